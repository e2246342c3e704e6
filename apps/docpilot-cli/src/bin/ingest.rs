use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use docpilot_cli::{init_logging, load_settings, store_path};
use docpilot_core::config::expand_path;
use docpilot_core::corpus::load_chunks;
use docpilot_core::traits::{IndexStore, VectorCollection};
use docpilot_models::build_clients;
use docpilot_rag::{Indexer, IndexerOptions};
use docpilot_vector::LanceStore;

/// Embed chunk records and store them in the vector index.
#[derive(Parser)]
#[command(name = "docpilot-ingest", version, about, long_about = None)]
struct Cli {
    /// Chunk records JSON (defaults to `docs.output`)
    input: Option<PathBuf>,

    /// Delete the store directory before ingesting
    #[arg(long)]
    fresh: bool,

    /// Override `ingest.batch_size`
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Disable the progress bar
    #[arg(long)]
    no_progress: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging("info");
    let mut settings = load_settings()?;
    if let Some(batch_size) = cli.batch_size {
        settings.ingest.batch_size = batch_size;
    }

    // Credential and provider problems surface before any file or store work.
    let clients = build_clients(&settings.models).context("configuring model clients")?;

    let input = cli.input.unwrap_or_else(|| expand_path(&settings.docs.output));
    let chunks = load_chunks(&input).with_context(|| format!("loading chunks from {}", input.display()))?;
    println!("Loaded {} chunks from {}", chunks.len(), input.display());

    let db_path = store_path(&settings);
    if cli.fresh && db_path.exists() {
        std::fs::remove_dir_all(&db_path).with_context(|| format!("removing {}", db_path.display()))?;
        println!("Removed existing store at {}", db_path.display());
    }
    let store = LanceStore::open(&db_path, settings.models.dim).await?;
    let collection = store.get_or_create_collection(&settings.store.collection).await?;

    let options = IndexerOptions { show_progress: !cli.no_progress, ..IndexerOptions::from_settings(&settings) };
    let indexer = Indexer::new(clients.embedder, collection, options);
    let report = indexer.ingest(&chunks).await?;

    println!("\nIngestion complete");
    println!("  processed: {}", report.processed());
    println!("  succeeded: {}", report.succeeded);
    println!("  failed:    {}", report.failed);
    println!("  failed batches: {} of {}", report.failed_batches, report.batches);
    println!(
        "  collection '{}' now holds {} chunks",
        settings.store.collection,
        indexer.collection().count().await?
    );
    Ok(())
}
