use anyhow::{Context, Result};
use clap::Parser;
use std::io;
use std::process::ExitCode;

use docpilot_cli::repl::run_repl;
use docpilot_cli::{init_logging, load_settings, store_path};
use docpilot_core::traits::IndexStore;
use docpilot_core::Error;
use docpilot_models::build_clients;
use docpilot_rag::QueryEngine;
use docpilot_vector::LanceStore;

/// Ask questions about the ingested documentation.
#[derive(Parser)]
#[command(name = "docpilot-copilot", version, about, long_about = None)]
struct Cli {
    /// Chunks retrieved per question (defaults to `query.top_k`)
    #[arg(short = 'k', long)]
    top_k: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging("warn");
    let mut settings = load_settings()?;
    if let Some(top_k) = cli.top_k {
        anyhow::ensure!(top_k > 0, "--top-k must be positive");
        settings.query.top_k = top_k;
    }

    let clients = build_clients(&settings.models).context("configuring model clients")?;

    let opened = match LanceStore::open_existing(&store_path(&settings), settings.models.dim).await {
        Ok(store) => store.get_existing_collection(&settings.store.collection).await,
        Err(e) => Err(e),
    };
    let collection = match opened {
        Ok(collection) => collection,
        Err(Error::NotFound(msg)) => {
            eprintln!("Error: {msg}");
            eprintln!("Please run docpilot-ingest first to build the index.");
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Err(e).context("opening the index store"),
    };
    println!("Connected to collection '{}'.", settings.store.collection);

    let engine = QueryEngine::from_settings(clients.embedder, clients.generator, collection, &settings);
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    run_repl(&engine, stdin.lock(), &mut stdout).await?;
    Ok(ExitCode::SUCCESS)
}
