use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::warn;

use docpilot_cli::{ensure_docs_dir, init_logging, load_settings};
use docpilot_core::chunker::{Chunker, ChunkingConfig};
use docpilot_core::config::expand_path;
use docpilot_core::corpus::write_records;

/// Split a directory of Markdown documents into heading-scoped chunks.
#[derive(Parser)]
#[command(name = "docpilot-chunk", version, about, long_about = None)]
struct Cli {
    /// Documentation root (defaults to `docs.dir`)
    docs_dir: Option<PathBuf>,

    /// Output JSON file (defaults to `docs.output`)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only chunk the first N files
    #[arg(short, long)]
    limit: Option<usize>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging("info");
    let settings = load_settings()?;

    let docs_dir = cli.docs_dir.unwrap_or_else(|| expand_path(&settings.docs.dir));
    let output = cli.output.unwrap_or_else(|| expand_path(&settings.docs.output));
    ensure_docs_dir(&docs_dir)?;
    println!("Documentation directory: {}", docs_dir.display());

    let chunker = Chunker::with_config(ChunkingConfig { extensions: settings.docs.extensions.clone() });
    let corpus = match cli.limit {
        Some(limit) => chunker.process_directory_limited(&docs_dir, limit),
        None => chunker.process_directory(&docs_dir),
    }
    .with_context(|| format!("chunking {}", docs_dir.display()))?;

    if corpus.files == 0 {
        warn!("No documentation files found in {}", docs_dir.display());
        return Ok(());
    }

    write_records(&output, &corpus.chunks).with_context(|| format!("writing {}", output.display()))?;
    println!(
        "Processed {} files ({} skipped) into {} chunks: {}",
        corpus.files,
        corpus.skipped,
        corpus.chunks.len(),
        output.display()
    );
    Ok(())
}
