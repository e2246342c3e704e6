//! Startup plumbing shared by the docpilot binaries.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use docpilot_core::config::{expand_path, Config, Settings};

pub mod repl;

/// Log to stderr; `RUST_LOG` overrides the default level.
pub fn init_logging(default_level: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

pub fn load_settings() -> Result<Settings> {
    let config = Config::load().context("loading configuration")?;
    config.settings().context("invalid configuration")
}

pub fn store_path(settings: &Settings) -> PathBuf { expand_path(&settings.store.path) }

/// Fail unless `dir` is an existing directory.
pub fn ensure_docs_dir(dir: &Path) -> Result<()> {
    anyhow::ensure!(dir.is_dir(), "documentation directory {} does not exist or is not a directory", dir.display());
    Ok(())
}
