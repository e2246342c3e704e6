//! JSON corpus files: the hand-off between chunking and ingestion.
//!
//! The file is a JSON array of `{source, heading, content}` objects. Ids are
//! not stored; they are re-derived from per-source order on load.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::types::{assign_ids, Chunk, ChunkRecord};

pub fn parse_records(json: &str) -> Result<Vec<ChunkRecord>> {
    serde_json::from_str(json).map_err(|e| Error::MalformedInput(e.to_string()))
}

/// Read a corpus file. Records with blank content are dropped and counted.
pub fn load_records(path: &Path) -> Result<Vec<ChunkRecord>> {
    let json = fs::read_to_string(path)?;
    let records = parse_records(&json).map_err(|e| match e {
        Error::MalformedInput(msg) => Error::MalformedInput(format!("{}: {msg}", path.display())),
        other => other,
    })?;
    let total = records.len();
    let records: Vec<ChunkRecord> = records.into_iter().filter(|r| !r.content.trim().is_empty()).collect();
    if records.len() < total {
        warn!(dropped = total - records.len(), "dropped records with empty content");
    }
    info!("Loaded {} chunk records from {}", records.len(), path.display());
    Ok(records)
}

/// Load a corpus file and derive chunk ids.
pub fn load_chunks(path: &Path) -> Result<Vec<Chunk>> {
    Ok(assign_ids(load_records(path)?))
}

pub fn write_records(path: &Path, chunks: &[Chunk]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let records: Vec<ChunkRecord> = chunks.iter().map(Chunk::to_record).collect();
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, &records).map_err(|e| Error::Io(e.into()))?;
    writer.flush()?;
    Ok(())
}
