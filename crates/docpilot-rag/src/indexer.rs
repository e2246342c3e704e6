//! Batched embedding and storage of chunks.
//!
//! Batches run strictly in input order. A batch whose embedding call fails is
//! skipped as a whole and followed by a fixed pause; it never stops the run.
//! Re-running ingestion over the same chunks is the recovery path, since ids
//! are stable and the store upserts.

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use docpilot_core::config::Settings;
use docpilot_core::traits::{Embedder, VectorCollection};
use docpilot_core::types::{Chunk, ChunkMetadata, EmbedMode};
use docpilot_core::{Error, Result};

use crate::timeout::with_timeout;

#[derive(Debug, Clone)]
pub struct IndexerOptions {
    pub batch_size: usize,
    /// Pause after a failed batch before the next one starts.
    pub backoff: Duration,
    /// Upper bound on each embedding or store call.
    pub call_timeout: Duration,
    pub show_progress: bool,
}

impl Default for IndexerOptions {
    fn default() -> Self {
        Self {
            batch_size: 100,
            backoff: Duration::from_secs(10),
            call_timeout: Duration::from_secs(60),
            show_progress: false,
        }
    }
}

impl IndexerOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            batch_size: settings.ingest.batch_size,
            backoff: settings.ingest.backoff(),
            call_timeout: settings.models.timeout(),
            show_progress: false,
        }
    }
}

/// Totals for one ingestion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub succeeded: usize,
    pub failed: usize,
    pub batches: usize,
    pub failed_batches: usize,
}

impl IngestReport {
    pub fn processed(&self) -> usize { self.succeeded + self.failed }
}

pub struct Indexer<C> {
    embedder: Arc<dyn Embedder>,
    collection: C,
    options: IndexerOptions,
}

impl<C: VectorCollection> Indexer<C> {
    pub fn new(embedder: Arc<dyn Embedder>, collection: C, options: IndexerOptions) -> Self {
        Self { embedder, collection, options }
    }

    pub fn collection(&self) -> &C { &self.collection }

    pub async fn ingest(&self, chunks: &[Chunk]) -> Result<IngestReport> {
        let batch_size = self.options.batch_size;
        if batch_size == 0 {
            return Err(Error::InvalidConfig("batch size must be positive".to_string()));
        }
        let mut report = IngestReport::default();
        if chunks.is_empty() {
            info!("No chunks to index");
            return Ok(report);
        }

        let total_batches = chunks.len().div_ceil(batch_size);
        info!(
            "Indexing {} chunks into collection '{}' in {} batches of up to {}",
            chunks.len(),
            self.collection.name(),
            total_batches,
            batch_size
        );
        let pb = self.progress_bar(chunks.len());

        for (i, batch) in chunks.chunks(batch_size).enumerate() {
            let batch_no = i + 1;
            report.batches += 1;
            pb.set_message(format!("batch {batch_no}/{total_batches}"));

            let Some(vectors) = self.embed(batch, batch_no).await else {
                report.failed += batch.len();
                report.failed_batches += 1;
                pb.inc(batch.len() as u64);
                if batch_no < total_batches && !self.options.backoff.is_zero() {
                    info!("Backing off for {:?} before the next batch", self.options.backoff);
                    tokio::time::sleep(self.options.backoff).await;
                }
                continue;
            };

            let (stored, missing) = self.store(batch, vectors, batch_no).await;
            report.succeeded += stored;
            report.failed += missing;
            if stored == 0 && missing > 0 {
                report.failed_batches += 1;
            }
            pb.inc(batch.len() as u64);
        }

        pb.finish_with_message("done");
        info!(
            "Ingestion finished: {} succeeded, {} failed ({} of {} batches failed)",
            report.succeeded, report.failed, report.failed_batches, report.batches
        );
        Ok(report)
    }

    /// Embed one batch; `None` means every chunk of it goes without a vector.
    async fn embed(&self, batch: &[Chunk], batch_no: usize) -> Option<Vec<Vec<f32>>> {
        let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
        let call = self.embedder.embed_batch(&texts, EmbedMode::Indexing);
        match with_timeout(self.options.call_timeout, "embedding call", call).await {
            Ok(vectors) if vectors.len() == batch.len() => Some(vectors),
            Ok(vectors) => {
                warn!(
                    "Skipping batch {}: embedding model returned {} vectors for {} chunks",
                    batch_no,
                    vectors.len(),
                    batch.len()
                );
                None
            }
            Err(e) => {
                warn!("Skipping batch {} ({} chunks): {}", batch_no, batch.len(), e);
                None
            }
        }
    }

    /// Write the chunks that got a vector. Returns (stored, failed).
    async fn store(&self, batch: &[Chunk], vectors: Vec<Vec<f32>>, batch_no: usize) -> (usize, usize) {
        let mut ids = Vec::with_capacity(batch.len());
        let mut kept = Vec::with_capacity(batch.len());
        let mut metadata: Vec<ChunkMetadata> = Vec::with_capacity(batch.len());
        let mut contents = Vec::with_capacity(batch.len());
        for (chunk, vector) in batch.iter().zip(vectors) {
            if vector.is_empty() {
                continue;
            }
            ids.push(chunk.id.clone());
            kept.push(vector);
            metadata.push(chunk.metadata());
            contents.push(chunk.content.clone());
        }

        let unembedded = batch.len() - ids.len();
        if unembedded > 0 {
            warn!("Batch {}: {} chunks came back without an embedding", batch_no, unembedded);
        }
        if ids.is_empty() {
            return (0, unembedded);
        }

        let call = self.collection.add(&ids, &kept, &metadata, &contents);
        match with_timeout(self.options.call_timeout, "index store write", call).await {
            Ok(()) => (ids.len(), unembedded),
            Err(e) => {
                warn!("Batch {}: failed to store {} chunks: {}", batch_no, ids.len(), e);
                (0, batch.len())
            }
        }
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.options.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        pb.set_style(style);
        pb
    }
}
