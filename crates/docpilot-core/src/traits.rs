use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ChunkMetadata, EmbedMode, StoredMatch};

#[async_trait]
pub trait Embedder: Send + Sync {
    /// Dimensionality of every vector this embedder returns.
    fn dim(&self) -> usize;
    /// One vector per input text, same order. An empty vector marks a text the
    /// model could not embed.
    async fn embed_batch(&self, texts: &[String], mode: EmbedMode) -> Result<Vec<Vec<f32>>>;
}

#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

#[async_trait]
pub trait VectorCollection: Send + Sync {
    fn name(&self) -> &str;
    /// All slices are aligned by position.
    async fn add(
        &self,
        ids: &[String],
        vectors: &[Vec<f32>],
        metadata: &[ChunkMetadata],
        contents: &[String],
    ) -> Result<()>;
    /// Up to `k` nearest rows, closest first.
    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<StoredMatch>>;
    async fn count(&self) -> Result<usize>;
}

#[async_trait]
pub trait IndexStore: Send + Sync {
    type Collection: VectorCollection;

    async fn get_or_create_collection(&self, name: &str) -> Result<Self::Collection>;
    /// Fails with `Error::NotFound` when no collection called `name` exists.
    async fn get_existing_collection(&self, name: &str) -> Result<Self::Collection>;
}
