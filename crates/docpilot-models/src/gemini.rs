use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use docpilot_core::config::{ApiKey, ModelSettings};
use docpilot_core::traits::{Embedder, Generator};
use docpilot_core::types::EmbedMode;
use docpilot_core::{Error, Result};

use crate::wire;

/// Gemini REST client serving both embeddings and generation.
///
/// The credential is handed in at construction; the client never reads the
/// environment itself.
pub struct GeminiClient {
    http: Client,
    api_key: ApiKey,
    base_url: String,
    embedding_model: String,
    generation_model: String,
    dim: usize,
}

impl GeminiClient {
    pub fn new(settings: &ModelSettings, api_key: ApiKey) -> Result<Self> {
        let http = Client::builder()
            .timeout(settings.timeout())
            .build()
            .map_err(|e| Error::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            api_key,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            embedding_model: wire::model_path(&settings.embedding_model),
            generation_model: wire::model_path(&settings.generation_model),
            dim: settings.dim,
        })
    }

    async fn post_json<T: Serialize + ?Sized>(&self, url: &str, body: &T) -> Result<String> {
        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", self.api_key.expose())
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("request to {url} failed: {e}")))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Transport(format!("reading response from {url} failed: {e}")))?;
        if !status.is_success() {
            return Err(wire::classify_failure(status.as_u16(), &text));
        }
        Ok(text)
    }
}

#[async_trait]
impl Embedder for GeminiClient {
    fn dim(&self) -> usize { self.dim }

    async fn embed_batch(&self, texts: &[String], mode: EmbedMode) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let url = format!("{}/{}:batchEmbedContents", self.base_url, self.embedding_model);
        let request = wire::embed_request(&self.embedding_model, texts, mode);
        debug!(count = texts.len(), task = wire::task_type(mode), "embedding batch");
        let body = self.post_json(&url, &request).await?;
        wire::parse_embeddings(&body, texts.len())
    }
}

#[async_trait]
impl Generator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/{}:generateContent", self.base_url, self.generation_model);
        debug!(chars = prompt.len(), model = %self.generation_model, "generating answer");
        let body = self.post_json(&url, &wire::generate_request(prompt)).await?;
        wire::parse_generation(&body)
    }
}
