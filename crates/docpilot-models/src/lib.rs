//! Embedding and generation clients behind the `docpilot-core` traits.

use std::sync::Arc;
use tracing::info;

use docpilot_core::config::{ApiKey, ModelSettings, Provider};
use docpilot_core::traits::{Embedder, Generator};
use docpilot_core::Result;

pub mod fake;
pub mod gemini;
pub mod wire;

pub use fake::{EchoGenerator, FakeEmbedder};
pub use gemini::GeminiClient;

/// Long-lived client handles, created once at startup.
#[derive(Clone)]
pub struct ModelClients {
    pub embedder: Arc<dyn Embedder>,
    pub generator: Arc<dyn Generator>,
}

/// Build clients for the configured provider, reading the credential from the
/// environment variable named in `settings` when one is needed.
pub fn build_clients(settings: &ModelSettings) -> Result<ModelClients> {
    match settings.provider {
        Provider::Fake => Ok(fake_clients(settings.dim)),
        Provider::Gemini => build_gemini_clients(settings, settings.api_key()?),
    }
}

pub fn build_gemini_clients(settings: &ModelSettings, api_key: ApiKey) -> Result<ModelClients> {
    let client = Arc::new(GeminiClient::new(settings, api_key)?);
    info!(embedding = %settings.embedding_model, generation = %settings.generation_model, "Gemini clients configured");
    Ok(ModelClients { embedder: client.clone(), generator: client })
}

pub fn fake_clients(dim: usize) -> ModelClients {
    info!(dim, "using offline FakeEmbedder and EchoGenerator");
    ModelClients { embedder: Arc::new(FakeEmbedder::new(dim)), generator: Arc::new(EchoGenerator) }
}
