use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use docpilot_core::config::Settings;
use docpilot_core::traits::{Embedder, Generator, VectorCollection};
use docpilot_core::types::{EmbedMode, Query, RetrievalResult, DEFAULT_TOP_K};
use docpilot_core::{Error, Result};

use crate::prompt::{compose_prompt, format_context};
use crate::timeout::with_timeout;

/// A generated answer and the material it was grounded on.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub text: String,
    pub retrieval: RetrievalResult,
    /// The context block exactly as it appeared in the prompt.
    pub context: String,
}

/// Retrieval-augmented question answering over one collection.
pub struct QueryEngine<C> {
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn Generator>,
    collection: C,
    top_k: usize,
    call_timeout: Duration,
}

impl<C: VectorCollection> QueryEngine<C> {
    pub fn new(embedder: Arc<dyn Embedder>, generator: Arc<dyn Generator>, collection: C) -> Self {
        Self { embedder, generator, collection, top_k: DEFAULT_TOP_K, call_timeout: Duration::from_secs(60) }
    }

    pub fn from_settings(
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
        collection: C,
        settings: &Settings,
    ) -> Self {
        Self::new(embedder, generator, collection)
            .with_top_k(settings.query.top_k)
            .with_call_timeout(settings.models.timeout())
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_call_timeout(mut self, limit: Duration) -> Self {
        self.call_timeout = limit;
        self
    }

    pub fn top_k(&self) -> usize { self.top_k }

    /// Embed the question for retrieval and fetch its nearest chunks.
    pub async fn retrieve(&self, query: &Query) -> Result<RetrievalResult> {
        let texts = [query.text().to_string()];
        let call = self.embedder.embed_batch(&texts, EmbedMode::Query);
        let vector = with_timeout(self.call_timeout, "question embedding", call)
            .await?
            .into_iter()
            .next()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::Transport("embedding model returned no vector for the question".to_string()))?;

        let call = self.collection.query(&vector, query.k());
        let matches = with_timeout(self.call_timeout, "index store query", call).await?;
        debug!(hits = matches.len(), k = query.k(), "retrieved chunks");
        Ok(RetrievalResult::from_matches(matches))
    }

    /// Answer one question. Blank questions fail with `EmptyQuestion` before
    /// any collaborator is called.
    pub async fn answer(&self, question: &str) -> Result<Answer> {
        let query = Query::new(question, self.top_k)?;
        let retrieval = self.retrieve(&query).await?;
        info!("Answering from {} retrieved chunks", retrieval.len());

        let context = format_context(&retrieval);
        let prompt = compose_prompt(query.text(), &context);
        let text = with_timeout(self.call_timeout, "generation call", self.generator.generate(&prompt)).await?;
        Ok(Answer { text, retrieval, context })
    }
}
