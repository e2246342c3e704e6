use async_trait::async_trait;
use std::hash::{Hash, Hasher};
use twox_hash::XxHash64;

use docpilot_core::traits::{Embedder, Generator};
use docpilot_core::types::EmbedMode;
use docpilot_core::Result;

/// Deterministic bag-of-words hashing embedder for offline runs and tests.
///
/// Both modes share one vector space so queries land near documents that use
/// the same words.
pub struct FakeEmbedder { dim: usize }

impl FakeEmbedder {
    pub fn new(dim: usize) -> Self { Self { dim: dim.max(1) } }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dim];
        for (i, token) in text.split_whitespace().enumerate() {
            let token = token.to_lowercase();
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += val + (i as f32 % 3.0) * 0.01;
        }
        let norm = (v.iter().map(|x| x * x).sum::<f32>()).sqrt().max(1e-6);
        for x in &mut v { *x /= norm; }
        v
    }
}

#[async_trait]
impl Embedder for FakeEmbedder {
    fn dim(&self) -> usize { self.dim }

    async fn embed_batch(&self, texts: &[String], _mode: EmbedMode) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}

const CONTEXT_OPEN: &str = "--- Retrieved Documentation Context ---";
const CONTEXT_CLOSE: &str = "\n-------------------------------------";

/// The retrieved-context block of a copilot prompt, if it has one.
pub fn context_block(prompt: &str) -> Option<&str> {
    let start = prompt.find(CONTEXT_OPEN)?;
    let rest = &prompt[start..];
    let end = rest.rfind(CONTEXT_CLOSE)? + CONTEXT_CLOSE.len();
    Some(&rest[..end])
}

/// Offline generator that answers with the context block of its prompt, or
/// the whole prompt when there is none.
#[derive(Default)]
pub struct EchoGenerator;

#[async_trait]
impl Generator for EchoGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = context_block(prompt).unwrap_or(prompt);
        Ok(format!("[offline echo]\n{body}"))
    }
}
