#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

use docpilot_core::traits::{Embedder, Generator, VectorCollection};
use docpilot_core::types::{Chunk, ChunkMetadata, EmbedMode, StoredMatch};
use docpilot_core::{Error, Result};

/// What the embedder should do on a given call (1-based).
#[derive(Clone, Copy)]
pub enum Script {
    Ok,
    Fail,
    ShortCount,
    EmptyFirst,
    Stall,
}

/// Embedder that records every call and follows a per-call script.
pub struct ScriptedEmbedder {
    pub dim: usize,
    script: Vec<Script>,
    pub calls: Mutex<Vec<(Vec<String>, EmbedMode)>>,
}

impl ScriptedEmbedder {
    pub fn new(dim: usize, script: Vec<Script>) -> Self {
        Self { dim, script, calls: Mutex::new(Vec::new()) }
    }

    pub fn ok(dim: usize) -> Self { Self::new(dim, Vec::new()) }

    pub fn call_count(&self) -> usize { self.calls.lock().unwrap().len() }

    pub fn modes(&self) -> Vec<EmbedMode> {
        self.calls.lock().unwrap().iter().map(|(_, m)| *m).collect()
    }
}

#[async_trait]
impl Embedder for ScriptedEmbedder {
    fn dim(&self) -> usize { self.dim }

    async fn embed_batch(&self, texts: &[String], mode: EmbedMode) -> Result<Vec<Vec<f32>>> {
        let call_no = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((texts.to_vec(), mode));
            calls.len()
        };
        let step = self.script.get(call_no - 1).copied().unwrap_or(Script::Ok);
        let mut vectors: Vec<Vec<f32>> = texts.iter().map(|_| vec![1.0; self.dim]).collect();
        match step {
            Script::Ok => Ok(vectors),
            Script::Fail => Err(Error::Quota("scripted quota failure".to_string())),
            Script::ShortCount => {
                vectors.pop();
                Ok(vectors)
            }
            Script::EmptyFirst => {
                if let Some(first) = vectors.first_mut() {
                    first.clear();
                }
                Ok(vectors)
            }
            Script::Stall => {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(vectors)
            }
        }
    }
}

/// Collection that keeps rows in memory and returns canned query results.
#[derive(Default)]
pub struct MemoryCollection {
    pub rows: Mutex<Vec<(String, ChunkMetadata, String)>>,
    pub canned: Vec<StoredMatch>,
    pub fail_adds: bool,
    pub queried_k: Mutex<Vec<usize>>,
}

impl MemoryCollection {
    pub fn with_matches(canned: Vec<StoredMatch>) -> Self {
        Self { canned, ..Self::default() }
    }

    pub fn failing() -> Self {
        Self { fail_adds: true, ..Self::default() }
    }

    pub fn ids(&self) -> Vec<String> {
        self.rows.lock().unwrap().iter().map(|(id, _, _)| id.clone()).collect()
    }
}

#[async_trait]
impl VectorCollection for MemoryCollection {
    fn name(&self) -> &str { "memory" }

    async fn add(
        &self,
        ids: &[String],
        _vectors: &[Vec<f32>],
        metadata: &[ChunkMetadata],
        contents: &[String],
    ) -> Result<()> {
        if self.fail_adds {
            return Err(Error::Transport("store unavailable".to_string()));
        }
        let mut rows = self.rows.lock().unwrap();
        for ((id, meta), content) in ids.iter().zip(metadata).zip(contents) {
            rows.push((id.clone(), meta.clone(), content.clone()));
        }
        Ok(())
    }

    async fn query(&self, _vector: &[f32], k: usize) -> Result<Vec<StoredMatch>> {
        self.queried_k.lock().unwrap().push(k);
        Ok(self.canned.iter().take(k).cloned().collect())
    }

    async fn count(&self) -> Result<usize> { Ok(self.rows.lock().unwrap().len()) }
}

/// Generator that remembers prompts and replies with a fixed answer.
#[derive(Default)]
pub struct RecordingGenerator {
    pub prompts: Mutex<Vec<String>>,
    pub fail: bool,
}

#[async_trait]
impl Generator for RecordingGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.fail {
            return Err(Error::Transport("generation backend down".to_string()));
        }
        Ok("generated answer".to_string())
    }
}

pub fn chunks(n: usize) -> Vec<Chunk> {
    (0..n).map(|i| Chunk::new("guide.md", "Guide", &format!("content {i}"), i)).collect()
}

pub fn stored(source: &str, heading: &str, content: &str, distance: f32) -> StoredMatch {
    StoredMatch {
        content: content.to_string(),
        metadata: ChunkMetadata { source: source.to_string(), heading: heading.to_string() },
        distance,
    }
}
