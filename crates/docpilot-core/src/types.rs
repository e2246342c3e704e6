//! Domain types shared by the chunker, the indexer and the query engine.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{Error, Result};

pub type ChunkId = String;

/// Retrieval width used when a caller does not pick one.
pub const DEFAULT_TOP_K: usize = 5;

/// Build the store primary key for the `ordinal`-th chunk of `source`.
pub fn chunk_id(source: &str, ordinal: usize) -> ChunkId {
    format!("{source}:{ordinal}")
}

/// A chunk as it travels on disk between chunking and ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub source: String,
    pub heading: String,
    pub content: String,
}

/// A contiguous span of one document, independently retrievable.
///
/// - `id`: `source` plus the chunk's ordinal within that source
/// - `source`: path-like identifier of the originating document
/// - `heading`: nearest heading, or the document name for preamble text
/// - `content`: trimmed, never empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: ChunkId,
    pub source: String,
    pub heading: String,
    pub content: String,
}

impl Chunk {
    pub fn new(source: &str, heading: &str, content: &str, ordinal: usize) -> Self {
        Self {
            id: chunk_id(source, ordinal),
            source: source.to_string(),
            heading: heading.to_string(),
            content: content.to_string(),
        }
    }

    pub fn metadata(&self) -> ChunkMetadata {
        ChunkMetadata { source: self.source.clone(), heading: self.heading.clone() }
    }

    pub fn to_record(&self) -> ChunkRecord {
        ChunkRecord { source: self.source.clone(), heading: self.heading.clone(), content: self.content.clone() }
    }
}

/// Give each record an id from its position among records of the same source.
///
/// Input order is preserved, so feeding back the chunker's output yields the
/// same ids the chunker produced.
pub fn assign_ids(records: Vec<ChunkRecord>) -> Vec<Chunk> {
    let mut ordinals: HashMap<String, usize> = HashMap::new();
    records
        .into_iter()
        .map(|r| {
            let next = ordinals.entry(r.source.clone()).or_insert(0);
            let chunk = Chunk { id: chunk_id(&r.source, *next), source: r.source, heading: r.heading, content: r.content };
            *next += 1;
            chunk
        })
        .collect()
}

/// Metadata stored next to every vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub source: String,
    pub heading: String,
}

/// Which side of a retrieval task a text is embedded for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmbedMode {
    Indexing,
    Query,
}

/// One row returned by a nearest-neighbour lookup. Lower `distance` is closer.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredMatch {
    pub content: String,
    pub metadata: ChunkMetadata,
    pub distance: f32,
}

/// A retrieved chunk with its 1-based rank.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedChunk {
    pub rank: usize,
    pub source: String,
    pub heading: String,
    pub content: String,
    pub distance: f32,
}

/// Chunks retrieved for a single query, most relevant first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetrievalResult {
    pub chunks: Vec<RetrievedChunk>,
}

impl RetrievalResult {
    /// Rank store matches in the order the store returned them.
    pub fn from_matches(matches: Vec<StoredMatch>) -> Self {
        let chunks = matches
            .into_iter()
            .enumerate()
            .map(|(i, m)| RetrievedChunk {
                rank: i + 1,
                source: m.metadata.source,
                heading: m.metadata.heading,
                content: m.content,
                distance: m.distance,
            })
            .collect();
        Self { chunks }
    }

    pub fn len(&self) -> usize { self.chunks.len() }

    pub fn is_empty(&self) -> bool { self.chunks.is_empty() }

    pub fn iter(&self) -> std::slice::Iter<'_, RetrievedChunk> { self.chunks.iter() }
}

/// A validated user question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    text: String,
    k: usize,
}

impl Query {
    pub fn new(text: &str, k: usize) -> Result<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::EmptyQuestion);
        }
        if k == 0 {
            return Err(Error::InvalidConfig("retrieval width k must be positive".to_string()));
        }
        Ok(Self { text: text.to_string(), k })
    }

    pub fn text(&self) -> &str { &self.text }

    pub fn k(&self) -> usize { self.k }
}
