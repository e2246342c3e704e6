//! Ingestion and question answering on top of the collaborator traits.

pub mod engine;
pub mod indexer;
pub mod prompt;
pub mod timeout;

pub use engine::{Answer, QueryEngine};
pub use indexer::{Indexer, IndexerOptions, IngestReport};
