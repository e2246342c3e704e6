mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use common::{chunks, MemoryCollection, Script, ScriptedEmbedder};
use docpilot_core::types::EmbedMode;
use docpilot_core::Error;
use docpilot_rag::{Indexer, IndexerOptions, IngestReport};

fn options(batch_size: usize) -> IndexerOptions {
    IndexerOptions { batch_size, backoff: Duration::ZERO, ..IndexerOptions::default() }
}

#[tokio::test]
async fn one_failed_batch_of_three_counts_only_its_chunks() {
    let embedder = Arc::new(ScriptedEmbedder::new(4, vec![Script::Ok, Script::Fail, Script::Ok]));
    let indexer = Indexer::new(embedder.clone(), MemoryCollection::default(), options(3));

    let report = indexer.ingest(&chunks(8)).await.unwrap();

    assert_eq!(report, IngestReport { succeeded: 5, failed: 3, batches: 3, failed_batches: 1 });
    assert_eq!(report.processed(), 8);
    assert_eq!(embedder.call_count(), 3);
    assert!(embedder.modes().iter().all(|m| *m == EmbedMode::Indexing));
    assert_eq!(
        indexer.collection().ids(),
        vec!["guide.md:0", "guide.md:1", "guide.md:2", "guide.md:6", "guide.md:7"]
    );
}

#[tokio::test]
async fn batches_follow_input_order() {
    let embedder = Arc::new(ScriptedEmbedder::ok(2));
    let indexer = Indexer::new(embedder.clone(), MemoryCollection::default(), options(2));

    indexer.ingest(&chunks(5)).await.unwrap();

    let calls = embedder.calls.lock().unwrap();
    let sizes: Vec<usize> = calls.iter().map(|(texts, _)| texts.len()).collect();
    assert_eq!(sizes, vec![2, 2, 1]);
    assert_eq!(calls[1].0, vec!["content 2".to_string(), "content 3".to_string()]);
}

#[tokio::test]
async fn wrong_vector_count_fails_the_whole_batch() {
    let embedder = Arc::new(ScriptedEmbedder::new(2, vec![Script::ShortCount]));
    let indexer = Indexer::new(embedder, MemoryCollection::default(), options(4));

    let report = indexer.ingest(&chunks(4)).await.unwrap();

    assert_eq!(report.succeeded, 0);
    assert_eq!(report.failed, 4);
    assert_eq!(report.failed_batches, 1);
    assert!(indexer.collection().ids().is_empty());
}

#[tokio::test]
async fn chunks_without_a_vector_are_failures() {
    let embedder = Arc::new(ScriptedEmbedder::new(2, vec![Script::EmptyFirst]));
    let indexer = Indexer::new(embedder, MemoryCollection::default(), options(3));

    let report = indexer.ingest(&chunks(3)).await.unwrap();

    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.failed_batches, 0);
    assert_eq!(indexer.collection().ids(), vec!["guide.md:1", "guide.md:2"]);
}

#[tokio::test]
async fn store_write_failure_fails_every_chunk_of_the_batch() {
    let embedder = Arc::new(ScriptedEmbedder::ok(2));
    let indexer = Indexer::new(embedder.clone(), MemoryCollection::failing(), options(2));

    let report = indexer.ingest(&chunks(3)).await.unwrap();

    assert_eq!(report, IngestReport { succeeded: 0, failed: 3, batches: 2, failed_batches: 2 });
    assert_eq!(embedder.call_count(), 2);
}

#[tokio::test]
async fn slow_embedding_call_times_out_as_a_failed_batch() {
    let embedder = Arc::new(ScriptedEmbedder::new(2, vec![Script::Stall, Script::Ok]));
    let opts = IndexerOptions { call_timeout: Duration::from_millis(50), ..options(2) };
    let indexer = Indexer::new(embedder, MemoryCollection::default(), opts);

    let report = indexer.ingest(&chunks(4)).await.unwrap();

    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, 2);
    assert_eq!(indexer.collection().ids(), vec!["guide.md:2", "guide.md:3"]);
}

#[tokio::test]
async fn failed_batch_is_followed_by_backoff() {
    let embedder = Arc::new(ScriptedEmbedder::new(2, vec![Script::Fail, Script::Ok]));
    let opts = IndexerOptions { backoff: Duration::from_millis(120), ..options(1) };
    let indexer = Indexer::new(embedder, MemoryCollection::default(), opts);

    let started = Instant::now();
    let report = indexer.ingest(&chunks(2)).await.unwrap();

    assert!(started.elapsed() >= Duration::from_millis(120));
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, 1);
}

#[tokio::test]
async fn empty_input_makes_no_calls() {
    let embedder = Arc::new(ScriptedEmbedder::ok(2));
    let indexer = Indexer::new(embedder.clone(), MemoryCollection::default(), options(10));

    let report = indexer.ingest(&[]).await.unwrap();

    assert_eq!(report, IngestReport::default());
    assert_eq!(embedder.call_count(), 0);
}

#[tokio::test]
async fn zero_batch_size_is_invalid() {
    let embedder = Arc::new(ScriptedEmbedder::ok(2));
    let indexer = Indexer::new(embedder, MemoryCollection::default(), options(0));

    assert!(matches!(indexer.ingest(&chunks(1)).await, Err(Error::InvalidConfig(_))));
}
