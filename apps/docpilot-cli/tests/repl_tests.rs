use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use docpilot_cli::repl::{is_exit_command, run_repl, SessionStats};
use docpilot_core::traits::IndexStore;
use docpilot_core::types::Chunk;
use docpilot_models::fake_clients;
use docpilot_rag::{Indexer, IndexerOptions, QueryEngine};
use docpilot_vector::{LanceCollection, LanceStore};
use tempfile::TempDir;

async fn indexed_collection(tmp: &TempDir, store_dim: usize, embed_dim: usize) -> LanceCollection {
    let store = LanceStore::open(&tmp.path().join("db"), store_dim).await.unwrap();
    let collection = store.get_or_create_collection("docs").await.unwrap();
    if store_dim == embed_dim {
        let chunks = vec![
            Chunk::new("docs/guide.md", "Setup", "Install the package with the installer.", 0),
            Chunk::new("docs/guide.md", "Usage", "Run the tool with a config file.", 1),
        ];
        let options = IndexerOptions { backoff: Duration::ZERO, ..IndexerOptions::default() };
        let indexer = Indexer::new(Arc::clone(&fake_clients(embed_dim).embedder), collection.clone(), options);
        indexer.ingest(&chunks).await.unwrap();
    }
    collection
}

async fn session(engine: &QueryEngine<LanceCollection>, input: &str) -> (SessionStats, String) {
    let mut out = Vec::new();
    let stats = run_repl(engine, Cursor::new(input.to_string()), &mut out).await.unwrap();
    (stats, String::from_utf8(out).unwrap())
}

#[test]
fn exit_commands_ignore_case_and_padding() {
    assert!(is_exit_command("quit\n"));
    assert!(is_exit_command("  EXIT "));
    assert!(is_exit_command("Quit"));
    assert!(!is_exit_command("quitting"));
    assert!(!is_exit_command(""));
}

#[tokio::test]
async fn answers_until_quit_and_skips_blank_lines() {
    let tmp = TempDir::new().unwrap();
    let collection = indexed_collection(&tmp, 64, 64).await;
    let clients = fake_clients(64);
    let engine = QueryEngine::new(clients.embedder, clients.generator, collection).with_top_k(2);

    let (stats, out) = session(&engine, "   \nhow do I install the package?\nQUIT\nnever asked\n").await;

    assert_eq!(stats, SessionStats { answered: 1, failed: 0 });
    assert_eq!(out.matches("--- Answer ---").count(), 1);
    assert!(out.contains("Source 1: docs/guide.md"));
    assert!(out.contains("--- Retrieved Documentation Context ---"));
    assert!(out.trim_end().ends_with("Copilot session ended. Goodbye!"));
}

#[tokio::test]
async fn failed_question_is_reported_and_loop_continues() {
    let tmp = TempDir::new().unwrap();
    // Store expects 8-dim vectors, the embedder produces 16.
    let collection = indexed_collection(&tmp, 8, 16).await;
    let clients = fake_clients(16);
    let engine = QueryEngine::new(clients.embedder, clients.generator, collection);

    let (stats, out) = session(&engine, "first question\nsecond question\n").await;

    assert_eq!(stats, SessionStats { answered: 0, failed: 2 });
    assert_eq!(out.matches("An error occurred: ").count(), 2);
    assert!(out.contains("Goodbye!"));
}

#[tokio::test]
async fn end_of_input_ends_the_session() {
    let tmp = TempDir::new().unwrap();
    let collection = indexed_collection(&tmp, 16, 16).await;
    let clients = fake_clients(16);
    let engine = QueryEngine::new(clients.embedder, clients.generator, collection);

    let (stats, out) = session(&engine, "").await;

    assert_eq!(stats, SessionStats::default());
    assert!(out.contains("Type 'quit' or 'exit' to stop."));
    assert!(out.contains("Goodbye!"));
}
