use docpilot_core::types::EmbedMode;
use docpilot_core::Error;
use docpilot_models::wire::{
    classify_failure, embed_request, generate_request, model_path, parse_embeddings, parse_generation,
};

#[test]
fn embed_request_carries_task_type_per_mode() {
    let texts = vec!["alpha".to_string(), "beta".to_string()];

    let doc = serde_json::to_value(embed_request("models/text-embedding-004", &texts, EmbedMode::Indexing)).unwrap();
    assert_eq!(doc["requests"].as_array().map(Vec::len), Some(2));
    assert_eq!(doc["requests"][0]["taskType"], "RETRIEVAL_DOCUMENT");
    assert_eq!(doc["requests"][1]["content"]["parts"][0]["text"], "beta");
    assert_eq!(doc["requests"][0]["model"], "models/text-embedding-004");
    assert!(doc["requests"][0]["content"].get("role").is_none());

    let query = serde_json::to_value(embed_request("models/text-embedding-004", &texts[..1], EmbedMode::Query)).unwrap();
    assert_eq!(query["requests"][0]["taskType"], "RETRIEVAL_QUERY");
}

#[test]
fn generate_request_wraps_prompt_as_user_turn() {
    let body = serde_json::to_value(generate_request("hi")).unwrap();
    assert_eq!(body["contents"][0]["role"], "user");
    assert_eq!(body["contents"][0]["parts"][0]["text"], "hi");
}

#[test]
fn model_path_is_normalized() {
    assert_eq!(model_path("gemini-1.5-flash"), "models/gemini-1.5-flash");
    assert_eq!(model_path("models/text-embedding-004"), "models/text-embedding-004");
}

#[test]
fn embeddings_must_match_input_count() {
    let body = r#"{"embeddings":[{"values":[0.1,0.2]},{"values":[0.3,0.4]}]}"#;
    let vectors = parse_embeddings(body, 2).expect("two vectors");
    assert_eq!(vectors[1], vec![0.3, 0.4]);

    assert!(matches!(parse_embeddings(body, 3), Err(Error::Transport(_))));
    assert!(matches!(parse_embeddings("<html>", 1), Err(Error::Transport(_))));
}

#[test]
fn generation_text_parts_are_concatenated() {
    let body = r#"{"candidates":[{"content":{"parts":[{"text":"Install "},{"text":"with npm."}]},"finishReason":"STOP"}]}"#;
    assert_eq!(parse_generation(body).expect("text"), "Install with npm.");
}

#[test]
fn blocked_generation_is_an_error() {
    let body = r#"{"candidates":[],"promptFeedback":{"blockReason":"SAFETY"}}"#;
    match parse_generation(body) {
        Err(Error::Transport(msg)) => assert!(msg.contains("SAFETY")),
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[test]
fn rate_limits_classify_as_quota() {
    assert!(matches!(classify_failure(429, "slow down"), Error::Quota(_)));
    let exhausted = r#"{"error":{"code":403,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
    assert!(matches!(classify_failure(403, exhausted), Error::Quota(ref m) if m.contains("Quota exceeded")));
    assert!(matches!(classify_failure(500, "boom"), Error::Transport(ref m) if m.contains("500")));
}
