//! Request and response bodies of the Gemini REST API (`v1beta`).

use serde::{Deserialize, Serialize};

use docpilot_core::types::EmbedMode;
use docpilot_core::{Error, Result};

#[derive(Debug, Serialize)]
pub struct Part<'a> {
    pub text: &'a str,
}

#[derive(Debug, Serialize)]
pub struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<&'static str>,
    pub parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedContentRequest<'a> {
    pub model: &'a str,
    pub content: Content<'a>,
    pub task_type: &'static str,
}

#[derive(Debug, Serialize)]
pub struct BatchEmbedRequest<'a> {
    pub requests: Vec<EmbedContentRequest<'a>>,
}

#[derive(Debug, Deserialize)]
pub struct BatchEmbedResponse {
    #[serde(default)]
    pub embeddings: Vec<ContentEmbedding>,
}

#[derive(Debug, Deserialize)]
pub struct ContentEmbedding {
    #[serde(default)]
    pub values: Vec<f32>,
}

#[derive(Debug, Serialize)]
pub struct GenerateRequest<'a> {
    pub contents: Vec<Content<'a>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Gemini task type for an embedding mode.
pub fn task_type(mode: EmbedMode) -> &'static str {
    match mode {
        EmbedMode::Indexing => "RETRIEVAL_DOCUMENT",
        EmbedMode::Query => "RETRIEVAL_QUERY",
    }
}

/// `models/<name>`, accepting either form as input.
pub fn model_path(model: &str) -> String {
    if model.starts_with("models/") { model.to_string() } else { format!("models/{model}") }
}

pub fn embed_request<'a>(model: &'a str, texts: &'a [String], mode: EmbedMode) -> BatchEmbedRequest<'a> {
    let requests = texts
        .iter()
        .map(|text| EmbedContentRequest {
            model,
            content: Content { role: None, parts: vec![Part { text: text.as_str() }] },
            task_type: task_type(mode),
        })
        .collect();
    BatchEmbedRequest { requests }
}

pub fn generate_request(prompt: &str) -> GenerateRequest<'_> {
    GenerateRequest { contents: vec![Content { role: Some("user"), parts: vec![Part { text: prompt }] }] }
}

/// Decode a batch embedding response, insisting on one vector per input.
pub fn parse_embeddings(body: &str, expected: usize) -> Result<Vec<Vec<f32>>> {
    let response: BatchEmbedResponse = serde_json::from_str(body)
        .map_err(|e| Error::Transport(format!("malformed embedding response: {e}")))?;
    if response.embeddings.len() != expected {
        return Err(Error::Transport(format!(
            "malformed embedding response: expected {expected} vectors, got {}",
            response.embeddings.len()
        )));
    }
    Ok(response.embeddings.into_iter().map(|e| e.values).collect())
}

/// Concatenate the text parts of the first candidate.
pub fn parse_generation(body: &str) -> Result<String> {
    let response: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| Error::Transport(format!("malformed generation response: {e}")))?;
    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "no candidates returned".to_string());
        return Err(Error::Transport(format!("generation produced no answer: {reason}")));
    };
    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "empty content".to_string());
        return Err(Error::Transport(format!("generation produced no answer: {reason}")));
    }
    Ok(text)
}

/// Map a non-success HTTP status and body onto the error taxonomy.
pub fn classify_failure(status: u16, body: &str) -> Error {
    let parsed = serde_json::from_str::<ApiErrorBody>(body).ok();
    let exhausted = parsed
        .as_ref()
        .and_then(|b| b.error.status.as_deref())
        .is_some_and(|s| s == "RESOURCE_EXHAUSTED");
    let message = match parsed {
        Some(b) if !b.error.message.is_empty() => b.error.message,
        _ => body.chars().take(200).collect(),
    };
    if status == 429 || exhausted {
        Error::Quota(format!("HTTP {status}: {message}"))
    } else {
        Error::Transport(format!("HTTP {status}: {message}"))
    }
}
