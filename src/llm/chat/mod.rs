pub mod perplexity;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use self::perplexity::PerplexityChatClient;
use super::LlmConfig;

pub const NO_ANSWER: &str = "No answer received.";

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Invalid API key format: {0}")]
    InvalidCredential(String),
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("{0}")]
    Parse(#[from] serde_json::Error),
}

/// Raw reply from the completion API: the HTTP status and the decoded body,
/// whatever its shape.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamReply {
    pub status: u16,
    pub body: Value,
}

impl UpstreamReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Serialize, Debug)]
pub(crate) struct CompletionMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

#[derive(Serialize, Debug)]
pub(crate) struct CompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<CompletionMessage<'a>>,
}

#[async_trait]
pub trait CompletionApi: Send + Sync {
    /// Sends `prompt` as a single user message, authenticated with `api_key`.
    async fn complete(&self, api_key: &str, prompt: &str) -> Result<UpstreamReply, UpstreamError>;

    fn get_model(&self) -> String;
    fn get_base_url(&self) -> String;
}

/// Where a provider may put the generated text inside a `choices[i]` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerShape {
    /// `{ "message": { "content": "..." } }`
    MessageContent,
    /// `{ "text": "..." }`
    Text,
}

impl AnswerShape {
    pub const CHAIN: [AnswerShape; 2] = [AnswerShape::MessageContent, AnswerShape::Text];

    pub fn extract<'a>(&self, choice: &'a Value) -> Option<&'a str> {
        let field = match self {
            AnswerShape::MessageContent => choice.get("message").and_then(|m| m.get("content")),
            AnswerShape::Text => choice.get("text"),
        };
        field.and_then(Value::as_str).filter(|s| !s.is_empty())
    }
}

pub fn extract_answer(body: &Value) -> String {
    extract_answer_with(body, &AnswerShape::CHAIN)
}

/// First non-empty text found by walking `chain` over the first choice, or
/// the fixed placeholder.
pub fn extract_answer_with(body: &Value, chain: &[AnswerShape]) -> String {
    body.get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| chain.iter().find_map(|shape| shape.extract(choice)))
        .map(str::to_owned)
        .unwrap_or_else(|| NO_ANSWER.to_string())
}

/// Provider message from `error.message`, falling back to the whole body.
pub fn extract_error(body: &Value) -> String {
    body.get("error")
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| body.to_string())
}

pub fn new_client(config: &LlmConfig) -> Result<Arc<dyn CompletionApi>, UpstreamError> {
    let client: Arc<dyn CompletionApi> = Arc::new(PerplexityChatClient::from_config(config)?);
    Ok(client)
}
