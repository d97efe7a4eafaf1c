use serde::{ Serialize, Deserialize };
use std::fmt;

/// Body of `POST /api/ask`. Both fields are optional on the wire so that a
/// missing field can be reported as a validation error instead of a parse error.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskRequest {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl AskRequest {
    pub fn new(prompt: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            prompt: Some(prompt.into()),
            api_key: Some(api_key.into()),
        }
    }
}

// The credential never reaches log output.
impl fmt::Debug for AskRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AskRequest")
            .field("prompt", &self.prompt)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Either `{ "answer": .. }` or `{ "error": .. }`. Built through the two
/// constructors on the server side; decoded leniently on the client side.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AskResponse {
    pub fn answer(text: impl Into<String>) -> Self {
        Self { answer: Some(text.into()), error: None }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { answer: None, error: Some(message.into()) }
    }
}
