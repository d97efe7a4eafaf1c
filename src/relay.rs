use axum::http::StatusCode;
use log::{ info, warn, error };
use std::sync::Arc;

use crate::llm::chat::{ extract_answer, extract_error, CompletionApi };
use crate::models::relay::{ AskRequest, AskResponse };

pub const MISSING_FIELDS: &str = "Prompt and API key are required.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayOutcome {
    pub status: StatusCode,
    pub body: AskResponse,
}

impl RelayOutcome {
    fn answer(text: String) -> Self {
        Self { status: StatusCode::OK, body: AskResponse::answer(text) }
    }

    fn bad_request(message: &str) -> Self {
        Self { status: StatusCode::BAD_REQUEST, body: AskResponse::error(message) }
    }

    pub fn server_error(message: String) -> Self {
        Self { status: StatusCode::INTERNAL_SERVER_ERROR, body: AskResponse::error(message) }
    }
}

/// Stateless forwarder: one prompt in, one upstream call, one normalized reply out.
#[derive(Clone)]
pub struct Relay {
    upstream: Arc<dyn CompletionApi>,
}

impl Relay {
    pub fn new(upstream: Arc<dyn CompletionApi>) -> Self {
        Self { upstream }
    }

    pub async fn ask(&self, request: AskRequest) -> RelayOutcome {
        let (prompt, api_key) = match (non_empty(request.prompt), non_empty(request.api_key)) {
            (Some(prompt), Some(api_key)) => (prompt, api_key),
            _ => {
                warn!("Rejected ask request with missing prompt or API key");
                return RelayOutcome::bad_request(MISSING_FIELDS);
            }
        };

        info!(
            "Forwarding prompt ({} chars) to {} [{}]",
            prompt.chars().count(),
            self.upstream.get_base_url(),
            self.upstream.get_model()
        );

        match self.upstream.complete(&api_key, &prompt).await {
            Ok(reply) if reply.is_success() => {
                info!("Upstream answered with status {}", reply.status);
                RelayOutcome::answer(extract_answer(&reply.body))
            }
            Ok(reply) => {
                warn!("Upstream rejected request with status {}", reply.status);
                RelayOutcome::server_error(extract_error(&reply.body))
            }
            Err(e) => {
                error!("Upstream call failed: {}", e);
                RelayOutcome::server_error(e.to_string())
            }
        }
    }
}

fn non_empty(field: Option<String>) -> Option<String> {
    field.filter(|s| !s.is_empty())
}
