//! The Perplexity client against a local HTTP stand-in for the completion API.

use axum::{
    extract::State,
    http::{ header, HeaderMap, StatusCode },
    response::{ IntoResponse, Response },
    routing::post,
    Router,
};
use pplx_chat::llm::chat::perplexity::PerplexityChatClient;
use pplx_chat::models::relay::{ AskRequest, AskResponse };
use pplx_chat::relay::Relay;
use serde_json::{ json, Value };
use std::sync::{ Arc, Mutex };

#[derive(Clone)]
struct StandIn {
    seen: Arc<Mutex<Vec<(String, Value)>>>,
    status: StatusCode,
    content_type: &'static str,
    body: &'static str,
}

async fn completions(State(state): State<StandIn>, headers: HeaderMap, body: String) -> Response {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let payload = serde_json::from_str(&body).unwrap_or(Value::Null);
    state.seen.lock().unwrap().push((auth, payload));
    (state.status, [(header::CONTENT_TYPE, state.content_type)], state.body).into_response()
}

async fn spawn_upstream(status: StatusCode, content_type: &'static str, body: &'static str) -> (String, StandIn) {
    let state = StandIn {
        seen: Arc::new(Mutex::new(Vec::new())),
        status,
        content_type,
        body,
    };
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new()
        .route("/chat/completions", post(completions))
        .with_state(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}/chat/completions", addr), state)
}

fn relay_to(url: String) -> Relay {
    let client = PerplexityChatClient::new(None, Some(url)).unwrap();
    Relay::new(Arc::new(client))
}

#[tokio::test]
async fn sends_bearer_key_and_single_user_message() {
    let (url, state) = spawn_upstream(
        StatusCode::OK,
        "application/json",
        r#"{"choices":[{"message":{"content":"X"}}]}"#,
    ).await;

    let outcome = relay_to(url).ask(AskRequest::new("hello", "k1")).await;

    assert_eq!(outcome.status, StatusCode::OK);
    assert_eq!(outcome.body, AskResponse::answer("X"));
    let seen = state.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, "Bearer k1");
    assert_eq!(
        seen[0].1,
        json!({ "model": "sonar-pro", "messages": [{ "role": "user", "content": "hello" }] })
    );
}

#[tokio::test]
async fn provider_error_message_is_passed_through() {
    let (url, state) = spawn_upstream(
        StatusCode::UNAUTHORIZED,
        "application/json",
        r#"{"error":{"message":"bad key"}}"#,
    ).await;

    let outcome = relay_to(url).ask(AskRequest::new("hello", "k1")).await;

    assert_eq!(outcome.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(outcome.body, AskResponse::error("bad key"));
    assert_eq!(state.seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn html_error_page_is_a_parse_failure() {
    let (url, _state) = spawn_upstream(
        StatusCode::BAD_GATEWAY,
        "text/html",
        "<html><body>502 Bad Gateway</body></html>",
    ).await;

    let outcome = relay_to(url).ask(AskRequest::new("hello", "k1")).await;

    assert_eq!(outcome.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(outcome.body.answer.is_none());
    let message = outcome.body.error.unwrap();
    assert!(message.contains("expected value"), "got {message}");
}

#[tokio::test]
async fn unreachable_upstream_is_a_transport_failure() {
    // Bind then drop to get a port with nothing listening.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/chat/completions", listener.local_addr().unwrap());
    drop(listener);

    let outcome = relay_to(url).ask(AskRequest::new("hello", "k1")).await;

    assert_eq!(outcome.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(outcome.body.answer.is_none());
    assert!(outcome.body.error.unwrap().contains("error sending request"));
}
