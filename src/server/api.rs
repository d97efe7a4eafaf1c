use crate::cli::TlsFiles;
use crate::models::relay::{ AskRequest, AskResponse };
use crate::relay::{ Relay, RelayOutcome };
use std::error::Error;
use std::net::SocketAddr;
use axum::{
    body::Bytes,
    routing::{ get, post },
    Router,
    extract::State,
    response::{ IntoResponse, Response },
    Json,
};
use serde::Serialize;
use tower_http::cors::{ Any, CorsLayer };
use log::{ info, error };

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Clone)]
struct AppState {
    relay: Relay,
}

pub fn router(relay: Relay) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/ask", post(ask_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .with_state(AppState { relay })
}

pub async fn start_http_server(
    addr: SocketAddr,
    relay: Relay,
    tls: Option<TlsFiles>,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let app = router(relay);

    match tls {
        Some(files) => {
            info!(
                "TLS enabled. Loading certificate from '{}' and key from '{}'",
                files.cert_path,
                files.key_path
            );
            let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(
                &files.cert_path,
                &files.key_path
            ).await?;
            info!("Relay listening on: https://{}", addr);
            axum_server::bind_rustls(addr, tls_config)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
                error!("Failed to bind relay to {}: {}. Try a different port.", addr, e);
                e
            })?;
            info!("Relay listening on: http://{}", addr);
            axum::serve(listener, app.into_make_service()).await?;
        }
    }

    Ok(())
}

// The body is decoded by hand so that malformed JSON is reported in the
// relay's own `{ error }` shape rather than as an extractor rejection.
async fn ask_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let request: AskRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            error!("Failed to parse ask request: {}", e);
            return into_response(RelayOutcome::server_error(e.to_string()));
        }
    };

    into_response(state.relay.ask(request).await)
}

async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

fn into_response(outcome: RelayOutcome) -> Response {
    let body: AskResponse = outcome.body;
    (outcome.status, Json(body)).into_response()
}
