use async_trait::async_trait;
use log::debug;
use reqwest::Client as HttpClient;
use thiserror::Error;
use url::Url;

use crate::models::relay::{ AskRequest, AskResponse };

#[derive(Debug, Error)]
pub enum RelayCallError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("{0}")]
    Decode(#[from] serde_json::Error),
}

/// What the relay sent back: whether the status was a success, and the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayReply {
    pub ok: bool,
    pub body: AskResponse,
}

#[async_trait]
pub trait RelayClient: Send + Sync {
    async fn ask(&self, prompt: &str, api_key: &str) -> Result<RelayReply, RelayCallError>;
}

pub struct HttpRelayClient {
    http: HttpClient,
    endpoint: Url,
}

impl HttpRelayClient {
    pub fn new(endpoint: Url) -> Result<Self, RelayCallError> {
        let http = HttpClient::builder().build()?;
        Ok(Self::with_client(http, endpoint))
    }

    pub fn with_client(http: HttpClient, endpoint: Url) -> Self {
        Self { http, endpoint }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl RelayClient for HttpRelayClient {
    async fn ask(&self, prompt: &str, api_key: &str) -> Result<RelayReply, RelayCallError> {
        let resp = self.http
            .post(self.endpoint.clone())
            .json(&AskRequest::new(prompt, api_key))
            .send()
            .await?;

        let ok = resp.status().is_success();
        let bytes = resp.bytes().await?;
        debug!("Relay replied ok={} with {} bytes", ok, bytes.len());

        let body: AskResponse = serde_json::from_slice(&bytes)?;
        Ok(RelayReply { ok, body })
    }
}
