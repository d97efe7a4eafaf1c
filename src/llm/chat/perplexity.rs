use async_trait::async_trait;
use log::debug;
use reqwest::{ Client as HttpClient, header::{ HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION } };

use super::{ CompletionApi, CompletionMessage, CompletionRequest, UpstreamError, UpstreamReply };
use crate::llm::{ LlmConfig, DEFAULT_API_URL, DEFAULT_MODEL };

pub struct PerplexityChatClient {
    http: HttpClient,
    model: String,
    base_url: String,
}

impl PerplexityChatClient {
    pub fn new(model: Option<String>, base_url: Option<String>) -> Result<Self, UpstreamError> {
        let chat_model = model.unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let api_url = base_url.unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = HttpClient::builder().default_headers(headers).build()?;

        Ok(Self {
            http,
            model: chat_model,
            base_url: api_url,
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, UpstreamError> {
        Self::new(config.completion_model.clone(), config.base_url.clone())
    }

    fn bearer(api_key: &str) -> Result<HeaderValue, UpstreamError> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|e| UpstreamError::InvalidCredential(e.to_string()))?;
        value.set_sensitive(true);
        Ok(value)
    }
}

#[async_trait]
impl CompletionApi for PerplexityChatClient {
    async fn complete(&self, api_key: &str, prompt: &str) -> Result<UpstreamReply, UpstreamError> {
        let req = CompletionRequest {
            model: &self.model,
            messages: vec![CompletionMessage { role: "user", content: prompt }],
        };

        let resp = self.http
            .post(&self.base_url)
            .header(AUTHORIZATION, Self::bearer(api_key)?)
            .json(&req)
            .send()
            .await?;

        let status = resp.status().as_u16();
        let bytes = resp.bytes().await?;
        debug!("Upstream replied {} with {} bytes", status, bytes.len());

        // Decoded before the status is looked at: a non-JSON error page is a parse failure.
        let body = serde_json::from_slice(&bytes)?;
        Ok(UpstreamReply { status, body })
    }

    fn get_model(&self) -> String {
        self.model.clone()
    }

    fn get_base_url(&self) -> String {
        self.base_url.clone()
    }
}
