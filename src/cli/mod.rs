use clap::{ Parser, Subcommand };
use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::llm::LlmConfig;

pub const ASK_PATH: &str = "api/ask";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid server address '{addr}': {source}")]
    ServerAddr {
        addr: String,
        source: std::net::AddrParseError,
    },
    #[error("Invalid relay URL '{url}': {source}")]
    RelayUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("Both --tls-cert-path and --tls-key-path must be provided to enable TLS")]
    IncompleteTls,
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Relay and terminal client for Perplexity chat", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the HTTP relay that forwards prompts to the completion API
    Serve(ServeArgs),
    /// Open an interactive conversation against a running relay
    Chat(ChatArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct ServeArgs {
    /// Host address and port for the relay to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:3000")]
    pub server_addr: String,

    /// Chat completions URL of the upstream provider.
    #[arg(long, env = "PPLX_API_URL")] // No default, the client falls back to the Perplexity endpoint
    pub upstream_url: Option<String>,

    /// Model identifier sent with every completion request (e.g., sonar, sonar-pro)
    #[arg(long, env = "PPLX_MODEL")]
    pub model: Option<String>,

    /// Optional path to the TLS certificate file (PEM format). Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Optional path to the TLS private key file (PEM format). Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,

    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsFiles {
    pub cert_path: String,
    pub key_path: String,
}

impl ServeArgs {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server_addr.parse().map_err(|source| ConfigError::ServerAddr {
            addr: self.server_addr.clone(),
            source,
        })
    }

    pub fn tls_files(&self) -> Result<Option<TlsFiles>, ConfigError> {
        if !self.enable_tls {
            return Ok(None);
        }
        match (&self.tls_cert_path, &self.tls_key_path) {
            (Some(cert_path), Some(key_path)) => Ok(Some(TlsFiles {
                cert_path: cert_path.clone(),
                key_path: key_path.clone(),
            })),
            _ => Err(ConfigError::IncompleteTls),
        }
    }

    pub fn llm_config(&self) -> LlmConfig {
        LlmConfig {
            base_url: self.upstream_url.clone().filter(|u| !u.trim().is_empty()),
            completion_model: self.model.clone().filter(|m| !m.trim().is_empty()),
        }
    }
}

#[derive(clap::Args, Debug, Clone)]
pub struct ChatArgs {
    /// Base URL of the relay (the ask endpoint is resolved beneath it).
    #[arg(long, env = "RELAY_URL", default_value = "http://127.0.0.1:3000")]
    pub relay_url: String,
}

impl ChatArgs {
    pub fn relay_endpoint(&self) -> Result<Url, ConfigError> {
        resolve_ask_endpoint(&self.relay_url)
    }
}

/// Resolves the ask endpoint under `base`, keeping any path prefix it carries.
pub fn resolve_ask_endpoint(base: &str) -> Result<Url, ConfigError> {
    let to_err = |source| ConfigError::RelayUrl { url: base.to_string(), source };
    let mut url = Url::parse(base).map_err(to_err)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.join(ASK_PATH).map_err(to_err)
}
