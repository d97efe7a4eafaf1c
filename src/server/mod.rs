pub mod api;

use crate::cli::TlsFiles;
use crate::relay::Relay;
use std::error::Error;
use std::net::SocketAddr;

pub struct Server {
    addr: SocketAddr,
    relay: Relay,
    tls: Option<TlsFiles>,
}

impl Server {
    pub fn new(addr: SocketAddr, relay: Relay, tls: Option<TlsFiles>) -> Self {
        Self { addr, relay, tls }
    }

    pub async fn run(self) -> Result<(), Box<dyn Error + Send + Sync>> {
        api::start_http_server(self.addr, self.relay, self.tls).await
    }
}
