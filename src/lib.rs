pub mod models;
pub mod server;
pub mod llm;
pub mod cli;
pub mod history;
pub mod relay;
pub mod client;

use client::relay::HttpRelayClient;
use client::storage::MemorySessionStore;
use client::ChatSession;
use cli::{ Args, ChatArgs, Command, ServeArgs };
use llm::chat::new_client as new_chat_client;
use log::info;
use relay::Relay;
use server::Server;
use std::error::Error;
use std::sync::Arc;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    match args.command {
        Command::Serve(serve) => run_relay(serve).await,
        Command::Chat(chat) => run_chat(chat).await,
    }
}

async fn run_relay(args: ServeArgs) -> Result<(), Box<dyn Error + Send + Sync>> {
    let addr = args.socket_addr()?;
    let tls = args.tls_files()?;
    let llm_config = args.llm_config();
    let upstream = new_chat_client(&llm_config)?;

    info!("--- Relay Configuration ---");
    info!("Server Address: {}", addr);
    info!("Upstream URL: {}", upstream.get_base_url());
    info!("Model: {}", upstream.get_model());
    info!("TLS Enabled: {}", tls.is_some());
    info!("---------------------------");

    let server = Server::new(addr, Relay::new(upstream), tls);
    server.run().await
}

async fn run_chat(args: ChatArgs) -> Result<(), Box<dyn Error + Send + Sync>> {
    let relay = HttpRelayClient::new(args.relay_endpoint()?)?;
    info!("Relay endpoint: {}", relay.endpoint());

    let store = Arc::new(MemorySessionStore::new());
    let mut session = ChatSession::mount(store, Arc::new(relay));
    client::terminal::run(&mut session).await
}
