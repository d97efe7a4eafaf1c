use clap::Parser;
use dotenv::dotenv;
use pplx_chat::cli::{ Args, Command };
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    dotenv().ok();
    let args = Args::parse();

    // The chat front-end shares the terminal with the log output.
    let default_filter = match args.command {
        Command::Serve(_) => "info",
        Command::Chat(_) => "warn",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    pplx_chat::run(args).await
}
