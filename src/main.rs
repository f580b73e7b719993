mod chat;
mod config;
mod gemini_client;
mod session;
#[cfg(test)]
mod test_support;
mod web;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use dotenv::dotenv;
use eyre::Result;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::chat::ChatContext;
use crate::config::Config;
use crate::gemini_client::GeminiClient;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Address to serve the app on
    #[arg(long, default_value = "127.0.0.1:8501")]
    addr: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load environment variables from .env file
    dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    info!("Starting UPSC Insight");

    // The credential is a hard precondition: without it the app must not
    // come up at all, and no generation call is ever attempted.
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            eprintln!("🚨 {e}");
            return Ok(ExitCode::FAILURE);
        }
    };

    let client = Arc::new(GeminiClient::new(config.api_key));
    let chat = Arc::new(ChatContext::new(client));

    web::serve(&cli.addr, chat).await?;

    Ok(ExitCode::SUCCESS)
}
