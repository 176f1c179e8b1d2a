//! Connect Four Client
//!
//! Connects to a server and plays one game from the terminal.

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use connect_four::{config::ClientArgs, GameClient};

#[tokio::main]
async fn main() -> Result<()> {
    let args = ClientArgs::parse();

    // Quiet by default so log lines stay out of the board display.
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let input = BufReader::new(tokio::io::stdin());
    let client = GameClient::connect(&args.host, args.port, input, std::io::stdout()).await?;

    let summary = client.play().await?;
    info!(
        "Game over: {:?} as {:?} ({} moves sent, {} rejected)",
        summary.result, summary.role, summary.moves_sent, summary.invalid_replies
    );
    Ok(())
}
