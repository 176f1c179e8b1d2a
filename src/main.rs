//! Connect Four Server
//!
//! Listens on the given port and referees games of the given variant
//! until interrupted.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use connect_four::{config::ServerArgs, GameServer, VERSION};

#[tokio::main]
async fn main() -> Result<()> {
    let args = ServerArgs::parse();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let config = args.server_config();
    info!("Connect Four Server v{}", VERSION);
    info!("Variant: {}", config.variant);
    if let Some(timeout) = config.move_timeout {
        info!("Move timeout: {:?}", timeout);
    }

    let server = std::sync::Arc::new(GameServer::bind(config).await?);

    let signal_server = server.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_server.shutdown();
        }
    });

    server.run().await?;
    info!("Server stopped");
    Ok(())
}
