//! FRC daemon - coherence scoring and tracking service
//!
//! The FRC daemon provides:
//! - REST API for S_FRC calculation with per-user coherence logging
//! - User, protocol, and session management over a relational store
//! - Session-token bookkeeping with TTL and explicit invalidation

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod config;
mod error;
mod server;
mod tokens;

use config::DaemonConfig;
use error::DaemonResult;
use server::Server;

/// FRC Daemon CLI
#[derive(Parser)]
#[command(name = "frcd")]
#[command(about = "FRC daemon - coherence scoring and tracking service", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "FRC_CONFIG")]
    config: Option<String>,

    /// Listen address
    #[arg(short, long, env = "FRC_LISTEN_ADDR", default_value = "127.0.0.1:8000")]
    listen: String,

    /// Log level
    #[arg(long, env = "FRC_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Enable JSON logging
    #[arg(long, env = "FRC_LOG_JSON")]
    json: bool,
}

#[tokio::main]
async fn main() -> DaemonResult<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| cli.log_level.clone().into());

    if cli.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    // Load configuration
    let mut config = DaemonConfig::load(cli.config.as_deref())
        .map_err(|e| error::DaemonError::Config(e.to_string()))?;

    // Override with CLI args
    config.server.listen_addr = cli
        .listen
        .parse()
        .map_err(|e| error::DaemonError::Config(format!("Invalid listen address: {}", e)))?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        listen = %config.server.listen_addr,
        "Starting FRC daemon"
    );

    // Create and run server
    let server = Server::new(config).await?;
    server.run().await
}
