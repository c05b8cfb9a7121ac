//! Restaurant Finder Server
//!
//! Binary entry point for the restaurant finder HTTP service.

use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use restaurant_finder::common::config::{FinderConfig, StoreBackend};
use restaurant_finder::FinderServer;

#[derive(Parser, Debug)]
#[command(name = "restaurant-finder")]
#[command(about = "Restaurant CRUD and proximity search service", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "finder.toml", env = "FINDER_CONFIG")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Use the in-memory store regardless of configuration
    #[arg(long)]
    memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)))
        .init();

    info!("Restaurant Finder v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config = if args.config.exists() {
        let content = std::fs::read_to_string(&args.config)?;
        toml::from_str(&content)?
    } else {
        info!("Using default configuration");
        FinderConfig::default()
    };
    if args.memory {
        config.database.backend = StoreBackend::Memory;
    }

    let server = FinderServer::new(config).await?;

    // Handle shutdown signals
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received shutdown signal");
    };

    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        () = shutdown => {
            server.shutdown().await?;
        }
    }

    Ok(())
}
