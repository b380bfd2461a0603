//! autoscalerd — the autoscaler policy daemon.
//!
//! Opens the policy store (redb) and serves the policy REST API.
//!
//! # Usage
//!
//! ```text
//! autoscalerd serve --config /etc/autoscaler/autoscalerd.toml --port 8080
//! ```

mod config;

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::{DaemonConfig, LogFormat, LoggingConfig};

const DEFAULT_LOG_FILTER: &str = "info,autoscalerd=debug,autoscaler=debug";

#[derive(Parser)]
#[command(name = "autoscalerd", about = "Autoscaler policy daemon")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the policy API.
    Serve {
        /// Path to autoscalerd.toml.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Port to listen on (overrides the config file).
        #[arg(long)]
        port: Option<u16>,

        /// Data directory for the policy database (overrides the config file).
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Keep policies in memory only.
        #[arg(long)]
        in_memory: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            config,
            port,
            data_dir,
            in_memory,
        } => {
            let mut config = DaemonConfig::load(config.as_deref())?;
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(data_dir) = data_dir {
                config.storage.data_dir = data_dir;
            }
            config.storage.in_memory |= in_memory;

            init_tracing(&config.logging)?;
            serve(config).await
        }
    }
}

fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(logging.filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER))?,
    };

    match logging.format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
    }
    Ok(())
}

async fn serve(config: DaemonConfig) -> anyhow::Result<()> {
    info!("autoscaler policy daemon starting");

    let store = if config.storage.in_memory {
        let store = autoscaler_state::StateStore::open_in_memory()?;
        info!("policy store opened in memory");
        store
    } else {
        std::fs::create_dir_all(&config.storage.data_dir)?;
        let db_path = config.storage.db_path();
        let store = autoscaler_state::StateStore::open(&db_path)?;
        info!(path = ?db_path, "policy store opened");
        store
    };

    let router = autoscaler_api::build_router(store);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));

    info!(%addr, "API server starting");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "failed to listen for shutdown signal");
            }
            info!("shutdown signal received");
        })
        .await?;

    info!("autoscaler policy daemon stopped");
    Ok(())
}
