//! Fragments - typed content storage with on-demand format conversion
//!
//! Command-line entry point: runs the HTTP API or prints configuration.

use anyhow::Result;
use clap::{Parser, Subcommand};
use fragments::{
    api::{self, BasicAuth},
    config::FragmentsConfig,
    storage::FragmentStore,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "fragments")]
#[command(author = "A3S Lab Team")]
#[command(version)]
#[command(about = "Typed content storage with on-demand format conversion")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "FRAGMENTS_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Show configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => FragmentsConfig::load(path)?,
        None => FragmentsConfig::default(),
    };

    init_logging(cli.verbose, config.log.json);

    match cli.command {
        Commands::Serve { host, port } => {
            run_server(config, host, port).await?;
        }
        Commands::Config { default } => {
            show_config(if default { None } else { Some(&config) })?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool, json: bool) {
    let log_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("fragments={0},tower_http={0}", log_level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn run_server(
    mut config: FragmentsConfig,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let store = FragmentStore::from_config(&config.storage).await?;
    let auth = BasicAuth::from_config(&config.auth);
    if auth.user_count() == 0 {
        tracing::warn!("No users configured; every /v1 request will be rejected");
    }

    let app = api::build_app(store, auth, &config.server);
    tracing::info!("Starting Fragments API. Press Ctrl+C to stop.");
    api::serve(app, addr, shutdown_signal()).await?;
    tracing::info!("Shut down");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
    }
    tracing::info!("Shutting down...");
}

fn show_config(config: Option<&FragmentsConfig>) -> Result<()> {
    let config = config.cloned().unwrap_or_default();
    println!("{}", config.to_toml()?);
    Ok(())
}
