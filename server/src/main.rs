use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use todo_server::{Config, MemoryStore, TodoService, TodoStore};

/// Todo list REST API server.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Configuration file (defaults to ./todo-server.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    host: Option<String>,

    #[arg(short, long)]
    port: Option<u16>,

    /// Persist todos to this JSON file instead of keeping them in memory
    #[arg(long)]
    data_file: Option<PathBuf>,

    /// Verbosity (-v debug, -vv trace); overrides the configured log filter
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config =
        Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(data_file) = cli.data_file {
        config.data_file = Some(data_file);
    }

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log)),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let store: Arc<dyn TodoStore> = match &config.data_file {
        Some(path) => Arc::new(
            MemoryStore::open(path)
                .await
                .with_context(|| format!("failed to open {}", path.display()))?,
        ),
        None => Arc::new(MemoryStore::new()),
    };

    let addr = config.addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("todo API listening on http://{addr}{}", todo_server::API_PREFIX);

    todo_server::run(listener, TodoService::new(store)).await?;
    Ok(())
}
