use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use sirena_core::{RoutingService, load_network};
use sirena_server::{AppConfig, app};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "sirena-server", version, about = "Emergency vehicle routing server")]
struct Cli {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Road network, overrides `[network] path`
    #[arg(long)]
    network: Option<PathBuf>,
    /// Listen address, overrides `[server] bind`
    #[arg(long)]
    bind: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    };
    if let Some(network) = cli.network {
        config.network.path = Some(network);
    }
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }

    let graph = load_network(config.network_path()?)?;
    let service = Arc::new(RoutingService::new(graph, config.routing.clone()));

    let listener = tokio::net::TcpListener::bind(config.server.bind).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app(service, &config.server))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
