//! Mirror gateway binary.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use mirror_proxy::config::loader::load_config;
use mirror_proxy::observability::{logging, metrics};
use mirror_proxy::{GatewayConfig, HttpServer, Shutdown};

/// Content-rewriting mirror gateway.
#[derive(Parser)]
#[command(name = "mirror-proxy", version)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability.log_level);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.origin,
        prefix = %config.upstream.path_prefix,
        "configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "listening for connections");

    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown signal received");
            shutdown.trigger();
        }
    });

    server.run(listener, rx).await?;

    tracing::info!("shutdown complete");
    Ok(())
}
