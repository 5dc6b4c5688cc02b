//! Scan relay server.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────────┐
//!                     │                      SCAN RELAY                      │
//!                     │                                                      │
//!   Browser request   │  ┌─────────┐   ┌──────────┐   ┌──────────────────┐   │
//!   ──────────────────┼─▶│  http   │──▶│  path    │──▶│ variants (pure)  │   │
//!                     │  │ server  │   │ resolver │   │ candidate URLs   │   │
//!                     │  └─────────┘   └──────────┘   └────────┬─────────┘   │
//!                     │                                        ▼             │
//!   Browser response  │  ┌─────────┐   ┌──────────┐   ┌──────────────────┐   │
//!   ◀─────────────────┼──│ error   │◀──│translate │◀──│ fetch (sequential│◀──┼── Scan host
//!                     │  │envelope │   │json/bin  │   │ header profile)  │   │
//!                     │  └─────────┘   └──────────┘   └──────────────────┘   │
//!                     │                                                      │
//!                     │   config · observability · lifecycle                │
//!                     └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use scan_relay::config::{load_config, RelayConfig};
use scan_relay::lifecycle::{shutdown_signal, Shutdown};
use scan_relay::observability::{logging, metrics};
use scan_relay::HttpServer;

#[derive(Parser)]
#[command(name = "scan-relay")]
#[command(about = "Relay for manga scan pages and chapter metadata", long_about = None)]
struct Args {
    /// TOML configuration file; built-in defaults when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => RelayConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability);
    tracing::info!("scan-relay v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        mount_prefix = %config.upstream.mount_prefix,
        upstream = %config.upstream.base_url,
        variants = config.upstream.variants.len(),
        attempt_timeout_secs = config.timeouts.attempt_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
