//! Request observability service.
//!
//! # Architecture Overview
//!
//! ```text
//!   Client ──▶ boundary ──▶ [validate /work] ──▶ metrics ──▶ handler ──▶ business.work span
//!          ◀── X-Request-Id, end log ◀──────────── counters, latency ◀───────┘
//!
//!   Cross-cutting: config (TOML + CLI), logging (tracing), Prometheus exporter,
//!                  shutdown (signals → stop accepting, interrupt in-flight work)
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use request_observability::config::{load_config, ServiceConfig};
use request_observability::lifecycle::{signals, Shutdown};
use request_observability::observability::{logging, metrics};
use request_observability::HttpServer;

#[derive(Parser)]
#[command(name = "request-observability")]
#[command(about = "HTTP service with correlation IDs, endpoint metrics and traced work")]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability)?;

    tracing::info!("request-observability v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        max_work_ms = config.work.max_ms,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    tokio::spawn(signals::shutdown_on_signal(shutdown.clone()));

    let server = HttpServer::new(config, shutdown);
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
