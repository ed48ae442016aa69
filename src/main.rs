//! Energy trading gateway (v0.1)
//!
//! # Architecture Overview
//!
//! ```text
//!     Dashboard / meters
//!            │  HTTP (JSON)
//!            ▼
//!     ┌─────────────┐    ┌──────────────┐    ┌───────────────────┐
//!     │ http server │───▶│    ledger    │───▶│  LedgerBackend    │
//!     │  handlers   │    │  validation  │    │ maschain │ simul. │
//!     └─────────────┘    └──────────────┘    └─────────┬─────────┘
//!                                                      │ REST
//!                                                      ▼
//!                                               MasChain provider
//!
//!     Cross-cutting: config, observability, lifecycle
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use energy_gateway::config::loader::process_env;
use energy_gateway::http::HttpServer;
use energy_gateway::lifecycle::{bootstrap, probe, resolve_config, signals, Shutdown};
use energy_gateway::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "energy-gateway")]
#[command(about = "Peer-to-peer energy trading gateway", version)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long, env = "ENERGY_GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listen address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = resolve_config(cli.config.as_deref(), process_env)?;
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability);
    tracing::info!("energy-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        backend = ?config.chain.backend,
        network = %config.chain.network,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let context = bootstrap(config, process_env)?;
    probe(context.backend.as_ref()).await;

    let listener = TcpListener::bind(&context.config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    signals::spawn_signal_listener(shutdown);

    let server = HttpServer::new(&context.config, context.ledger.clone());
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
