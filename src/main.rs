//! YaYa wallet signing gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌────────────────────────────────────────────────────┐
//!                      │                     GATEWAY                        │
//!                      │                                                    │
//!   Dashboard request  │  ┌──────────┐   ┌──────────────┐   ┌────────────┐  │
//!   ───────────────────┼─▶│   http   │──▶│ transactions │──▶│  upstream  │  │
//!                      │  │  router  │   │     api      │   │ dispatcher │  │
//!                      │  └──────────┘   └──────────────┘   └─────┬──────┘  │
//!                      │                                          │         │
//!                      │                          ┌───────────────┤         │
//!                      │                          ▼               ▼         │
//!                      │                   ┌────────────┐  ┌────────────┐   │
//!                      │                   │  signing   │  │ transport  │───┼──▶ Wallet API
//!                      │                   │ 4 variants │  │  reqwest   │   │
//!                      │                   └────────────┘  └────────────┘   │
//!                      │                                                    │
//!                      │   config · observability · security · lifecycle    │
//!                      └────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use yaya_gateway::config::{load_config, load_dotenv};
use yaya_gateway::http::GatewayServer;
use yaya_gateway::lifecycle::{build_transactions_api, Shutdown};
use yaya_gateway::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "yaya-gateway")]
#[command(about = "Signing gateway for the YaYa wallet transaction API", long_about = None)]
struct Args {
    /// Optional TOML configuration file. Environment variables override it.
    #[arg(short, long, env = "YAYA_GATEWAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let dotenv = load_dotenv()?;
    let config = load_config(args.config.as_deref())?;

    logging::init_logging(&config.observability);

    tracing::info!("yaya-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    if let Some(path) = dotenv {
        tracing::info!(path = %path.display(), "Loaded environment file");
    }
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        allowed_origins = ?config.cors.allowed_origins,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    // Refuse to serve without credentials.
    let api = match build_transactions_api(&config) {
        Ok(api) => Arc::new(api),
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            return Err(e.into());
        }
    };

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    let server = GatewayServer::new(config, api);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
