//! CEP → temperature services.
//!
//! # Architecture Overview
//!
//! ```text
//!   Client                 edge service                 internal service
//!     │  POST / {"cep"}    ┌─────────────┐  GET /{cep}   ┌──────────────┐
//!     ├───────────────────▶│  Forwarder  ├──────────────▶│  Aggregator  │
//!     │                    │  validate   │  traceparent  │  re-validate │
//!     │                    └─────────────┘               └──────┬───────┘
//!     │                                                         │
//!     │                                      ┌──────────────────┼──────────────┐
//!     │                                      ▼                  ▼              │
//!     │                               postal provider    weather provider     │
//!     │                               (CEP → city)       (city → temp_c)      │
//!     │                                                                        │
//!     ◀──── {"city","temp_C","temp_F","temp_K"} ◀─────────────────────────────┘
//! ```
//!
//! One binary runs either role: `cep-weather edge` or `cep-weather internal`.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use cep_weather::config::{load_config, ObservabilityConfig, ServiceRole};
use cep_weather::http::HttpServer;
use cep_weather::lifecycle::Shutdown;
use cep_weather::observability::{logging, metrics, NoopTracer, OtelTracer};

#[derive(Parser)]
#[command(name = "cep-weather")]
#[command(about = "Resolve a Brazilian postal code to the current temperature", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "CEP_WEATHER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the client-facing service (POST /)
    Edge,
    /// Run the provider-facing service (GET /{cep})
    Internal,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let role = match cli.command {
        Commands::Edge => ServiceRole::Edge,
        Commands::Internal => ServiceRole::Internal,
    };

    let config = match load_config(cli.config.as_deref(), role) {
        Ok(config) => config,
        Err(e) => {
            let _telemetry = logging::init(&ObservabilityConfig::bootstrap(), role.service_name())?;
            tracing::error!(error = %e, "Failed to load configuration");
            return Err(e.into());
        }
    };
    let telemetry = logging::init(&config.observability, role.service_name())?;

    tracing::info!(
        service = role.service_name(),
        bind_address = %config.bind_address(role),
        request_timeout_ms = config.timeouts.request_ms,
        upstream_timeout_ms = config.timeouts.upstream_ms,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let tracer = if config.observability.otel_enabled {
        OtelTracer::shared()
    } else {
        NoopTracer::shared()
    };

    let listener = TcpListener::bind(config.bind_address(role)).await?;
    let server = HttpServer::new(&config, role, tracer)?;

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    server.run(listener, shutdown.subscribe()).await?;

    telemetry.shutdown();
    tracing::info!("Shutdown complete");
    Ok(())
}
