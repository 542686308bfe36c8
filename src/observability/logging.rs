//! Structured logging and span export setup.
//!
//! # Responsibilities
//! - Install the global `tracing` subscriber
//! - Bridge spans to OpenTelemetry when enabled
//! - Flush pending spans on shutdown
//!
//! # Design Decisions
//! - JSON format for production, pretty format for development
//! - `RUST_LOG` overrides the configured level for log output only; pipeline
//!   spans always reach the OpenTelemetry layer so trace context propagates
//! - Spans get trace ids even without an exporter, so propagation works
//!   when no collector is configured

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use tracing::Level;
use tracing_subscriber::{
    filter::Targets, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

use crate::config::{LogFormat, ObservabilityConfig};
use crate::error::StartupError;

/// Keeps the span pipeline alive; call [`TelemetryGuard::shutdown`] before exit.
#[must_use]
pub struct TelemetryGuard {
    provider: Option<SdkTracerProvider>,
}

impl TelemetryGuard {
    /// Flush and stop the span pipeline.
    pub fn shutdown(self) {
        if let Some(provider) = self.provider {
            if let Err(e) = provider.shutdown() {
                tracing::warn!(error = %e, "Failed to flush spans on shutdown");
            }
        }
    }
}

/// Initialize the global subscriber for `service_name`.
pub fn init(config: &ObservabilityConfig, service_name: &str) -> Result<TelemetryGuard, StartupError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let provider = if config.otel_enabled {
        Some(build_provider(config, service_name)?)
    } else {
        None
    };

    let otel_layer = provider.as_ref().map(|p| {
        tracing_opentelemetry::layer()
            .with_tracer(p.tracer(service_name.to_string()))
            .with_filter(span_filter())
    });

    let (json_layer, pretty_layer) = match config.log_format {
        LogFormat::Json => (
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_filter(env_filter),
            ),
            None,
        ),
        LogFormat::Pretty => (
            None,
            Some(tracing_subscriber::fmt::layer().with_filter(env_filter)),
        ),
    };

    tracing_subscriber::registry()
        .with(otel_layer)
        .with(json_layer)
        .with(pretty_layer)
        .try_init()
        .map_err(|e| StartupError::Telemetry(e.to_string()))?;

    tracing::info!(
        service = service_name,
        otel_enabled = config.otel_enabled,
        otlp_endpoint = config.otlp_endpoint.as_deref().unwrap_or("none"),
        "Telemetry initialized"
    );

    Ok(TelemetryGuard { provider })
}

/// Spans exported to OpenTelemetry, independent of the log level.
pub(crate) fn span_filter() -> Targets {
    Targets::new().with_target(env!("CARGO_CRATE_NAME"), Level::INFO)
}

fn build_provider(
    config: &ObservabilityConfig,
    service_name: &str,
) -> Result<SdkTracerProvider, StartupError> {
    let resource = Resource::builder()
        .with_service_name(service_name.to_string())
        .build();

    let mut builder = SdkTracerProvider::builder().with_resource(resource);

    if let Some(endpoint) = &config.otlp_endpoint {
        let exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_http()
            .with_endpoint(endpoint.clone())
            .build()
            .map_err(|e| StartupError::Telemetry(e.to_string()))?;
        builder = builder.with_batch_exporter(exporter);
    }

    Ok(builder.build())
}
