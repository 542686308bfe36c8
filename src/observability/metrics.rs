//! Metrics collection and exposition.
//!
//! # Metrics
//! - `cep_requests_total` (counter): inbound requests by service, status
//! - `cep_request_duration_seconds` (histogram): inbound latency by service
//! - `cep_upstream_requests_total` (counter): outbound calls by upstream, outcome

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to start metrics endpoint"),
    }
}

/// Record one handled inbound request.
pub fn record_request(service: &'static str, status: u16, start: Instant) {
    metrics::counter!(
        "cep_requests_total",
        "service" => service,
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("cep_request_duration_seconds", "service" => service)
        .record(start.elapsed().as_secs_f64());
}

/// Record the outcome of one outbound call.
pub fn record_upstream(upstream: &'static str, outcome: &'static str) {
    metrics::counter!(
        "cep_upstream_requests_total",
        "upstream" => upstream,
        "outcome" => outcome
    )
    .increment(1);
}
