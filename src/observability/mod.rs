//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Pipeline components produce:
//!     → logging.rs (structured log events, span export)
//!     → metrics.rs (counters, histograms)
//!     → tracing.rs (named spans, W3C context across the HTTP hop)
//!
//! Consumers:
//!     → stdout (JSON or pretty)
//!     → Metrics endpoint (Prometheus scrape)
//!     → OTLP collector (optional)
//! ```

pub mod logging;
pub mod metrics;
pub mod tracing;

pub use self::tracing::{NoopTracer, OtelTracer, SharedTracer, Tracer};
