//! Distributed tracing support.
//!
//! # Responsibilities
//! - Create named spans for pipeline operations
//! - Propagate trace context to downstream requests
//! - Continue a trace started by an upstream service
//!
//! # Design Decisions
//! - Components receive a [`Tracer`] explicitly; nothing looks one up globally
//! - W3C Trace Context headers (`traceparent`, `tracestate`)
//! - [`NoopTracer`] satisfies the same interface where no exporter is wanted

use std::sync::Arc;

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use opentelemetry::propagation::{Extractor, Injector, TextMapPropagator};
use opentelemetry_sdk::propagation::TraceContextPropagator;
use tracing::{field, info_span, Span};
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// Span names used across both services.
pub mod span_names {
    pub const VALIDATE_CEP: &str = "validate-cep";
    pub const REQUEST_INTERNAL: &str = "request-internal-service";
    pub const AGGREGATE: &str = "get-cep-temperature";
    pub const RESOLVE_ADDRESS: &str = "get-cep-location";
    pub const RESOLVE_WEATHER: &str = "get-weather";
}

/// Span attribute holding the postal code.
pub const FIELD_CEP: &str = "cep";
/// Span attribute holding the resolved city name.
pub const FIELD_CITY: &str = "city";

/// Capability to start spans and move trace context across an HTTP hop.
///
/// Spans returned by [`Tracer::start_span`] declare the [`FIELD_CEP`] and
/// [`FIELD_CITY`] attributes so callers can tag them with `Span::record`.
/// A span ends when its last handle is dropped.
pub trait Tracer: Send + Sync {
    /// Start a span that is a child of the current span.
    fn start_span(&self, name: &'static str) -> Span;

    /// Write the trace context of `span` into outbound request headers.
    fn inject_context(&self, span: &Span, headers: &mut HeaderMap);

    /// Make `span` continue the trace carried by inbound request headers.
    fn continue_trace(&self, span: &Span, headers: &HeaderMap);
}

/// Shared handle passed to every component.
pub type SharedTracer = Arc<dyn Tracer>;

/// Tracer backed by `tracing` spans bridged to OpenTelemetry.
///
/// Spans only carry an OpenTelemetry context when the subscriber has the
/// `tracing-opentelemetry` layer installed (see `observability::logging`).
#[derive(Debug, Default)]
pub struct OtelTracer {
    propagator: TraceContextPropagator,
}

impl OtelTracer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedTracer {
        Arc::new(Self::new())
    }
}

impl Tracer for OtelTracer {
    fn start_span(&self, name: &'static str) -> Span {
        info_span!(
            "operation",
            otel.name = name,
            operation = name,
            cep = field::Empty,
            city = field::Empty
        )
    }

    fn inject_context(&self, span: &Span, headers: &mut HeaderMap) {
        let cx = span.context();
        self.propagator
            .inject_context(&cx, &mut HeaderInjector(headers));
    }

    fn continue_trace(&self, span: &Span, headers: &HeaderMap) {
        let parent = self.propagator.extract(&HeaderExtractor(headers));
        let _ = span.set_parent(parent);
    }
}

/// Tracer that records nothing and propagates nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTracer;

impl NoopTracer {
    pub fn shared() -> SharedTracer {
        Arc::new(Self)
    }
}

impl Tracer for NoopTracer {
    fn start_span(&self, _name: &'static str) -> Span {
        Span::none()
    }

    fn inject_context(&self, _span: &Span, _headers: &mut HeaderMap) {}

    fn continue_trace(&self, _span: &Span, _headers: &HeaderMap) {}
}

/// Adapter for injecting trace context into HTTP headers.
struct HeaderInjector<'a>(&'a mut HeaderMap);

impl Injector for HeaderInjector<'_> {
    fn set(&mut self, key: &str, value: String) {
        if let (Ok(name), Ok(val)) = (
            HeaderName::from_bytes(key.as_bytes()),
            HeaderValue::from_str(&value),
        ) {
            self.0.insert(name, val);
        }
    }
}

/// Adapter for extracting trace context from HTTP headers.
struct HeaderExtractor<'a>(&'a HeaderMap);

impl Extractor for HeaderExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(|k| k.as_str()).collect()
    }
}
