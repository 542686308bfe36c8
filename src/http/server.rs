//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the Axum router for the selected service role
//! - Build the shared outbound HTTP client
//! - Wire up middleware (tracing, request ID, deadline, panic recovery)
//! - Serve on a listener until shutdown is signalled

use std::time::Duration;

use axum::{
    http::HeaderName,
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{AppConfig, ServiceRole};
use crate::error::StartupError;
use crate::http::handlers::{self, EdgeState, InternalState};
use crate::http::middleware::{enforce_deadline, Deadline};
use crate::http::response::panic_response;
use crate::observability::tracing::SharedTracer;
use crate::pipeline::{Aggregator, Forwarder};
use crate::providers::{AddressResolver, WeatherResolver};

/// Header carrying the per-request correlation id.
pub const X_REQUEST_ID: &str = "x-request-id";

/// HTTP server for one of the two services.
pub struct HttpServer {
    router: Router,
    role: ServiceRole,
}

impl HttpServer {
    /// Create the server for `role` from validated configuration.
    pub fn new(
        config: &AppConfig,
        role: ServiceRole,
        tracer: SharedTracer,
    ) -> Result<Self, StartupError> {
        let client = build_client(config)?;

        let routes = match role {
            ServiceRole::Edge => {
                let forwarder = Forwarder::new(
                    client,
                    config.edge.internal_base_url.clone(),
                    tracer,
                );
                Router::new()
                    .route("/", post(handlers::forward_temperature))
                    .with_state(EdgeState { forwarder })
            }
            ServiceRole::Internal => {
                let address = AddressResolver::new(
                    client.clone(),
                    config.providers.postal_base_url.clone(),
                    tracer.clone(),
                );
                let weather = WeatherResolver::new(
                    client,
                    config.providers.weather_base_url.clone(),
                    config.providers.weather_api_key.clone(),
                    tracer.clone(),
                );
                let aggregator = Aggregator::new(address, weather, tracer);
                Router::new()
                    .route("/", get(handlers::missing_cep))
                    .route("/{cep}", get(handlers::temperature_by_cep))
                    .with_state(InternalState { aggregator })
            }
        };

        let router = Self::with_middleware(routes, config);
        Ok(Self { router, role })
    }

    /// Wrap routes with the shared middleware stack.
    fn with_middleware(routes: Router, config: &AppConfig) -> Router {
        let request_id = HeaderName::from_static(X_REQUEST_ID);
        let deadline = Deadline(Duration::from_millis(config.timeouts.request_ms));
        routes
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(middleware::from_fn_with_state(deadline, enforce_deadline))
            .layer(PropagateRequestIdLayer::new(request_id.clone()))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
    }

    /// The router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            service = self.role.service_name(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Outbound client shared by every request; safe for concurrent use.
fn build_client(config: &AppConfig) -> Result<reqwest::Client, StartupError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(config.timeouts.upstream_ms))
        .build()?;
    Ok(client)
}
