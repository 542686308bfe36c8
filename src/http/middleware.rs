//! Request-boundary middleware.

use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::PipelineError;

/// Upper bound on the lifetime of one inbound request.
#[derive(Debug, Clone, Copy)]
pub struct Deadline(pub Duration);

/// Answer with `503 {"error": "service unavailable"}` once the deadline passes.
///
/// The handler future is dropped on expiry, which also drops any outbound
/// call it is awaiting.
pub async fn enforce_deadline(
    State(Deadline(limit)): State<Deadline>,
    req: Request<Body>,
    next: Next,
) -> Response {
    match tokio::time::timeout(limit, next.run(req)).await {
        Ok(response) => response,
        Err(_) => PipelineError::UpstreamUnavailable(format!(
            "request deadline of {}ms exceeded",
            limit.as_millis()
        ))
        .into_response(),
    }
}
