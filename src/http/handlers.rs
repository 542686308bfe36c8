//! Axum handlers for the edge and internal services.

use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{rejection::PathRejection, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};

use crate::error::PipelineError;
use crate::http::response::json_response;
use crate::pipeline::{Aggregator, Forwarder};
use crate::observability::metrics;

/// State injected into edge handlers.
#[derive(Clone)]
pub struct EdgeState {
    pub forwarder: Forwarder,
}

/// State injected into internal handlers.
#[derive(Clone)]
pub struct InternalState {
    pub aggregator: Aggregator,
}

/// `POST /` on the edge service.
///
/// The body is taken as raw bytes so that every decode failure maps to 400.
pub async fn forward_temperature(State(state): State<EdgeState>, body: Bytes) -> Response {
    let start = Instant::now();

    let response = match state.forwarder.forward(&body).await {
        Ok(reading) => json_response(StatusCode::OK, &reading),
        Err(e) => e.into_response(),
    };

    metrics::record_request("edge", response.status().as_u16(), start);
    response
}

/// `GET /{cep}` on the internal service.
///
/// A segment that does not decode to UTF-8 cannot be a CEP and maps to 422.
pub async fn temperature_by_cep(
    State(state): State<InternalState>,
    cep: Result<Path<String>, PathRejection>,
    headers: HeaderMap,
) -> Response {
    let start = Instant::now();

    let result = match cep {
        Ok(Path(cep)) => state.aggregator.aggregate(&cep, &headers).await,
        Err(rejection) => Err(PipelineError::InvalidFormat(rejection.body_text())),
    };
    let response = match result {
        Ok(reading) => json_response(StatusCode::OK, &reading),
        Err(e) => e.into_response(),
    };

    metrics::record_request("internal", response.status().as_u16(), start);
    response
}

/// `GET /` on the internal service: the CEP segment is empty.
pub async fn missing_cep() -> Response {
    PipelineError::MissingPostalCode.into_response()
}
