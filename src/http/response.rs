//! Response encoding for both services.
//!
//! # Responsibilities
//! - Encode success bodies as JSON
//! - Map pipeline errors to a status and an `{"error": ...}` body
//! - Turn handler panics into a plain 500
//!
//! # Design Decisions
//! - Error bodies only carry the short public message; details are logged
//! - Encoding failures of a success body become a 500, never a partial body

use std::any::Any;

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// User-visible failure body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: String,
}

impl ErrorEnvelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = %status, error = %self, "Request failed");
        } else {
            tracing::info!(status = %status, error = %self, "Request rejected");
        }
        (status, Json(ErrorEnvelope::new(self.public_message()))).into_response()
    }
}

/// Encode `value` as a JSON response with `status`.
pub fn json_response<T: Serialize>(status: StatusCode, value: &T) -> Response {
    match serde_json::to_vec(value) {
        Ok(bytes) => {
            let mut response = Response::new(Body::from(bytes));
            *response.status_mut() = status;
            response.headers_mut().insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
            response
        }
        Err(e) => PipelineError::Serialization(e.to_string()).into_response(),
    }
}

/// Response for a panic caught at the request boundary.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!(panic = %detail, "Handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorEnvelope::new("internal server error")),
    )
        .into_response()
}
