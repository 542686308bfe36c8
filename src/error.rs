//! Error taxonomy for the request pipeline.
//!
//! Every variant is terminal for the current request. The HTTP layer turns
//! an error into a status code and a short client message; the detail
//! strings carried here are for logs only.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors raised anywhere between the inbound request and the response.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Request body could not be decoded.
    #[error("malformed request body: {0}")]
    MalformedInput(String),

    /// Empty CEP path segment on the internal service.
    #[error("postal code is required")]
    MissingPostalCode,

    /// CEP is not exactly eight digits.
    #[error("invalid postal code format: {0:?}")]
    InvalidFormat(String),

    /// Postal-lookup provider has no such CEP.
    #[error("postal code not found: {0}")]
    NotFound(String),

    /// Weather provider failed or returned no usable reading.
    #[error("weather unavailable: {0}")]
    WeatherUnavailable(String),

    /// Internal service answered with a non-success status.
    #[error("upstream returned status {0}")]
    UpstreamStatus(StatusCode),

    /// Transport-level failure reaching a downstream service.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Downstream answered with success but the body was unusable.
    #[error("invalid upstream response: {0}")]
    InvalidUpstreamResponse(String),

    /// Outgoing response could not be encoded.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl PipelineError {
    /// HTTP status surfaced to the caller.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MalformedInput(_) | Self::MissingPostalCode => StatusCode::BAD_REQUEST,
            Self::InvalidFormat(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound(_) | Self::WeatherUnavailable(_) => StatusCode::NOT_FOUND,
            Self::UpstreamStatus(status) => *status,
            Self::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::InvalidUpstreamResponse(_) | Self::Serialization(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message placed in the client-facing `error` field.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::MalformedInput(_) => "invalid JSON",
            Self::MissingPostalCode => "CEP is required",
            Self::InvalidFormat(_) => "invalid zipcode",
            Self::NotFound(_) => "can not find zipcode",
            Self::WeatherUnavailable(_) => "can not find weather",
            Self::UpstreamStatus(_) => "zipcode lookup failed",
            Self::UpstreamUnavailable(_) => "service unavailable",
            Self::InvalidUpstreamResponse(_) | Self::Serialization(_) => "internal server error",
        }
    }
}

/// Failures while wiring a service together at startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("telemetry setup failed: {0}")]
    Telemetry(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
