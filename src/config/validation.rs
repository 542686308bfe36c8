//! Configuration validation.
//!
//! Serde handles syntax; this checks semantics for the role being started.
//! Validation is a pure function and reports every problem, not just the first.

use std::fmt;
use std::net::SocketAddr;

use url::Url;

use crate::config::schema::{AppConfig, ServiceRole};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate the sections `role` depends on.
pub fn validate_config(config: &AppConfig, role: ServiceRole) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_socket_addr(&mut errors, "bind_address", config.bind_address(role));

    match role {
        ServiceRole::Edge => {
            check_http_url(&mut errors, "edge.internal_base_url", &config.edge.internal_base_url);
        }
        ServiceRole::Internal => {
            check_http_url(&mut errors, "providers.postal_base_url", &config.providers.postal_base_url);
            check_http_url(
                &mut errors,
                "providers.weather_base_url",
                &config.providers.weather_base_url,
            );
            if config.providers.weather_api_key.trim().is_empty() {
                errors.push(ValidationError {
                    field: "providers.weather_api_key",
                    message: "must be set (or provide WEATHER_API_KEY)".to_string(),
                });
            }
        }
    }

    if config.timeouts.request_ms == 0 {
        errors.push(ValidationError {
            field: "timeouts.request_ms",
            message: "must be greater than zero".to_string(),
        });
    }
    if config.timeouts.upstream_ms == 0 {
        errors.push(ValidationError {
            field: "timeouts.upstream_ms",
            message: "must be greater than zero".to_string(),
        });
    }

    if config.observability.metrics_enabled {
        check_socket_addr(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }
    if let Some(endpoint) = &config.observability.otlp_endpoint {
        check_http_url(&mut errors, "observability.otlp_endpoint", endpoint);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_socket_addr(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError {
            field,
            message: format!("'{}' is not a valid socket address", value),
        });
    }
}

fn check_http_url(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError {
            field,
            message: format!("unsupported scheme '{}'", url.scheme()),
        }),
        Err(e) => errors.push(ValidationError {
            field,
            message: format!("'{}' is not a valid URL: {}", value, e),
        }),
    }
}
