//! Configuration schema definitions.
//!
//! One file configures both services; each process reads the sections that
//! apply to its role. All types derive Serde traits for deserialization
//! from TOML.

use serde::{Deserialize, Serialize};

/// Which of the two services this process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceRole {
    /// Client-facing service: validates and forwards.
    Edge,
    /// Internal service: queries the providers and aggregates.
    Internal,
}

impl ServiceRole {
    /// Name used for logs, metrics labels and the trace resource.
    pub fn service_name(&self) -> &'static str {
        match self {
            ServiceRole::Edge => "cep-edge",
            ServiceRole::Internal => "cep-internal",
        }
    }
}

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Edge service settings.
    pub edge: EdgeConfig,

    /// Internal service settings.
    pub internal: InternalConfig,

    /// External data providers used by the internal service.
    pub providers: ProviderConfig,

    /// Inbound and outbound deadlines.
    pub timeouts: TimeoutConfig,

    /// Logging, tracing and metrics.
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Bind address for the given role.
    pub fn bind_address(&self, role: ServiceRole) -> &str {
        match role {
            ServiceRole::Edge => &self.edge.bind_address,
            ServiceRole::Internal => &self.internal.bind_address,
        }
    }
}

/// Edge service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EdgeConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Base URL of the internal service; the CEP is appended as a path segment.
    pub internal_base_url: String,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            internal_base_url: "http://localhost:8081".to_string(),
        }
    }
}

/// Internal service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InternalConfig {
    /// Bind address (e.g., "0.0.0.0:8081").
    pub bind_address: String,
}

impl Default for InternalConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8081".to_string(),
        }
    }
}

/// External provider endpoints and credentials.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Postal-lookup provider base URL; requests go to `{base}/ws/{cep}/json/`.
    pub postal_base_url: String,

    /// Weather provider base URL; requests go to `{base}/current.json`.
    pub weather_base_url: String,

    /// Weather provider API key. Usually supplied through `WEATHER_API_KEY`.
    pub weather_api_key: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            postal_base_url: "https://viacep.com.br".to_string(),
            weather_base_url: "https://api.weatherapi.com/v1".to_string(),
            weather_api_key: String::new(),
        }
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("postal_base_url", &self.postal_base_url)
            .field("weather_base_url", &self.weather_base_url)
            .field("weather_api_key", &"<redacted>")
            .finish()
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Deadline for a whole inbound request, in milliseconds. Dropping the
    /// handler on expiry also cancels its outbound calls.
    pub request_ms: u64,

    /// Timeout for each outbound HTTP call, in milliseconds.
    pub upstream_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_ms: 30_000,
            upstream_ms: 10_000,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level filter used when `RUST_LOG` is unset.
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Build OpenTelemetry spans and propagate W3C trace context.
    pub otel_enabled: bool,

    /// OTLP/HTTP collector endpoint; spans are only exported when set.
    pub otlp_endpoint: Option<String>,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "cep_weather=info,tower_http=info".to_string(),
            log_format: LogFormat::Json,
            otel_enabled: true,
            otlp_endpoint: None,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

impl ObservabilityConfig {
    /// Log-only settings for reporting a configuration that failed to load.
    pub fn bootstrap() -> Self {
        Self {
            otel_enabled: false,
            otlp_endpoint: None,
            metrics_enabled: false,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bootstrap_observability_only_logs() {
        let bootstrap = ObservabilityConfig::bootstrap();
        assert!(!bootstrap.otel_enabled);
        assert!(!bootstrap.metrics_enabled);
        assert!(bootstrap.otlp_endpoint.is_none());
        assert_eq!(bootstrap.log_format, LogFormat::Json);
        assert_eq!(bootstrap.log_level, ObservabilityConfig::default().log_level);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [edge]
            internal_base_url = "http://internal:8081"

            [timeouts]
            upstream_ms = 2500
            "#,
        )
        .unwrap();

        assert_eq!(config.edge.internal_base_url, "http://internal:8081");
        assert_eq!(config.edge.bind_address, "0.0.0.0:8080");
        assert_eq!(config.timeouts.upstream_ms, 2500);
        assert_eq!(config.timeouts.request_ms, 30_000);
        assert_eq!(config.providers.postal_base_url, "https://viacep.com.br");
        assert_eq!(config.observability.log_format, LogFormat::Json);
    }

    #[test]
    fn test_api_key_is_redacted_in_debug() {
        let mut config = ProviderConfig::default();
        config.weather_api_key = "super-secret".to_string();
        let printed = format!("{:?}", config);
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn test_bind_address_per_role() {
        let config = AppConfig::default();
        assert_eq!(config.bind_address(ServiceRole::Edge), "0.0.0.0:8080");
        assert_eq!(config.bind_address(ServiceRole::Internal), "0.0.0.0:8081");
    }
}
