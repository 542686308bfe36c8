//! Weather provider client (WeatherAPI-compatible).

use serde::Deserialize;
use tracing::Instrument;

use crate::error::PipelineError;
use crate::observability::metrics;
use crate::observability::tracing::{span_names, SharedTracer, FIELD_CITY};

/// Current conditions for a city.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherRecord {
    /// Location name as reported by the provider.
    pub location: String,
    pub temp_c: f64,
}

#[derive(Debug, Deserialize)]
struct CurrentWeatherPayload {
    location: LocationPayload,
    current: CurrentPayload,
}

#[derive(Debug, Deserialize)]
struct LocationPayload {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct CurrentPayload {
    temp_c: f64,
}

/// Resolves a city name to its current Celsius temperature.
#[derive(Clone)]
pub struct WeatherResolver {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    tracer: SharedTracer,
}

impl WeatherResolver {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        tracer: SharedTracer,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            tracer,
        }
    }

    /// Fetch current weather for `city`. Every failure is terminal.
    pub async fn resolve(&self, city: &str) -> Result<WeatherRecord, PipelineError> {
        let span = self.tracer.start_span(span_names::RESOLVE_WEATHER);
        span.record(FIELD_CITY, city);

        let result = self.fetch(city).instrument(span).await;
        metrics::record_upstream("weather", if result.is_ok() { "ok" } else { "error" });
        result
    }

    async fn fetch(&self, city: &str) -> Result<WeatherRecord, PipelineError> {
        let url = format!("{}/current.json", self.base_url.trim_end_matches('/'));

        // `query` percent-encodes the city (spaces, accents).
        let response = self
            .client
            .get(&url)
            .query(&[("key", self.api_key.as_str()), ("q", city), ("aqi", "no")])
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(city, error = %e, "Weather provider unreachable");
                PipelineError::WeatherUnavailable(format!("transport: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(city, status = %status, "Weather provider returned an error");
            return Err(PipelineError::WeatherUnavailable(format!("status {}", status)));
        }

        let payload: CurrentWeatherPayload = response.json().await.map_err(|e| {
            tracing::warn!(city, error = %e, "Undecodable weather payload");
            PipelineError::WeatherUnavailable(format!("decode: {}", e))
        })?;

        if !payload.current.temp_c.is_finite() {
            return Err(PipelineError::WeatherUnavailable(
                "non-finite temperature".to_string(),
            ));
        }

        tracing::debug!(city, temp_c = payload.current.temp_c, "Weather resolved");

        Ok(WeatherRecord {
            location: payload.location.name,
            temp_c: payload.current.temp_c,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_nested_reading() {
        let payload: CurrentWeatherPayload = serde_json::from_str(
            r#"{
                "location": {"name": "Sao Paulo", "region": "Sao Paulo", "country": "Brazil"},
                "current": {"temp_c": 21.3, "temp_f": 70.3, "condition": {"text": "Sunny"}}
            }"#,
        )
        .unwrap();
        assert_eq!(payload.location.name, "Sao Paulo");
        assert_eq!(payload.current.temp_c, 21.3);
    }

    #[test]
    fn test_missing_reading_is_a_decode_error() {
        let result = serde_json::from_str::<CurrentWeatherPayload>(
            r#"{"location": {"name": "Nowhere"}, "current": {}}"#,
        );
        assert!(result.is_err());

        let result = serde_json::from_str::<CurrentWeatherPayload>(
            r#"{"error": {"code": 1006, "message": "No matching location found."}}"#,
        );
        assert!(result.is_err());
    }
}
