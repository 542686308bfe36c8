//! Edge-service pipeline: decode, validate, forward to the internal service.

use axum::http::HeaderMap;
use tracing::Instrument;

use crate::domain::{is_valid_cep, PostalCodeRequest, TemperatureReading};
use crate::error::PipelineError;
use crate::observability::metrics;
use crate::observability::tracing::{span_names, SharedTracer, FIELD_CEP};

/// Validates inbound CEPs and relays them to the internal service.
#[derive(Clone)]
pub struct Forwarder {
    client: reqwest::Client,
    internal_base_url: String,
    tracer: SharedTracer,
}

impl Forwarder {
    pub fn new(
        client: reqwest::Client,
        internal_base_url: impl Into<String>,
        tracer: SharedTracer,
    ) -> Self {
        Self {
            client,
            internal_base_url: internal_base_url.into(),
            tracer,
        }
    }

    /// Handle one raw edge request body.
    ///
    /// The returned future owns the outbound call: dropping it (client
    /// disconnect, inbound deadline) aborts the call to the internal service.
    ///
    /// # Errors
    /// - `MalformedInput` / `InvalidFormat` without any network call
    /// - `UpstreamUnavailable` when the internal service cannot be reached
    /// - `UpstreamStatus` carrying the internal service's non-success status
    /// - `InvalidUpstreamResponse` when a success body cannot be decoded
    pub async fn forward(&self, body: &[u8]) -> Result<TemperatureReading, PipelineError> {
        let request: PostalCodeRequest = serde_json::from_slice(body)
            .map_err(|e| PipelineError::MalformedInput(e.to_string()))?;

        let span = self.tracer.start_span(span_names::VALIDATE_CEP);
        span.record(FIELD_CEP, request.cep.as_str());

        async {
            if !is_valid_cep(&request.cep) {
                tracing::info!(cep = %request.cep, "Rejected invalid postal code");
                return Err(PipelineError::InvalidFormat(request.cep.clone()));
            }
            self.fetch_temperature(&request.cep).await
        }
        .instrument(span)
        .await
    }

    async fn fetch_temperature(&self, cep: &str) -> Result<TemperatureReading, PipelineError> {
        let span = self.tracer.start_span(span_names::REQUEST_INTERNAL);
        span.record(FIELD_CEP, cep);

        let mut headers = HeaderMap::new();
        self.tracer.inject_context(&span, &mut headers);

        let url = format!("{}/{}", self.internal_base_url.trim_end_matches('/'), cep);

        let result = async {
            let response = self
                .client
                .get(&url)
                .headers(headers)
                .send()
                .await
                .map_err(|e| {
                    tracing::warn!(cep, error = %e, "Internal service unreachable");
                    PipelineError::UpstreamUnavailable(e.to_string())
                })?;

            let status = response.status();
            if !status.is_success() {
                tracing::info!(cep, status = %status, "Internal service lookup failed");
                return Err(PipelineError::UpstreamStatus(status));
            }

            response.json::<TemperatureReading>().await.map_err(|e| {
                tracing::error!(cep, error = %e, "Undecodable internal service response");
                PipelineError::InvalidUpstreamResponse(e.to_string())
            })
        }
        .instrument(span)
        .await;

        metrics::record_upstream("internal", if result.is_ok() { "ok" } else { "error" });
        result
    }
}
