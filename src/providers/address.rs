//! Postal-lookup provider client (ViaCEP-compatible).
//!
//! The provider answers `GET {base}/ws/{cep}/json/`. An unknown CEP still
//! comes back as `200` with an `erro` flag in the payload, so the flag is
//! checked explicitly after decoding.

use serde::{Deserialize, Deserializer};
use tracing::Instrument;

use crate::error::PipelineError;
use crate::observability::metrics;
use crate::observability::tracing::{span_names, SharedTracer, FIELD_CEP};

/// Address resolved for a CEP. Only built for found codes with a city.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressRecord {
    pub cep: String,
    pub street: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
}

#[derive(Debug, Deserialize)]
struct ViaCepPayload {
    #[serde(default)]
    cep: String,
    #[serde(default)]
    logradouro: String,
    #[serde(default)]
    bairro: String,
    #[serde(default)]
    localidade: String,
    #[serde(default)]
    uf: String,
    #[serde(default, deserialize_with = "not_found_flag")]
    erro: bool,
}

/// The provider has sent the flag both as `true` and as `"true"`.
fn not_found_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Text(s) => s.eq_ignore_ascii_case("true"),
    })
}

/// Resolves a CEP to its address through the postal-lookup provider.
#[derive(Clone)]
pub struct AddressResolver {
    client: reqwest::Client,
    base_url: String,
    tracer: SharedTracer,
}

impl AddressResolver {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, tracer: SharedTracer) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            tracer,
        }
    }

    /// Look up `cep`. The caller has already validated its format.
    pub async fn resolve(&self, cep: &str) -> Result<AddressRecord, PipelineError> {
        let span = self.tracer.start_span(span_names::RESOLVE_ADDRESS);
        span.record(FIELD_CEP, cep);

        let result = self.fetch(cep).instrument(span).await;
        metrics::record_upstream("postal", if result.is_ok() { "ok" } else { "error" });
        result
    }

    async fn fetch(&self, cep: &str) -> Result<AddressRecord, PipelineError> {
        let url = format!("{}/ws/{}/json/", self.base_url.trim_end_matches('/'), cep);

        let response = self.client.get(&url).send().await.map_err(|e| {
            tracing::warn!(cep, error = %e, "Postal provider unreachable");
            PipelineError::UpstreamUnavailable(format!("postal provider: {}", e))
        })?;

        let status = response.status();
        if status.is_server_error() {
            tracing::warn!(cep, status = %status, "Postal provider failed");
            return Err(PipelineError::UpstreamUnavailable(format!(
                "postal provider returned {}",
                status
            )));
        }
        if !status.is_success() {
            tracing::info!(cep, status = %status, "Postal provider rejected lookup");
            return Err(PipelineError::NotFound(format!(
                "postal provider returned {}",
                status
            )));
        }

        let payload: ViaCepPayload = response.json().await.map_err(|e| {
            tracing::warn!(cep, error = %e, "Undecodable postal provider payload");
            PipelineError::NotFound(format!("undecodable postal payload: {}", e))
        })?;

        if payload.erro {
            tracing::info!(cep, "Postal code not found");
            return Err(PipelineError::NotFound(cep.to_string()));
        }
        if payload.localidade.trim().is_empty() {
            tracing::info!(cep, "Postal code resolved without a city");
            return Err(PipelineError::NotFound(format!("{} has no city", cep)));
        }

        tracing::debug!(cep, city = %payload.localidade, "Postal code resolved");

        Ok(AddressRecord {
            cep: if payload.cep.is_empty() { cep.to_string() } else { payload.cep },
            street: payload.logradouro,
            neighborhood: payload.bairro,
            city: payload.localidade,
            state: payload.uf,
        })
    }
}
