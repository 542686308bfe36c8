//! Internal-service pipeline: CEP → address → weather → reading.

use axum::http::HeaderMap;
use tracing::Instrument;

use crate::domain::{is_valid_cep, TemperatureReading};
use crate::error::PipelineError;
use crate::observability::tracing::{span_names, SharedTracer, FIELD_CEP};
use crate::providers::{AddressResolver, WeatherResolver};

/// Composes the two resolvers and the converter into one reading.
#[derive(Clone)]
pub struct Aggregator {
    address: AddressResolver,
    weather: WeatherResolver,
    tracer: SharedTracer,
}

impl Aggregator {
    pub fn new(address: AddressResolver, weather: WeatherResolver, tracer: SharedTracer) -> Self {
        Self {
            address,
            weather,
            tracer,
        }
    }

    /// Resolve `cep` to a temperature reading.
    ///
    /// `headers` are the inbound request headers; the aggregation span
    /// continues any trace they carry. The CEP is validated here even if a
    /// caller already did, since this service can be reached directly.
    ///
    /// # Errors
    /// `MissingPostalCode` or `InvalidFormat` before any network call;
    /// otherwise whatever the resolvers return.
    pub async fn aggregate(
        &self,
        cep: &str,
        headers: &HeaderMap,
    ) -> Result<TemperatureReading, PipelineError> {
        let span = self.tracer.start_span(span_names::AGGREGATE);
        self.tracer.continue_trace(&span, headers);
        span.record(FIELD_CEP, cep);

        self.run(cep).instrument(span).await
    }

    async fn run(&self, cep: &str) -> Result<TemperatureReading, PipelineError> {
        if cep.is_empty() {
            return Err(PipelineError::MissingPostalCode);
        }
        if !is_valid_cep(cep) {
            return Err(PipelineError::InvalidFormat(cep.to_string()));
        }

        // Weather needs the resolved city: these two calls are sequential.
        let address = self.address.resolve(cep).await?;
        let weather = self.weather.resolve(&address.city).await?;

        let reading = TemperatureReading::from_celsius(address.city, weather.temp_c);
        tracing::info!(
            cep,
            city = %reading.city,
            temp_c = reading.temp_c,
            "Temperature aggregated"
        );
        Ok(reading)
    }
}
