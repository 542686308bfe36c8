//! Celsius conversions and the aggregated temperature record.

use serde::{Deserialize, Serialize};

/// Converts a Celsius reading to Fahrenheit.
pub fn to_fahrenheit(celsius: f64) -> f64 {
    celsius * 1.8 + 32.0
}

/// Converts a Celsius reading to Kelvin (integer offset, as reported to clients).
pub fn to_kelvin(celsius: f64) -> f64 {
    celsius + 273.0
}

/// Final response body shared by both services.
///
/// All three units are derived from the same Celsius value; build it through
/// [`TemperatureReading::from_celsius`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureReading {
    pub city: String,
    #[serde(rename = "temp_C")]
    pub temp_c: f64,
    #[serde(rename = "temp_F")]
    pub temp_f: f64,
    #[serde(rename = "temp_K")]
    pub temp_k: f64,
}

impl TemperatureReading {
    pub fn from_celsius(city: impl Into<String>, celsius: f64) -> Self {
        Self {
            city: city.into(),
            temp_c: celsius,
            temp_f: to_fahrenheit(celsius),
            temp_k: to_kelvin(celsius),
        }
    }
}
