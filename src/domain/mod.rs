//! Pure domain logic shared by both services.
//!
//! Nothing in here performs I/O: the CEP validator and the temperature
//! converter are plain functions over their inputs.

pub mod cep;
pub mod temperature;

pub use cep::{is_valid_cep, PostalCodeRequest};
pub use temperature::{to_fahrenheit, to_kelvin, TemperatureReading};
