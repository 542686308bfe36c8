//! External data providers called by the internal service.
//!
//! # Data Flow
//! ```text
//! CEP  → address.rs (postal-lookup provider) → AddressRecord.city
//! city → weather.rs (weather provider)       → WeatherRecord.temp_c
//! ```
//!
//! # Design Decisions
//! - Both clients share one `reqwest::Client` (connection pool, timeout)
//! - No retries and no fallback provider: one failed call fails the request
//! - Calls are made from the inbound request future, so dropping that
//!   future cancels them

pub mod address;
pub mod weather;

pub use address::{AddressRecord, AddressResolver};
pub use weather::{WeatherRecord, WeatherResolver};
