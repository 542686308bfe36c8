//! Postal code to temperature lookup, split across an edge service and an
//! internal service.

pub mod config;
pub mod domain;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod pipeline;
pub mod providers;

pub use config::AppConfig;
pub use domain::TemperatureReading;
pub use error::PipelineError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
