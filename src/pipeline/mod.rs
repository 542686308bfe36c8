//! Request pipelines for the two services.
//!
//! # Data Flow
//! ```text
//! client ─POST /─▶ forwarder.rs (edge)
//!                     decode → validate → GET {internal}/{cep} + traceparent
//!                                              │
//!                                              ▼
//!                  aggregator.rs (internal)
//!                     re-validate → address → weather → convert
//! ```
//!
//! Each request is handled on its own task with no shared mutable state;
//! within a request every step is sequential.

pub mod aggregator;
pub mod forwarder;

pub use aggregator::Aggregator;
pub use forwarder::Forwarder;
