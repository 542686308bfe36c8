//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → middleware.rs (request deadline)
//!     → handlers.rs (extract body / path / headers)
//!     → pipeline (Forwarder or Aggregator)
//!     → response.rs (JSON body or error envelope)
//!     → Send to client
//! ```

pub mod handlers;
pub mod middleware;
pub mod response;
pub mod server;

pub use response::ErrorEnvelope;
pub use server::{HttpServer, X_REQUEST_ID};
