//! # Toolbridge HTTP
//!
//! HTTP transport layer for the Toolbridge control plane: an axum front end
//! that parses requests, calls into the dispatch engine, and serializes
//! result envelopes back to the client with the documented status mapping.

pub mod config;
pub mod handlers;
pub mod router;
pub mod shutdown;

pub use config::{ConfigError, HttpConfig};
pub use router::{AppState, router};
pub use shutdown::shutdown_signal;
