//! # Toolbridge Services
//!
//! Backend service adapters for the Toolbridge control plane. Each adapter
//! satisfies the [`toolbridge_core::ServiceAdapter`] capability: it describes
//! itself and its tools once, and handles validated tool invocations against
//! its own backend state.

pub mod github;
pub mod linear;

pub use github::GithubService;
pub use linear::LinearService;
