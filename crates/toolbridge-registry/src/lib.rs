//! # Toolbridge Registry
//!
//! The registry store and dispatch engine of the Toolbridge control plane:
//! service/tool registration, O(1) name resolution, and execution routing
//! with uniform result envelopes.

pub mod dispatch;
pub mod registry;

pub use dispatch::{DEFAULT_HANDLER_TIMEOUT, Dispatcher};
pub use registry::{RegisteredTool, Registry, ServiceSummary, ToolSummary};
