//! Registration and lookup errors.
//!
//! These errors are reported directly to the caller of the registry API;
//! they never travel inside a result envelope, which is reserved for tool
//! execution (registration happens outside request dispatch).

use crate::identifiers::{ServiceId, ToolName};

/// Errors produced by registry operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// A service with this id is already registered.
    #[error("service '{0}' is already registered")]
    DuplicateService(ServiceId),

    /// A tool with this bare name is already bound by another service.
    ///
    /// Registration is atomic: when any declared tool collides, none of the
    /// registering service's tools become visible.
    #[error("tool '{tool}' is already provided by service '{owner}'")]
    DuplicateTool { tool: ToolName, owner: ServiceId },

    /// The referenced service id is not registered.
    #[error("service '{0}' is not registered")]
    ServiceNotFound(ServiceId),

    /// The referenced tool name is not registered.
    #[error("tool '{0}' is not registered")]
    ToolNotFound(ToolName),
}

/// Result type alias for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
