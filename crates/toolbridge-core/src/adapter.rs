//! The capability contract every backend integration must satisfy.
//!
//! A [`ServiceAdapter`] is the seam between the dispatch engine and the code
//! that talks to a real upstream API. The engine depends only on this trait:
//! it asks the adapter to describe itself once at registration time and then
//! routes validated tool invocations to [`ServiceAdapter::handle`]. Whatever
//! the adapter keeps inside (HTTP clients, caches, fixture stores) is its own
//! concern, including synchronization of any mutable state, since the engine
//! runs handlers concurrently.

use crate::identifiers::ToolName;
use crate::manifest::ServiceManifest;
use async_trait::async_trait;
use serde_json::Value;

/// Failure contract exposed by tool handlers.
///
/// `Upstream` tags failures attributable to the backend service; the engine
/// preserves its message and detail in the result envelope. Anything else is
/// an `Internal` fault whose detail is kept out of client responses.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HandlerError {
    #[error("{message}")]
    Upstream {
        message: String,
        detail: Option<Value>,
    },
    #[error("{message}")]
    Internal { message: String },
}

impl HandlerError {
    pub fn upstream(message: impl Into<String>) -> Self {
        HandlerError::Upstream {
            message: message.into(),
            detail: None,
        }
    }

    pub fn upstream_with_detail(message: impl Into<String>, detail: Value) -> Self {
        HandlerError::Upstream {
            message: message.into(),
            detail: Some(detail),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        HandlerError::Internal {
            message: message.into(),
        }
    }
}

/// A backend integration: self-description plus tool handlers.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use serde_json::{Value, json};
/// use toolbridge_core::adapter::{HandlerError, ServiceAdapter};
/// use toolbridge_core::identifiers::{ServiceId, ToolName};
/// use toolbridge_core::manifest::{CredentialRef, ServiceManifest, ToolDef};
/// use toolbridge_core::schema::InputSchema;
///
/// struct EchoService;
///
/// #[async_trait]
/// impl ServiceAdapter for EchoService {
///     fn manifest(&self) -> ServiceManifest {
///         ServiceManifest::new(
///             ServiceId::parse("echo").unwrap(),
///             "Echo",
///             "Echoes its parameters back",
///             "https://example.invalid",
///             CredentialRef::new("none"),
///         )
///         .with_tool(ToolDef::new(
///             ToolName::parse("echo").unwrap(),
///             "Echo the parameters",
///             InputSchema::new(),
///         ))
///     }
///
///     async fn handle(&self, _tool: &ToolName, params: Value) -> Result<Value, HandlerError> {
///         Ok(json!({ "echo": params }))
///     }
/// }
/// ```
#[async_trait]
pub trait ServiceAdapter: Send + Sync {
    /// Describe this service and the tools it contributes.
    ///
    /// Called once during registration; the returned manifest is immutable
    /// from the registry's point of view.
    fn manifest(&self) -> ServiceManifest;

    /// Execute one of this service's tools with an already-validated
    /// parameter object.
    ///
    /// The registry only routes names the manifest declared, so an unknown
    /// `tool` here indicates a wiring bug and should be reported as
    /// [`HandlerError::Internal`].
    async fn handle(&self, tool: &ToolName, params: Value) -> Result<Value, HandlerError>;
}
