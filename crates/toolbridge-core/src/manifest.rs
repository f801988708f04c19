//! Service and tool definitions.
//!
//! A [`ServiceManifest`] is the immutable self-description a backend adapter
//! hands to the registry: identity, endpoint, credential handle, and the set
//! of tools the service contributes. Definitions are created once at
//! registration and never mutated afterwards.

use crate::identifiers::{ServiceId, ToolName};
use crate::schema::InputSchema;
use std::fmt;

/// Opaque handle to a backend credential.
///
/// The wrapped secret is reachable only through [`CredentialRef::expose`];
/// `Debug` and `Display` are redacted so the value cannot leak through
/// logging or error formatting.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialRef(String);

impl CredentialRef {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Access the underlying secret, e.g. to build an Authorization header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CredentialRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CredentialRef(<redacted>)")
    }
}

impl fmt::Display for CredentialRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

/// Immutable description of one invocable tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDef {
    pub name: ToolName,
    pub description: String,
    pub input_schema: InputSchema,
    /// Owning service, stamped when the tool is attached to a manifest.
    pub service: ServiceId,
}

impl ToolDef {
    /// Create a tool definition. The owning service id is filled in by
    /// [`ServiceManifest::with_tool`].
    pub fn new(
        name: ToolName,
        description: impl Into<String>,
        input_schema: InputSchema,
    ) -> UnboundToolDef {
        UnboundToolDef {
            name,
            description: description.into(),
            input_schema,
        }
    }
}

/// A tool definition not yet attached to a service.
#[derive(Debug, Clone)]
pub struct UnboundToolDef {
    name: ToolName,
    description: String,
    input_schema: InputSchema,
}

/// Immutable description of one backend integration and its tools.
///
/// # Example
///
/// ```rust
/// use toolbridge_core::identifiers::{ServiceId, ToolName};
/// use toolbridge_core::manifest::{CredentialRef, ServiceManifest, ToolDef};
/// use toolbridge_core::schema::InputSchema;
///
/// let manifest = ServiceManifest::new(
///     ServiceId::parse("github").unwrap(),
///     "GitHub",
///     "GitHub API service for repository management",
///     "https://api.github.com",
///     CredentialRef::new("token"),
/// )
/// .with_tool(ToolDef::new(
///     ToolName::parse("list_repos").unwrap(),
///     "List GitHub repositories",
///     InputSchema::new(),
/// ));
///
/// assert_eq!(manifest.tools[0].service.as_str(), "github");
/// ```
#[derive(Debug, Clone)]
pub struct ServiceManifest {
    pub id: ServiceId,
    pub display_name: String,
    pub description: String,
    pub base_endpoint: String,
    pub credential: CredentialRef,
    pub tools: Vec<ToolDef>,
}

impl ServiceManifest {
    pub fn new(
        id: ServiceId,
        display_name: impl Into<String>,
        description: impl Into<String>,
        base_endpoint: impl Into<String>,
        credential: CredentialRef,
    ) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            description: description.into(),
            base_endpoint: base_endpoint.into(),
            credential,
            tools: Vec::new(),
        }
    }

    /// Attach a tool, stamping this service as its owner.
    pub fn with_tool(mut self, tool: UnboundToolDef) -> Self {
        self.tools.push(ToolDef {
            name: tool.name,
            description: tool.description,
            input_schema: tool.input_schema,
            service: self.id.clone(),
        });
        self
    }
}
