//! The uniform result envelope returned for every tool execution.
//!
//! Every exit path from the dispatch engine produces exactly one
//! [`ResultEnvelope`]: either `success` with data, or failure with one
//! structured [`DispatchError`]. No raw error value, panic payload, or
//! backend-native error object ever crosses the dispatch boundary unwrapped,
//! and no partial results exist.

use crate::identifiers::CorrelationId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The closed error vocabulary exposed to transport layers.
///
/// Upstream-specific error codes are preserved inside
/// [`DispatchError::detail`]; the kind is always one of these five, giving
/// callers a stable discriminator independent of which backend failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed or missing parameters; recoverable by the caller.
    ValidationError,
    /// The caller referenced a tool name that is not registered.
    ToolNotFound,
    /// The caller referenced a service id that is not registered.
    ServiceNotFound,
    /// The backend service rejected or failed the call.
    UpstreamError,
    /// Unexpected failure inside the engine or an adapter; detail suppressed.
    InternalError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ValidationError => "validation_error",
            ErrorKind::ToolNotFound => "tool_not_found",
            ErrorKind::ServiceNotFound => "service_not_found",
            ErrorKind::UpstreamError => "upstream_error",
            ErrorKind::InternalError => "internal_error",
        }
    }
}

/// Structured error carried by a failed envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchError {
    pub kind: ErrorKind,
    pub message: String,
    /// Backend-provided detail, preserved verbatim for upstream failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
    /// Correlation id for suppressed internal errors; matches the server log.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<CorrelationId>,
}

impl DispatchError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            detail: None,
            reference: None,
        }
    }

    pub fn with_detail(mut self, detail: Value) -> Self {
        self.detail = Some(detail);
        self
    }

    pub fn with_reference(mut self, reference: CorrelationId) -> Self {
        self.reference = Some(reference);
        self
    }
}

/// The only shape ever returned to a caller of the dispatch engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<DispatchError>,
}

impl ResultEnvelope {
    pub fn success(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: DispatchError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// The error kind, if this envelope is a failure.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(|e| e.kind)
    }
}
