//! Dispatch engine: resolve, validate, invoke, normalize.
//!
//! [`Dispatcher::execute`] is the single convergence point for every failure
//! kind. Whatever happens inside — unknown name, contract violation, backend
//! rejection, handler panic, stalled upstream call — the caller receives one
//! [`ResultEnvelope`], never a raw error, and internal detail is kept out of
//! the client-facing message.

use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use serde_json::{Value, json};
use toolbridge_core::{
    CorrelationId, DispatchError, ErrorKind, HandlerError, RegistryError, ResultEnvelope,
    ServiceId, ToolName,
};

use crate::registry::{RegisteredTool, Registry};

/// Default bound on a single handler invocation.
pub const DEFAULT_HANDLER_TIMEOUT: Duration = Duration::from_secs(30);

/// Routes execution requests to the owning adapter and converts every
/// outcome into a uniform result envelope.
pub struct Dispatcher {
    registry: Arc<Registry>,
    handler_timeout: Duration,
}

impl Dispatcher {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self::with_timeout(registry, DEFAULT_HANDLER_TIMEOUT)
    }

    /// Create a dispatcher with a custom handler timeout.
    ///
    /// Handlers may block on outbound calls to backend services; the timeout
    /// bounds how long one execution can hold a task hostage.
    pub fn with_timeout(registry: Arc<Registry>, handler_timeout: Duration) -> Self {
        Self {
            registry,
            handler_timeout,
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Execute a tool by bare name.
    pub async fn execute(&self, name: &ToolName, params: Value) -> ResultEnvelope {
        match self.registry.lookup(name) {
            Ok(tool) => self.run(tool, params).await,
            Err(err) => ResultEnvelope::failure(registry_error(err)),
        }
    }

    /// Execute a tool addressed by its owning service, as used by the
    /// `POST /{service_id}/{tool_name}` transport route.
    ///
    /// Resolves through the qualified lookup and therefore reaches the same
    /// tool a bare lookup of that name would.
    pub async fn execute_qualified(
        &self,
        service: &ServiceId,
        tool: &ToolName,
        params: Value,
    ) -> ResultEnvelope {
        match self.registry.lookup_qualified(service, tool) {
            Ok(tool) => self.run(tool, params).await,
            Err(err) => ResultEnvelope::failure(registry_error(err)),
        }
    }

    async fn run(&self, tool: Arc<RegisteredTool>, params: Value) -> ResultEnvelope {
        let name = &tool.def.name;

        if let Err(violation) = tool.def.input_schema.validate(&params) {
            return ResultEnvelope::failure(DispatchError::new(
                ErrorKind::ValidationError,
                violation.to_string(),
            ));
        }

        tracing::debug!(tool = %name, service = %tool.def.service, "Dispatching tool");

        let invocation = tool.adapter.handle(name, params);
        let outcome = tokio::time::timeout(
            self.handler_timeout,
            std::panic::AssertUnwindSafe(invocation).catch_unwind(),
        )
        .await;

        match outcome {
            Ok(Ok(Ok(data))) => ResultEnvelope::success(data),
            Ok(Ok(Err(HandlerError::Upstream { message, detail }))) => {
                tracing::warn!(tool = %name, error = %message, "Backend failed tool execution");
                let mut error = DispatchError::new(ErrorKind::UpstreamError, message);
                if let Some(detail) = detail {
                    error = error.with_detail(detail);
                }
                ResultEnvelope::failure(error)
            }
            Ok(Ok(Err(HandlerError::Internal { message }))) => {
                ResultEnvelope::failure(internal_error(name, &message))
            }
            Ok(Err(panic)) => {
                let message = panic_message(panic);
                ResultEnvelope::failure(internal_error(name, &format!("handler panicked: {message}")))
            }
            Err(_elapsed) => {
                let secs = self.handler_timeout.as_secs();
                tracing::warn!(tool = %name, timeout_secs = secs, "Tool handler timed out");
                ResultEnvelope::failure(
                    DispatchError::new(
                        ErrorKind::UpstreamError,
                        format!("tool '{name}' timed out after {secs}s"),
                    )
                    .with_detail(json!({ "timeout_secs": secs })),
                )
            }
        }
    }
}

/// Map a registration-store error onto the dispatch taxonomy.
fn registry_error(err: RegistryError) -> DispatchError {
    let kind = match &err {
        RegistryError::ToolNotFound(_) => ErrorKind::ToolNotFound,
        RegistryError::ServiceNotFound(_) => ErrorKind::ServiceNotFound,
        // Duplicate errors only arise at registration time, which reports to
        // the registration caller directly; reaching here is an engine bug.
        RegistryError::DuplicateService(_) | RegistryError::DuplicateTool { .. } => {
            ErrorKind::InternalError
        }
    };
    DispatchError::new(kind, err.to_string())
}

/// Build the caller-facing shape of an internal failure: generic message
/// plus a correlation id. The full detail goes to server-side logs only.
fn internal_error(tool: &ToolName, detail: &str) -> DispatchError {
    let reference = CorrelationId::generate();
    tracing::error!(
        tool = %tool,
        reference = %reference,
        error = detail,
        "Internal error during tool execution"
    );
    DispatchError::new(
        ErrorKind::InternalError,
        "internal error while executing tool",
    )
    .with_reference(reference)
}

fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
