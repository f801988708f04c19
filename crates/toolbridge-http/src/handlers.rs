//! HTTP request handlers for the Toolbridge control plane.
//!
//! Handlers parse the request, call into the registry or dispatch engine,
//! and serialize the outcome. Execution endpoints always return a
//! [`ResultEnvelope`] body with the status code derived from the error kind;
//! listing endpoints use a plain error body, since the envelope is reserved
//! for tool execution.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use toolbridge_core::{
    DispatchError, ErrorKind, QualifiedToolName, ResultEnvelope, ServiceId, ToolName,
};
use toolbridge_registry::{ServiceSummary, ToolSummary};

use crate::AppState;

/// Error body for non-execution endpoints.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: String,
}

/// Response for `GET /services`.
#[derive(Debug, Serialize)]
pub struct ServicesResponse {
    pub services: Vec<ServiceSummary>,
    pub total: usize,
}

/// Response for `GET /tools`.
#[derive(Debug, Serialize)]
pub struct ToolsResponse {
    pub tools: Vec<ToolSummary>,
    pub total: usize,
}

/// Query parameters for `GET /tools`.
#[derive(Debug, Deserialize)]
pub struct ToolsQuery {
    /// Restrict the listing to one owning service.
    pub service: Option<String>,
}

/// Request body for `POST /execute`.
#[derive(Debug, Deserialize)]
pub struct ExecuteRequest {
    pub tool_name: String,
    #[serde(default = "empty_params")]
    pub params: Value,
}

fn empty_params() -> Value {
    Value::Object(Map::new())
}

/// Response for `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Map an envelope onto the documented status codes.
fn status_for(envelope: &ResultEnvelope) -> StatusCode {
    match envelope.error_kind() {
        None => StatusCode::OK,
        Some(ErrorKind::ValidationError) => StatusCode::BAD_REQUEST,
        Some(ErrorKind::ToolNotFound) | Some(ErrorKind::ServiceNotFound) => StatusCode::NOT_FOUND,
        Some(ErrorKind::UpstreamError) => StatusCode::BAD_GATEWAY,
        Some(ErrorKind::InternalError) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn respond(envelope: ResultEnvelope) -> (StatusCode, Json<ResultEnvelope>) {
    (status_for(&envelope), Json(envelope))
}

/// A name that fails identifier validation cannot be registered, so the
/// request itself is malformed.
fn invalid_name(what: &str, detail: impl std::fmt::Display) -> (StatusCode, Json<ResultEnvelope>) {
    respond(ResultEnvelope::failure(DispatchError::new(
        ErrorKind::ValidationError,
        format!("invalid {what}: {detail}"),
    )))
}

/// GET /health - Liveness probe.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "toolbridge",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now(),
    })
}

/// GET /services - List all registered services.
pub async fn list_services(State(state): State<AppState>) -> Json<ServicesResponse> {
    let services = state.registry.list_services();
    Json(ServicesResponse {
        total: services.len(),
        services,
    })
}

/// GET /tools - List registered tools, optionally scoped by service.
pub async fn list_tools(
    State(state): State<AppState>,
    Query(query): Query<ToolsQuery>,
) -> Result<Json<ToolsResponse>, (StatusCode, Json<ErrorResponse>)> {
    let tools = match query.service {
        None => state.registry.list_tools(),
        Some(service) => {
            let id = ServiceId::parse(&service).map_err(|e| {
                (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse {
                        error: "invalid_service_id",
                        message: format!("invalid service id '{service}': {e}"),
                    }),
                )
            })?;
            state.registry.list_tools_for(&id).map_err(|e| {
                (
                    StatusCode::NOT_FOUND,
                    Json(ErrorResponse {
                        error: "service_not_found",
                        message: e.to_string(),
                    }),
                )
            })?
        }
    };

    Ok(Json(ToolsResponse {
        total: tools.len(),
        tools,
    }))
}

/// Parse a request body, treating an empty body as an empty parameter
/// object the way the execution endpoints document it.
fn parse_body<T: serde::de::DeserializeOwned>(
    body: &Bytes,
    empty: impl FnOnce() -> T,
) -> Result<T, (StatusCode, Json<ResultEnvelope>)> {
    if body.is_empty() {
        return Ok(empty());
    }
    serde_json::from_slice(body).map_err(|e| {
        respond(ResultEnvelope::failure(DispatchError::new(
            ErrorKind::ValidationError,
            format!("malformed request body: {e}"),
        )))
    })
}

/// POST /execute - Execute a tool by name.
///
/// Accepts both the bare form (`list_issues`) and the qualified
/// `service.tool` form (`github.list_issues`); a qualified name resolves to
/// the same tool a bare lookup of that name would.
pub async fn execute(
    State(state): State<AppState>,
    body: Bytes,
) -> (StatusCode, Json<ResultEnvelope>) {
    let request: ExecuteRequest = match parse_body(&body, || ExecuteRequest {
        tool_name: String::new(),
        params: empty_params(),
    }) {
        Ok(request) => request,
        Err(response) => return response,
    };

    if request.tool_name.contains('.') {
        let qualified = match QualifiedToolName::parse(&request.tool_name) {
            Ok(qualified) => qualified,
            Err(e) => return invalid_name("tool name", e),
        };
        return respond(
            state
                .dispatcher
                .execute_qualified(qualified.service(), qualified.tool(), request.params)
                .await,
        );
    }

    let name = match ToolName::parse(&request.tool_name) {
        Ok(name) => name,
        Err(e) => return invalid_name("tool name", e),
    };
    respond(state.dispatcher.execute(&name, request.params).await)
}

/// POST /{service_id}/{tool_name} - Execute a tool addressed by its owning
/// service; the body is the parameter object itself.
pub async fn execute_scoped(
    State(state): State<AppState>,
    Path((service_id, tool_name)): Path<(String, String)>,
    body: Bytes,
) -> (StatusCode, Json<ResultEnvelope>) {
    let service = match ServiceId::parse(&service_id) {
        Ok(service) => service,
        Err(e) => return invalid_name("service id", e),
    };
    let tool = match ToolName::parse(&tool_name) {
        Ok(tool) => tool,
        Err(e) => return invalid_name("tool name", e),
    };
    let params = match parse_body(&body, empty_params) {
        Ok(params) => params,
        Err(response) => return response,
    };

    respond(
        state
            .dispatcher
            .execute_qualified(&service, &tool, params)
            .await,
    )
}
