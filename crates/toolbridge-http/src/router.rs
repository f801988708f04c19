//! Router assembly for the HTTP transport.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use toolbridge_registry::{Dispatcher, Registry};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::HttpConfig;
use crate::handlers::{execute, execute_scoped, health, list_services, list_tools};

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub dispatcher: Arc<Dispatcher>,
}

/// Build the router with all endpoints and middleware.
///
/// Static routes win over the scoped execution route, so `/services`,
/// `/tools`, `/execute`, and `/health` are never shadowed by
/// `/{service_id}/{tool_name}`.
pub fn router(registry: Arc<Registry>, dispatcher: Arc<Dispatcher>, config: &HttpConfig) -> Router {
    let state = AppState {
        registry,
        dispatcher,
    };

    let mut router = Router::new()
        .route("/health", get(health))
        .route("/services", get(list_services))
        .route("/tools", get(list_tools))
        .route("/execute", post(execute))
        .route("/{service_id}/{tool_name}", post(execute_scoped))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if config.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }

    router
}
