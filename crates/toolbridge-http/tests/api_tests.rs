//! Integration tests for the HTTP transport.
//!
//! Exercises the assembled router end to end against the real GitHub and
//! Linear adapters, covering endpoint shapes and the documented status-code
//! mapping.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use toolbridge_core::CredentialRef;
use toolbridge_http::{HttpConfig, router};
use toolbridge_registry::{Dispatcher, Registry};
use toolbridge_services::{GithubService, LinearService};
use tower::ServiceExt;

fn test_app() -> Router {
    let registry = Arc::new(Registry::new());
    registry
        .register(Arc::new(GithubService::new(CredentialRef::new("gh-token"))))
        .expect("github registers");
    registry
        .register(Arc::new(LinearService::new(CredentialRef::new("lin-token"))))
        .expect("linear registers");

    let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&registry)));
    router(registry, dispatcher, &HttpConfig::default())
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_reports_healthy() {
    let (status, body) = send(test_app(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "toolbridge");
    assert!(body["version"].is_string());
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn services_listing_preserves_registration_order() {
    let (status, body) = send(test_app(), get("/services")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["services"][0]["id"], "github");
    assert_eq!(body["services"][1]["id"], "linear");
    assert_eq!(body["services"][0]["display_name"], "GitHub");
}

#[tokio::test]
async fn tools_listing_tags_each_tool_with_its_owner() {
    let (status, body) = send(test_app(), get("/tools")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 8);

    let tools = body["tools"].as_array().unwrap();
    assert_eq!(tools[0]["name"], "list_repos");
    assert_eq!(tools[0]["service"], "github");
    assert!(tools[0]["input_schema"]["properties"].is_object());

    let linear_tools: Vec<&str> = tools
        .iter()
        .filter(|tool| tool["service"] == "linear")
        .map(|tool| tool["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        linear_tools,
        vec!["list_teams", "list_tickets", "get_member", "create_ticket"]
    );
}

#[tokio::test]
async fn tools_listing_can_be_scoped_by_service() {
    let (status, body) = send(test_app(), get("/tools?service=linear")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 4);

    let (status, body) = send(test_app(), get("/tools?service=jira")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "service_not_found");
}

#[tokio::test]
async fn execute_returns_success_envelope_with_data() {
    let request = post("/execute", json!({"tool_name": "list_repos", "params": {}}));
    let (status, body) = send(test_app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["data"].is_array());
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn execute_accepts_qualified_tool_names() {
    let request = post(
        "/execute",
        json!({"tool_name": "github.list_repos", "params": {}}),
    );
    let (status, body) = send(test_app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    // A qualified name under the wrong service does not resolve.
    let request = post(
        "/execute",
        json!({"tool_name": "linear.list_repos", "params": {}}),
    );
    let (status, body) = send(test_app(), request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["kind"], "tool_not_found");
}

#[tokio::test]
async fn execute_unknown_tool_maps_to_404() {
    let request = post("/execute", json!({"tool_name": "merge_pull", "params": {}}));
    let (status, body) = send(test_app(), request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["kind"], "tool_not_found");
}

#[tokio::test]
async fn execute_with_contract_violation_maps_to_400() {
    let request = post(
        "/execute",
        json!({"tool_name": "create_issue", "params": {"repo_id": 1}}),
    );
    let (status, body) = send(test_app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["kind"], "validation_error");
    assert!(body["error"]["message"].as_str().unwrap().contains("title"));
}

#[tokio::test]
async fn execute_upstream_failure_maps_to_502_with_detail() {
    let request = post(
        "/execute",
        json!({"tool_name": "create_issue", "params": {"repo_id": 999, "title": "x"}}),
    );
    let (status, body) = send(test_app(), request).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["kind"], "upstream_error");
    assert_eq!(body["error"]["detail"]["repo_id"], 999);
}

#[tokio::test]
async fn execute_with_malformed_body_maps_to_400() {
    let request = Request::builder()
        .method("POST")
        .uri("/execute")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(test_app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["kind"], "validation_error");
}

#[tokio::test]
async fn scoped_execution_resolves_through_the_owning_service() {
    let request = post("/linear/list_teams", json!({}));
    let (status, body) = send(test_app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn scoped_execution_accepts_an_empty_body() {
    let request = Request::builder()
        .method("POST")
        .uri("/github/list_repos")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(test_app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn scoped_execution_does_not_route_across_services() {
    // list_tickets exists, but belongs to linear.
    let request = post("/github/list_tickets", json!({}));
    let (status, body) = send(test_app(), request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["kind"], "tool_not_found");
}

#[tokio::test]
async fn scoped_execution_with_unknown_service_maps_to_404() {
    let request = post("/jira/list_tickets", json!({}));
    let (status, body) = send(test_app(), request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["kind"], "service_not_found");
}

#[tokio::test]
async fn scoped_and_bare_execution_reach_the_same_tool() {
    let scoped = post("/github/list_issues", json!({"repo_id": 1}));
    let (_, scoped_body) = send(test_app(), scoped).await;

    let bare = post(
        "/execute",
        json!({"tool_name": "list_issues", "params": {"repo_id": 1}}),
    );
    let (_, bare_body) = send(test_app(), bare).await;

    assert_eq!(scoped_body["data"], bare_body["data"]);
}
