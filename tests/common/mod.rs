#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use issue_tracker::server::{AppState, router};
use issues_lib::{InMemoryStore, IssueService};
use serde_json::Value;
use tower::ServiceExt;

/// Router over a fresh in-memory store.
pub fn test_app() -> Router {
    issue_tracker::logging::init_test_logging();
    let service = IssueService::new(Arc::new(InMemoryStore::new()));
    router(AppState::new(service))
}

/// Router over a store persisted at `path`.
pub fn persistent_app(path: &std::path::Path) -> Router {
    issue_tracker::logging::init_test_logging();
    let store = InMemoryStore::open(path).expect("open store");
    router(AppState::new(IssueService::new(Arc::new(store))))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

/// Send a request with an optional JSON body.
pub async fn send_json(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");
    send(app, request).await
}

/// Send a request with a url-encoded form body.
pub async fn send_form(app: &Router, method: Method, uri: &str, form: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .expect("request");
    send(app, request).await
}

/// Create an issue via POST and return the response body.
pub async fn create(app: &Router, project: &str, body: Value) -> Value {
    let (status, value) =
        send_json(app, Method::POST, &format!("/api/issues/{project}"), Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    value
}

/// GET a list endpoint and return the array.
pub async fn list(app: &Router, uri: &str) -> Vec<Value> {
    let (status, value) = send_json(app, Method::GET, uri, None).await;
    assert_eq!(status, StatusCode::OK);
    value.as_array().expect("array response").clone()
}
