#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;
use users_server::{create_router, Config, MemoryUserStore, StoreBackend};

pub fn test_config() -> Config {
    Config {
        store: StoreBackend::Memory,
        allowed_origins: vec!["https://app.example".to_string()],
        project_id: "demo-project".to_string(),
        environment: "test".to_string(),
        port: 0,
    }
}

/// Router over a fresh in-memory store.
pub fn test_app() -> Router {
    create_router(Arc::new(MemoryUserStore::new()), test_config())
}

pub fn path(suffix: &str) -> String {
    format!("{}{}", users_shared::api::FUNCTION_PREFIX, suffix)
}

/// Send a request and return the status with the body parsed as JSON
/// (`Value::Null` for an empty body).
pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}
