mod common;

use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::{path, send, test_app};
use serde_json::{json, Value};
use tower::ServiceExt;

#[tokio::test]
async fn create_get_delete_lifecycle() {
    let app = test_app();

    let (status, created) = send(
        &app,
        "POST",
        &path("/users"),
        Some(json!({"name": "A", "email": "a@x.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(id.len(), 20);
    assert_eq!(created["name"], "A");
    assert_eq!(created["email"], "a@x.com");
    assert!(created["createdAt"].is_string());
    assert_eq!(created["createdAt"], created["updatedAt"]);

    let (status, fetched) = send(&app, "GET", &path(&format!("/users/{id}")), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, deleted) = send(&app, "DELETE", &path(&format!("/users/{id}")), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted, json!({"message": "User deleted successfully"}));

    let (status, body) = send(&app, "GET", &path(&format!("/users/{id}")), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "User not found"}));
}

#[tokio::test]
async fn get_unknown_id_on_empty_collection_is_404() {
    let app = test_app();

    let (status, body) = send(&app, "GET", &path("/users/doesnotexist"), None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");
}

#[tokio::test]
async fn delete_unknown_id_still_succeeds() {
    let app = test_app();

    let (status, body) = send(&app, "DELETE", &path("/users/never-existed"), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User deleted successfully");
}

#[tokio::test]
async fn update_refreshes_updated_at_and_echoes_record() {
    let app = test_app();
    let (_, created) = send(
        &app,
        "POST",
        &path("/users"),
        Some(json!({"name": "A", "email": "a@x.com"})),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    tokio::time::sleep(Duration::from_millis(5)).await;

    let (status, updated) = send(
        &app,
        "PUT",
        &path(&format!("/users/{id}")),
        Some(json!({"name": "B", "email": "b@x.com", "createdAt": created["createdAt"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], id);
    assert_eq!(updated["name"], "B");
    assert_eq!(updated["email"], "b@x.com");
    assert_eq!(updated["createdAt"], created["createdAt"]);

    let before = created["updatedAt"].as_str().unwrap();
    let after = updated["updatedAt"].as_str().unwrap();
    assert!(after > before, "{after} should be later than {before}");

    let (_, fetched) = send(&app, "GET", &path(&format!("/users/{id}")), None).await;
    assert_eq!(fetched, updated);
}

#[tokio::test]
async fn update_trusts_caller_supplied_created_at() {
    let app = test_app();
    let (_, created) = send(
        &app,
        "POST",
        &path("/users"),
        Some(json!({"name": "A", "email": "a@x.com"})),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let (status, updated) = send(
        &app,
        "PUT",
        &path(&format!("/users/{id}")),
        Some(json!({"name": "A", "email": "a@x.com", "createdAt": "2999-01-01T00:00:00.000Z"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["createdAt"], "2999-01-01T00:00:00.000Z");
}

#[tokio::test]
async fn update_unknown_id_is_404() {
    let app = test_app();

    let (status, body) = send(
        &app,
        "PUT",
        &path("/users/missing"),
        Some(json!({"name": "A", "email": "a@x.com"})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");
}

#[tokio::test]
async fn list_includes_every_created_user() {
    let app = test_app();
    let mut ids = Vec::new();
    for n in 0..3 {
        let (_, created) = send(
            &app,
            "POST",
            &path("/users"),
            Some(json!({"name": format!("U{n}"), "email": format!("u{n}@x.com")})),
        )
        .await;
        ids.push(created["id"].clone());
    }

    let (status, body) = send(&app, "GET", &path("/users"), None).await;
    assert_eq!(status, StatusCode::OK);

    let listed: Vec<Value> = body.as_array().unwrap().iter().map(|u| u["id"].clone()).collect();
    assert!(listed.len() >= 3);
    for id in &ids {
        assert!(listed.contains(id));
    }
}

#[tokio::test]
async fn missing_fields_are_rejected_with_400() {
    let app = test_app();

    let (status, body) = send(&app, "POST", &path("/users"), Some(json!({"email": "a@x.com"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "name is required");

    let (status, body) = send(&app, "POST", &path("/users"), Some(json!({"name": "A"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "email is required");

    let (_, listed) = send(&app, "GET", &path("/users"), None).await;
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn malformed_json_is_rejected_with_error_body() {
    let app = test_app();
    let request = Request::builder()
        .method("POST")
        .uri(path("/users"))
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn health_reports_environment_and_project() {
    let app = test_app();

    let (status, body) = send(&app, "GET", &path("/health"), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"status": "ok", "environment": "test", "projectId": "demo-project"})
    );
}

#[tokio::test]
async fn routes_live_under_function_prefix_only() {
    let app = test_app();

    let (status, body) = send(&app, "GET", "/users", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not found");
}
