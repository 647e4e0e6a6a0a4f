mod common;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use common::{path, test_app, test_config};
use tower::ServiceExt;
use users_server::{create_router, Config, MemoryUserStore};

async fn call(app: Router, request: Request<Body>) -> (Response, usize) {
    let response = app.oneshot(request).await.unwrap();
    let (parts, body) = response.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    (Response::from_parts(parts, Body::empty()), bytes.len())
}

fn preflight(uri: &str, origin: &str) -> Request<Body> {
    Request::builder()
        .method("OPTIONS")
        .uri(uri)
        .header("origin", origin)
        .header("access-control-request-method", "POST")
        .body(Body::empty())
        .unwrap()
}

fn header(response: &Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .map(|value| value.to_str().unwrap().to_string())
}

#[tokio::test]
async fn preflight_is_a_bare_200_on_any_path() {
    for uri in [path("/users"), path("/users/abc"), "/nowhere".to_string()] {
        let (response, body_len) = call(test_app(), preflight(&uri, "https://app.example")).await;

        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        assert_eq!(body_len, 0, "{uri}");
        assert_eq!(
            header(&response, "access-control-allow-origin").as_deref(),
            Some("https://app.example")
        );

        let methods = header(&response, "access-control-allow-methods").unwrap();
        for method in ["GET", "POST", "PUT", "DELETE", "OPTIONS"] {
            assert!(methods.contains(method), "{methods}");
        }
        let headers = header(&response, "access-control-allow-headers")
            .unwrap()
            .to_lowercase();
        for name in ["origin", "x-requested-with", "content-type", "accept", "authorization"] {
            assert!(headers.contains(name), "{headers}");
        }
    }
}

#[tokio::test]
async fn plain_options_is_a_bare_200_on_any_path() {
    for uri in [path("/users"), path("/health"), "/nowhere".to_string()] {
        let request = Request::builder()
            .method("OPTIONS")
            .uri(&uri)
            .header("origin", "https://app.example")
            .body(Body::empty())
            .unwrap();

        let (response, body_len) = call(test_app(), request).await;

        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        assert_eq!(body_len, 0, "{uri}");
        assert_eq!(
            header(&response, "access-control-allow-origin").as_deref(),
            Some("https://app.example")
        );
    }
}

#[tokio::test]
async fn regular_responses_echo_a_listed_origin() {
    let request = Request::builder()
        .uri(path("/health"))
        .header("origin", "https://app.example")
        .body(Body::empty())
        .unwrap();

    let (response, _) = call(test_app(), request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header(&response, "access-control-allow-origin").as_deref(),
        Some("https://app.example")
    );
}

#[tokio::test]
async fn unlisted_origin_gets_no_allow_origin() {
    let request = Request::builder()
        .uri(path("/health"))
        .header("origin", "https://other.example")
        .body(Body::empty())
        .unwrap();

    let (response, _) = call(test_app(), request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "access-control-allow-origin"), None);
}

#[tokio::test]
async fn wildcard_entry_allows_any_origin() {
    let config = Config {
        allowed_origins: vec!["https://app.example".to_string(), "*".to_string()],
        ..test_config()
    };
    let app = create_router(Arc::new(MemoryUserStore::new()), config);

    let (response, _) = call(app, preflight(&path("/users"), "https://z.example")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header(&response, "access-control-allow-origin").as_deref(),
        Some("*")
    );
}
