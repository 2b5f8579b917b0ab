use super::*;
use crate::service::test_helpers::{StaticMessageSource, create_test_service, create_test_service_with};
use crate::types::{DownloadResponse, ExtractResponse};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use tower::ServiceExt;

mod jobs;

const PASSWORD: &str = "test-password";

/// Router over the sample messages, gated by [`PASSWORD`]
fn create_test_app() -> (Router, Arc<ExportService>) {
    let (service, _source) = create_test_service();
    app_for(service)
}

fn app_for(service: ExportService) -> (Router, Arc<ExportService>) {
    let service = Arc::new(service);
    let config = Arc::new(service.config().clone());
    (create_router(service.clone(), config), service)
}

async fn post_json(app: &Router, uri: &str, body: Value) -> Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", "application/json")
                .header("X-API-Password", PASSWORD)
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn get_authed(app: &Router, uri: &str) -> Response {
    app.clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .header("X-API-Password", PASSWORD)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn body_text(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

async fn json_body<T: DeserializeOwned>(response: Response) -> T {
    serde_json::from_str(&body_text(response).await).unwrap()
}

/// POST /download for U123 over the sample range
async fn download_sample(app: &Router) -> DownloadResponse {
    let response = post_json(
        app,
        "/api/v1/download",
        json!({"user_id": "U123", "start_date": "2025-03-07", "end_date": "2025-03-09"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    json_body(response).await
}

#[tokio::test]
async fn test_api_server_spawns() {
    let (service, _source) = create_test_service();
    let service = Arc::new(service);

    let mut config = service.config().clone();
    config.server.api.bind_address = "127.0.0.1:0".parse().unwrap(); // Port 0 = OS assigns a free port
    let config = Arc::new(config);

    let api_handle = tokio::spawn(start_api_server(service, config));

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!api_handle.is_finished(), "server should still be running");

    api_handle.abort();
}

#[tokio::test]
async fn test_cors_enabled() {
    let (service, _source) = create_test_service();
    let service = Arc::new(service);

    let mut config = service.config().clone();
    config.server.api.cors_enabled = true;
    config.server.api.cors_origins = vec!["*".to_string()];
    let app = create_router(service, Arc::new(config));

    let request = Request::builder()
        .uri("/api/v1/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers().contains_key("access-control-allow-origin"),
        "CORS header should be present when CORS is enabled"
    );
}

#[tokio::test]
async fn test_cors_disabled() {
    let (service, _source) = create_test_service();
    let service = Arc::new(service);

    let mut config = service.config().clone();
    config.server.api.cors_enabled = false;
    let app = create_router(service, Arc::new(config));

    let request = Request::builder()
        .uri("/api/v1/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert!(!response.headers().contains_key("access-control-allow-origin"));
}

#[test]
fn test_build_cors_layer_specific_origins() {
    // Unparseable origins are dropped rather than rejected
    let _layer = build_cors_layer(&["http://localhost:3000".to_string(), "\n".to_string()]);
}

#[tokio::test]
async fn test_gated_route_requires_password() {
    let (app, service) = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/download")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    json!({"user_id": "U123", "start_date": "2025-03-07", "end_date": "2025-03-09"})
                        .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let error: crate::error::ApiError = json_body(response).await;
    assert_eq!(error.error.code, "unauthorized");
    assert!(service.jobs().is_empty().await);
}

#[tokio::test]
async fn test_wrong_password_is_rejected_before_the_handler() {
    let (app, service) = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/download")
                .header("Content-Type", "application/json")
                .header("X-API-Password", "not-the-password")
                .body(Body::from(
                    json!({"user_id": "U123", "start_date": "2025-03-07", "end_date": "2025-03-09"})
                        .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(service.jobs().is_empty().await);
}

#[tokio::test]
async fn test_no_password_configured_leaves_routes_open() {
    let (service, _source) = create_test_service();
    let service = Arc::new(service);
    let mut config = service.config().clone();
    config.server.api.api_password = None;
    let app = create_router(service, Arc::new(config));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/download")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    json!({"user_id": "U123", "start_date": "2025-03-07", "end_date": "2025-03-09"})
                        .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
