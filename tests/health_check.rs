//! Liveness and readiness endpoints.

mod common;

use common::TestApp;
use serial_test::serial;

#[tokio::test]
#[serial]
async fn health_check_returns_ok() {
    let app = TestApp::spawn().await;

    let response = app.get_public("/health").await;

    assert_status!(response, 200);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
#[serial]
async fn readiness_reports_database_up() {
    let app = TestApp::spawn().await;

    let response = app.get_public("/health/ready").await;

    assert_status!(response, 200);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "ready");
    assert_eq!(body["database"]["status"], "up");
}

#[tokio::test]
#[serial]
async fn openapi_document_is_served() {
    let app = TestApp::spawn().await;

    let response = app.get_public("/api-docs/openapi.json").await;

    assert_status!(response, 200);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert!(body["paths"]["/search"].is_object());
}

#[tokio::test]
#[serial]
async fn request_id_is_generated_when_absent() {
    let app = TestApp::spawn().await;

    let response = app.get_public("/health").await;

    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("missing x-request-id")
        .to_str()
        .unwrap();
    assert!(!request_id.is_empty());
}
