//! Signup and login over HTTP.

mod common;

use common::TestApp;
use serde_json::json;
use serial_test::serial;

#[tokio::test]
#[serial]
async fn signup_returns_user_summary() {
    let app = TestApp::spawn().await;
    let email = TestApp::unique_email();

    let response = app
        .post_public(
            "/signup",
            json!({ "name": "Ann", "email": email, "password": "password123" }),
        )
        .await;

    assert_status!(response, 200);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "User created successfully");
    assert_eq!(body["user"]["name"], "Ann");
    assert_eq!(body["user"]["email"], email.as_str());
    assert!(body["user"]["id"].as_i64().unwrap() > 0);
    assert!(body["user"].get("passwordHash").is_none());
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
#[serial]
async fn signup_normalizes_email_case() {
    let app = TestApp::spawn().await;

    let response = app
        .post_public(
            "/signup",
            json!({ "name": "Ann", "email": "Ann.Smith@Example.COM", "password": "password123" }),
        )
        .await;

    assert_status!(response, 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["user"]["email"], "ann.smith@example.com");
}

#[tokio::test]
#[serial]
async fn signup_rejects_duplicate_email() {
    let app = TestApp::spawn().await;
    let user = app.signup("Ann").await;

    let response = app
        .post_public(
            "/signup",
            json!({ "name": "Other", "email": user.email.to_uppercase(), "password": "password123" }),
        )
        .await;

    assert_status!(response, 409);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["code"], "USER_EXISTS");
}

#[tokio::test]
#[serial]
async fn signup_rejects_short_password() {
    let app = TestApp::spawn().await;

    let response = app
        .post_public(
            "/signup",
            json!({ "name": "Ann", "email": TestApp::unique_email(), "password": "12345" }),
        )
        .await;

    assert_status!(response, 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("at least 6"));
}

#[tokio::test]
#[serial]
async fn signup_rejects_invalid_email() {
    let app = TestApp::spawn().await;

    let response = app
        .post_public(
            "/signup",
            json!({ "name": "Ann", "email": "not-an-email", "password": "password123" }),
        )
        .await;

    assert_status!(response, 400);
}

#[tokio::test]
#[serial]
async fn login_returns_placeholder_token_and_identity() {
    let app = TestApp::spawn().await;
    let user = app.signup("Ann").await;

    let response = app
        .post_public(
            "/login",
            json!({ "email": user.email, "password": user.password }),
        )
        .await;

    assert_status!(response, 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["token"], "mock-jwt-token");
    assert_eq!(body["id"], user.id);
    assert_eq!(body["name"], "Ann");
}

#[tokio::test]
#[serial]
async fn login_failures_are_indistinguishable() {
    let app = TestApp::spawn().await;
    let user = app.signup("Ann").await;

    let wrong_password = app
        .post_public(
            "/login",
            json!({ "email": user.email, "password": "wrong-password" }),
        )
        .await;
    let unknown_email = app
        .post_public(
            "/login",
            json!({ "email": TestApp::unique_email(), "password": "password123" }),
        )
        .await;

    assert_status!(wrong_password, 401);
    assert_status!(unknown_email, 401);

    let a: serde_json::Value = wrong_password.json().await.unwrap();
    let b: serde_json::Value = unknown_email.json().await.unwrap();
    assert_eq!(a, b);
}

#[tokio::test]
#[serial]
async fn ann_signup_and_login_scenario() {
    let app = TestApp::spawn().await;
    let signup = json!({ "name": "Ann", "email": "ann@x.com", "password": "secret1" });

    let first = app.post_public("/signup", signup.clone()).await;
    assert_status!(first, 200);
    let created: serde_json::Value = first.json().await.unwrap();

    let second = app.post_public("/signup", signup).await;
    assert_status!(second, 409);

    let wrong = app
        .post_public("/login", json!({ "email": "ann@x.com", "password": "wrong" }))
        .await;
    assert_status!(wrong, 401);

    let ok = app
        .post_public("/login", json!({ "email": "ann@x.com", "password": "secret1" }))
        .await;
    assert_status!(ok, 200);
    let body: serde_json::Value = ok.json().await.unwrap();
    assert_eq!(body["id"], created["user"]["id"]);
    assert_eq!(body["name"], "Ann");
    assert_eq!(body["email"], "ann@x.com");
}
