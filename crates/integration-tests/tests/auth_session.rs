//! Session lifecycle through the API client: login, bearer header, 401.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use handyhub_client::api::{ApiError, RegisterRequest};
use handyhub_client::storage::keys;
use handyhub_client::{KeyValueStore, MemoryStore, SessionState};
use handyhub_core::{Email, UserRole};
use handyhub_integration_tests::{TEST_TOKEN, TestApp, profile, profile_json};
use secrecy::ExposeSecret;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn authorization(request: &wiremock::Request) -> Option<String> {
    request
        .headers
        .get("authorization")
        .map(|v| v.to_str().unwrap().to_string())
}

#[tokio::test]
async fn test_login_establishes_and_persists_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"email": "asha@example.in", "password": "hunter2"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"token": TEST_TOKEN, "user": profile_json()}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let storage = Arc::new(MemoryStore::new());
    let app = TestApp::new(&server, storage.clone());
    assert_eq!(app.session.state(), SessionState::Anonymous);

    let email = Email::parse(" Asha@Example.in ").unwrap();
    let user = app.api.login(email, "hunter2".to_string()).await.unwrap();

    assert_eq!(user, profile());
    assert_eq!(app.session.state(), SessionState::Authenticated);
    assert_eq!(app.session.token().unwrap().expose_secret(), TEST_TOKEN);
    assert_eq!(storage.get(keys::TOKEN).unwrap().as_deref(), Some(TEST_TOKEN));
    assert!(storage.get(keys::USER).unwrap().is_some());
}

#[tokio::test]
async fn test_login_tolerates_unrecognised_role() {
    let server = MockServer::start().await;
    let mut user = profile_json();
    user["role"] = json!("super_admin");
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": {"token": TEST_TOKEN, "user": user}})),
        )
        .mount(&server)
        .await;

    let app = TestApp::new(&server, Arc::new(MemoryStore::new()));
    let user = app
        .api
        .login(Email::parse("asha@example.in").unwrap(), "hunter2".to_string())
        .await
        .unwrap();

    assert_eq!(user.role, UserRole::Unknown);
    assert!(!user.role.is_staff());
    assert!(app.session.is_authenticated());
}

#[tokio::test]
async fn test_register_accepts_unwrapped_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({"token": TEST_TOKEN, "user": profile_json()})),
        )
        .mount(&server)
        .await;

    let app = TestApp::new(&server, Arc::new(MemoryStore::new()));
    let request = RegisterRequest {
        name: "Asha Rao".to_string(),
        email: Email::parse("asha@example.in").unwrap(),
        phone: None,
        password: "hunter2".to_string(),
    };

    let user = app.api.register(request).await.unwrap();
    assert_eq!(user.name, "Asha Rao");
    assert!(app.session.is_authenticated());
}

#[tokio::test]
async fn test_rejected_login_keeps_session_anonymous() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"message": "Invalid credentials"})),
        )
        .mount(&server)
        .await;

    let app = TestApp::new(&server, Arc::new(MemoryStore::new()));
    let err = app
        .api
        .login(Email::parse("asha@example.in").unwrap(), "wrong".to_string())
        .await
        .unwrap_err();

    assert!(matches!(
        &err,
        ApiError::Status { status: 400, message } if message == "Invalid credentials"
    ));
    assert_eq!(err.user_message(), "Invalid credentials");
    assert!(!app.session.is_authenticated());
}

#[tokio::test]
async fn test_bearer_header_only_when_signed_in() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/addresses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(2)
        .mount(&server)
        .await;

    let app = TestApp::new(&server, Arc::new(MemoryStore::new()));
    app.api.list_addresses().await.unwrap();
    app.sign_in();
    app.api.list_addresses().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(authorization(&requests[0]), None);
    assert_eq!(
        authorization(&requests[1]),
        Some(format!("Bearer {TEST_TOKEN}"))
    );

    let ids: Vec<_> = requests
        .iter()
        .map(|r| r.headers.get("x-request-id").unwrap().clone())
        .collect();
    assert_ne!(ids[0], ids[1]);
}

#[tokio::test]
async fn test_unauthorized_clears_session_and_propagates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Token expired"})))
        .mount(&server)
        .await;

    let storage = Arc::new(MemoryStore::new());
    let app = TestApp::new(&server, storage.clone());
    app.sign_in();

    let err = app.api.me().await.unwrap_err();

    assert!(err.is_unauthorized());
    assert!(matches!(&err, ApiError::Unauthorized { message } if message == "Token expired"));
    assert_eq!(app.session.state(), SessionState::Anonymous);
    assert_eq!(storage.get(keys::TOKEN).unwrap(), None);
    assert_eq!(storage.get(keys::USER).unwrap(), None);
}

#[tokio::test]
async fn test_me_refreshes_cached_profile() {
    let server = MockServer::start().await;
    let mut updated = profile_json();
    updated["name"] = json!("Asha R.");
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": updated})))
        .mount(&server)
        .await;

    let app = TestApp::new(&server, Arc::new(MemoryStore::new()));
    app.sign_in();

    let user = app.api.me().await.unwrap();
    assert_eq!(user.name, "Asha R.");
    assert_eq!(app.session.user().unwrap().name, "Asha R.");
    assert_eq!(app.session.token().unwrap().expose_secret(), TEST_TOKEN);
}

#[tokio::test]
async fn test_logout_is_local() {
    let server = MockServer::start().await;
    let storage = Arc::new(MemoryStore::new());
    let app = TestApp::new(&server, storage.clone());
    app.sign_in();

    app.api.logout();

    assert!(!app.session.is_authenticated());
    assert!(storage.is_empty());
    assert!(server.received_requests().await.unwrap().is_empty());
}
