//! Integration tests for the HandyHub client.
//!
//! Every test runs the real [`ApiClient`] pipeline against a `wiremock`
//! backend, so no network access or credentials are needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p handyhub-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `auth_session` - Login, bearer header, 401 logout
//! - `catalog` - Envelope decoding, catalog cache, slots and addresses
//! - `checkout` - Order body shapes and cart clearing
//! - `persistence` - Restart against a state file
//! - `transport` - Timeouts and unreachable backends

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use std::sync::Arc;

use handyhub_client::{
    ApiClient, AuthResponse, CartStore, ClientConfig, KeyValueStore, SessionStore,
};
use handyhub_core::{CategorySummary, Email, ServiceSummary, UserProfile, UserRole};
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::{Value, json};
use wiremock::MockServer;

/// Token handed out by the mock backend.
pub const TEST_TOKEN: &str = "tok_test_123";

/// Cart, session and client sharing one storage backend.
pub struct TestApp {
    pub cart: CartStore,
    pub session: SessionStore,
    pub api: ApiClient,
}

impl TestApp {
    /// Wire up the stores and a client pointed at `server`'s `/api` prefix.
    pub fn new(server: &MockServer, storage: Arc<dyn KeyValueStore>) -> Self {
        let config = ClientConfig::for_api_url(&format!("{}/api", server.uri()))
            .expect("mock server URI is a valid base URL");
        Self::with_config(&config, storage)
    }

    /// Wire up the stores and a client built from an explicit configuration.
    pub fn with_config(config: &ClientConfig, storage: Arc<dyn KeyValueStore>) -> Self {
        let session = SessionStore::open(storage.clone());
        let cart = CartStore::open(storage);
        let api = ApiClient::new(config, session.clone()).expect("Failed to build API client");

        Self { cart, session, api }
    }

    /// Sign in without going through the login endpoint.
    pub fn sign_in(&self) {
        self.session.establish(AuthResponse {
            token: SecretString::from(TEST_TOKEN.to_string()),
            user: profile(),
        });
    }
}

/// The customer every test signs in as.
#[must_use]
pub fn profile() -> UserProfile {
    UserProfile {
        id: "user1".into(),
        name: "Asha Rao".to_string(),
        email: Email::parse("asha@example.in").expect("valid email"),
        phone: Some("9800000000".to_string()),
        role: UserRole::Customer,
    }
}

/// `profile()` as the backend serializes it.
#[must_use]
pub fn profile_json() -> Value {
    json!({
        "_id": "user1",
        "name": "Asha Rao",
        "email": "asha@example.in",
        "phone": "9800000000",
        "role": "customer"
    })
}

/// A priced plumbing service.
#[must_use]
pub fn service(id: &str, price: i64) -> ServiceSummary {
    ServiceSummary::new(id, format!("Service {id}"), Some(Decimal::from(price)))
}

/// The plumbing category.
#[must_use]
pub fn plumbing() -> CategorySummary {
    CategorySummary::new("cat1", "Plumbing")
}
