//! Request pipeline hooks.
//!
//! Every request passes through each [`Interceptor`] in order just before it
//! is sent, and every received response status is shown to each interceptor
//! before the body is decoded. Transport failures never reach
//! `after_response`.

use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Request, StatusCode};
use secrecy::ExposeSecret;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::session::SessionStore;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// A cross-cutting hook around every API call.
pub trait Interceptor: Send + Sync {
    /// Inspect or amend the outgoing request.
    fn before_request(&self, _request: &mut Request) {}

    /// Observe the response status. Must not swallow failures.
    fn after_response(&self, _status: StatusCode) {}
}

/// Attaches `Authorization: Bearer <token>` when a session exists.
///
/// The token is read at send time, so a login or logout between building
/// the client and sending a request is always honoured.
#[derive(Debug, Clone)]
pub struct BearerAuth {
    session: SessionStore,
}

impl BearerAuth {
    #[must_use]
    pub const fn new(session: SessionStore) -> Self {
        Self { session }
    }
}

impl Interceptor for BearerAuth {
    fn before_request(&self, request: &mut Request) {
        let Some(token) = self.session.token() else {
            return;
        };

        match HeaderValue::from_str(&format!("Bearer {}", token.expose_secret())) {
            Ok(mut value) => {
                value.set_sensitive(true);
                request.headers_mut().insert(AUTHORIZATION, value);
            }
            Err(_) => warn!("Session token is not a valid header value; sending unauthenticated"),
        }
    }
}

/// Clears the session when the backend answers 401.
#[derive(Debug, Clone)]
pub struct LogoutOnUnauthorized {
    session: SessionStore,
}

impl LogoutOnUnauthorized {
    #[must_use]
    pub const fn new(session: SessionStore) -> Self {
        Self { session }
    }
}

impl Interceptor for LogoutOnUnauthorized {
    fn after_response(&self, status: StatusCode) {
        if status == StatusCode::UNAUTHORIZED && self.session.is_authenticated() {
            warn!("Backend returned 401; logging out");
            self.session.clear();
        }
    }
}

/// Tags each request with a fresh UUID v4 `x-request-id`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestId;

impl Interceptor for RequestId {
    fn before_request(&self, request: &mut Request) {
        let request_id = Uuid::new_v4().to_string();
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            debug!(request_id = %request_id, url = %request.url(), "Sending request");
            request.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
    }
}
