//! Authenticated HandyHub REST client.
//!
//! # Pipeline
//!
//! Each call goes through the same steps:
//!
//! 1. Build the request (`Content-Type: application/json`)
//! 2. Run every [`Interceptor::before_request`] (request id, bearer token)
//! 3. Send; transport failures are returned as [`ApiError::Transport`]
//! 4. Run every [`Interceptor::after_response`] (401 clears the session)
//! 5. Map non-2xx statuses to errors, otherwise strip the `{ data }`
//!    envelope and decode
//!
//! Calls are independent: no retries, no queueing, no deduplication of
//! in-flight requests. Dropping a returned future aborts its request.
//!
//! # Example
//!
//! ```rust,ignore
//! let client = ApiClient::new(&config, session.clone())?;
//! client.login(email, "hunter2".into()).await?;
//! let addresses = client.list_addresses().await?;
//! ```

mod auth;
mod booking;
mod catalog;
mod envelope;
mod error;
mod interceptor;
mod types;

pub use catalog::filter_services;
pub use envelope::unwrap_envelope;
pub use error::ApiError;
pub use interceptor::{BearerAuth, Interceptor, LogoutOnUnauthorized, REQUEST_ID_HEADER, RequestId};
pub use types::*;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};
use url::Url;

use crate::config::ClientConfig;
use crate::session::SessionStore;

/// How long catalog responses are served from memory.
const CATALOG_TTL: Duration = Duration::from_secs(300);

/// Client for the HandyHub backend.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: Url,
    session: SessionStore,
    interceptors: Vec<Arc<dyn Interceptor>>,
    catalog_cache: Cache<String, Value>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("session", &self.inner.session)
            .field("interceptors", &self.inner.interceptors.len())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client with the standard pipeline: request id, bearer
    /// token, logout on 401.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ClientConfig, session: SessionStore) -> Result<Self, ApiError> {
        let interceptors: Vec<Arc<dyn Interceptor>> = vec![
            Arc::new(RequestId),
            Arc::new(BearerAuth::new(session.clone())),
            Arc::new(LogoutOnUnauthorized::new(session.clone())),
        ];
        Self::with_interceptors(config, session, interceptors)
    }

    /// Create a client with a custom interceptor chain, run in order.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn with_interceptors(
        config: &ClientConfig,
        session: SessionStore,
        interceptors: Vec<Arc<dyn Interceptor>>,
    ) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let catalog_cache = Cache::builder()
            .max_capacity(256)
            .time_to_live(CATALOG_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http: builder.build()?,
                base_url: config.api_url.clone(),
                session,
                interceptors,
                catalog_cache,
            }),
        })
    }

    /// The session this client authenticates with.
    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    /// Resolve `segments` below the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let value = self.execute(Method::GET, url, None).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_value(body)?;
        let value = self.execute(Method::POST, url, Some(body)).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// GET through the catalog cache.
    async fn get_cached<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let key = url.to_string();

        if let Some(value) = self.inner.catalog_cache.get(&key).await {
            debug!(url = %key, "Cache hit");
            return Ok(serde_json::from_value(value)?);
        }

        let value = self.execute(Method::GET, url, None).await?;
        let decoded = serde_json::from_value(value.clone())?;
        self.inner.catalog_cache.insert(key, value).await;
        Ok(decoded)
    }

    /// Drop every cached catalog response.
    pub async fn invalidate_catalog(&self) {
        self.inner.catalog_cache.invalidate_all();
        self.inner.catalog_cache.run_pending_tasks().await;
    }

    /// Run one request through the pipeline and return the unwrapped payload.
    async fn execute(
        &self,
        method: Method,
        url: Url,
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        let mut builder = self
            .inner
            .http
            .request(method.clone(), url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(body) = body {
            builder = builder.json(&body);
        }

        let mut request = builder.build()?;
        for interceptor in &self.inner.interceptors {
            interceptor.before_request(&mut request);
        }
        let path = request.url().path().to_string();

        let response = self.inner.http.execute(request).await.map_err(|e| {
            error!(error = %e, method = %method, path = %path, "Request failed");
            ApiError::Transport(e)
        })?;

        let status = response.status();
        for interceptor in &self.inner.interceptors {
            interceptor.after_response(status);
        }

        let text = response.text().await?;
        debug!(method = %method, path = %path, status = %status, "Response received");

        if !status.is_success() {
            let mut message = envelope::error_message(&text);
            if message.is_empty() {
                message = status.canonical_reason().unwrap_or("").to_string();
            }

            return Err(if status == StatusCode::UNAUTHORIZED {
                ApiError::Unauthorized { message }
            } else {
                ApiError::Status {
                    status: status.as_u16(),
                    message,
                }
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        let body: Value = serde_json::from_str(&text).map_err(|e| {
            error!(
                error = %e,
                path = %path,
                body = %text.chars().take(500).collect::<String>(),
                "Failed to parse response body"
            );
            ApiError::Decode(e)
        })?;

        Ok(unwrap_envelope(body))
    }
}
