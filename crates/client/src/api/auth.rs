//! Login, registration and profile endpoints.

use handyhub_core::{Email, UserProfile};
use tracing::{info, instrument};

use super::types::{LoginRequest, RegisterRequest};
use super::{ApiClient, ApiError};
use crate::session::AuthResponse;

impl ApiClient {
    /// Log in and establish the session.
    ///
    /// # Errors
    ///
    /// Returns error if the credentials are rejected or the request fails.
    /// The session is left untouched on failure.
    #[instrument(skip(self, email, password), fields(email = %email))]
    pub async fn login(&self, email: Email, password: String) -> Result<UserProfile, ApiError> {
        let url = self.endpoint(&["auth", "login"])?;
        let response: AuthResponse = self.post(url, &LoginRequest { email, password }).await?;

        let user = response.user.clone();
        self.session().establish(response);
        Ok(user)
    }

    /// Create an account and establish the session.
    ///
    /// # Errors
    ///
    /// Returns error if the backend rejects the registration or the request
    /// fails.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: RegisterRequest) -> Result<UserProfile, ApiError> {
        let url = self.endpoint(&["auth", "register"])?;
        let response: AuthResponse = self.post(url, &request).await?;

        let user = response.user.clone();
        self.session().establish(response);
        Ok(user)
    }

    /// Drop the local session. No request is made.
    pub fn logout(&self) {
        info!("Logging out");
        self.session().clear();
    }

    /// Fetch the signed-in profile and refresh the cached copy.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails; a 401 also clears the session.
    #[instrument(skip(self))]
    pub async fn me(&self) -> Result<UserProfile, ApiError> {
        let url = self.endpoint(&["auth", "me"])?;
        let user: UserProfile = self.get(url).await?;
        self.session().refresh_user(user.clone());
        Ok(user)
    }
}
