//! Client-side authentication session.
//!
//! A session is the `(token, user)` pair returned by login or registration.
//! [`SessionStore`] keeps it as a single `Option<AuthSession>`, so a token
//! without a user (or the reverse) cannot be represented. The pair is
//! persisted under [`keys::TOKEN`] and [`keys::USER`].
//!
//! # Lifecycle
//!
//! ```text
//! Anonymous --establish()--> Authenticated
//! Authenticated --clear()--> Anonymous   (explicit logout or any 401)
//! ```

use std::sync::{Arc, PoisonError, RwLock};

use handyhub_core::UserProfile;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{info, warn};

use crate::storage::{KeyValueStore, StorageError, keys};

/// Body returned by the login and register endpoints.
#[derive(Deserialize)]
#[serde(from = "AuthResponseWire")]
pub struct AuthResponse {
    pub token: SecretString,
    pub user: UserProfile,
}

#[derive(Deserialize)]
struct AuthResponseWire {
    token: String,
    user: UserProfile,
}

impl From<AuthResponseWire> for AuthResponse {
    fn from(wire: AuthResponseWire) -> Self {
        Self {
            token: SecretString::from(wire.token),
            user: wire.user,
        }
    }
}

impl std::fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthResponse")
            .field("token", &"[REDACTED]")
            .field("user", &self.user)
            .finish()
    }
}

/// An authenticated session.
#[derive(Clone)]
pub struct AuthSession {
    token: SecretString,
    user: UserProfile,
}

impl AuthSession {
    #[must_use]
    pub const fn token(&self) -> &SecretString {
        &self.token
    }

    #[must_use]
    pub const fn user(&self) -> &UserProfile {
        &self.user
    }
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("token", &"[REDACTED]")
            .field("user", &self.user)
            .finish()
    }
}

impl From<AuthResponse> for AuthSession {
    fn from(response: AuthResponse) -> Self {
        Self {
            token: response.token,
            user: response.user,
        }
    }
}

/// Coarse session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated,
}

/// Shared session handle.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionStoreInner>,
}

struct SessionStoreInner {
    session: RwLock<Option<AuthSession>>,
    storage: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Rehydrate the session persisted in `storage`.
    ///
    /// Only a complete, parseable token/user pair is restored. Anything else
    /// is wiped from storage so the next start is anonymous too.
    #[must_use]
    pub fn open(storage: Arc<dyn KeyValueStore>) -> Self {
        let session = match Self::load(storage.as_ref()) {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "Discarding unreadable persisted session");
                None
            }
        };

        if session.is_none() {
            Self::wipe(storage.as_ref());
        }

        Self {
            inner: Arc::new(SessionStoreInner {
                session: RwLock::new(session),
                storage,
            }),
        }
    }

    fn load(storage: &dyn KeyValueStore) -> Result<Option<AuthSession>, StorageError> {
        let (Some(token), Some(user)) = (storage.get(keys::TOKEN)?, storage.get(keys::USER)?)
        else {
            return Ok(None);
        };

        if token.is_empty() {
            return Ok(None);
        }

        let user: UserProfile = serde_json::from_str(&user)?;
        Ok(Some(AuthSession {
            token: SecretString::from(token),
            user,
        }))
    }

    fn wipe(storage: &dyn KeyValueStore) {
        for key in [keys::TOKEN, keys::USER] {
            if let Err(e) = storage.remove(key) {
                warn!(error = %e, key, "Failed to remove persisted session key");
            }
        }
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Option<AuthSession>> {
        self.inner
            .session
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Option<AuthSession>> {
        self.inner
            .session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Enter the authenticated state with a fresh token and profile.
    pub fn establish(&self, response: AuthResponse) {
        let session = AuthSession::from(response);
        let mut guard = self.write();

        let user = serde_json::to_string(&session.user).map_err(StorageError::from);
        let persisted = user.and_then(|user| {
            self.inner
                .storage
                .set(keys::TOKEN, session.token.expose_secret())?;
            self.inner.storage.set(keys::USER, &user)
        });
        if let Err(e) = persisted {
            warn!(error = %e, "Failed to persist session; next start will be anonymous");
            Self::wipe(self.inner.storage.as_ref());
        }

        info!(user_id = %session.user.id, role = %session.user.role, "Session established");
        *guard = Some(session);
    }

    /// Replace the cached profile, keeping the current token.
    ///
    /// Ignored when anonymous.
    pub fn refresh_user(&self, user: UserProfile) {
        let mut guard = self.write();
        let Some(session) = guard.as_mut() else {
            return;
        };

        match serde_json::to_string(&user) {
            Ok(raw) => {
                if let Err(e) = self.inner.storage.set(keys::USER, &raw) {
                    warn!(error = %e, "Failed to persist refreshed profile");
                }
            }
            Err(e) => warn!(error = %e, "Failed to serialize refreshed profile"),
        }
        session.user = user;
    }

    /// Return to the anonymous state. Clearing an anonymous session is a no-op.
    pub fn clear(&self) {
        let mut guard = self.write();
        if guard.take().is_some() {
            info!("Session cleared");
        }
        Self::wipe(self.inner.storage.as_ref());
    }

    /// Current bearer token, if authenticated.
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.read().as_ref().map(|s| s.token.clone())
    }

    /// Current profile, if authenticated.
    #[must_use]
    pub fn user(&self) -> Option<UserProfile> {
        self.read().as_ref().map(|s| s.user.clone())
    }

    /// Current session, if authenticated.
    #[must_use]
    pub fn current(&self) -> Option<AuthSession> {
        self.read().clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.read().is_some()
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        if self.is_authenticated() {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        }
    }
}
