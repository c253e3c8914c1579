//! Command implementations.
//!
//! Every command receives an [`App`] holding the cart, the session and an
//! API client that share one storage backend.

pub mod auth;
pub mod booking;
pub mod cart;
pub mod catalog;

use std::sync::Arc;

use handyhub_client::{
    ApiClient, ApiError, CartStore, CheckoutError, ClientConfig, FileStore, KeyValueStore,
    MemoryStore, SessionStore, StorageError,
};
use handyhub_core::EmailError;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// State file could not be opened.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Backend call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Checkout was rejected locally or by the backend.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Email argument is malformed.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// A referenced catalog entry or address does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The command needs a signed-in session.
    #[error("Not logged in")]
    NotLoggedIn,
}

impl CommandError {
    /// Message shown to the person at the terminal.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(e) => e.user_message(),
            Self::Checkout(e) => e.user_message(),
            Self::NotLoggedIn => "You are not logged in. Run `hh login` first.".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Process-wide client state.
pub struct App {
    pub cart: CartStore,
    pub session: SessionStore,
    pub api: ApiClient,
}

impl App {
    /// Open the persisted state at `config.state_path`.
    ///
    /// # Errors
    ///
    /// Returns error if the state file is unreadable or the HTTP client
    /// cannot be built.
    pub fn open(config: &ClientConfig) -> Result<Self, CommandError> {
        let store = FileStore::open(&config.state_path)?;
        debug!(path = %store.path().display(), "Using state file");
        Self::with_storage(config, Arc::new(store))
    }

    /// Start with empty in-memory state.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn ephemeral(config: &ClientConfig) -> Result<Self, CommandError> {
        Self::with_storage(config, Arc::new(MemoryStore::new()))
    }

    fn with_storage(
        config: &ClientConfig,
        storage: Arc<dyn KeyValueStore>,
    ) -> Result<Self, CommandError> {
        let session = SessionStore::open(storage.clone());
        let cart = CartStore::open(storage);
        let api = ApiClient::new(config, session.clone())?;

        Ok(Self { cart, session, api })
    }

    /// Fail early for commands that only make sense when signed in.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::NotLoggedIn`] when anonymous.
    pub fn require_session(&self) -> Result<(), CommandError> {
        if self.session.is_authenticated() {
            Ok(())
        } else {
            Err(CommandError::NotLoggedIn)
        }
    }
}
