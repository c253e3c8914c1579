//! HandyHub client core.
//!
//! The pieces of the customer and operations apps that carry real
//! contracts, independent of any UI:
//!
//! - [`cart`] - Persistent shopping cart with merge-on-add and derived totals
//! - [`session`] - Token/profile session with atomic set and clear
//! - [`api`] - REST client with bearer attach, logout-on-401 and envelope
//!   unwrapping
//! - [`checkout`] - Local validation and order placement from the cart
//! - [`storage`] - Key-value persistence port with memory and file backends
//! - [`config`] - Environment configuration
//!
//! # Wiring
//!
//! ```rust,ignore
//! let config = ClientConfig::from_env()?;
//! let storage: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&config.state_path)?);
//!
//! let session = SessionStore::open(storage.clone());
//! let cart = CartStore::open(storage);
//! let api = ApiClient::new(&config, session)?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod session;
pub mod storage;

pub use api::{ApiClient, ApiError};
pub use cart::{CartItem, CartState, CartStore};
pub use checkout::{CheckoutDetails, CheckoutError, OrderRequest, ValidationError, place_cart_order};
pub use config::{ClientConfig, ConfigError};
pub use session::{AuthResponse, AuthSession, SessionState, SessionStore};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
