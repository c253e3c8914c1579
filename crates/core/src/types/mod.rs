//! Core types for HandyHub.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod catalog;
pub mod email;
pub mod id;
pub mod price;
pub mod profile;
pub mod role;

pub use catalog::{CategorySummary, ServiceSummary};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{CurrencyCode, Price};
pub use profile::UserProfile;
pub use role::{UserRole, UserRoleParseError};
