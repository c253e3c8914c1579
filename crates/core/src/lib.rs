//! HandyHub Core - Shared domain types.
//!
//! This crate provides the types shared by every HandyHub client component:
//! - `client` - Cart store, session store and authenticated API client
//! - `cli` - Command-line front end for customers and operators
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, emails and roles, plus the
//!   catalog and profile descriptors exchanged with the backend

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
