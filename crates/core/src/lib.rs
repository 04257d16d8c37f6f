//! Nepostore Core - shared types for the storefront platform.
//!
//! This crate holds everything that can be decided without I/O:
//!
//! - [`tenant`] - hostname parsing and mode classification
//! - [`routing`] - per-mode route tables and path matching
//! - [`models`] - API payloads and form validation
//! - [`listing`] - search, sort and pagination for list screens
//! - [`bulk`] - the bulk product CSV format
//! - [`store`] - persisted keys, versioned envelopes and change events
//! - [`visitor`] - cart, wishlist and recently viewed
//! - [`types`] - ids, prices, emails and status enums
//!
//! The server and CLI build on these; neither re-implements any of it.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod bulk;
pub mod listing;
pub mod models;
pub mod routing;
pub mod store;
pub mod tenant;
pub mod types;
pub mod visitor;

pub use types::*;
