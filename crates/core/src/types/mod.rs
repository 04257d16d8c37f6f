//! Core types for Nepostore.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod price;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::{AmountOverflow, CurrencyCode, Price, line_amount, sum_amounts};
pub use status::*;
