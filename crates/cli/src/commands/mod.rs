//! CLI command implementations.

pub mod bulk;
pub mod inspect;
