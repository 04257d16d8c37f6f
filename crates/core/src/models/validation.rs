//! Form validation shared by the input types.

use rust_decimal::Decimal;
use thiserror::Error;

/// A rule broken by user input, checked before any API call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("{0} cannot be negative")]
    Negative(&'static str),
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("{field} {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ValidationError {
    /// Construct an [`ValidationError::Invalid`].
    #[must_use]
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }

    /// Name of the field that broke the rule.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::Required(field) | Self::Negative(field) => field,
            Self::TooLong { field, .. } | Self::Invalid { field, .. } => field,
        }
    }
}

/// Reject blank strings.
pub(crate) fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Required(field))
    } else {
        Ok(())
    }
}

/// Reject strings longer than `max` characters.
pub(crate) fn max_len(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        Err(ValidationError::TooLong { field, max })
    } else {
        Ok(())
    }
}

/// Reject negative amounts.
pub(crate) fn non_negative(field: &'static str, value: Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        Err(ValidationError::Negative(field))
    } else {
        Ok(())
    }
}

/// Reject values that are not `http(s)` URLs or site-relative paths.
pub(crate) fn link(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.starts_with('/') {
        return Ok(());
    }
    match url::Url::parse(value) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
        _ => Err(ValidationError::invalid(field, "must be an http(s) URL")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require() {
        assert_eq!(require("name", "  "), Err(ValidationError::Required("name")));
        assert!(require("name", "x").is_ok());
    }

    #[test]
    fn test_non_negative() {
        assert!(non_negative("price", Decimal::ZERO).is_ok());
        assert_eq!(
            non_negative("price", Decimal::new(-1, 0)),
            Err(ValidationError::Negative("price"))
        );
    }

    #[test]
    fn test_link() {
        assert!(link("url", "https://acme.com").is_ok());
        assert!(link("url", "/category/shoes").is_ok());
        assert!(link("url", "ftp://acme.com").is_err());
        assert!(link("url", "acme").is_err());
    }

    #[test]
    fn test_messages() {
        assert_eq!(ValidationError::Required("Name").to_string(), "Name is required");
        assert_eq!(
            ValidationError::invalid("Logo", "must be an http(s) URL").to_string(),
            "Logo must be an http(s) URL"
        );
    }
}
