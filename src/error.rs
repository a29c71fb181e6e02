//! Error types.
//!
//! | Type           | Raised when                                             |
//! |----------------|---------------------------------------------------------|
//! | `ConfigError`  | hierarchy wiring, predicates, formatters, config files  |
//! | `AddressError` | building or walking addresses                           |
//! | `LocateError`  | parsing references and extracting leaf text             |
//!
//! Content provider failures live next to the provider trait
//! ([`ContentError`](crate::content::ContentError)).

use std::path::PathBuf;

use thiserror::Error;

use crate::content::ContentError;

// ============================================================================
// ConfigError
// ============================================================================

/// Setup-time errors. Never expected once the hierarchy is bootstrapped.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("`{0}` is not a level of this hierarchy")]
    UnknownLevel(String),

    #[error("level `{0}` is declared twice")]
    DuplicateLevel(String),

    #[error("invalid level wiring: {0}")]
    Wiring(String),

    #[error("invalid identifier predicate for `{level}`: {message}")]
    Predicate { level: String, message: String },

    #[error("invalid url format for `{level}`: {message}")]
    UrlFormat { level: String, message: String },

    #[error("invalid reference grammar: {0}")]
    Grammar(String),

    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("config file parsing error")]
    Toml(#[from] toml::de::Error),
}

impl ConfigError {
    pub(crate) fn predicate(level: &str, message: impl Into<String>) -> Self {
        Self::Predicate {
            level: level.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn url_format(level: &str, message: impl Into<String>) -> Self {
        Self::UrlFormat {
            level: level.to_string(),
            message: message.into(),
        }
    }
}

// ============================================================================
// AddressError
// ============================================================================

/// Errors raised while constructing or descending addresses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// Parent/child mismatch, descent past the leaf, or text requested off-leaf.
    #[error("{0}")]
    InvalidHierarchy(String),

    /// Identifier rejected by its level's policy or impossible to coerce.
    #[error("{0}")]
    InvalidIdentifier(String),
}

impl AddressError {
    pub const fn is_invalid_hierarchy(&self) -> bool {
        matches!(self, Self::InvalidHierarchy(_))
    }

    pub const fn is_invalid_identifier(&self) -> bool {
        matches!(self, Self::InvalidIdentifier(_))
    }
}

// ============================================================================
// LocateError
// ============================================================================

/// Errors surfaced by [`Locator`](crate::locator::Locator).
#[derive(Debug, Error)]
pub enum LocateError {
    /// The raw reference does not match the grammar (or, under
    /// [`ErrorPolicy::Normalize`](crate::locator::ErrorPolicy), any inner
    /// hierarchy/identifier failure).
    #[error("reference `{reference}` is invalid: {reason}")]
    InvalidReference { reference: String, reason: String },

    #[error(transparent)]
    Address(#[from] AddressError),

    #[error(transparent)]
    Content(#[from] ContentError),
}

impl LocateError {
    pub(crate) fn invalid_reference(reference: &str, reason: impl Into<String>) -> Self {
        Self::InvalidReference {
            reference: reference.to_string(),
            reason: reason.into(),
        }
    }

    pub const fn is_invalid_reference(&self) -> bool {
        matches!(self, Self::InvalidReference { .. })
    }

    pub fn as_address_error(&self) -> Option<&AddressError> {
        match self {
            Self::Address(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_config_error_display() {
        let io_err = ConfigError::Io(
            PathBuf::from("holotheca.toml"),
            Error::new(ErrorKind::NotFound, "file not found"),
        );
        let display = format!("{io_err}");
        assert!(display.contains("IO error"));
        assert!(display.contains("holotheca.toml"));

        let err = ConfigError::predicate("wall", "range is empty");
        assert_eq!(
            err.to_string(),
            "invalid identifier predicate for `wall`: range is empty"
        );
    }

    #[test]
    fn test_locate_error_kinds() {
        let err = LocateError::invalid_reference("2abz0/2", "does not match grammar");
        assert!(err.is_invalid_reference());
        assert!(err.as_address_error().is_none());

        let err: LocateError = AddressError::InvalidIdentifier("wall 8".into()).into();
        assert!(!err.is_invalid_reference());
        assert!(err.as_address_error().unwrap().is_invalid_identifier());
        assert_eq!(err.to_string(), "wall 8");
    }
}
