//! Shared primitives for all Rust crates in Ecclesia.

#![forbid(unsafe_code)]

/// Authentication primitives shared across services.
pub mod auth;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use auth::UserIdentity;

/// Result type used across Ecclesia crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Creates a validated non-empty string, naming the field in the error.
    pub fn for_field(field_name: &str, value: impl Into<String>) -> AppResult<Self> {
        Self::new(value)
            .map_err(|_| AppError::Validation(format!("{field_name} must not be empty")))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// User is not authenticated.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// User is authenticated but blocked by access policy.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Stored entity type tag is not one this build knows how to handle.
    #[error("unknown entity type: {0}")]
    UnknownEntityType(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}
