//! Validation error types

use thiserror::Error;

/// Validation error for domain models
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    /// Field is empty when it shouldn't be
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// Field exceeds maximum length
    #[error("{field} exceeds maximum length of {max} characters")]
    TooLong { field: &'static str, max: usize },

    /// String doesn't match required format (e.g., slug)
    #[error("{field}: {reason}")]
    InvalidFormat { field: &'static str, reason: &'static str },
}
