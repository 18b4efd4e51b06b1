//! # AppError
//!
//! Centralized error handling for the ladle ecosystem.
//! Maps domain-specific failures to actionable error types; the API crate
//! translates each variant into an HTTP status and `{message}` body.

use thiserror::Error;

/// The primary error type for all ladle-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (e.g., Recipe, Review, User)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// Validation failure (missing fields, out-of-range rating)
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Missing or invalid credential
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Valid credential lacking the required role or ownership
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Uniqueness or state violation (duplicate title, duplicate review,
    /// duplicate pending request)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Infrastructure failure (e.g., DB down)
    #[error("internal service error: {0}")]
    Internal(String),
}

/// A specialized Result type for ladle logic.
pub type Result<T> = std::result::Result<T, AppError>;
