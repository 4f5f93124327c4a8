//! # AppError
//!
//! Centralized error handling for the askforge ecosystem.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

/// The primary error type for all domain operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Referenced entity absent (e.g., Post, Answer, Comment)
    #[error("{0} not found with ID {1}")]
    NotFound(&'static str, String),

    /// A comment parent pointing at a nonexistent entity, or a parent
    /// designation that is not exactly one of post/answer
    #[error("invalid reference: {0}")]
    InvalidReference(String),

    /// Field constraint violated (content length, enum membership,
    /// vote direction)
    #[error("validation error: {0}")]
    Validation(String),

    /// Credential could not be resolved to a caller identity
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Requester is not the authorized actor for a mutation
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Concurrent modification detected (lost update on a versioned write)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Transient backing-store failure; the only retryable class
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Infrastructure failure that is neither the caller's fault nor
    /// retryable (e.g. an undecodable stored record)
    #[error("internal service error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether a caller may retry the failed operation idempotently.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::StoreUnavailable(_))
    }
}

/// A specialized Result type for askforge logic.
pub type Result<T> = std::result::Result<T, AppError>;
