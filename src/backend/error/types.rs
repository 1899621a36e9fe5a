/**
 * Backend Error Types
 *
 * This module defines the failure taxonomy of the course store. Every
 * operation returns one of these, and the HTTP layer maps it to a status.
 *
 * # Error Categories
 *
 * ## Not Found
 *
 * A referenced course, module, lesson or block does not exist. Not retried.
 *
 * ## Invalid Input
 *
 * Malformed identifiers, empty or duplicate reorder lists, reorder lists
 * that do not match the parent's current children, malformed block
 * payloads. Raised inside a transaction, it rolls the transaction back
 * before anything is written.
 *
 * ## Store Failures
 *
 * Errors from the underlying store (connectivity, constraint violations).
 * The transaction is rolled back and the whole operation may be retried.
 *
 * ## Invariant Violations
 *
 * A pre-commit check found sibling positions that are not `0..n-1`. The
 * transaction is rolled back. Replaying it will not help.
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::shared::SharedError;

/// Backend-specific error types
///
/// # Usage
///
/// ```rust
/// use syllabus::backend::error::BackendError;
///
/// let err = BackendError::not_found("Course");
/// assert_eq!(err.message(), "Course not found");
///
/// let err = BackendError::invalid_input("moduleIds must be unique");
/// assert!(!err.is_retryable());
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// Referenced entity does not exist
    #[error("{entity} not found")]
    NotFound {
        /// Entity kind, e.g. `"Lesson"`
        entity: &'static str,
    },

    /// Request data failed a shape or membership check
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Human-readable error message
        message: String,
    },

    /// No store is configured for this process
    #[error("Service unavailable: {message}")]
    Unavailable {
        /// Human-readable error message
        message: String,
    },

    /// A write would have left the ordering broken
    #[error("Invariant violation: {message}")]
    InvariantViolation {
        /// Which parent and collection failed the check
        message: String,
    },

    /// The transactional store reported an error
    #[error("Store error: {0}")]
    Store(#[from] sqlx::Error),

    /// Shared error (from shared parsing code)
    #[error(transparent)]
    SharedError(#[from] SharedError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result alias used across the backend
pub type BackendResult<T> = Result<T, BackendError>;

impl BackendError {
    pub fn not_found(entity: &'static str) -> Self {
        Self::NotFound { entity }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// The error handlers return when no store is configured
    pub fn database_not_configured() -> Self {
        Self::Unavailable {
            message: "Database is not configured".to_string(),
        }
    }

    /// Get the HTTP status code for this error
    ///
    /// # Status Code Mapping
    ///
    /// - `NotFound` - 404 Not Found
    /// - `InvalidInput` - 400 Bad Request
    /// - `Unavailable` - 503 Service Unavailable
    /// - `InvariantViolation` - 500 Internal Server Error
    /// - `Store` - 500 Internal Server Error
    /// - `SharedError` - 400 for validation, 500 for serialization
    /// - `SerializationError` - 500 Internal Server Error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            Self::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::InvariantViolation { .. } | Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::SharedError(err) => match err {
                SharedError::ValidationError { .. } => StatusCode::BAD_REQUEST,
                SharedError::SerializationError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::SerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. Store and serialization details stay in the
    /// logs.
    pub fn message(&self) -> String {
        match self {
            Self::NotFound { entity } => format!("{entity} not found"),
            Self::InvalidInput { message } => message.clone(),
            Self::Unavailable { message } => message.clone(),
            Self::InvariantViolation { .. } => "Ordering could not be preserved".to_string(),
            Self::Store(_) => "Database operation failed".to_string(),
            Self::SharedError(err @ SharedError::ValidationError { .. }) => err.to_string(),
            Self::SharedError(_) | Self::SerializationError(_) => {
                "Failed to encode content".to_string()
            }
        }
    }

    /// Whether replaying the whole operation may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store(_))
    }
}
