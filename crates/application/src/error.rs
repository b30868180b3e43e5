//! Application error types

use curlew_domain::DomainError;
use thiserror::Error;

/// Application-level errors.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// A domain validation error occurred.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// A hierarchy change would break the collection forest.
    #[error("invalid hierarchy: {0}")]
    InvalidHierarchy(String),

    /// An import document could not be parsed or exceeds the configured limits.
    #[error("import format error: {0}")]
    ImportFormat(String),

    /// A store operation failed. The surrounding transaction was rolled back.
    #[error("store error: {0}")]
    Store(String),
}

impl ApplicationError {
    /// Builds a `NotFound` error for a collection id.
    #[must_use]
    pub fn collection_not_found(id: &str) -> Self {
        Self::NotFound(format!("collection {id}"))
    }

    /// Builds a `NotFound` error for a request id.
    #[must_use]
    pub fn request_not_found(id: i64) -> Self {
        Self::NotFound(format!("request {id}"))
    }
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
