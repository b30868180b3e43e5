//! Domain error types

use thiserror::Error;

use crate::request::RequestId;

/// Domain-level errors that can occur during validation or processing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An identifier is invalid or empty.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// A reposition was requested for a request outside the loaded scope.
    #[error("request {0} is not part of the scope being reordered")]
    RequestNotInScope(RequestId),

    /// A reposition was requested before the scope was normalized.
    #[error("request {0} has no sort position")]
    UnpositionedRequest(RequestId),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
