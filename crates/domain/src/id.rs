//! ID generation utilities.

use uuid::Uuid;

use crate::error::{DomainError, DomainResult};

/// Generates a new collection identifier.
///
/// Identifiers are UUID v7 strings, so freshly created collections sort
/// after older ones when compared lexically.
#[must_use]
pub fn generate_id() -> String {
    Uuid::now_v7().to_string()
}

/// Validates an identifier received from the shell.
///
/// Identifiers are opaque, so the only requirement is that they are not blank.
///
/// # Errors
///
/// Returns [`DomainError::InvalidIdentifier`] for empty or whitespace-only input.
pub fn validate_id(id: &str) -> DomainResult<&str> {
    if id.trim().is_empty() {
        return Err(DomainError::InvalidIdentifier(id.to_string()));
    }
    Ok(id)
}
