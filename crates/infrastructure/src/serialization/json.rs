//! JSON serialization helpers for deterministic output.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use serde_json::ser::{PrettyFormatter, Serializer};

/// Error type for serialization operations.
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    /// JSON serialization failed.
    #[error("JSON serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// JSON deserialization failed.
    #[error("JSON deserialization failed: {0}")]
    Deserialize(serde_json::Error),

    /// UTF-8 encoding error.
    #[error("UTF-8 encoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Serializes a value to deterministic JSON.
///
/// Output format:
/// - 2-space indentation
/// - Trailing newline
/// - Keys sorted alphabetically (requires `BTreeMap` or `Value` in source types)
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json_stable<T: Serialize>(value: &T) -> Result<String, SerializationError> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"  ");
    let mut serializer = Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;

    let mut json = String::from_utf8(buffer)?;
    json.push('\n'); // Trailing newline
    Ok(json)
}

/// Serializes an opaque JSON payload to compact text with sorted keys.
///
/// `None` and JSON `null` both become an empty string, which the store
/// persists as `NULL`.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_canonical_json(value: Option<&Value>) -> Result<String, SerializationError> {
    match value {
        None | Some(Value::Null) => Ok(String::new()),
        Some(value) => Ok(serde_json::to_string(value)?),
    }
}

/// Deserializes JSON from a string.
///
/// Handles both pretty-printed and minified JSON.
///
/// # Errors
///
/// Returns an error if the JSON is invalid or doesn't match the expected type.
pub fn from_json<T: DeserializeOwned>(json: &str) -> Result<T, SerializationError> {
    serde_json::from_str(json).map_err(SerializationError::Deserialize)
}

/// Parses JSON without deserializing to a specific type.
///
/// Useful for format detection before attempting typed deserialization.
///
/// # Errors
///
/// Returns an error if the JSON is invalid.
pub fn parse_value(json: &str) -> Result<Value, SerializationError> {
    serde_json::from_str(json).map_err(SerializationError::Deserialize)
}
