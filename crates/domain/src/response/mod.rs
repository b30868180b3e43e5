//! Execution records.

use serde::{Deserialize, Serialize};

use crate::request::RequestId;

/// Immutable record of one request execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    /// Store-assigned identifier.
    pub id: i64,
    /// HTTP status code.
    pub status_code: i64,
    /// Encoded response headers.
    pub headers: String,
    /// Response body.
    pub body: String,
    /// Wall-clock time of the round trip, in milliseconds.
    #[serde(rename = "runtimeMS")]
    pub runtime_ms: i64,
    /// Request this response belongs to.
    #[serde(rename = "requestID")]
    pub request_id: RequestId,
}

/// Response data to append to a request's history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResponseRecord {
    /// HTTP status code.
    pub status_code: i64,
    /// Encoded response headers.
    pub headers: String,
    /// Response body.
    pub body: String,
    /// Round-trip time in milliseconds.
    #[serde(rename = "runtimeMS")]
    pub runtime_ms: i64,
}
