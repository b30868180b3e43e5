//! Saved request types.
//!
//! Header, body and auth payloads are opaque text to the engine: the shell
//! edits them and the importer writes them as canonical JSON.

use serde::{Deserialize, Serialize};

use crate::collection::CollectionId;
use crate::response::Response;

/// Sequential request identifier assigned by the store.
pub type RequestId = i64;

/// Full request record, as shown in the editor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// Store-assigned identifier.
    pub id: RequestId,
    /// Owning collection, `None` when unfiled.
    pub collection_id: Option<CollectionId>,
    /// Name of the owning collection, when it still exists.
    #[serde(default)]
    pub collection_name: Option<String>,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// HTTP method.
    pub method: String,
    /// Target URL, possibly containing variables.
    pub url: String,
    /// Encoded headers.
    pub headers: String,
    /// Encoded body.
    pub body: String,
    /// Body kind (`none`, `raw`, `graphql`, ...).
    pub body_type: String,
    /// Body syntax for raw bodies (`JSON`, `XML`, ...).
    pub body_format: String,
    /// Encoded auth configuration.
    pub auth: String,
    /// Position within the owning scope.
    pub sort_order: Option<i64>,
    /// Latest recorded response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Response>,
}

/// Lightweight request row for sidebar listings and search results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestSummary {
    /// Store-assigned identifier.
    pub id: RequestId,
    /// Owning collection, `None` when unfiled.
    pub collection_id: Option<CollectionId>,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// HTTP method.
    pub method: String,
    /// Target URL.
    pub url: String,
    /// Position within the owning scope.
    pub sort_order: Option<i64>,
}

impl RequestSummary {
    /// Key used to order requests inside one scope: positioned before
    /// unpositioned, then by position, then by id.
    #[must_use]
    pub const fn sort_key(&self) -> (bool, Option<i64>, RequestId) {
        (self.sort_order.is_none(), self.sort_order, self.id)
    }
}

/// Editable request fields sent by the shell on save or update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestDraft {
    /// Owning collection, `None` for unfiled.
    pub collection_id: Option<CollectionId>,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// HTTP method.
    pub method: String,
    /// Target URL.
    pub url: String,
    /// Encoded headers.
    pub headers: String,
    /// Encoded body.
    pub body: String,
    /// Body kind.
    pub body_type: String,
    /// Body syntax.
    pub body_format: String,
    /// Encoded auth configuration.
    pub auth: String,
}

impl RequestDraft {
    /// Creates a draft with the essential fields set.
    #[must_use]
    pub fn new(name: impl Into<String>, method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            method: method.into(),
            url: url.into(),
            ..Self::default()
        }
    }

    /// Places the draft in a collection.
    #[must_use]
    pub fn in_collection(mut self, collection_id: impl Into<CollectionId>) -> Self {
        self.collection_id = Some(collection_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_key_puts_unpositioned_last() {
        let positioned = RequestSummary {
            id: 9,
            sort_order: Some(5),
            ..RequestSummary::default()
        };
        let unpositioned = RequestSummary {
            id: 1,
            sort_order: None,
            ..RequestSummary::default()
        };
        assert!(positioned.sort_key() < unpositioned.sort_key());
    }

    #[test]
    fn test_draft_deserializes_with_missing_fields() {
        let draft: RequestDraft =
            serde_json::from_str(r#"{"name": "Login", "method": "POST"}"#).unwrap_or_default();
        assert_eq!(draft.name, "Login");
        assert_eq!(draft.method, "POST");
        assert!(draft.collection_id.is_none());
        assert!(draft.headers.is_empty());
    }

    #[test]
    fn test_draft_builder() {
        let draft = RequestDraft::new("Users", "GET", "https://api.example.com/users")
            .in_collection("c-1");
        assert_eq!(draft.collection_id.as_deref(), Some("c-1"));
        assert_eq!(draft.method, "GET");
    }
}
