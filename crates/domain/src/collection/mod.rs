//! Collection types.
//!
//! Collections form a forest through their `parent_collection_id` link. The
//! link is stored flat; [`tree::build_forest`] turns a listing back into nested
//! nodes for display.

pub mod tree;

use serde::{Deserialize, Serialize};

use crate::id::generate_id;

pub use tree::{CollectionForest, CollectionNode, build_forest};

/// Opaque, globally unique collection identifier.
pub type CollectionId = String;

/// Semantic version carried by an imported collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionVersion {
    /// Major component.
    #[serde(default)]
    pub major: i64,
    /// Minor component.
    #[serde(default)]
    pub minor: i64,
    /// Patch component.
    #[serde(default)]
    pub patch: i64,
    /// Pre-release or build identifier.
    #[serde(default)]
    pub identifier: String,
}

/// A node in the collection hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    /// Unique identifier, stable for the lifetime of the collection.
    pub id: CollectionId,

    /// Display name.
    pub name: String,

    /// Free-form description, empty when not set.
    #[serde(default)]
    pub description: String,

    /// Schema URL of the export this collection was imported from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Version of the export this collection was imported from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<CollectionVersion>,

    /// Owning collection. `None` marks a root.
    #[serde(default)]
    pub parent_collection_id: Option<CollectionId>,
}

impl Collection {
    /// Creates a new root collection with a freshly generated identifier.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            name: name.into(),
            description: String::new(),
            schema: None,
            version: None,
            parent_collection_id: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the owning collection.
    #[must_use]
    pub fn with_parent(mut self, parent_id: Option<CollectionId>) -> Self {
        self.parent_collection_id = parent_id;
        self
    }

    /// Records the export schema and version this collection came from.
    #[must_use]
    pub fn with_origin(mut self, schema: Option<String>, version: Option<CollectionVersion>) -> Self {
        self.schema = schema;
        self.version = version;
        self
    }

    /// Returns true if the collection has no parent.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent_collection_id.is_none()
    }

    /// Returns true if the collection names itself as its parent.
    ///
    /// This is a corrupt state; the tree manager repairs it on read.
    #[must_use]
    pub fn is_self_referencing(&self) -> bool {
        self.parent_collection_id.as_deref() == Some(self.id.as_str())
    }
}
