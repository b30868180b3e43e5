//! Engine Settings Domain Model
//!
//! Defines the user-tunable policies of the collection engine.

use serde::{Deserialize, Serialize};

/// What happens to sub-collections when their parent is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeletePolicy {
    /// Remove only the collection; children keep a dangling parent id (default).
    #[default]
    Orphan,
    /// Remove the collection, every descendant, and the requests they own.
    Cascade,
    /// Refuse to delete a collection that still has child collections.
    Reject,
}

impl DeletePolicy {
    /// Returns the lowercase name used in settings files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Orphan => "orphan",
            Self::Cascade => "cascade",
            Self::Reject => "reject",
        }
    }
}

/// Guards applied to import documents before anything is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportLimits {
    /// Maximum document size in bytes.
    #[serde(default = "default_max_document_bytes")]
    pub max_document_bytes: usize,

    /// Maximum folder nesting depth below the root collection.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Maximum number of nodes (folders and requests) in one document.
    #[serde(default = "default_max_items")]
    pub max_items: usize,
}

fn default_max_document_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_max_depth() -> usize {
    32
}

fn default_max_items() -> usize {
    10_000
}

impl Default for ImportLimits {
    fn default() -> Self {
        Self {
            max_document_bytes: default_max_document_bytes(),
            max_depth: default_max_depth(),
            max_items: default_max_items(),
        }
    }
}

/// Settings for the collection engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Delete behaviour for collections with children.
    #[serde(default)]
    pub delete_policy: DeletePolicy,

    /// Import guards.
    #[serde(default)]
    pub import: ImportLimits,
}
