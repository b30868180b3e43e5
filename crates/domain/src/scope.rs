//! Ordering scopes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::collection::CollectionId;

/// The set of requests that share one owning collection.
///
/// Unfiled requests form their own scope. Sort positions are dense within a
/// scope and unrelated across scopes. The derived ordering puts `Unfiled`
/// first, then collections by id, which is the grouping used for listings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum Scope {
    /// Requests with no owning collection.
    Unfiled,
    /// Requests owned by the given collection.
    Collection(CollectionId),
}

impl Scope {
    /// Builds a scope from a nullable collection id.
    #[must_use]
    pub fn from_collection_id(collection_id: Option<&str>) -> Self {
        collection_id.map_or(Self::Unfiled, |id| Self::Collection(id.to_string()))
    }

    /// Returns the collection id, or `None` for the unfiled scope.
    #[must_use]
    pub fn collection_id(&self) -> Option<&str> {
        match self {
            Self::Unfiled => None,
            Self::Collection(id) => Some(id),
        }
    }
}

impl From<Option<CollectionId>> for Scope {
    fn from(collection_id: Option<CollectionId>) -> Self {
        collection_id.map_or(Self::Unfiled, Self::Collection)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unfiled => write!(f, "unfiled"),
            Self::Collection(id) => write!(f, "collection {id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unfiled_sorts_before_collections() {
        let mut scopes = vec![
            Scope::Collection("b".into()),
            Scope::Unfiled,
            Scope::Collection("a".into()),
        ];
        scopes.sort();
        assert_eq!(
            scopes,
            vec![
                Scope::Unfiled,
                Scope::Collection("a".into()),
                Scope::Collection("b".into())
            ]
        );
    }

    #[test]
    fn round_trips_collection_id() {
        assert_eq!(Scope::from_collection_id(None), Scope::Unfiled);
        let scope = Scope::from(Some("c-1".to_string()));
        assert_eq!(scope.collection_id(), Some("c-1"));
        assert_eq!(scope.to_string(), "collection c-1");
    }
}
