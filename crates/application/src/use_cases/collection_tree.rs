//! Collection tree manager.
//!
//! Keeps the parent links of collections a forest. Corrupt self-references
//! found in the store are repaired on read instead of being reported.

use std::collections::HashSet;

use curlew_domain::{
    Collection, CollectionForest, CollectionId, DeletePolicy, build_forest, validate_id,
};
use tracing::{debug, info, warn};

use crate::ports::{Store, StoreSession};
use crate::{ApplicationError, ApplicationResult};

/// Use case owning every change to the collection hierarchy.
pub struct CollectionTreeManager<S: Store> {
    store: S,
    delete_policy: DeletePolicy,
}

impl<S: Store> CollectionTreeManager<S> {
    /// Creates a new `CollectionTreeManager`.
    #[must_use]
    pub const fn new(store: S, delete_policy: DeletePolicy) -> Self {
        Self {
            store,
            delete_policy,
        }
    }

    /// Creates a collection, optionally under an existing parent.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if `parent_id` names a missing collection, or a
    /// store error if the insert fails.
    pub fn create(
        &self,
        name: &str,
        description: &str,
        parent_id: Option<&str>,
    ) -> ApplicationResult<Collection> {
        let parent_id = parent_id.map(validate_id).transpose()?;
        let collection = Collection::new(name)
            .with_description(description)
            .with_parent(parent_id.map(ToString::to_string));

        self.store.with_transaction(|session| {
            if let Some(parent_id) = parent_id {
                require_collection(session, parent_id)?;
            }
            insert_collection(session, &collection)
        })?;
        Ok(collection)
    }

    /// Moves a collection under `new_parent_id`, or to the top level when `None`.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the collection or the new parent does not exist
    /// - `InvalidHierarchy` if the move would make the collection its own
    ///   parent or ancestor; nothing is written in that case
    /// - a store error if a write fails
    pub fn update_parent(
        &self,
        collection_id: &str,
        new_parent_id: Option<&str>,
    ) -> ApplicationResult<()> {
        let collection_id = validate_id(collection_id)?;
        let new_parent_id = new_parent_id.map(validate_id).transpose()?;

        self.store.with_transaction(|session| {
            if new_parent_id == Some(collection_id) {
                return Err(ApplicationError::InvalidHierarchy(
                    "a collection cannot be its own parent".to_string(),
                ));
            }
            require_collection(session, collection_id)?;

            if let Some(parent_id) = new_parent_id {
                require_collection(session, parent_id)?;
                ensure_not_ancestor(session, collection_id, parent_id)?;
            }

            session.set_collection_parent(collection_id, new_parent_id)?;
            info!(
                collection_id,
                parent_id = new_parent_id.unwrap_or("<root>"),
                "Collection moved"
            );
            Ok(())
        })
    }

    /// Lists every collection after clearing stored self-references.
    ///
    /// Dangling parent ids are returned as stored.
    ///
    /// # Errors
    ///
    /// Returns a store error if the sweep or the listing fails.
    pub fn list_all(&self) -> ApplicationResult<Vec<Collection>> {
        self.store.with_transaction(list_repaired)
    }

    /// Deletes a collection according to the configured [`DeletePolicy`].
    ///
    /// # Errors
    ///
    /// - `NotFound` if the collection does not exist
    /// - `InvalidHierarchy` under [`DeletePolicy::Reject`] when the collection
    ///   still has children
    /// - a store error if a write fails
    pub fn delete(&self, collection_id: &str) -> ApplicationResult<()> {
        let collection_id = validate_id(collection_id)?;
        let policy = self.delete_policy;

        self.store.with_transaction(|session| {
            require_collection(session, collection_id)?;

            match policy {
                DeletePolicy::Orphan => {
                    session.delete_collection(collection_id)?;
                }
                DeletePolicy::Reject => {
                    let children = session.child_collection_ids(collection_id)?;
                    if !children.is_empty() {
                        return Err(ApplicationError::InvalidHierarchy(format!(
                            "collection {collection_id} still has {} child collection(s)",
                            children.len()
                        )));
                    }
                    session.delete_collection(collection_id)?;
                }
                DeletePolicy::Cascade => {
                    let doomed = descendants(session, collection_id)?;
                    let mut requests = 0;
                    for id in &doomed {
                        requests += session.delete_requests_in(id)?;
                        session.delete_collection(id)?;
                    }
                    debug!(
                        collections = doomed.len(),
                        requests, "Cascade delete removed subtree"
                    );
                }
            }

            info!(collection_id, policy = policy.as_str(), "Collection deleted");
            Ok(())
        })
    }

    /// Renames a collection and replaces its description.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the collection does not exist.
    pub fn update_details(
        &self,
        collection_id: &str,
        name: &str,
        description: &str,
    ) -> ApplicationResult<Collection> {
        let collection_id = validate_id(collection_id)?;

        self.store.with_transaction(|session| {
            if !session.update_collection_details(collection_id, name, description)? {
                return Err(ApplicationError::collection_not_found(collection_id));
            }
            require_collection(session, collection_id)
        })
    }

    /// Builds the nested view of every collection and request.
    ///
    /// # Errors
    ///
    /// Returns a store error if a listing fails.
    pub fn tree(&self) -> ApplicationResult<CollectionForest> {
        self.store.with_transaction(|session| {
            let collections = list_repaired(session)?;
            let requests = session.list_request_summaries()?;
            Ok(build_forest(&collections, &requests))
        })
    }
}

/// Loads a collection or fails with `NotFound`.
///
/// # Errors
///
/// Returns `NotFound` if the collection does not exist, or a store error.
pub fn require_collection(session: &dyn StoreSession, id: &str) -> ApplicationResult<Collection> {
    session
        .find_collection(id)?
        .ok_or_else(|| ApplicationError::collection_not_found(id))
}

/// Inserts a collection row inside an open transaction.
///
/// # Errors
///
/// Returns a store error if the insert fails.
pub fn insert_collection(session: &dyn StoreSession, collection: &Collection) -> ApplicationResult<()> {
    session.insert_collection(collection)?;
    debug!(
        collection_id = %collection.id,
        name = %collection.name,
        "Collection created"
    );
    Ok(())
}

fn list_repaired(session: &dyn StoreSession) -> ApplicationResult<Vec<Collection>> {
    let repaired = session.clear_self_parents()?;
    if repaired > 0 {
        warn!(repaired, "Cleared self-referencing collection parents");
    }
    session.list_collections()
}

/// Walks upward from `parent_id` and fails if `collection_id` is reached.
///
/// A self-parented ancestor is repaired and treated as a root. The walk ends
/// at a missing record and never takes more steps than there are collections,
/// so a stored cycle elsewhere cannot stall it.
fn ensure_not_ancestor(
    session: &dyn StoreSession,
    collection_id: &str,
    parent_id: &str,
) -> ApplicationResult<()> {
    let limit = session.count_collections()?;
    let mut cursor: Option<CollectionId> = Some(parent_id.to_string());
    let mut steps = 0;

    while let Some(current) = cursor {
        if current == collection_id {
            return Err(ApplicationError::InvalidHierarchy(
                "circular hierarchy detected".to_string(),
            ));
        }
        if steps >= limit {
            warn!(
                collection_id,
                parent_id, "Ancestor walk hit a stored cycle; stopping"
            );
            break;
        }
        steps += 1;

        let Some(node) = session.find_collection(&current)? else {
            break;
        };
        if node.is_self_referencing() {
            warn!(collection_id = %node.id, "Repairing self-referencing collection");
            session.set_collection_parent(&node.id, None)?;
            break;
        }
        cursor = node.parent_collection_id;
    }
    Ok(())
}

/// Returns `root` and every collection below it, parents before children.
fn descendants(session: &dyn StoreSession, root: &str) -> ApplicationResult<Vec<CollectionId>> {
    let mut seen: HashSet<CollectionId> = HashSet::from([root.to_string()]);
    let mut ordered = vec![root.to_string()];
    let mut next = 0;

    while next < ordered.len() {
        let children = session.child_collection_ids(&ordered[next])?;
        next += 1;
        for child in children {
            if seen.insert(child.clone()) {
                ordered.push(child);
            }
        }
    }
    Ok(ordered)
}
