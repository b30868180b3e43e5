//! Store ports
//!
//! The store adapter answers exact-match and range queries and performs
//! single-row or bulk writes. It holds no business rules: hierarchy checks,
//! ordering plans and repair passes live in the use cases.

use std::sync::Arc;

use curlew_domain::{
    Collection, CollectionId, PositionChange, Request, RequestDraft, RequestId, RequestSummary,
    Response, ResponseRecord, Scope, SortSlot,
};

use crate::ApplicationResult;

/// Queries and writes over the `collections` table.
pub trait CollectionStore {
    /// Inserts a new collection row.
    ///
    /// # Errors
    ///
    /// Returns an error if the row cannot be written.
    fn insert_collection(&self, collection: &Collection) -> ApplicationResult<()>;

    /// Loads one collection by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn find_collection(&self, id: &str) -> ApplicationResult<Option<Collection>>;

    /// Loads every collection in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn list_collections(&self) -> ApplicationResult<Vec<Collection>>;

    /// Counts stored collections.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn count_collections(&self) -> ApplicationResult<usize>;

    /// Ids of the collections whose parent is `id`, excluding `id` itself.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn child_collection_ids(&self, id: &str) -> ApplicationResult<Vec<CollectionId>>;

    /// Rewrites the parent link of one collection. Returns false if no row matched.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn set_collection_parent(&self, id: &str, parent_id: Option<&str>) -> ApplicationResult<bool>;

    /// Rewrites name and description. Returns false if no row matched.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn update_collection_details(
        &self,
        id: &str,
        name: &str,
        description: &str,
    ) -> ApplicationResult<bool>;

    /// Clears the parent of every collection that names itself as parent.
    /// Returns the number of repaired rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn clear_self_parents(&self) -> ApplicationResult<usize>;

    /// Deletes one collection row. Returns false if no row matched.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn delete_collection(&self, id: &str) -> ApplicationResult<bool>;
}

/// Queries and writes over the `requests` and `responses` tables.
pub trait RequestStore {
    /// Inserts a request at the given position and returns its new id.
    ///
    /// # Errors
    ///
    /// Returns an error if the row cannot be written.
    fn insert_request(
        &self,
        draft: &RequestDraft,
        sort_order: Option<i64>,
    ) -> ApplicationResult<RequestId>;

    /// Loads one request with its collection name joined in. The latest
    /// response is not loaded.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn find_request(&self, id: RequestId) -> ApplicationResult<Option<Request>>;

    /// Rewrites the editable fields of a request. Owning collection and sort
    /// position are left untouched. Returns false if no row matched.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn update_request(&self, id: RequestId, draft: &RequestDraft) -> ApplicationResult<bool>;

    /// Deletes a request and its responses. Returns false if no row matched.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn delete_request(&self, id: RequestId) -> ApplicationResult<bool>;

    /// Deletes every request owned by a collection, with their responses.
    /// Returns the number of deleted requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn delete_requests_in(&self, collection_id: &str) -> ApplicationResult<usize>;

    /// Lists every request as a summary, unordered.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn list_request_summaries(&self) -> ApplicationResult<Vec<RequestSummary>>;

    /// Finds requests whose name or url equals `term`, or whose name, url or
    /// body contains it. Results are ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn search_requests(&self, term: &str) -> ApplicationResult<Vec<RequestSummary>>;

    /// Resolves the scope a request belongs to.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn request_scope(&self, id: RequestId) -> ApplicationResult<Option<Scope>>;

    /// Lists the distinct scopes that currently hold requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn request_scopes(&self) -> ApplicationResult<Vec<Scope>>;

    /// Loads the ordering slots of one scope.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn sort_slots(&self, scope: &Scope) -> ApplicationResult<Vec<SortSlot>>;

    /// Highest sort position in a scope, `None` when no request is positioned.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn max_sort_order(&self, scope: &Scope) -> ApplicationResult<Option<i64>>;

    /// Writes planned positions in order.
    ///
    /// # Errors
    ///
    /// Returns an error if any write fails or a planned row no longer exists.
    fn apply_positions(&self, changes: &[PositionChange]) -> ApplicationResult<()>;

    /// Moves a request into `scope` at `sort_order`. Returns false if no row matched.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn set_request_scope(
        &self,
        id: RequestId,
        scope: &Scope,
        sort_order: Option<i64>,
    ) -> ApplicationResult<bool>;

    /// Appends a response to a request's history and returns the stored record.
    ///
    /// # Errors
    ///
    /// Returns an error if the row cannot be written.
    fn insert_response(
        &self,
        request_id: RequestId,
        record: &ResponseRecord,
    ) -> ApplicationResult<Response>;

    /// Loads the most recent response of a request.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn latest_response(&self, request_id: RequestId) -> ApplicationResult<Option<Response>>;
}

/// Everything reachable inside one transaction.
pub trait StoreSession: CollectionStore + RequestStore {}

impl<T: CollectionStore + RequestStore + ?Sized> StoreSession for T {}

/// Transactional entry point to the store.
pub trait Store: Send + Sync {
    /// Runs `f` inside one transaction.
    ///
    /// The transaction commits when `f` returns `Ok` and rolls back
    /// otherwise, so the first failing write leaves no partial state.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `f`, or a store error if the transaction
    /// cannot be opened or committed.
    fn with_transaction<T, F>(&self, f: F) -> ApplicationResult<T>
    where
        F: FnOnce(&dyn StoreSession) -> ApplicationResult<T>;
}

impl<S: Store> Store for Arc<S> {
    fn with_transaction<T, F>(&self, f: F) -> ApplicationResult<T>
    where
        F: FnOnce(&dyn StoreSession) -> ApplicationResult<T>,
    {
        self.as_ref().with_transaction(f)
    }
}
