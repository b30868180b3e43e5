//! Request catalog use case.
//!
//! Saving, editing, deleting and searching requests, plus the append-only
//! response history. New requests are appended to the end of their scope.

use curlew_domain::{
    Request, RequestDraft, RequestId, RequestSummary, Response, ResponseRecord, Scope,
};
use tracing::{debug, info};

use super::collection_tree::require_collection;
use super::request_sequencer::{move_to_scope, next_position};
use crate::ports::{Store, StoreSession};
use crate::{ApplicationError, ApplicationResult};

/// Use case for request CRUD and response history.
pub struct RequestCatalog<S: Store> {
    store: S,
}

impl<S: Store> RequestCatalog<S> {
    /// Creates a new `RequestCatalog`.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Saves a new request at the end of its scope, optionally with the
    /// response it produced.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the draft names a missing collection, or a store
    /// error if a write fails.
    pub fn save(
        &self,
        draft: &RequestDraft,
        response: Option<&ResponseRecord>,
    ) -> ApplicationResult<Request> {
        self.store.with_transaction(|session| {
            let scope = Scope::from_collection_id(draft.collection_id.as_deref());
            if let Some(collection_id) = scope.collection_id() {
                require_collection(session, collection_id)?;
            }

            let position = next_position(session, &scope)?;
            let id = session.insert_request(draft, Some(position))?;
            if let Some(record) = response {
                session.insert_response(id, record)?;
            }

            info!(request_id = id, %scope, position, "Request saved");
            load_request(session, id)
        })
    }

    /// Loads a request with its collection name and latest response.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the request does not exist.
    pub fn get(&self, id: RequestId) -> ApplicationResult<Request> {
        self.store
            .with_transaction(|session| load_request(session, id))
    }

    /// Replaces the editable fields of a request.
    ///
    /// A changed collection moves the request to the end of the new scope.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the request or the new collection does not
    /// exist, or a store error if a write fails.
    pub fn update(
        &self,
        id: RequestId,
        draft: &RequestDraft,
        response: Option<&ResponseRecord>,
    ) -> ApplicationResult<Request> {
        self.store.with_transaction(|session| {
            let target = Scope::from_collection_id(draft.collection_id.as_deref());
            move_to_scope(session, id, &target)?;

            if !session.update_request(id, draft)? {
                return Err(ApplicationError::request_not_found(id));
            }
            if let Some(record) = response {
                session.insert_response(id, record)?;
            }

            debug!(request_id = id, "Request updated");
            load_request(session, id)
        })
    }

    /// Deletes a request and its response history. Siblings keep their
    /// positions; the gap closes on the next reorder of the scope.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the request does not exist.
    pub fn delete(&self, id: RequestId) -> ApplicationResult<()> {
        self.store.with_transaction(|session| {
            if !session.delete_request(id)? {
                return Err(ApplicationError::request_not_found(id));
            }
            info!(request_id = id, "Request deleted");
            Ok(())
        })
    }

    /// Finds requests by exact name or url, or by a fragment of name, url or body.
    ///
    /// # Errors
    ///
    /// Returns a store error if the query fails.
    pub fn search(&self, term: &str) -> ApplicationResult<Vec<RequestSummary>> {
        self.store
            .with_transaction(|session| session.search_requests(term))
    }

    /// Appends a response to a request's history.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the request does not exist.
    pub fn record_response(
        &self,
        request_id: RequestId,
        record: &ResponseRecord,
    ) -> ApplicationResult<Response> {
        self.store.with_transaction(|session| {
            if session.request_scope(request_id)?.is_none() {
                return Err(ApplicationError::request_not_found(request_id));
            }
            let response = session.insert_response(request_id, record)?;
            debug!(
                request_id,
                status = response.status_code,
                "Response recorded"
            );
            Ok(response)
        })
    }
}

fn load_request(session: &dyn StoreSession, id: RequestId) -> ApplicationResult<Request> {
    let mut request = session
        .find_request(id)?
        .ok_or_else(|| ApplicationError::request_not_found(id))?;
    request.response = session.latest_response(id)?;
    Ok(request)
}
