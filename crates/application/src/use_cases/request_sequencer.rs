//! Request sequencer.
//!
//! Requests are ordered independently inside each [`Scope`]. Positions are
//! made dense lazily: every reorder first normalizes the scope it touches,
//! then shifts only the requests between the old and the new position.

use curlew_domain::ordering::{self, PositionChange};
use curlew_domain::{RequestId, RequestSummary, Scope, validate_id};
use tracing::{debug, info};

use super::collection_tree::require_collection;
use crate::ports::{Store, StoreSession};
use crate::{ApplicationError, ApplicationResult};

/// Use case owning the order of requests within their scopes.
pub struct RequestSequencer<S: Store> {
    store: S,
}

impl<S: Store> RequestSequencer<S> {
    /// Creates a new `RequestSequencer`.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Makes the positions of `scope` exactly `0..n`.
    ///
    /// Returns the number of rows written; a dense scope yields zero.
    ///
    /// # Errors
    ///
    /// Returns a store error if a read or write fails.
    pub fn normalize(&self, scope: &Scope) -> ApplicationResult<usize> {
        self.store
            .with_transaction(|session| normalize_scope(session, scope))
    }

    /// Returns the position a request appended to `scope` would take.
    ///
    /// # Errors
    ///
    /// Returns a store error if the query fails.
    pub fn next_position(&self, scope: &Scope) -> ApplicationResult<i64> {
        self.store
            .with_transaction(|session| next_position(session, scope))
    }

    /// Moves a request to `target` within its scope.
    ///
    /// Targets beyond either end are clamped to the first or last position.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the request does not exist, or a store error if a
    /// write fails. A failed write rolls back the whole move.
    pub fn set_position(&self, request_id: RequestId, target: i64) -> ApplicationResult<()> {
        self.store.with_transaction(|session| {
            let scope = session
                .request_scope(request_id)?
                .ok_or_else(|| ApplicationError::request_not_found(request_id))?;

            normalize_scope(session, &scope)?;

            let slots = session.sort_slots(&scope)?;
            let target = ordering::clamp_target(slots.len(), target);
            let changes = ordering::reposition(&slots, request_id, target)?;
            if changes.is_empty() {
                debug!(request_id, target, "Request already in place");
                return Ok(());
            }

            session.apply_positions(&changes)?;
            info!(
                request_id,
                target,
                %scope,
                shifted = changes.len() - 1,
                "Request repositioned"
            );
            Ok(())
        })
    }

    /// Lists every request grouped by scope (unfiled first, then collections
    /// by id) and ordered by position, normalizing every scope first.
    ///
    /// # Errors
    ///
    /// Returns a store error if a read or write fails.
    pub fn list_ordered(&self) -> ApplicationResult<Vec<RequestSummary>> {
        self.store.with_transaction(|session| {
            for scope in session.request_scopes()? {
                normalize_scope(session, &scope)?;
            }

            let mut requests = session.list_request_summaries()?;
            requests.sort_by(|a, b| {
                let scope_a = Scope::from_collection_id(a.collection_id.as_deref());
                let scope_b = Scope::from_collection_id(b.collection_id.as_deref());
                scope_a
                    .cmp(&scope_b)
                    .then_with(|| a.sort_key().cmp(&b.sort_key()))
            });
            Ok(requests)
        })
    }

    /// Moves a request into another collection, or out to the unfiled scope.
    ///
    /// The request is appended at the end of its new scope and the scope it
    /// left is renormalized.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the request or the target collection does not
    /// exist, or a store error if a write fails.
    pub fn set_request_collection(
        &self,
        request_id: RequestId,
        collection_id: Option<&str>,
    ) -> ApplicationResult<()> {
        let collection_id = collection_id.map(validate_id).transpose()?;
        let target = Scope::from_collection_id(collection_id);

        self.store
            .with_transaction(|session| move_to_scope(session, request_id, &target))
    }
}

/// Normalizes one scope inside an open transaction.
///
/// # Errors
///
/// Returns a store error if a read or write fails.
pub fn normalize_scope(session: &dyn StoreSession, scope: &Scope) -> ApplicationResult<usize> {
    let slots = session.sort_slots(scope)?;
    let changes: Vec<PositionChange> = ordering::normalize(&slots);
    if changes.is_empty() {
        return Ok(0);
    }

    session.apply_positions(&changes)?;
    debug!(%scope, writes = changes.len(), "Scope normalized");
    Ok(changes.len())
}

/// Position for a request appended to `scope`: one past the highest stored
/// position, or zero for an empty scope.
///
/// # Errors
///
/// Returns a store error if the query fails.
pub fn next_position(session: &dyn StoreSession, scope: &Scope) -> ApplicationResult<i64> {
    Ok(session.max_sort_order(scope)?.map_or(0, |max| max + 1))
}

/// Moves a request into `target`, appending it there and closing the gap it
/// leaves behind.
///
/// # Errors
///
/// Returns `NotFound` if the request or the target collection does not
/// exist, or a store error if a write fails. Staying in the current scope is
/// a no-op, even when that scope's collection has been deleted.
pub fn move_to_scope(
    session: &dyn StoreSession,
    request_id: RequestId,
    target: &Scope,
) -> ApplicationResult<()> {
    let source = session
        .request_scope(request_id)?
        .ok_or_else(|| ApplicationError::request_not_found(request_id))?;
    if &source == target {
        return Ok(());
    }
    if let Some(collection_id) = target.collection_id() {
        require_collection(session, collection_id)?;
    }

    let position = next_position(session, target)?;
    session.set_request_scope(request_id, target, Some(position))?;
    normalize_scope(session, &source)?;

    info!(request_id, from = %source, to = %target, position, "Request moved");
    Ok(())
}
