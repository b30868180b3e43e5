//! In-memory store used by the use case tests.
//!
//! Each transaction works on a copy of the state that replaces the shared
//! state only when the closure succeeds, which mirrors the rollback behaviour
//! of the SQLite adapter.

#![allow(clippy::unwrap_used)]

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use curlew_domain::{
    Collection, CollectionId, PositionChange, Request, RequestDraft, RequestId, RequestSummary,
    Response, ResponseRecord, Scope, SortSlot,
};

use crate::ports::{CollectionStore, RequestStore, Store, StoreSession};
use crate::{ApplicationError, ApplicationResult};

#[derive(Debug, Clone, Default)]
struct State {
    collections: Vec<Collection>,
    requests: BTreeMap<RequestId, Request>,
    responses: Vec<Response>,
    next_request_id: RequestId,
    next_response_id: i64,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    fail_position_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `apply_positions` call fail.
    pub fn fail_position_writes(&self) {
        self.fail_position_writes.store(true, Ordering::SeqCst);
    }

    /// Inserts a collection row as-is, bypassing every check.
    pub fn seed_collection(&self, id: &str, parent: Option<&str>) {
        let mut state = self.state.lock().unwrap();
        state.collections.push(Collection {
            id: id.to_string(),
            name: id.to_uppercase(),
            description: String::new(),
            schema: None,
            version: None,
            parent_collection_id: parent.map(ToString::to_string),
        });
    }

    /// Inserts a request row as-is and returns its id.
    pub fn seed_request(&self, collection_id: Option<&str>, sort_order: Option<i64>) -> RequestId {
        let mut state = self.state.lock().unwrap();
        state.next_request_id += 1;
        let id = state.next_request_id;
        state.requests.insert(
            id,
            Request {
                id,
                collection_id: collection_id.map(ToString::to_string),
                name: format!("r{id}"),
                method: "GET".to_string(),
                sort_order,
                ..Request::default()
            },
        );
        id
    }

    pub fn collection(&self, id: &str) -> Option<Collection> {
        let state = self.state.lock().unwrap();
        state.collections.iter().find(|c| c.id == id).cloned()
    }

    pub fn collection_count(&self) -> usize {
        self.state.lock().unwrap().collections.len()
    }

    pub fn request(&self, id: RequestId) -> Option<Request> {
        self.state.lock().unwrap().requests.get(&id).cloned()
    }

    /// `(id, sort_order)` pairs of a scope ordered by position.
    pub fn positions(&self, scope: &Scope) -> Vec<(RequestId, Option<i64>)> {
        let state = self.state.lock().unwrap();
        let mut rows: Vec<_> = state
            .requests
            .values()
            .filter(|r| r.collection_id.as_deref() == scope.collection_id())
            .map(|r| (r.id, r.sort_order))
            .collect();
        rows.sort_by_key(|&(id, position)| (position.is_none(), position, id));
        rows
    }

    pub fn response_count(&self) -> usize {
        self.state.lock().unwrap().responses.len()
    }
}

impl Store for MemoryStore {
    fn with_transaction<T, F>(&self, f: F) -> ApplicationResult<T>
    where
        F: FnOnce(&dyn StoreSession) -> ApplicationResult<T>,
    {
        let mut guard = self
            .state
            .lock()
            .map_err(|_| ApplicationError::Store("state lock poisoned".to_string()))?;
        let session = MemorySession {
            state: RefCell::new(guard.clone()),
            fail_position_writes: self.fail_position_writes.load(Ordering::SeqCst),
        };
        let value = f(&session)?;
        *guard = session.state.into_inner();
        Ok(value)
    }
}

struct MemorySession {
    state: RefCell<State>,
    fail_position_writes: bool,
}

fn in_scope(request: &Request, scope: &Scope) -> bool {
    request.collection_id.as_deref() == scope.collection_id()
}

fn summary(request: &Request) -> RequestSummary {
    RequestSummary {
        id: request.id,
        collection_id: request.collection_id.clone(),
        name: request.name.clone(),
        description: request.description.clone(),
        method: request.method.clone(),
        url: request.url.clone(),
        sort_order: request.sort_order,
    }
}

impl CollectionStore for MemorySession {
    fn insert_collection(&self, collection: &Collection) -> ApplicationResult<()> {
        self.state.borrow_mut().collections.push(collection.clone());
        Ok(())
    }

    fn find_collection(&self, id: &str) -> ApplicationResult<Option<Collection>> {
        Ok(self
            .state
            .borrow()
            .collections
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    fn list_collections(&self) -> ApplicationResult<Vec<Collection>> {
        Ok(self.state.borrow().collections.clone())
    }

    fn count_collections(&self) -> ApplicationResult<usize> {
        Ok(self.state.borrow().collections.len())
    }

    fn child_collection_ids(&self, id: &str) -> ApplicationResult<Vec<CollectionId>> {
        Ok(self
            .state
            .borrow()
            .collections
            .iter()
            .filter(|c| c.id != id && c.parent_collection_id.as_deref() == Some(id))
            .map(|c| c.id.clone())
            .collect())
    }

    fn set_collection_parent(&self, id: &str, parent_id: Option<&str>) -> ApplicationResult<bool> {
        let mut state = self.state.borrow_mut();
        Ok(state
            .collections
            .iter_mut()
            .find(|c| c.id == id)
            .map(|c| c.parent_collection_id = parent_id.map(ToString::to_string))
            .is_some())
    }

    fn update_collection_details(
        &self,
        id: &str,
        name: &str,
        description: &str,
    ) -> ApplicationResult<bool> {
        let mut state = self.state.borrow_mut();
        Ok(state
            .collections
            .iter_mut()
            .find(|c| c.id == id)
            .map(|c| {
                c.name = name.to_string();
                c.description = description.to_string();
            })
            .is_some())
    }

    fn clear_self_parents(&self) -> ApplicationResult<usize> {
        let mut state = self.state.borrow_mut();
        let mut repaired = 0;
        for collection in &mut state.collections {
            if collection.is_self_referencing() {
                collection.parent_collection_id = None;
                repaired += 1;
            }
        }
        Ok(repaired)
    }

    fn delete_collection(&self, id: &str) -> ApplicationResult<bool> {
        let mut state = self.state.borrow_mut();
        let before = state.collections.len();
        state.collections.retain(|c| c.id != id);
        Ok(state.collections.len() != before)
    }
}

impl RequestStore for MemorySession {
    fn insert_request(
        &self,
        draft: &RequestDraft,
        sort_order: Option<i64>,
    ) -> ApplicationResult<RequestId> {
        let mut state = self.state.borrow_mut();
        state.next_request_id += 1;
        let id = state.next_request_id;
        state.requests.insert(
            id,
            Request {
                id,
                collection_id: draft.collection_id.clone(),
                collection_name: None,
                name: draft.name.clone(),
                description: draft.description.clone(),
                method: draft.method.clone(),
                url: draft.url.clone(),
                headers: draft.headers.clone(),
                body: draft.body.clone(),
                body_type: draft.body_type.clone(),
                body_format: draft.body_format.clone(),
                auth: draft.auth.clone(),
                sort_order,
                response: None,
            },
        );
        Ok(id)
    }

    fn find_request(&self, id: RequestId) -> ApplicationResult<Option<Request>> {
        let state = self.state.borrow();
        Ok(state.requests.get(&id).map(|request| {
            let collection_name = request.collection_id.as_deref().and_then(|cid| {
                state
                    .collections
                    .iter()
                    .find(|c| c.id == cid)
                    .map(|c| c.name.clone())
            });
            Request {
                collection_name,
                ..request.clone()
            }
        }))
    }

    fn update_request(&self, id: RequestId, draft: &RequestDraft) -> ApplicationResult<bool> {
        let mut state = self.state.borrow_mut();
        Ok(state
            .requests
            .get_mut(&id)
            .map(|r| {
                r.name.clone_from(&draft.name);
                r.description.clone_from(&draft.description);
                r.method.clone_from(&draft.method);
                r.url.clone_from(&draft.url);
                r.headers.clone_from(&draft.headers);
                r.body.clone_from(&draft.body);
                r.body_type.clone_from(&draft.body_type);
                r.body_format.clone_from(&draft.body_format);
                r.auth.clone_from(&draft.auth);
            })
            .is_some())
    }

    fn delete_request(&self, id: RequestId) -> ApplicationResult<bool> {
        let mut state = self.state.borrow_mut();
        state.responses.retain(|r| r.request_id != id);
        Ok(state.requests.remove(&id).is_some())
    }

    fn delete_requests_in(&self, collection_id: &str) -> ApplicationResult<usize> {
        let mut state = self.state.borrow_mut();
        let doomed: Vec<RequestId> = state
            .requests
            .values()
            .filter(|r| r.collection_id.as_deref() == Some(collection_id))
            .map(|r| r.id)
            .collect();
        for id in &doomed {
            state.requests.remove(id);
        }
        state.responses.retain(|r| !doomed.contains(&r.request_id));
        Ok(doomed.len())
    }

    fn list_request_summaries(&self) -> ApplicationResult<Vec<RequestSummary>> {
        Ok(self.state.borrow().requests.values().map(summary).collect())
    }

    fn search_requests(&self, term: &str) -> ApplicationResult<Vec<RequestSummary>> {
        Ok(self
            .state
            .borrow()
            .requests
            .values()
            .filter(|r| r.name.contains(term) || r.url.contains(term) || r.body.contains(term))
            .map(summary)
            .collect())
    }

    fn request_scope(&self, id: RequestId) -> ApplicationResult<Option<Scope>> {
        Ok(self
            .state
            .borrow()
            .requests
            .get(&id)
            .map(|r| Scope::from(r.collection_id.clone())))
    }

    fn request_scopes(&self) -> ApplicationResult<Vec<Scope>> {
        let mut scopes: Vec<Scope> = self
            .state
            .borrow()
            .requests
            .values()
            .map(|r| Scope::from(r.collection_id.clone()))
            .collect();
        scopes.sort();
        scopes.dedup();
        Ok(scopes)
    }

    fn sort_slots(&self, scope: &Scope) -> ApplicationResult<Vec<SortSlot>> {
        Ok(self
            .state
            .borrow()
            .requests
            .values()
            .filter(|r| in_scope(r, scope))
            .map(|r| SortSlot::new(r.id, r.sort_order))
            .collect())
    }

    fn max_sort_order(&self, scope: &Scope) -> ApplicationResult<Option<i64>> {
        Ok(self
            .state
            .borrow()
            .requests
            .values()
            .filter(|r| in_scope(r, scope))
            .filter_map(|r| r.sort_order)
            .max())
    }

    fn apply_positions(&self, changes: &[PositionChange]) -> ApplicationResult<()> {
        if self.fail_position_writes && !changes.is_empty() {
            return Err(ApplicationError::Store("disk I/O error".to_string()));
        }
        let mut state = self.state.borrow_mut();
        for change in changes {
            let request = state.requests.get_mut(&change.request_id).ok_or_else(|| {
                ApplicationError::Store(format!("request {} disappeared", change.request_id))
            })?;
            request.sort_order = Some(change.to);
        }
        Ok(())
    }

    fn set_request_scope(
        &self,
        id: RequestId,
        scope: &Scope,
        sort_order: Option<i64>,
    ) -> ApplicationResult<bool> {
        let mut state = self.state.borrow_mut();
        Ok(state
            .requests
            .get_mut(&id)
            .map(|r| {
                r.collection_id = scope.collection_id().map(ToString::to_string);
                r.sort_order = sort_order;
            })
            .is_some())
    }

    fn insert_response(
        &self,
        request_id: RequestId,
        record: &ResponseRecord,
    ) -> ApplicationResult<Response> {
        let mut state = self.state.borrow_mut();
        state.next_response_id += 1;
        let response = Response {
            id: state.next_response_id,
            status_code: record.status_code,
            headers: record.headers.clone(),
            body: record.body.clone(),
            runtime_ms: record.runtime_ms,
            request_id,
        };
        state.responses.push(response.clone());
        Ok(response)
    }

    fn latest_response(&self, request_id: RequestId) -> ApplicationResult<Option<Response>> {
        Ok(self
            .state
            .borrow()
            .responses
            .iter()
            .filter(|r| r.request_id == request_id)
            .max_by_key(|r| r.id)
            .cloned())
    }
}
