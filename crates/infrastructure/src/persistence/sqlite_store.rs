//! SQLite store adapter.
//!
//! One connection guarded by a mutex. Every call to
//! [`Store::with_transaction`] opens an `IMMEDIATE` transaction, so a
//! read-modify-write sequence never interleaves with another writer, and
//! rolls it back when the closure fails.
//!
//! Empty strings are written as `NULL` and `NULL` text is read back as an
//! empty string. Foreign keys are not enforced: children of a deleted
//! collection keep their dangling parent id.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use curlew_application::ports::{CollectionStore, RequestStore, Store, StoreSession};
use curlew_application::{ApplicationError, ApplicationResult};
use curlew_domain::{
    Collection, CollectionId, CollectionVersion, PositionChange, Request, RequestDraft, RequestId,
    RequestSummary, Response, ResponseRecord, Scope, SortSlot,
};
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params};
use tracing::{debug, info};

const SCHEMA_SQL: &str = include_str!("schema.sql");

const INDEXES_SQL: &str = "
CREATE INDEX IF NOT EXISTS idx_requests_scope ON requests(collection_id, sort_order);
CREATE INDEX IF NOT EXISTS idx_collections_parent ON collections(parent_collection);
CREATE INDEX IF NOT EXISTS idx_responses_request ON responses(request_id);
";

/// Errors raised while opening the database.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// SQLite reported an error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The database directory could not be created.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StoreError> for ApplicationError {
    fn from(error: StoreError) -> Self {
        Self::Store(error.to_string())
    }
}

fn store_error(error: rusqlite::Error) -> ApplicationError {
    ApplicationError::Store(error.to_string())
}

/// Rebuilds `requests` without the `NOT NULL` on `collection_id` that older
/// builds declared, keeping ids and every column.
const REBUILD_REQUESTS_SQL: &str = "
CREATE TABLE requests_rebuilt (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  collection_id TEXT,
  name TEXT,
  description TEXT,
  method TEXT,
  url TEXT,
  headers TEXT,
  body TEXT,
  body_type TEXT,
  body_format TEXT,
  auth TEXT,
  sort_order INTEGER
);
INSERT INTO requests_rebuilt (
  id, collection_id, name, description, method, url, headers, body,
  body_type, body_format, auth, sort_order
)
SELECT id, collection_id, name, description, method, url, headers, body,
       body_type, body_format, auth, sort_order
FROM requests;
DROP TABLE requests;
ALTER TABLE requests_rebuilt RENAME TO requests;
";

/// SQLite implementation of the [`Store`] port.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (or creates) the database at `path` and brings its schema up to date.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the database
    /// cannot be opened or migrated.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let store = Self::initialize(Connection::open(path)?)?;
        info!(path = %path.display(), "Opened collection database");
        Ok(store)
    }

    /// Opens a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be created.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::initialize(Connection::open_in_memory()?)
    }

    /// Default database location: `<data dir>/curlew/curlew.db`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|p| p.join("curlew").join("curlew.db"))
    }

    fn initialize(mut conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA_SQL)?;
        ensure_schema_extensions(&mut conn)?;
        conn.execute_batch(INDEXES_SQL)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

/// Brings databases created by older builds up to the current schema: adds
/// missing columns and lets requests exist without a collection.
fn ensure_schema_extensions(conn: &mut Connection) -> Result<(), StoreError> {
    let additions = [
        ("requests", "sort_order", "INTEGER"),
        ("requests", "body_format", "TEXT"),
        ("collections", "schema", "TEXT"),
        ("collections", "version_major", "INTEGER"),
        ("collections", "version_minor", "INTEGER"),
        ("collections", "version_patch", "INTEGER"),
        ("collections", "version_identifier", "TEXT"),
    ];

    for (table, column, kind) in additions {
        if column_not_null(conn, table, column)?.is_none() {
            conn.execute(&format!("ALTER TABLE {table} ADD COLUMN {column} {kind}"), [])?;
            info!(table, column, "Upgraded database schema");
        }
    }

    if column_not_null(conn, "requests", "collection_id")? == Some(true) {
        let tx = conn.transaction()?;
        tx.execute_batch(REBUILD_REQUESTS_SQL)?;
        tx.commit()?;
        info!("Rebuilt requests table to allow unfiled requests");
    }
    Ok(())
}

/// Returns whether `column` is declared `NOT NULL`, or `None` if it is missing.
fn column_not_null(conn: &Connection, table: &str, column: &str) -> Result<Option<bool>, StoreError> {
    let pragma = format!("PRAGMA table_info({table})");
    let mut stmt = conn.prepare(&pragma)?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            let not_null: i64 = row.get(3)?;
            return Ok(Some(not_null != 0));
        }
    }
    Ok(None)
}

impl Store for SqliteStore {
    fn with_transaction<T, F>(&self, f: F) -> ApplicationResult<T>
    where
        F: FnOnce(&dyn StoreSession) -> ApplicationResult<T>,
    {
        let mut conn = self
            .conn
            .lock()
            .map_err(|_| ApplicationError::Store("database mutex poisoned".to_string()))?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(store_error)?;

        // Dropping `tx` on the error path rolls it back.
        let value = f(&SqliteSession { conn: &tx })?;
        tx.commit().map_err(store_error)?;
        Ok(value)
    }
}

/// Queries bound to one open transaction.
struct SqliteSession<'a> {
    conn: &'a Connection,
}

impl SqliteSession<'_> {
    fn run<T>(&self, query: impl FnOnce(&Connection) -> rusqlite::Result<T>) -> ApplicationResult<T> {
        query(self.conn).map_err(store_error)
    }
}

fn nullable(value: &str) -> Option<&str> {
    if value.is_empty() { None } else { Some(value) }
}

fn text(row: &Row<'_>, index: usize) -> rusqlite::Result<String> {
    Ok(row.get::<_, Option<String>>(index)?.unwrap_or_default())
}

fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn collection_from_row(row: &Row<'_>) -> rusqlite::Result<Collection> {
    let major: Option<i64> = row.get(4)?;
    let minor: Option<i64> = row.get(5)?;
    let patch: Option<i64> = row.get(6)?;
    let identifier = text(row, 7)?;
    let version = (major.is_some() || minor.is_some() || patch.is_some() || !identifier.is_empty())
        .then(|| CollectionVersion {
            major: major.unwrap_or_default(),
            minor: minor.unwrap_or_default(),
            patch: patch.unwrap_or_default(),
            identifier,
        });

    Ok(Collection {
        id: row.get(0)?,
        name: text(row, 1)?,
        description: text(row, 2)?,
        schema: row.get::<_, Option<String>>(3)?.filter(|s| !s.is_empty()),
        version,
        parent_collection_id: row.get(8)?,
    })
}

fn summary_from_row(row: &Row<'_>) -> rusqlite::Result<RequestSummary> {
    Ok(RequestSummary {
        id: row.get(0)?,
        collection_id: row.get(1)?,
        name: text(row, 2)?,
        description: text(row, 3)?,
        method: text(row, 4)?,
        url: text(row, 5)?,
        sort_order: row.get(6)?,
    })
}

fn response_from_row(row: &Row<'_>) -> rusqlite::Result<Response> {
    Ok(Response {
        id: row.get(0)?,
        status_code: row.get::<_, Option<i64>>(1)?.unwrap_or_default(),
        headers: text(row, 2)?,
        body: text(row, 3)?,
        runtime_ms: row.get::<_, Option<i64>>(4)?.unwrap_or_default(),
        request_id: row.get::<_, Option<i64>>(5)?.unwrap_or_default(),
    })
}

impl CollectionStore for SqliteSession<'_> {
    fn insert_collection(&self, collection: &Collection) -> ApplicationResult<()> {
        let version = collection.version.as_ref();
        self.run(|conn| {
            conn.execute(
                "INSERT INTO collections (
                   id, name, description, schema, version_major, version_minor,
                   version_patch, version_identifier, parent_collection
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    collection.id,
                    collection.name,
                    nullable(&collection.description),
                    collection.schema.as_deref(),
                    version.map(|v| v.major),
                    version.map(|v| v.minor),
                    version.map(|v| v.patch),
                    version.map(|v| v.identifier.as_str()),
                    collection.parent_collection_id.as_deref(),
                ],
            )?;
            Ok(())
        })
    }

    fn find_collection(&self, id: &str) -> ApplicationResult<Option<Collection>> {
        self.run(|conn| {
            conn.query_row(
                "SELECT id, name, description, schema, version_major, version_minor,
                        version_patch, version_identifier, parent_collection
                 FROM collections WHERE id = ?1",
                [id],
                collection_from_row,
            )
            .optional()
        })
    }

    fn list_collections(&self) -> ApplicationResult<Vec<Collection>> {
        self.run(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, description, schema, version_major, version_minor,
                        version_patch, version_identifier, parent_collection
                 FROM collections ORDER BY rowid",
            )?;
            let rows = stmt.query_map([], collection_from_row)?;
            rows.collect()
        })
    }

    fn count_collections(&self) -> ApplicationResult<usize> {
        let total: i64 = self.run(|conn| {
            conn.query_row("SELECT COUNT(*) FROM collections", [], |row| row.get(0))
        })?;
        Ok(usize::try_from(total).unwrap_or_default())
    }

    fn child_collection_ids(&self, id: &str) -> ApplicationResult<Vec<CollectionId>> {
        self.run(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id FROM collections
                 WHERE parent_collection = ?1 AND id <> ?1
                 ORDER BY rowid",
            )?;
            let rows = stmt.query_map([id], |row| row.get(0))?;
            rows.collect()
        })
    }

    fn set_collection_parent(&self, id: &str, parent_id: Option<&str>) -> ApplicationResult<bool> {
        let changed = self.run(|conn| {
            conn.execute(
                "UPDATE collections SET parent_collection = ?1 WHERE id = ?2",
                params![parent_id, id],
            )
        })?;
        Ok(changed > 0)
    }

    fn update_collection_details(
        &self,
        id: &str,
        name: &str,
        description: &str,
    ) -> ApplicationResult<bool> {
        let changed = self.run(|conn| {
            conn.execute(
                "UPDATE collections SET name = ?1, description = ?2 WHERE id = ?3",
                params![name, nullable(description), id],
            )
        })?;
        Ok(changed > 0)
    }

    fn clear_self_parents(&self) -> ApplicationResult<usize> {
        self.run(|conn| {
            conn.execute(
                "UPDATE collections SET parent_collection = NULL WHERE parent_collection = id",
                [],
            )
        })
    }

    fn delete_collection(&self, id: &str) -> ApplicationResult<bool> {
        let changed =
            self.run(|conn| conn.execute("DELETE FROM collections WHERE id = ?1", [id]))?;
        Ok(changed > 0)
    }
}

impl RequestStore for SqliteSession<'_> {
    fn insert_request(
        &self,
        draft: &RequestDraft,
        sort_order: Option<i64>,
    ) -> ApplicationResult<RequestId> {
        self.run(|conn| {
            conn.execute(
                "INSERT INTO requests (
                   collection_id, name, description, method, url, headers, body,
                   body_type, body_format, auth, sort_order
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    draft.collection_id.as_deref(),
                    nullable(&draft.name),
                    nullable(&draft.description),
                    nullable(&draft.method),
                    nullable(&draft.url),
                    nullable(&draft.headers),
                    nullable(&draft.body),
                    nullable(&draft.body_type),
                    nullable(&draft.body_format),
                    nullable(&draft.auth),
                    sort_order,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    fn find_request(&self, id: RequestId) -> ApplicationResult<Option<Request>> {
        self.run(|conn| {
            conn.query_row(
                "SELECT r.id, r.collection_id, c.name, r.name, r.description, r.method, r.url,
                        r.headers, r.body, r.body_type, r.body_format, r.auth, r.sort_order
                 FROM requests r
                 LEFT JOIN collections c ON c.id = r.collection_id
                 WHERE r.id = ?1",
                [id],
                |row| {
                    Ok(Request {
                        id: row.get(0)?,
                        collection_id: row.get(1)?,
                        collection_name: row.get(2)?,
                        name: text(row, 3)?,
                        description: text(row, 4)?,
                        method: text(row, 5)?,
                        url: text(row, 6)?,
                        headers: text(row, 7)?,
                        body: text(row, 8)?,
                        body_type: text(row, 9)?,
                        body_format: text(row, 10)?,
                        auth: text(row, 11)?,
                        sort_order: row.get(12)?,
                        response: None,
                    })
                },
            )
            .optional()
        })
    }

    fn update_request(&self, id: RequestId, draft: &RequestDraft) -> ApplicationResult<bool> {
        let changed = self.run(|conn| {
            conn.execute(
                "UPDATE requests
                 SET name = ?1, description = ?2, method = ?3, url = ?4, headers = ?5,
                     body = ?6, body_type = ?7, body_format = ?8, auth = ?9
                 WHERE id = ?10",
                params![
                    nullable(&draft.name),
                    nullable(&draft.description),
                    nullable(&draft.method),
                    nullable(&draft.url),
                    nullable(&draft.headers),
                    nullable(&draft.body),
                    nullable(&draft.body_type),
                    nullable(&draft.body_format),
                    nullable(&draft.auth),
                    id,
                ],
            )
        })?;
        Ok(changed > 0)
    }

    fn delete_request(&self, id: RequestId) -> ApplicationResult<bool> {
        let changed = self.run(|conn| {
            conn.execute("DELETE FROM responses WHERE request_id = ?1", [id])?;
            conn.execute("DELETE FROM requests WHERE id = ?1", [id])
        })?;
        Ok(changed > 0)
    }

    fn delete_requests_in(&self, collection_id: &str) -> ApplicationResult<usize> {
        self.run(|conn| {
            conn.execute(
                "DELETE FROM responses
                 WHERE request_id IN (SELECT id FROM requests WHERE collection_id = ?1)",
                [collection_id],
            )?;
            conn.execute(
                "DELETE FROM requests WHERE collection_id = ?1",
                [collection_id],
            )
        })
    }

    fn list_request_summaries(&self) -> ApplicationResult<Vec<RequestSummary>> {
        self.run(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, collection_id, name, description, method, url, sort_order
                 FROM requests",
            )?;
            let rows = stmt.query_map([], summary_from_row)?;
            rows.collect()
        })
    }

    fn search_requests(&self, term: &str) -> ApplicationResult<Vec<RequestSummary>> {
        let pattern = like_pattern(term);
        self.run(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, collection_id, name, description, method, url, sort_order
                 FROM requests
                 WHERE name = ?1 OR url = ?1
                    OR name LIKE ?2 ESCAPE '\\'
                    OR url LIKE ?2 ESCAPE '\\'
                    OR body LIKE ?2 ESCAPE '\\'
                 ORDER BY id ASC",
            )?;
            let rows = stmt.query_map(params![term, pattern], summary_from_row)?;
            rows.collect()
        })
    }

    fn request_scope(&self, id: RequestId) -> ApplicationResult<Option<Scope>> {
        let collection_id: Option<Option<CollectionId>> = self.run(|conn| {
            conn.query_row(
                "SELECT collection_id FROM requests WHERE id = ?1",
                [id],
                |row| row.get(0),
            )
            .optional()
        })?;
        Ok(collection_id.map(Scope::from))
    }

    fn request_scopes(&self) -> ApplicationResult<Vec<Scope>> {
        let ids: Vec<Option<CollectionId>> = self.run(|conn| {
            let mut stmt =
                conn.prepare("SELECT DISTINCT collection_id FROM requests ORDER BY collection_id")?;
            let rows = stmt.query_map([], |row| row.get(0))?;
            rows.collect()
        })?;
        Ok(ids.into_iter().map(Scope::from).collect())
    }

    fn sort_slots(&self, scope: &Scope) -> ApplicationResult<Vec<SortSlot>> {
        self.run(|conn| {
            let mut stmt = conn.prepare_cached(
                "SELECT id, sort_order FROM requests WHERE collection_id IS ?1",
            )?;
            let rows = stmt.query_map([scope.collection_id()], |row| {
                Ok(SortSlot::new(row.get(0)?, row.get(1)?))
            })?;
            rows.collect()
        })
    }

    fn max_sort_order(&self, scope: &Scope) -> ApplicationResult<Option<i64>> {
        self.run(|conn| {
            conn.query_row(
                "SELECT MAX(sort_order) FROM requests WHERE collection_id IS ?1",
                [scope.collection_id()],
                |row| row.get(0),
            )
        })
    }

    fn apply_positions(&self, changes: &[PositionChange]) -> ApplicationResult<()> {
        let mut stmt = self
            .conn
            .prepare_cached("UPDATE requests SET sort_order = ?1 WHERE id = ?2")
            .map_err(store_error)?;

        for change in changes {
            let changed = stmt
                .execute(params![change.to, change.request_id])
                .map_err(store_error)?;
            if changed == 0 {
                return Err(ApplicationError::Store(format!(
                    "request {} disappeared while reordering",
                    change.request_id
                )));
            }
        }
        debug!(writes = changes.len(), "Sort positions written");
        Ok(())
    }

    fn set_request_scope(
        &self,
        id: RequestId,
        scope: &Scope,
        sort_order: Option<i64>,
    ) -> ApplicationResult<bool> {
        let changed = self.run(|conn| {
            conn.execute(
                "UPDATE requests SET collection_id = ?1, sort_order = ?2 WHERE id = ?3",
                params![scope.collection_id(), sort_order, id],
            )
        })?;
        Ok(changed > 0)
    }

    fn insert_response(
        &self,
        request_id: RequestId,
        record: &ResponseRecord,
    ) -> ApplicationResult<Response> {
        let id = self.run(|conn| {
            conn.execute(
                "INSERT INTO responses (status_code, headers, body, runtime_ms, request_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    record.status_code,
                    record.headers,
                    record.body,
                    record.runtime_ms,
                    request_id,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })?;

        Ok(Response {
            id,
            status_code: record.status_code,
            headers: record.headers.clone(),
            body: record.body.clone(),
            runtime_ms: record.runtime_ms,
            request_id,
        })
    }

    fn latest_response(&self, request_id: RequestId) -> ApplicationResult<Option<Response>> {
        self.run(|conn| {
            conn.query_row(
                "SELECT id, status_code, headers, body, runtime_ms, request_id
                 FROM responses WHERE request_id = ?1
                 ORDER BY id DESC LIMIT 1",
                [request_id],
                response_from_row,
            )
            .optional()
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn store() -> SqliteStore {
        SqliteStore::open_in_memory().unwrap()
    }

    fn collection(id: &str, parent: Option<&str>) -> Collection {
        Collection {
            id: id.to_string(),
            name: id.to_uppercase(),
            description: String::new(),
            schema: None,
            version: None,
            parent_collection_id: parent.map(ToString::to_string),
        }
    }

    #[test]
    fn collection_round_trip_keeps_origin_and_nulls() {
        let store = store();
        let imported = collection("root", None).with_origin(
            Some("https://schema.getpostman.com/json/collection/v2.1.0/collection.json".into()),
            Some(CollectionVersion {
                major: 2,
                minor: 1,
                patch: 0,
                identifier: String::new(),
            }),
        );
        let plain = collection("child", Some("root"));

        store
            .with_transaction(|s| {
                s.insert_collection(&imported)?;
                s.insert_collection(&plain)
            })
            .unwrap();

        let listed = store.with_transaction(|s| s.list_collections()).unwrap();
        assert_eq!(listed, vec![imported, plain]);
    }

    #[test]
    fn failed_transaction_rolls_back() {
        let store = store();

        let result: ApplicationResult<()> = store.with_transaction(|s| {
            s.insert_collection(&collection("a", None))?;
            Err(ApplicationError::InvalidHierarchy("boom".into()))
        });

        assert!(result.is_err());
        assert_eq!(store.with_transaction(|s| s.count_collections()).unwrap(), 0);
    }

    #[test]
    fn self_parents_are_cleared() {
        let store = store();
        store
            .with_transaction(|s| {
                s.insert_collection(&collection("a", Some("a")))?;
                s.insert_collection(&collection("b", Some("gone")))
            })
            .unwrap();

        let repaired = store.with_transaction(|s| s.clear_self_parents()).unwrap();

        assert_eq!(repaired, 1);
        let b = store
            .with_transaction(|s| s.find_collection("b"))
            .unwrap()
            .unwrap();
        assert_eq!(b.parent_collection_id.as_deref(), Some("gone"));
    }

    #[test]
    fn scope_queries_treat_null_as_unfiled() {
        let store = store();
        store
            .with_transaction(|s| {
                s.insert_request(&RequestDraft::new("a", "GET", "/a"), Some(0))?;
                s.insert_request(&RequestDraft::new("b", "GET", "/b"), Some(3))?;
                s.insert_request(&RequestDraft::new("c", "GET", "/c").in_collection("x"), None)
            })
            .unwrap();

        let (unfiled, max, scopes) = store
            .with_transaction(|s| {
                Ok((
                    s.sort_slots(&Scope::Unfiled)?,
                    s.max_sort_order(&Scope::Unfiled)?,
                    s.request_scopes()?,
                ))
            })
            .unwrap();

        assert_eq!(unfiled.len(), 2);
        assert_eq!(max, Some(3));
        assert_eq!(
            scopes,
            vec![Scope::Unfiled, Scope::Collection("x".to_string())]
        );
    }

    #[test]
    fn apply_positions_fails_on_missing_row() {
        let store = store();
        let result = store.with_transaction(|s| {
            s.apply_positions(&[PositionChange {
                request_id: 99,
                from: None,
                to: 0,
            }])
        });
        assert!(matches!(result, Err(ApplicationError::Store(_))));
    }

    #[test]
    fn empty_fields_are_stored_as_null_and_read_as_empty() {
        let store = store();
        let id = store
            .with_transaction(|s| s.insert_request(&RequestDraft::new("n", "GET", ""), Some(0)))
            .unwrap();

        let (url_is_null, request) = store
            .with_transaction(|s| {
                let request = s.find_request(id)?;
                Ok((request.as_ref().map(|r| r.url.is_empty()), request))
            })
            .unwrap();

        assert_eq!(url_is_null, Some(true));
        assert!(request.unwrap().collection_name.is_none());
        let conn = store.conn.lock().unwrap();
        let raw: Option<String> = conn
            .query_row("SELECT url FROM requests WHERE id = ?1", [id], |row| row.get(0))
            .unwrap();
        assert!(raw.is_none());
    }

    #[test]
    fn search_matches_fragments_and_escapes_wildcards() {
        let store = store();
        store
            .with_transaction(|s| {
                let mut with_body = RequestDraft::new("Create user", "POST", "/users");
                with_body.body = r#"{"discount": "100%"}"#.to_string();
                s.insert_request(&with_body, Some(0))?;
                s.insert_request(&RequestDraft::new("List", "GET", "/users"), Some(1))?;
                s.insert_request(&RequestDraft::new("Health", "GET", "/health"), Some(2))
            })
            .unwrap();

        let names = |term: &str| -> Vec<String> {
            store
                .with_transaction(|s| s.search_requests(term))
                .unwrap()
                .into_iter()
                .map(|r| r.name)
                .collect()
        };

        assert_eq!(names("users"), vec!["Create user", "List"]);
        assert_eq!(names("100%"), vec!["Create user"]);
        assert_eq!(names("%"), vec!["Create user"]);
        assert!(names("nothing").is_empty());
    }

    #[test]
    fn latest_response_wins() {
        let store = store();
        let latest = store
            .with_transaction(|s| {
                let id = s.insert_request(&RequestDraft::new("r", "GET", "/"), Some(0))?;
                s.insert_response(id, &ResponseRecord { status_code: 500, ..ResponseRecord::default() })?;
                s.insert_response(id, &ResponseRecord { status_code: 201, ..ResponseRecord::default() })?;
                s.latest_response(id)
            })
            .unwrap();

        assert_eq!(latest.map(|r| r.status_code), Some(201));
    }

    #[test]
    fn legacy_database_is_upgraded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(
                "CREATE TABLE collections (id TEXT PRIMARY KEY, name TEXT NOT NULL,
                   description TEXT, parent_collection TEXT);
                 CREATE TABLE requests (id INTEGER PRIMARY KEY AUTOINCREMENT,
                   collection_id TEXT NOT NULL, name TEXT, description TEXT, method TEXT,
                   url TEXT, headers TEXT, body TEXT, body_type TEXT, auth TEXT);
                 INSERT INTO collections (id, name) VALUES ('c', 'Old');
                 INSERT INTO requests (collection_id, name) VALUES ('c', 'kept');",
            )
            .unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();

        let (slots, collection) = store
            .with_transaction(|s| {
                Ok((
                    s.sort_slots(&Scope::Collection("c".to_string()))?,
                    s.find_collection("c")?,
                ))
            })
            .unwrap();
        assert_eq!(slots, vec![SortSlot::new(1, None)]);
        let collection = collection.unwrap();
        assert_eq!(collection.name, "Old");
        assert!(collection.version.is_none());

        let loose = store
            .with_transaction(|s| s.insert_request(&RequestDraft::new("loose", "GET", "/"), Some(0)))
            .unwrap();
        assert_eq!(loose, 2);
        let unfiled = store
            .with_transaction(|s| s.sort_slots(&Scope::Unfiled))
            .unwrap();
        assert_eq!(unfiled, vec![SortSlot::new(2, Some(0))]);
        let kept = store
            .with_transaction(|s| s.find_request(1))
            .unwrap()
            .unwrap();
        assert_eq!(kept.name, "kept");
    }

    #[test]
    fn import_rolls_back_when_a_write_fails_midway() {
        use crate::import::PostmanImporter;

        let store = store();
        store
            .conn
            .lock()
            .unwrap()
            .execute_batch(
                "CREATE TRIGGER fail_second_request BEFORE INSERT ON requests
                 WHEN NEW.name = 'Second'
                 BEGIN SELECT RAISE(ABORT, 'disk full'); END;",
            )
            .unwrap();
        let document = r#"{
            "info": {"name": "Shop"},
            "item": [
                {"name": "Auth", "item": [{"name": "First", "request": {"url": "/a"}}]},
                {"name": "Second", "request": {"url": "/b"}}
            ]
        }"#;

        let result = PostmanImporter::default().import_collection(&store, document);

        assert!(result.is_err());
        let (collections, requests) = store
            .with_transaction(|s| Ok((s.count_collections()?, s.list_request_summaries()?)))
            .unwrap();
        assert_eq!(collections, 0);
        assert!(requests.is_empty());
    }
}
