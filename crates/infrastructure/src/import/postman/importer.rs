//! Postman Importer - Main Import Logic
//!
//! Validates an export completely before touching the store, then walks the
//! item tree depth-first in document order inside a single transaction.
//! Folders become collections, requests are inserted with positions counted
//! per folder, and empty nodes are skipped with a warning.

use curlew_application::ports::{Store, StoreSession};
use curlew_application::use_cases::insert_collection;
use curlew_application::{ApplicationError, ApplicationResult};
use curlew_domain::{Collection, CollectionId, CollectionVersion, ImportLimits, RequestDraft};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use super::types::{ItemKind, PostmanCollection, PostmanItem, PostmanText};
use super::warning::{ImportWarning, WarningStats};
use crate::serialization::{from_json, parse_value, to_canonical_json};

/// Name given to a root collection whose export has no name.
const UNTITLED: &str = "Untitled collection";

/// Import error types
#[derive(Debug, Error)]
pub enum ImportError {
    /// Document exceeds the maximum allowed size
    #[error("document too large: {size} bytes exceeds maximum of {max} bytes")]
    TooLarge {
        /// Actual size in bytes
        size: usize,
        /// Maximum allowed size in bytes
        max: usize,
    },
    /// JSON parsing failed
    #[error("invalid JSON: {0}")]
    InvalidJson(String),
    /// Document is not a Postman collection
    #[error("invalid Postman format: {0}")]
    InvalidFormat(String),
    /// Folders are nested deeper than allowed
    #[error("folders nested {depth} levels deep exceed maximum of {max}")]
    TooDeep {
        /// Deepest folder nesting found
        depth: usize,
        /// Maximum allowed nesting
        max: usize,
    },
    /// Too many items in the collection
    #[error("too many items: {count} exceeds maximum of {max}")]
    TooManyItems {
        /// Actual item count
        count: usize,
        /// Maximum allowed items
        max: usize,
    },
    /// A write failed and the import was rolled back
    #[error(transparent)]
    Store(#[from] ApplicationError),
}

impl From<ImportError> for ApplicationError {
    fn from(error: ImportError) -> Self {
        match error {
            ImportError::Store(inner) => inner,
            other => Self::ImportFormat(other.to_string()),
        }
    }
}

/// Preview of what will be imported
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportPreview {
    /// Name of the root collection
    pub collection_name: String,
    /// Schema URL declared by the export
    pub schema: Option<String>,
    /// Number of folders, each becoming a collection below the root
    pub folder_count: usize,
    /// Number of requests
    pub request_count: usize,
    /// Number of empty nodes that will be skipped
    pub skipped_count: usize,
    /// Warnings the import will produce
    pub warnings: Vec<ImportWarning>,
}

/// Result of a successful import
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    /// The root collection created from the export's `info` block
    pub root: Collection,
    /// Collections created, root included
    pub collections_created: usize,
    /// Requests created
    pub requests_created: usize,
    /// Warnings generated during import
    pub warnings: Vec<ImportWarning>,
}

/// Main Postman importer
#[derive(Debug, Clone, Copy, Default)]
pub struct PostmanImporter {
    limits: ImportLimits,
}

impl PostmanImporter {
    /// Create a new importer with the given limits
    #[must_use]
    pub const fn new(limits: ImportLimits) -> Self {
        Self { limits }
    }

    /// Parses and validates a document without writing anything.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is too large, is not valid JSON, is
    /// not a Postman collection, or exceeds the depth or item limits.
    pub fn parse(&self, content: &str) -> Result<PostmanCollection, ImportError> {
        if content.len() > self.limits.max_document_bytes {
            return Err(ImportError::TooLarge {
                size: content.len(),
                max: self.limits.max_document_bytes,
            });
        }

        let json = parse_value(content).map_err(|e| ImportError::InvalidJson(e.to_string()))?;
        detect_format(&json)?;

        let collection: PostmanCollection =
            from_json(content).map_err(|e| ImportError::InvalidFormat(e.to_string()))?;

        let (depth, count) = measure(&collection.item, 0);
        if depth > self.limits.max_depth {
            return Err(ImportError::TooDeep {
                depth,
                max: self.limits.max_depth,
            });
        }
        if count > self.limits.max_items {
            return Err(ImportError::TooManyItems {
                count,
                max: self.limits.max_items,
            });
        }
        Ok(collection)
    }

    /// Preview what will be imported without actually importing
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`Self::parse`].
    pub fn preview(&self, content: &str) -> Result<ImportPreview, ImportError> {
        let collection = self.parse(content)?;
        let root = root_collection(&collection);

        let mut walker = Walker::dry_run();
        walker.walk(&root.id, &collection.item, &root.name)?;
        let tally = walker.tally;

        Ok(ImportPreview {
            collection_name: root.name,
            schema: root.schema,
            folder_count: tally.folders,
            request_count: tally.requests,
            skipped_count: tally.skipped,
            warnings: tally.warnings,
        })
    }

    /// Imports a document into the store as one transaction.
    ///
    /// # Errors
    ///
    /// Returns a validation error before any write, or the first failing
    /// write, in which case nothing is committed.
    pub fn import_collection<S: Store>(
        &self,
        store: &S,
        content: &str,
    ) -> Result<ImportResult, ImportError> {
        let collection = self.parse(content)?;
        let root = root_collection(&collection);
        info!(name = %root.name, "Importing Postman collection");

        let tally = store.with_transaction(|session| {
            insert_collection(session, &root)?;
            let mut walker = Walker::writing(session);
            walker.walk(&root.id, &collection.item, &root.name)?;
            Ok(walker.tally)
        })?;

        let stats = WarningStats::from_warnings(&tally.warnings);
        info!(
            collection_id = %root.id,
            folders = tally.folders,
            requests = tally.requests,
            skipped = tally.skipped,
            warnings = stats.total(),
            "Postman collection imported"
        );

        Ok(ImportResult {
            root,
            collections_created: tally.folders + 1,
            requests_created: tally.requests,
            warnings: tally.warnings,
        })
    }
}

/// Rejects documents that are valid JSON but not a Postman collection.
fn detect_format(json: &serde_json::Value) -> Result<(), ImportError> {
    let Some(info) = json.get("info") else {
        if json.get("values").is_some() {
            return Err(ImportError::InvalidFormat(
                "document is a Postman environment, not a collection".to_string(),
            ));
        }
        return Err(ImportError::InvalidFormat(
            "missing \"info\" block".to_string(),
        ));
    };
    if !info.is_object() {
        return Err(ImportError::InvalidFormat(
            "\"info\" must be an object".to_string(),
        ));
    }

    let schema = info
        .get("schema")
        .and_then(serde_json::Value::as_str)
        .unwrap_or("");
    if schema.contains("v1.") {
        return Err(ImportError::InvalidFormat(format!(
            "unsupported schema {schema}; export the collection as v2.0 or v2.1"
        )));
    }
    match json.get("item") {
        None | Some(serde_json::Value::Array(_)) => Ok(()),
        Some(_) => Err(ImportError::InvalidFormat(
            "\"item\" must be an array".to_string(),
        )),
    }
}

/// Returns the deepest folder nesting and the total node count below `items`.
fn measure(items: &[PostmanItem], depth: usize) -> (usize, usize) {
    let mut deepest = depth;
    let mut count = items.len();
    for item in items {
        if item.kind() == ItemKind::Folder {
            let (child_depth, child_count) = measure(item.children(), depth + 1);
            deepest = deepest.max(child_depth);
            count += child_count;
        }
    }
    (deepest, count)
}

fn root_collection(collection: &PostmanCollection) -> Collection {
    let info = &collection.info;
    let name = if info.name.trim().is_empty() {
        UNTITLED
    } else {
        info.name.as_str()
    };
    let version = info.version.as_ref().map(|version| {
        let (major, minor, patch, identifier) = version.parts();
        CollectionVersion {
            major,
            minor,
            patch,
            identifier,
        }
    });

    Collection::new(name)
        .with_description(
            info.description
                .as_ref()
                .map(PostmanText::content)
                .unwrap_or_default(),
        )
        .with_origin(info.schema.clone(), version)
}

fn request_draft(parent_id: &str, item: &PostmanItem) -> ApplicationResult<Option<RequestDraft>> {
    let Some(request) = item.request.as_ref() else {
        return Ok(None);
    };
    let details = request.details();

    let description = item
        .description
        .as_ref()
        .or_else(|| details.and_then(|d| d.description.as_ref()))
        .map(PostmanText::content)
        .unwrap_or_default();

    Ok(Some(RequestDraft {
        collection_id: Some(parent_id.to_string()),
        name: item.name.clone(),
        description,
        method: request.method(),
        url: request.url(),
        headers: encode(details.and_then(|d| d.header.as_ref()))?,
        body: encode(details.and_then(|d| d.body.as_ref()))?,
        body_type: details
            .and_then(|d| d.body_mode())
            .unwrap_or_default()
            .to_string(),
        body_format: details.and_then(|d| d.body_language()).unwrap_or_default(),
        auth: encode(details.and_then(|d| d.auth.as_ref()))?,
    }))
}

fn encode(value: Option<&serde_json::Value>) -> ApplicationResult<String> {
    to_canonical_json(value).map_err(|e| ApplicationError::ImportFormat(e.to_string()))
}

#[derive(Debug, Default)]
struct Tally {
    folders: usize,
    requests: usize,
    skipped: usize,
    warnings: Vec<ImportWarning>,
}

/// Depth-first walk over the item tree. Without a session it only counts.
struct Walker<'a> {
    session: Option<&'a dyn StoreSession>,
    tally: Tally,
}

impl<'a> Walker<'a> {
    fn dry_run() -> Self {
        Self {
            session: None,
            tally: Tally::default(),
        }
    }

    fn writing(session: &'a dyn StoreSession) -> Self {
        Self {
            session: Some(session),
            tally: Tally::default(),
        }
    }

    fn walk(&mut self, parent_id: &str, items: &[PostmanItem], path: &str) -> ApplicationResult<()> {
        // Positions restart at zero in every folder.
        let mut position: i64 = 0;

        for item in items {
            let item_path = format!("{path}/{}", item.name);
            match item.kind() {
                ItemKind::Folder => {
                    let folder = Collection::new(item.name.as_str())
                        .with_description(
                            item.description
                                .as_ref()
                                .map(PostmanText::content)
                                .unwrap_or_default(),
                        )
                        .with_parent(Some(CollectionId::from(parent_id)));
                    if let Some(session) = self.session {
                        insert_collection(session, &folder)?;
                    }
                    self.tally.folders += 1;
                    self.walk(&folder.id, item.children(), &item_path)?;
                }
                ItemKind::Request => {
                    let ignored = item.children().len();
                    if ignored > 0 {
                        self.tally
                            .warnings
                            .push(ImportWarning::children_under_request(&item_path, ignored));
                    }
                    if let (Some(session), Some(draft)) =
                        (self.session, request_draft(parent_id, item)?)
                    {
                        let id = session.insert_request(&draft, Some(position))?;
                        debug!(request_id = id, position, path = %item_path, "Imported request");
                    }
                    position += 1;
                    self.tally.requests += 1;
                }
                ItemKind::Empty => {
                    self.tally.skipped += 1;
                    self.tally.warnings.push(ImportWarning::empty_node(&item_path));
                }
            }
        }
        Ok(())
    }
}
