//! Command layer.
//!
//! Every operation the shell can invoke is a [`Command`] variant. Commands
//! arrive as JSON objects tagged by name, for example
//! `{"command": "SetRequestSortOrder", "requestId": 4, "sortOrder": 0}`, and
//! answer with a JSON value or a human-readable error string.

use std::sync::Arc;

use curlew_application::ApplicationResult;
use curlew_application::use_cases::{CollectionTreeManager, RequestCatalog, RequestSequencer};
use curlew_domain::{CollectionId, EngineSettings, RequestDraft, RequestId, ResponseRecord};
use curlew_infrastructure::{PostmanImporter, SqliteStore};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

/// A call from the shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all_fields = "camelCase")]
pub enum Command {
    /// Creates a collection, optionally below a parent.
    CreateCollection {
        /// Display name.
        name: String,
        /// Free-form description.
        #[serde(default)]
        description: String,
        /// Parent collection, `None` for a root.
        #[serde(default)]
        parent_id: Option<CollectionId>,
    },
    /// Re-parents a collection, or moves it to the top level.
    UpdateCollectionParent {
        /// Collection to move.
        collection_id: CollectionId,
        /// New parent, `None` for the top level.
        #[serde(default)]
        parent_id: Option<CollectionId>,
    },
    /// Renames a collection and replaces its description.
    UpdateCollectionDetails {
        /// Collection to edit.
        collection_id: CollectionId,
        /// New name.
        name: String,
        /// New description.
        #[serde(default)]
        description: String,
    },
    /// Deletes a collection according to the configured delete policy.
    DeleteCollection {
        /// Collection to delete.
        collection_id: CollectionId,
    },
    /// Lists every collection, repairing self-parented rows first.
    GetAllCollections,
    /// Returns the nested collection view with requests attached.
    GetCollectionTree,
    /// Moves a request to a collection, or unfiles it.
    SetRequestCollection {
        /// Request to move.
        request_id: RequestId,
        /// Target collection, `None` for unfiled.
        #[serde(default)]
        collection_id: Option<CollectionId>,
    },
    /// Moves a request to a position within its scope.
    SetRequestSortOrder {
        /// Request to move.
        request_id: RequestId,
        /// Target position; clamped to the scope.
        sort_order: i64,
    },
    /// Lists request summaries grouped by scope in display order.
    GetAllRequestsList,
    /// Saves a new request at the end of its scope.
    SaveRequest {
        /// Request fields.
        request: RequestDraft,
        /// Response to record alongside the request.
        #[serde(default)]
        response: Option<ResponseRecord>,
    },
    /// Loads one request with its latest response.
    GetRequest {
        /// Request to load.
        request_id: RequestId,
    },
    /// Replaces the editable fields of a request.
    UpdateRequest {
        /// Request to edit.
        request_id: RequestId,
        /// New field values.
        request: RequestDraft,
        /// Response to record alongside the edit.
        #[serde(default)]
        response: Option<ResponseRecord>,
    },
    /// Deletes a request and its response history.
    DeleteRequest {
        /// Request to delete.
        request_id: RequestId,
    },
    /// Finds requests by name, url or body.
    SearchRequests {
        /// Search term.
        term: String,
    },
    /// Appends a response to a request's history.
    RecordResponse {
        /// Request the response belongs to.
        request_id: RequestId,
        /// Response data.
        response: ResponseRecord,
    },
    /// Imports a Postman collection export.
    ImportCollection {
        /// Raw export text.
        content: String,
    },
    /// Reports what an import would create without writing anything.
    PreviewImport {
        /// Raw export text.
        content: String,
    },
}

impl Command {
    /// Command name as it appears on the wire.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CreateCollection { .. } => "CreateCollection",
            Self::UpdateCollectionParent { .. } => "UpdateCollectionParent",
            Self::UpdateCollectionDetails { .. } => "UpdateCollectionDetails",
            Self::DeleteCollection { .. } => "DeleteCollection",
            Self::GetAllCollections => "GetAllCollections",
            Self::GetCollectionTree => "GetCollectionTree",
            Self::SetRequestCollection { .. } => "SetRequestCollection",
            Self::SetRequestSortOrder { .. } => "SetRequestSortOrder",
            Self::GetAllRequestsList => "GetAllRequestsList",
            Self::SaveRequest { .. } => "SaveRequest",
            Self::GetRequest { .. } => "GetRequest",
            Self::UpdateRequest { .. } => "UpdateRequest",
            Self::DeleteRequest { .. } => "DeleteRequest",
            Self::SearchRequests { .. } => "SearchRequests",
            Self::RecordResponse { .. } => "RecordResponse",
            Self::ImportCollection { .. } => "ImportCollection",
            Self::PreviewImport { .. } => "PreviewImport",
        }
    }
}

/// Owns the use cases and runs commands against one store.
pub struct CommandHandler {
    store: Arc<SqliteStore>,
    tree: CollectionTreeManager<Arc<SqliteStore>>,
    sequencer: RequestSequencer<Arc<SqliteStore>>,
    catalog: RequestCatalog<Arc<SqliteStore>>,
    importer: PostmanImporter,
}

impl CommandHandler {
    /// Wires the use cases to `store` using the delete policy and import
    /// limits from `settings`.
    #[must_use]
    pub fn new(store: Arc<SqliteStore>, settings: &EngineSettings) -> Self {
        info!(
            delete_policy = settings.delete_policy.as_str(),
            max_depth = settings.import.max_depth,
            "Command handler ready"
        );
        Self {
            tree: CollectionTreeManager::new(Arc::clone(&store), settings.delete_policy),
            sequencer: RequestSequencer::new(Arc::clone(&store)),
            catalog: RequestCatalog::new(Arc::clone(&store)),
            importer: PostmanImporter::new(settings.import),
            store,
        }
    }

    /// Runs one command.
    ///
    /// Blocks on the store; async callers should run it on a blocking thread.
    ///
    /// # Errors
    ///
    /// Returns the error message of whichever layer rejected the command.
    pub fn handle(&self, command: Command) -> Result<Value, String> {
        debug!(command = command.name(), "Handling command");

        match command {
            Command::CreateCollection {
                name,
                description,
                parent_id,
            } => respond(self.tree.create(&name, &description, parent_id.as_deref())),
            Command::UpdateCollectionParent {
                collection_id,
                parent_id,
            } => respond(
                self.tree
                    .update_parent(&collection_id, parent_id.as_deref()),
            ),
            Command::UpdateCollectionDetails {
                collection_id,
                name,
                description,
            } => respond(self.tree.update_details(&collection_id, &name, &description)),
            Command::DeleteCollection { collection_id } => respond(self.tree.delete(&collection_id)),
            Command::GetAllCollections => respond(self.tree.list_all()),
            Command::GetCollectionTree => respond(self.tree.tree()),
            Command::SetRequestCollection {
                request_id,
                collection_id,
            } => respond(
                self.sequencer
                    .set_request_collection(request_id, collection_id.as_deref()),
            ),
            Command::SetRequestSortOrder {
                request_id,
                sort_order,
            } => respond(self.sequencer.set_position(request_id, sort_order)),
            Command::GetAllRequestsList => respond(self.sequencer.list_ordered()),
            Command::SaveRequest { request, response } => {
                respond(self.catalog.save(&request, response.as_ref()))
            }
            Command::GetRequest { request_id } => respond(self.catalog.get(request_id)),
            Command::UpdateRequest {
                request_id,
                request,
                response,
            } => respond(self.catalog.update(request_id, &request, response.as_ref())),
            Command::DeleteRequest { request_id } => respond(self.catalog.delete(request_id)),
            Command::SearchRequests { term } => respond(self.catalog.search(&term)),
            Command::RecordResponse {
                request_id,
                response,
            } => respond(self.catalog.record_response(request_id, &response)),
            Command::ImportCollection { content } => respond(
                self.importer
                    .import_collection(&self.store, &content)
                    .map_err(Into::into),
            ),
            Command::PreviewImport { content } => {
                respond(self.importer.preview(&content).map_err(Into::into))
            }
        }
    }
}

fn respond<T: Serialize>(result: ApplicationResult<T>) -> Result<Value, String> {
    let value = result.map_err(to_client_error)?;
    serde_json::to_value(value).map_err(to_client_error)
}

fn to_client_error(error: impl std::fmt::Display) -> String {
    error.to_string()
}
