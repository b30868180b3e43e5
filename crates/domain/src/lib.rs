//! Curlew Domain - Core business types
//!
//! This crate defines the domain model of the Curlew collection engine:
//! collections and their hierarchy, saved requests and their per-scope
//! ordering, and the engine settings.
//! All types here are pure Rust with no I/O dependencies.

pub mod collection;
pub mod error;
pub mod id;
pub mod ordering;
pub mod request;
pub mod response;
pub mod scope;
pub mod settings;

pub use collection::{
    Collection, CollectionForest, CollectionId, CollectionNode, CollectionVersion, build_forest,
};
pub use error::{DomainError, DomainResult};
pub use id::{generate_id, validate_id};
pub use ordering::{PositionChange, SortSlot};
pub use request::{Request, RequestDraft, RequestId, RequestSummary};
pub use response::{Response, ResponseRecord};
pub use scope::Scope;
pub use settings::{DeletePolicy, EngineSettings, ImportLimits};
