//! Curlew Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus the Postman import walker.

pub mod import;
pub mod persistence;
pub mod serialization;

pub use import::{
    ImportError, ImportPreview, ImportResult, ImportWarning, PostmanCollection, PostmanImporter,
    WarningSeverity, WarningStats,
};
pub use persistence::{SettingsError, SettingsRepository, SqliteStore, StoreError};
pub use serialization::{
    SerializationError, from_json, parse_value, to_canonical_json, to_json_stable,
};
