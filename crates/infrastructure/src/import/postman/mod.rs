//! Postman Import Module
//!
//! Imports Postman Collection v2.0 / v2.1 exports into the collection store.

pub mod importer;
pub mod types;
pub mod warning;

pub use importer::{ImportError, ImportPreview, ImportResult, PostmanImporter};
pub use types::PostmanCollection;
pub use warning::{ImportWarning, WarningSeverity, WarningStats};
