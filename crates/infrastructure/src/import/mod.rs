//! Collection import.

pub mod postman;

pub use postman::{
    ImportError, ImportPreview, ImportResult, ImportWarning, PostmanCollection, PostmanImporter,
    WarningSeverity, WarningStats,
};
