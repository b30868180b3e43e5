//! Persistence adapters.
//!
//! The SQLite store backs the collection and request ports; engine settings
//! live in a JSON file next to the other per-user configuration.

mod settings_repository;
mod sqlite_store;

pub use settings_repository::{SettingsError, SettingsRepository};
pub use sqlite_store::{SqliteStore, StoreError};
