//! Process configuration from the environment.

use std::path::PathBuf;

use curlew_infrastructure::{SettingsRepository, SqliteStore};

/// Environment variable overriding the database location.
pub const DB_PATH_ENV: &str = "CURLEW_DB_PATH";

/// Errors resolving the process configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No override was given and the platform has no data directory.
    #[error("could not determine data directory; set {DB_PATH_ENV}")]
    NoDataDir,
}

/// Where the engine keeps its state.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite database file.
    pub db_path: PathBuf,
    /// Settings file repository.
    pub settings: SettingsRepository,
}

impl AppConfig {
    /// Resolves the configuration from `CURLEW_DB_PATH` and the platform
    /// directories.
    ///
    /// # Errors
    ///
    /// Returns an error if no database path can be determined.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::resolve(std::env::var_os(DB_PATH_ENV).map(PathBuf::from))
    }

    fn resolve(db_override: Option<PathBuf>) -> Result<Self, ConfigError> {
        let db_path = db_override
            .filter(|path| !path.as_os_str().is_empty())
            .or_else(SqliteStore::default_path)
            .ok_or(ConfigError::NoDataDir)?;

        Ok(Self {
            db_path,
            settings: SettingsRepository::new(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn override_wins() {
        let config = AppConfig::resolve(Some(PathBuf::from("/tmp/x.db"))).unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/x.db"));
    }

    #[test]
    fn empty_override_is_ignored() {
        let config = AppConfig::resolve(Some(PathBuf::new()));
        if let Ok(config) = config {
            assert_eq!(Some(config.db_path), SqliteStore::default_path());
        }
    }
}
