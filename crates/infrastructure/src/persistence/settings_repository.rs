//! Engine settings persistence.
//!
//! Stores settings in the platform-specific config directory:
//! - Linux: ~/.config/curlew/settings.json
//! - macOS: ~/Library/Application Support/curlew/settings.json
//! - Windows: %APPDATA%/curlew/settings.json

use std::path::PathBuf;

use curlew_domain::EngineSettings;
use tokio::fs;
use tracing::{debug, info};

use crate::serialization::{SerializationError, from_json, to_json_stable};

/// Error type for settings operations.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),

    /// Could not determine config directory.
    #[error("Could not determine config directory")]
    NoConfigDir,
}

/// Repository for engine settings.
#[derive(Debug, Clone, Default)]
pub struct SettingsRepository {
    path: Option<PathBuf>,
}

impl SettingsRepository {
    /// Creates a repository backed by the platform config directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            path: Self::default_path(),
        }
    }

    /// Creates a repository backed by an explicit file.
    #[must_use]
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Returns the default settings file location, if a config directory exists.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("curlew").join("settings.json"))
    }

    /// Loads settings from disk.
    ///
    /// Returns defaults if the file doesn't exist. Missing fields take their
    /// default values.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load(&self) -> Result<EngineSettings, SettingsError> {
        let Some(path) = self.path.as_deref() else {
            return Ok(EngineSettings::default());
        };

        if !fs::try_exists(path).await? {
            debug!(path = %path.display(), "No settings file; using defaults");
            return Ok(EngineSettings::default());
        }

        let content = fs::read_to_string(path).await?;
        Ok(from_json(&content)?)
    }

    /// Loads settings, writing a file with the defaults on first run so the
    /// user has something to edit.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read or parsed, or the
    /// default file cannot be written.
    pub async fn load_or_init(&self) -> Result<EngineSettings, SettingsError> {
        let Some(path) = self.path.as_deref() else {
            return Ok(EngineSettings::default());
        };
        if fs::try_exists(path).await? {
            return self.load().await;
        }

        let settings = EngineSettings::default();
        self.save(&settings).await?;
        info!(path = %path.display(), "Wrote default settings");
        Ok(settings)
    }

    /// Saves settings to disk, creating the parent directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if no location is known or the file cannot be written.
    pub async fn save(&self, settings: &EngineSettings) -> Result<(), SettingsError> {
        let Some(path) = self.path.as_deref() else {
            return Err(SettingsError::NoConfigDir);
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = to_json_stable(settings)?;
        fs::write(path, content).await?;
        Ok(())
    }
}
