//! Desktop settings persisted in `app_config_dir()/settings.json`.
//!
//! The file is optional: a missing file yields the defaults, and unknown
//! keys are ignored so older builds can read newer files.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use specta::Type;
use tokio::sync::Mutex;

use crate::api::types::ApiError;

/// Settings file name inside the app config directory
pub const SETTINGS_FILENAME: &str = "settings.json";
/// Plugins folder name inside the app config directory
pub const PLUGINS_FOLDER_NAME: &str = "plugins";

const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

/// User-editable desktop settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Type)]
#[serde(rename_all = "camelCase", default)]
pub struct DesktopConfig {
    pub username: String,
    /// Accelerator toggling the search bar (e.g., "CommandOrControl+Space")
    pub search_shortcut: String,
    /// One of off, error, warn, info, debug, trace
    pub log_level: String,
    /// Maximum number of entries the search bar receives
    pub max_entries: u32,
    /// Identifiers of plugins the user switched off
    pub disabled_plugins: Vec<String>,
}

impl Default for DesktopConfig {
    fn default() -> Self {
        Self {
            username: String::from("michel"),
            search_shortcut: String::from("CommandOrControl+Space"),
            log_level: String::from("info"),
            max_entries: 50,
            disabled_plugins: Vec::new(),
        }
    }
}

impl DesktopConfig {
    /// Load settings from `path`, falling back to defaults when the file is absent.
    pub fn load(path: &Path) -> Result<Self, ApiError> {
        if !path.exists() {
            log::debug!("No settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ApiError::IoError {
            message: format!("Failed to read settings: {e}"),
        })?;

        let config: Self = serde_json::from_str(&content).map_err(|e| ApiError::InvalidInput {
            message: format!("Failed to parse settings: {e}"),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Write settings to `path`, creating the parent directory if needed.
    pub fn save(&self, path: &Path) -> Result<(), ApiError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ApiError::IoError {
                message: format!("Failed to create config directory: {e}"),
            })?;
        }

        let content = serde_json::to_string_pretty(self).map_err(|e| ApiError::IoError {
            message: format!("Failed to serialize settings: {e}"),
        })?;

        std::fs::write(path, content).map_err(|e| ApiError::IoError {
            message: format!("Failed to write settings: {e}"),
        })
    }

    /// Check every field against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` naming the first offending field.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.username.trim().is_empty() {
            return Err(ApiError::InvalidInput {
                message: "Username cannot be empty".to_string(),
            });
        }

        if self.search_shortcut.trim().is_empty() {
            return Err(ApiError::InvalidInput {
                message: "Search shortcut cannot be empty".to_string(),
            });
        }

        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(ApiError::InvalidInput {
                message: format!(
                    "Unknown log level '{}', expected one of {}",
                    self.log_level,
                    LOG_LEVELS.join(", ")
                ),
            });
        }

        if self.max_entries == 0 {
            return Err(ApiError::InvalidInput {
                message: "Maximum entries must be at least 1".to_string(),
            });
        }

        Ok(())
    }

    /// `log_level` as a filter, `Info` if it does not parse.
    pub fn log_level_filter(&self) -> log::LevelFilter {
        self.log_level
            .parse()
            .unwrap_or(log::LevelFilter::Info)
    }
}

/// Owner of the settings file and its in-memory copy.
///
/// Injected into Tauri as managed state; every change is written through.
pub struct ConfigStore {
    path: PathBuf,
    config: Mutex<DesktopConfig>,
}

impl ConfigStore {
    pub fn new(path: PathBuf, config: DesktopConfig) -> Self {
        Self {
            path,
            config: Mutex::new(config),
        }
    }

    /// Load the store from `path`; a missing file yields the defaults.
    pub async fn open(path: PathBuf) -> Result<Self, ApiError> {
        let load_path = path.clone();
        let config = tokio::task::spawn_blocking(move || DesktopConfig::load(&load_path))
            .await
            .map_err(|e| ApiError::IoError {
                message: format!("Failed to spawn blocking task: {e}"),
            })??;

        Ok(Self::new(path, config))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Plugins directory, a sibling of the settings file.
    pub fn plugins_root(&self) -> PathBuf {
        self.path
            .parent()
            .map(|dir| dir.join(PLUGINS_FOLDER_NAME))
            .unwrap_or_else(|| PathBuf::from(PLUGINS_FOLDER_NAME))
    }

    /// Snapshot of the current settings.
    pub async fn get(&self) -> DesktopConfig {
        self.config.lock().await.clone()
    }

    /// Validate, persist and adopt `config`.
    pub async fn update(&self, config: DesktopConfig) -> Result<DesktopConfig, ApiError> {
        self.update_with(|_| config).await
    }

    /// Derive new settings from the current ones, then validate, persist and adopt them.
    ///
    /// The lock is held from reading `current` until the new value is
    /// adopted, so concurrent changes such as
    /// [`ConfigStore::set_plugin_enabled`] are never overwritten.
    ///
    /// # Arguments
    ///
    /// * `derive` - Builds the next settings from the current ones
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` if the derived settings are invalid,
    /// or `ApiError::IoError` if they cannot be written. The current settings
    /// are left untouched in both cases.
    pub async fn update_with<F>(&self, derive: F) -> Result<DesktopConfig, ApiError>
    where
        F: FnOnce(&DesktopConfig) -> DesktopConfig,
    {
        let mut current = self.config.lock().await;

        let next = derive(&current);
        next.validate()?;
        self.persist(next.clone()).await?;
        *current = next.clone();

        log::info!("Settings updated: path={}", self.path.display());
        Ok(next)
    }

    /// Record the enable state of a plugin in the disabled list.
    pub async fn set_plugin_enabled(&self, identifier: &str, enable: bool) -> Result<(), ApiError> {
        let mut current = self.config.lock().await;

        let mut next = current.clone();
        next.disabled_plugins.retain(|id| id != identifier);
        if !enable {
            next.disabled_plugins.push(identifier.to_string());
            next.disabled_plugins.sort();
        }

        if next == *current {
            return Ok(());
        }

        self.persist(next.clone()).await?;
        *current = next;
        Ok(())
    }

    async fn persist(&self, config: DesktopConfig) -> Result<(), ApiError> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || config.save(&path))
            .await
            .map_err(|e| ApiError::IoError {
                message: format!("Failed to spawn blocking task: {e}"),
            })?
    }
}
