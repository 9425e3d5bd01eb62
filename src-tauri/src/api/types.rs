//! Bridge types for commands and events.
//!
//! These types provide a stable API surface for the frontend,
//! hiding internal complexity.

use serde::{Deserialize, Serialize};
use specta::Type;

/// Unique identifier for a background operation (UUID v4 string)
pub type OperationId = String;

/// Metadata describing a plugin known to the launcher.
///
/// Field names are part of the frontend contract and stay snake_case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Type)]
pub struct PluginInfo {
    /// Stable unique key (e.g., "spellcheck")
    pub identifier: String,
    /// Human-readable display name
    pub name: String,
    /// Human-readable summary text
    pub description: String,
    /// Whether this plugin participates in indexing
    pub can_index: bool,
    /// Whether the plugin is currently active
    pub enable: bool,
}

/// A title/description pair shown in the search bar result list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Type)]
pub struct Entry {
    pub title: String,
    pub description: String,
}

/// Response for commands that start a background operation
#[derive(Debug, Clone, Serialize, Deserialize, Type)]
#[serde(rename_all = "camelCase")]
pub struct OperationStarted {
    pub operation_id: OperationId,
}

/// Payload of the `michel/plugin_enabled_changed` event
#[derive(Debug, Clone, Serialize, Deserialize, Type)]
#[serde(rename_all = "camelCase")]
pub struct PluginEnabledChangedEvent {
    pub plugin: PluginInfo,
}

/// Payload of the `michel/plugin_index_requested` event.
///
/// Consumed by whatever runs the plugin; the backend only tracks the run.
#[derive(Debug, Clone, Serialize, Deserialize, Type)]
#[serde(rename_all = "camelCase")]
pub struct PluginIndexRequestedEvent {
    pub operation_id: OperationId,
    pub identifier: String,
}

/// Payload of the `michel/plugin_index_finished` event
#[derive(Debug, Clone, Serialize, Deserialize, Type)]
#[serde(rename_all = "camelCase")]
pub struct PluginIndexFinishedEvent {
    pub operation_id: OperationId,
    pub identifier: String,
    /// Error message reported by the run, if it failed
    pub error: Option<String>,
}

/// Payload of the `michel/entries_updated` event
#[derive(Debug, Clone, Serialize, Deserialize, Type)]
#[serde(rename_all = "camelCase")]
pub struct EntriesUpdatedEvent {
    /// Trimmed input the entries were produced for
    pub input: String,
    pub plugin_id: String,
}

/// API errors for frontend consumption
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(tag = "type")]
pub enum ApiError {
    /// Invalid input parameter
    InvalidInput { message: String },
    /// IO error during file system operation
    IoError { message: String },
    /// No plugin registered under this identifier
    PluginNotFound { identifier: String },
    /// A plugin with this identifier is already registered
    PluginAlreadyRegistered { identifier: String },
    /// The plugin exists but is disabled
    PluginDisabled { identifier: String },
    /// The plugin does not participate in indexing
    PluginCannotIndex { identifier: String },
    /// An index run is already in flight for this plugin
    IndexInProgress { identifier: String },
    /// No in-flight operation matches the given ID
    OperationNotFound {
        #[serde(rename = "operationId")]
        operation_id: OperationId,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::InvalidInput { message } => write!(f, "Invalid input: {message}"),
            ApiError::IoError { message } => write!(f, "IO error: {message}"),
            ApiError::PluginNotFound { identifier } => {
                write!(f, "Plugin not found: {identifier}")
            }
            ApiError::PluginAlreadyRegistered { identifier } => {
                write!(f, "Plugin already registered: {identifier}")
            }
            ApiError::PluginDisabled { identifier } => {
                write!(f, "Plugin is disabled: {identifier}")
            }
            ApiError::PluginCannotIndex { identifier } => {
                write!(f, "Plugin does not support indexing: {identifier}")
            }
            ApiError::IndexInProgress { identifier } => {
                write!(f, "Index run already in progress for plugin: {identifier}")
            }
            ApiError::OperationNotFound { operation_id } => {
                write!(f, "Operation not found: {operation_id}")
            }
        }
    }
}

impl std::error::Error for ApiError {}
