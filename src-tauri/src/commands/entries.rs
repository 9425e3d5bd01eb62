//! Search bar commands.
//!
//! Plugins push entries for an input; the search bar fetches the merged
//! view for whatever the user is currently typing.

use tauri::{AppHandle, Emitter, State};

use crate::api::types::{ApiError, EntriesUpdatedEvent, Entry};
use crate::config::ConfigStore;
use crate::plugins::registry::PluginRegistry;
use crate::runtime::entries::EntryBoard;

/// Event name emitted when a plugin submitted new entries
pub const EVENT_ENTRIES_UPDATED: &str = "michel/entries_updated";

async fn entries_fetch_for_input_inner(
    entries: &EntryBoard,
    registry: &PluginRegistry,
    config: &ConfigStore,
    input: String,
) -> Vec<Entry> {
    let max_entries = config.get().await.max_entries as usize;
    entries
        .entries_for_input(&input, registry, max_entries)
        .await
}

async fn entries_submit_inner(
    entries: &EntryBoard,
    registry: &PluginRegistry,
    plugin_id: String,
    input: String,
    submitted: Vec<Entry>,
) -> Result<EntriesUpdatedEvent, ApiError> {
    let plugin = registry.get(&plugin_id).await?;
    if !plugin.enable {
        return Err(ApiError::PluginDisabled {
            identifier: plugin_id,
        });
    }

    let input = entries.submit(&plugin_id, &input, submitted).await?;

    Ok(EntriesUpdatedEvent { input, plugin_id })
}

/// Fetch the entries enabled plugins produced for `input`.
///
/// A blank input yields an empty list.
#[tauri::command]
#[specta::specta]
pub async fn entries_fetch_for_input(
    entries: State<'_, EntryBoard>,
    registry: State<'_, PluginRegistry>,
    config: State<'_, ConfigStore>,
    input: String,
) -> Result<Vec<Entry>, ApiError> {
    Ok(entries_fetch_for_input_inner(&entries, &registry, &config, input).await)
}

/// Publish the entries `plugin_id` produced for `input`.
///
/// Replaces whatever the plugin published before.
///
/// # Arguments
///
/// * `plugin_id` - Identifier of the submitting plugin (e.g., "notes")
/// * `input` - The search bar input the entries answer; trimmed before storing
/// * `submitted` - The plugin's entries, best first
///
/// # Events Emitted
///
/// * `michel/entries_updated` - So the search bar can refetch
///
/// # Errors
///
/// * `ApiError::PluginNotFound` - If the plugin is not registered
/// * `ApiError::PluginDisabled` - If the plugin is disabled
/// * `ApiError::InvalidInput` - If the input is blank
#[tauri::command]
#[specta::specta]
pub async fn entries_submit(
    app: AppHandle,
    entries: State<'_, EntryBoard>,
    registry: State<'_, PluginRegistry>,
    plugin_id: String,
    input: String,
    submitted: Vec<Entry>,
) -> Result<(), ApiError> {
    let event = entries_submit_inner(&entries, &registry, plugin_id, input, submitted).await?;

    if let Err(e) = app.emit(EVENT_ENTRIES_UPDATED, &event) {
        log::error!("Failed to emit entries updated event: {e}");
    }

    Ok(())
}
