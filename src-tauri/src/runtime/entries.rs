//! EntryBoard - the entries plugins produced for the current search input.
//!
//! Plugins answer a search input asynchronously. Each answer replaces the
//! previous one from the same plugin, and the search bar reads the merged
//! view for the input it is displaying.

use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::api::types::{ApiError, Entry};
use crate::plugins::registry::PluginRegistry;

/// Latest answer of one plugin.
#[derive(Debug, Clone)]
struct PluginEntries {
    input: String,
    entries: Vec<Entry>,
}

/// Per-plugin store of search bar entries.
pub struct EntryBoard {
    boards: Mutex<HashMap<String, PluginEntries>>,
}

impl EntryBoard {
    pub fn new() -> Self {
        Self {
            boards: Mutex::new(HashMap::new()),
        }
    }

    /// Replace the entries `plugin_id` produced, now answering `input`.
    ///
    /// # Returns
    ///
    /// The trimmed input the entries were stored under.
    ///
    /// # Errors
    ///
    /// * `ApiError::InvalidInput` - If the input is blank
    pub async fn submit(
        &self,
        plugin_id: &str,
        input: &str,
        entries: Vec<Entry>,
    ) -> Result<String, ApiError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ApiError::InvalidInput {
                message: "Search input cannot be empty".to_string(),
            });
        }

        log::debug!(
            "Entries submitted: plugin_id={plugin_id}, input={input:?}, count={}",
            entries.len()
        );

        let mut boards = self.boards.lock().await;
        boards.insert(
            plugin_id.to_string(),
            PluginEntries {
                input: input.to_string(),
                entries,
            },
        );

        Ok(input.to_string())
    }

    /// Entries answering `input`, merged across enabled plugins.
    ///
    /// Plugins contribute in registry order and the result is capped at
    /// `max_entries`. Disabled or unregistered plugins contribute nothing,
    /// and a blank input yields no entries.
    pub async fn entries_for_input(
        &self,
        input: &str,
        registry: &PluginRegistry,
        max_entries: usize,
    ) -> Vec<Entry> {
        let input = input.trim();
        if input.is_empty() {
            return Vec::new();
        }

        let plugins = registry.list().await;
        let boards = self.boards.lock().await;

        plugins
            .iter()
            .filter(|plugin| plugin.enable)
            .filter_map(|plugin| boards.get(&plugin.identifier))
            .filter(|board| board.input == input)
            .flat_map(|board| board.entries.iter().cloned())
            .take(max_entries)
            .collect()
    }

    /// Forget everything `plugin_id` submitted.
    pub async fn clear_plugin(&self, plugin_id: &str) {
        let mut boards = self.boards.lock().await;
        if boards.remove(plugin_id).is_some() {
            log::debug!("Entries cleared: plugin_id={plugin_id}");
        }
    }
}

impl Default for EntryBoard {
    fn default() -> Self {
        Self::new()
    }
}
