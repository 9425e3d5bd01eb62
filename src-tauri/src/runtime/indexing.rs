//! IndexCoordinator - bookkeeping for plugin index runs.
//!
//! The backend does not index anything itself. A run is requested here,
//! announced to the plugin host through an event, and closed when the host
//! reports back. The coordinator guarantees at most one run per plugin.

use std::collections::HashMap;

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::types::{ApiError, OperationId, OperationStarted};
use crate::plugins::registry::PluginRegistry;

/// Event name emitted when an index run is requested
pub const EVENT_PLUGIN_INDEX_REQUESTED: &str = "michel/plugin_index_requested";
/// Event name emitted when an index run is closed
pub const EVENT_PLUGIN_INDEX_FINISHED: &str = "michel/plugin_index_finished";

/// Tracks in-flight index runs keyed by plugin identifier.
pub struct IndexCoordinator {
    in_flight: Mutex<HashMap<String, OperationId>>,
}

impl IndexCoordinator {
    pub fn new() -> Self {
        Self {
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Open an index run for `identifier`.
    ///
    /// # Errors
    ///
    /// * `ApiError::PluginNotFound` - If the plugin is not registered
    /// * `ApiError::PluginDisabled` - If the plugin is disabled
    /// * `ApiError::PluginCannotIndex` - If the plugin does not index
    /// * `ApiError::IndexInProgress` - If a run is already open for it
    pub async fn begin(
        &self,
        registry: &PluginRegistry,
        identifier: &str,
    ) -> Result<OperationStarted, ApiError> {
        let plugin = registry.get(identifier).await?;

        if !plugin.enable {
            return Err(ApiError::PluginDisabled {
                identifier: identifier.to_string(),
            });
        }

        if !plugin.can_index {
            return Err(ApiError::PluginCannotIndex {
                identifier: identifier.to_string(),
            });
        }

        let mut in_flight = self.in_flight.lock().await;
        if in_flight.contains_key(identifier) {
            return Err(ApiError::IndexInProgress {
                identifier: identifier.to_string(),
            });
        }

        let operation_id = Uuid::new_v4().to_string();
        in_flight.insert(identifier.to_string(), operation_id.clone());

        log::info!("Index run started: identifier={identifier}, operation_id={operation_id}");

        Ok(OperationStarted { operation_id })
    }

    /// Close the run `operation_id` of `identifier`.
    pub async fn finish(&self, identifier: &str, operation_id: &str) -> Result<(), ApiError> {
        let mut in_flight = self.in_flight.lock().await;
        match in_flight.get(identifier) {
            Some(current) if current == operation_id => {
                in_flight.remove(identifier);
                log::info!(
                    "Index run finished: identifier={identifier}, operation_id={operation_id}"
                );
                Ok(())
            }
            _ => Err(ApiError::OperationNotFound {
                operation_id: operation_id.to_string(),
            }),
        }
    }

    /// Drop the open run of `identifier`, if any, returning its operation ID.
    pub async fn cancel(&self, identifier: &str) -> Option<OperationId> {
        let removed = self.in_flight.lock().await.remove(identifier);
        if let Some(operation_id) = &removed {
            log::info!("Index run cancelled: identifier={identifier}, operation_id={operation_id}");
        }
        removed
    }

    /// Whether a run is open for `identifier`.
    pub async fn in_progress(&self, identifier: &str) -> bool {
        self.in_flight.lock().await.contains_key(identifier)
    }
}

impl Default for IndexCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
