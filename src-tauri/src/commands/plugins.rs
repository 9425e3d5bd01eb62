//! Plugin-related Tauri commands.
//!
//! These commands provide the frontend API for the settings window:
//! listing plugins, switching them on and off, and requesting index runs.

use tauri::{AppHandle, Emitter, State};

use crate::api::types::{
    ApiError, OperationId, OperationStarted, PluginEnabledChangedEvent,
    PluginIndexFinishedEvent, PluginIndexRequestedEvent, PluginInfo,
};
use crate::config::ConfigStore;
use crate::plugins::registry::PluginRegistry;
use crate::runtime::entries::EntryBoard;
use crate::runtime::indexing::{
    IndexCoordinator, EVENT_PLUGIN_INDEX_FINISHED, EVENT_PLUGIN_INDEX_REQUESTED,
};

/// Event name for plugin enable changes
pub const EVENT_PLUGIN_ENABLED_CHANGED: &str = "michel/plugin_enabled_changed";

/// What the enable change did, so the command can announce it.
struct EnableOutcome {
    plugin: PluginInfo,
    cancelled_run: Option<OperationId>,
}

async fn plugin_set_enabled_inner(
    registry: &PluginRegistry,
    config: &ConfigStore,
    entries: &EntryBoard,
    indexing: &IndexCoordinator,
    identifier: String,
    enable: bool,
) -> Result<EnableOutcome, ApiError> {
    log::info!("plugin_set_enabled called: identifier={identifier}, enable={enable}");

    let previous = registry.get(&identifier).await?.enable;
    let plugin = registry.set_enabled(&identifier, enable).await?;

    if let Err(e) = config.set_plugin_enabled(&identifier, enable).await {
        log::error!(
            "Failed to persist enable state, reverting: identifier={identifier}, error={e}"
        );
        registry.set_enabled(&identifier, previous).await?;
        return Err(e);
    }

    let cancelled_run = if enable {
        None
    } else {
        entries.clear_plugin(&identifier).await;
        indexing.cancel(&identifier).await
    };

    Ok(EnableOutcome {
        plugin,
        cancelled_run,
    })
}

async fn plugin_finish_index_inner(
    indexing: &IndexCoordinator,
    identifier: String,
    operation_id: OperationId,
    error: Option<String>,
) -> Result<PluginIndexFinishedEvent, ApiError> {
    log::debug!(
        "plugin_finish_index called: identifier={identifier}, operation_id={operation_id}, error={error:?}"
    );

    indexing.finish(&identifier, &operation_id).await?;

    if let Some(error) = &error {
        log::warn!("Index run failed: identifier={identifier}, error={error}");
    }

    Ok(PluginIndexFinishedEvent {
        operation_id,
        identifier,
        error,
    })
}

async fn plugin_run_index_all_inner(
    registry: &PluginRegistry,
    indexing: &IndexCoordinator,
) -> Vec<PluginIndexRequestedEvent> {
    let mut requested = Vec::new();
    for plugin in registry.indexable().await {
        match indexing.begin(registry, &plugin.identifier).await {
            Ok(started) => requested.push(PluginIndexRequestedEvent {
                operation_id: started.operation_id,
                identifier: plugin.identifier,
            }),
            Err(e) => log::debug!("Not indexing {}: {e}", plugin.identifier),
        }
    }
    requested
}

/// What a re-scan changed, so the command can announce cancelled runs.
struct RefreshResult {
    plugins: Vec<PluginInfo>,
    cancelled_runs: Vec<PluginIndexFinishedEvent>,
}

async fn plugin_refresh_inner(
    registry: &PluginRegistry,
    config: &ConfigStore,
    entries: &EntryBoard,
    indexing: &IndexCoordinator,
) -> Result<RefreshResult, ApiError> {
    let settings = config.get().await;
    let outcome = registry
        .refresh(&config.plugins_root(), &settings.disabled_plugins)
        .await?;

    let mut cancelled_runs = Vec::new();
    for plugin in outcome.removed {
        entries.clear_plugin(&plugin.identifier).await;
        if let Some(operation_id) = indexing.cancel(&plugin.identifier).await {
            cancelled_runs.push(PluginIndexFinishedEvent {
                operation_id,
                identifier: plugin.identifier,
                error: Some("plugin removed".to_string()),
            });
        }
    }

    Ok(RefreshResult {
        plugins: registry.list().await,
        cancelled_runs,
    })
}

/// List every known plugin in registration order.
#[tauri::command]
#[specta::specta]
pub async fn plugin_list(registry: State<'_, PluginRegistry>) -> Result<Vec<PluginInfo>, ApiError> {
    let plugins = registry.list().await;
    log::debug!("plugin_list result: count={}", plugins.len());
    Ok(plugins)
}

/// Enable or disable a plugin.
///
/// The new state is persisted in the desktop settings. Disabling a plugin
/// also drops its search bar entries and cancels its open index run.
///
/// # Arguments
///
/// * `identifier` - Plugin identifier (e.g., "spellcheck", "files")
/// * `enable` - The requested state
///
/// # Returns
///
/// The updated plugin record.
///
/// # Events Emitted
///
/// * `michel/plugin_enabled_changed` - With the updated plugin record
/// * `michel/plugin_index_finished` - If an open index run was cancelled
///
/// # Errors
///
/// * `ApiError::PluginNotFound` - If the plugin is not registered
/// * `ApiError::IoError` - If the settings cannot be written; the plugin
///   keeps its previous state
#[tauri::command]
#[specta::specta]
pub async fn plugin_set_enabled(
    app: AppHandle,
    registry: State<'_, PluginRegistry>,
    config: State<'_, ConfigStore>,
    entries: State<'_, EntryBoard>,
    indexing: State<'_, IndexCoordinator>,
    identifier: String,
    enable: bool,
) -> Result<PluginInfo, ApiError> {
    let outcome =
        plugin_set_enabled_inner(&registry, &config, &entries, &indexing, identifier, enable)
            .await?;

    if let Some(operation_id) = outcome.cancelled_run {
        let event = PluginIndexFinishedEvent {
            operation_id,
            identifier: outcome.plugin.identifier.clone(),
            error: Some("plugin disabled".to_string()),
        };
        if let Err(e) = app.emit(EVENT_PLUGIN_INDEX_FINISHED, &event) {
            log::error!("Failed to emit index finished event: {e}");
        }
    }

    let event = PluginEnabledChangedEvent {
        plugin: outcome.plugin.clone(),
    };
    if let Err(e) = app.emit(EVENT_PLUGIN_ENABLED_CHANGED, &event) {
        log::error!("Failed to emit plugin enabled changed event: {e}");
    }

    Ok(outcome.plugin)
}

/// Request an index run for a plugin.
///
/// Returns immediately with an operation ID. The plugin host picks the
/// request up from the `michel/plugin_index_requested` event and reports
/// completion through `plugin_finish_index`.
///
/// # Arguments
///
/// * `identifier` - Plugin identifier (e.g., "files")
///
/// # Errors
///
/// * `ApiError::PluginNotFound` - If the plugin is not registered
/// * `ApiError::PluginDisabled` - If the plugin is disabled
/// * `ApiError::PluginCannotIndex` - If the plugin does not index
/// * `ApiError::IndexInProgress` - If a run is already open for the plugin
#[tauri::command]
#[specta::specta]
pub async fn plugin_run_index(
    app: AppHandle,
    registry: State<'_, PluginRegistry>,
    indexing: State<'_, IndexCoordinator>,
    identifier: String,
) -> Result<OperationStarted, ApiError> {
    log::info!("plugin_run_index called: identifier={identifier}");

    let started = indexing.begin(&registry, &identifier).await?;

    let event = PluginIndexRequestedEvent {
        operation_id: started.operation_id.clone(),
        identifier,
    };
    if let Err(e) = app.emit(EVENT_PLUGIN_INDEX_REQUESTED, &event) {
        log::error!(
            "Failed to emit index requested event: {e}, operation_id={}",
            started.operation_id
        );
    }

    Ok(started)
}

/// Request an index run for every enabled plugin that indexes.
///
/// Plugins with a run already open are skipped.
///
/// # Returns
///
/// One started operation per requested run.
#[tauri::command]
#[specta::specta]
pub async fn plugin_run_index_all(
    app: AppHandle,
    registry: State<'_, PluginRegistry>,
    indexing: State<'_, IndexCoordinator>,
) -> Result<Vec<OperationStarted>, ApiError> {
    let requested = plugin_run_index_all_inner(&registry, &indexing).await;
    log::info!("plugin_run_index_all: requested={}", requested.len());

    let mut started = Vec::with_capacity(requested.len());
    for event in requested {
        if let Err(e) = app.emit(EVENT_PLUGIN_INDEX_REQUESTED, &event) {
            log::error!(
                "Failed to emit index requested event: {e}, operation_id={}",
                event.operation_id
            );
        }
        started.push(OperationStarted {
            operation_id: event.operation_id,
        });
    }

    Ok(started)
}

/// Re-scan the plugins directory and return the updated plugin list.
///
/// Plugins whose directory was removed lose their entries and open runs.
///
/// # Returns
///
/// Every known plugin in registration order.
///
/// # Events Emitted
///
/// * `michel/plugin_index_finished` - Once per open run of a removed plugin
///
/// # Errors
///
/// * `ApiError::IoError` - If the plugins directory cannot be read
#[tauri::command]
#[specta::specta]
pub async fn plugin_refresh(
    app: AppHandle,
    registry: State<'_, PluginRegistry>,
    config: State<'_, ConfigStore>,
    entries: State<'_, EntryBoard>,
    indexing: State<'_, IndexCoordinator>,
) -> Result<Vec<PluginInfo>, ApiError> {
    log::info!("plugin_refresh called");
    let result = plugin_refresh_inner(&registry, &config, &entries, &indexing).await?;

    for event in &result.cancelled_runs {
        if let Err(e) = app.emit(EVENT_PLUGIN_INDEX_FINISHED, event) {
            log::error!(
                "Failed to emit index finished event: {e}, operation_id={}",
                event.operation_id
            );
        }
    }

    Ok(result.plugins)
}

/// Close an index run, optionally reporting the error it ended with.
///
/// # Arguments
///
/// * `identifier` - Plugin the run belongs to
/// * `operation_id` - ID returned by `plugin_run_index`
/// * `error` - Failure message, `None` when the run succeeded
///
/// # Events Emitted
///
/// * `michel/plugin_index_finished`
///
/// # Errors
///
/// * `ApiError::OperationNotFound` - If no such run is open
#[tauri::command]
#[specta::specta]
pub async fn plugin_finish_index(
    app: AppHandle,
    indexing: State<'_, IndexCoordinator>,
    identifier: String,
    operation_id: OperationId,
    error: Option<String>,
) -> Result<(), ApiError> {
    let event = plugin_finish_index_inner(&indexing, identifier, operation_id, error).await?;

    if let Err(e) = app.emit(EVENT_PLUGIN_INDEX_FINISHED, &event) {
        log::error!(
            "Failed to emit index finished event: {e}, operation_id={}",
            event.operation_id
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::Entry;
    use crate::config::{DesktopConfig, SETTINGS_FILENAME};

    struct Fixture {
        dir: tempfile::TempDir,
        registry: PluginRegistry,
        config: ConfigStore,
        entries: EntryBoard,
        indexing: IndexCoordinator,
    }

    async fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigStore::open(dir.path().join(SETTINGS_FILENAME)).await.unwrap();
        let registry = PluginRegistry::new();
        registry
            .register(PluginInfo {
                identifier: "files".to_string(),
                name: "Files".to_string(),
                description: "Local files".to_string(),
                can_index: true,
                enable: true,
            })
            .await
            .unwrap();

        Fixture {
            dir,
            registry,
            config,
            entries: EntryBoard::new(),
            indexing: IndexCoordinator::new(),
        }
    }

    #[tokio::test]
    async fn test_disable_plugin_cleans_up() {
        let f = fixture().await;
        f.entries
            .submit(
                "files",
                "report",
                vec![Entry {
                    title: "report.pdf".to_string(),
                    description: "~/Documents".to_string(),
                }],
            )
            .await
            .unwrap();
        let started = f.indexing.begin(&f.registry, "files").await.unwrap();

        let outcome = plugin_set_enabled_inner(
            &f.registry,
            &f.config,
            &f.entries,
            &f.indexing,
            "files".to_string(),
            false,
        )
        .await
        .unwrap();

        assert!(!outcome.plugin.enable);
        assert_eq!(outcome.cancelled_run, Some(started.operation_id));
        assert!(!f.indexing.in_progress("files").await);
        assert!(f
            .entries
            .entries_for_input("report", &f.registry, 50)
            .await
            .is_empty());
        assert_eq!(f.config.get().await.disabled_plugins, vec!["files"]);
        assert_eq!(
            DesktopConfig::load(f.config.path()).unwrap().disabled_plugins,
            vec!["files"]
        );
    }

    #[tokio::test]
    async fn test_enable_plugin_updates_settings() {
        let f = fixture().await;
        plugin_set_enabled_inner(
            &f.registry,
            &f.config,
            &f.entries,
            &f.indexing,
            "files".to_string(),
            false,
        )
        .await
        .unwrap();

        let outcome = plugin_set_enabled_inner(
            &f.registry,
            &f.config,
            &f.entries,
            &f.indexing,
            "files".to_string(),
            true,
        )
        .await
        .unwrap();

        assert!(outcome.plugin.enable);
        assert!(outcome.cancelled_run.is_none());
        assert!(f.config.get().await.disabled_plugins.is_empty());
    }

    #[tokio::test]
    async fn test_set_enabled_unknown_plugin() {
        let f = fixture().await;

        let result = plugin_set_enabled_inner(
            &f.registry,
            &f.config,
            &f.entries,
            &f.indexing,
            "missing".to_string(),
            false,
        )
        .await;

        assert!(matches!(result, Err(ApiError::PluginNotFound { .. })));
        assert!(f.config.get().await.disabled_plugins.is_empty());
    }

    #[tokio::test]
    async fn test_finish_index_reports_error() {
        let f = fixture().await;
        let started = f.indexing.begin(&f.registry, "files").await.unwrap();

        let event = plugin_finish_index_inner(
            &f.indexing,
            "files".to_string(),
            started.operation_id.clone(),
            Some("disk full".to_string()),
        )
        .await
        .unwrap();

        assert_eq!(event.operation_id, started.operation_id);
        assert_eq!(event.error.as_deref(), Some("disk full"));
        assert!(!f.indexing.in_progress("files").await);
    }

    #[tokio::test]
    async fn test_finish_index_unknown_operation() {
        let f = fixture().await;

        let result = plugin_finish_index_inner(
            &f.indexing,
            "files".to_string(),
            "nope".to_string(),
            None,
        )
        .await;

        assert!(matches!(result, Err(ApiError::OperationNotFound { .. })));
    }

    #[tokio::test]
    async fn test_run_index_all_skips_busy_and_unindexable() {
        let f = fixture().await;
        for (identifier, can_index) in [("mail", true), ("calc", false)] {
            f.registry
                .register(PluginInfo {
                    identifier: identifier.to_string(),
                    name: identifier.to_string(),
                    description: String::new(),
                    can_index,
                    enable: true,
                })
                .await
                .unwrap();
        }
        f.indexing.begin(&f.registry, "files").await.unwrap();

        let requested = plugin_run_index_all_inner(&f.registry, &f.indexing).await;

        assert_eq!(requested.len(), 1);
        assert_eq!(requested[0].identifier, "mail");
        assert!(f.indexing.in_progress("mail").await);
    }

    #[tokio::test]
    async fn test_refresh_drops_removed_plugins() {
        let f = fixture().await;
        let plugins_root = f.config.plugins_root();
        let notes_dir = plugins_root.join("notes");
        std::fs::create_dir_all(&notes_dir).unwrap();
        std::fs::write(
            notes_dir.join(crate::plugins::manifest::MANIFEST_FILENAME),
            r#"{"identifier": "notes", "name": "Notes"}"#,
        )
        .unwrap();

        let started = f.indexing.begin(&f.registry, "files").await.unwrap();

        let result = plugin_refresh_inner(&f.registry, &f.config, &f.entries, &f.indexing)
            .await
            .unwrap();

        let ids: Vec<&str> = result.plugins.iter().map(|p| p.identifier.as_str()).collect();
        assert_eq!(ids, vec!["notes"]);
        assert!(!f.indexing.in_progress("files").await);

        assert_eq!(result.cancelled_runs.len(), 1);
        let cancelled = &result.cancelled_runs[0];
        assert_eq!(cancelled.identifier, "files");
        assert_eq!(cancelled.operation_id, started.operation_id);
        assert_eq!(cancelled.error.as_deref(), Some("plugin removed"));
    }

    #[tokio::test]
    async fn test_refresh_without_open_runs_cancels_nothing() {
        let f = fixture().await;

        let result = plugin_refresh_inner(&f.registry, &f.config, &f.entries, &f.indexing)
            .await
            .unwrap();

        assert!(result.plugins.is_empty());
        assert!(result.cancelled_runs.is_empty());
    }

    #[tokio::test]
    async fn test_set_enabled_reverts_when_settings_unwritable() {
        let f = fixture().await;
        let blocker = f.dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();
        let config = ConfigStore::new(blocker.join(SETTINGS_FILENAME), DesktopConfig::default());
        let started = f.indexing.begin(&f.registry, "files").await.unwrap();

        let result = plugin_set_enabled_inner(
            &f.registry,
            &config,
            &f.entries,
            &f.indexing,
            "files".to_string(),
            false,
        )
        .await;

        assert!(matches!(result, Err(ApiError::IoError { .. })));
        assert!(f.registry.get("files").await.unwrap().enable);
        assert!(config.get().await.disabled_plugins.is_empty());
        assert!(f.indexing.in_progress("files").await);
        f.indexing
            .finish("files", &started.operation_id)
            .await
            .unwrap();
    }
}
