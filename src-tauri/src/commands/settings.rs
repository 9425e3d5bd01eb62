//! Desktop settings commands.

use tauri::State;

use crate::api::types::ApiError;
use crate::config::{ConfigStore, DesktopConfig};

async fn settings_update_inner(
    config: &ConfigStore,
    next: DesktopConfig,
) -> Result<DesktopConfig, ApiError> {
    let mut restart_needed = false;

    // Enable state is owned by plugin_set_enabled; keep the live list.
    let updated = config
        .update_with(|current| {
            restart_needed = next.search_shortcut != current.search_shortcut
                || next.log_level != current.log_level;
            DesktopConfig {
                disabled_plugins: current.disabled_plugins.clone(),
                ..next
            }
        })
        .await?;

    if restart_needed {
        log::info!("Shortcut or log level changed; takes effect on next launch");
    }

    Ok(updated)
}

/// Get the current desktop settings.
#[tauri::command]
#[specta::specta]
pub async fn settings_get(config: State<'_, ConfigStore>) -> Result<DesktopConfig, ApiError> {
    Ok(config.get().await)
}

/// Validate and save new desktop settings.
///
/// `disabledPlugins` is ignored; use `plugin_set_enabled` instead.
/// The search shortcut and log level apply on the next launch.
///
/// # Arguments
///
/// * `settings` - The complete settings as edited in the settings window
///
/// # Returns
///
/// The settings as saved, with the current `disabledPlugins`.
///
/// # Errors
///
/// * `ApiError::InvalidInput` - If a value is invalid
/// * `ApiError::IoError` - If the settings cannot be written
#[tauri::command]
#[specta::specta]
pub async fn settings_update(
    config: State<'_, ConfigStore>,
    settings: DesktopConfig,
) -> Result<DesktopConfig, ApiError> {
    log::info!("settings_update called");
    settings_update_inner(&config, settings).await
}
