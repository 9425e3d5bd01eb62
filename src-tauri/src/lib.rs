//! michel - desktop launcher backend.
//!
//! Owns the plugin registry, the search bar entries and the desktop
//! settings, and exposes them to the frontend as Tauri commands.

pub mod api;
pub mod commands;
pub mod config;
pub mod plugins;
pub mod runtime;
#[cfg(desktop)]
pub mod shortcuts;
#[cfg(desktop)]
pub mod tray;

use tauri::Manager;
use tauri_specta::collect_commands;

use crate::config::{ConfigStore, DesktopConfig, SETTINGS_FILENAME};
use crate::plugins::registry::PluginRegistry;
use crate::runtime::entries::EntryBoard;
use crate::runtime::indexing::IndexCoordinator;

/// Where debug builds write the TypeScript command bindings
#[cfg(debug_assertions)]
const BINDINGS_PATH: &str = "../src/bindings.ts";

fn specta_builder() -> tauri_specta::Builder<tauri::Wry> {
    tauri_specta::Builder::<tauri::Wry>::new().commands(collect_commands![
        commands::plugins::plugin_list,
        commands::plugins::plugin_set_enabled,
        commands::plugins::plugin_run_index,
        commands::plugins::plugin_finish_index,
        commands::plugins::plugin_run_index_all,
        commands::plugins::plugin_refresh,
        commands::entries::entries_fetch_for_input,
        commands::entries::entries_submit,
        commands::settings::settings_get,
        commands::settings::settings_update,
    ])
}

/// Load settings, install logging, discover plugins and register state,
/// then install the tray and the search shortcut.
fn setup_app(app: &mut tauri::App) -> Result<(), Box<dyn std::error::Error>> {
    // Tray-only app: no dock icon.
    #[cfg(target_os = "macos")]
    app.set_activation_policy(tauri::ActivationPolicy::Accessory);

    let config_dir = app.path().app_config_dir()?;
    let settings_path = config_dir.join(SETTINGS_FILENAME);

    // Settings drive the log level, so errors are reported once logging is up.
    let (config, load_error) =
        match tauri::async_runtime::block_on(ConfigStore::open(settings_path.clone())) {
            Ok(store) => (store, None),
            Err(e) => (ConfigStore::new(settings_path, DesktopConfig::default()), Some(e)),
        };
    let settings = tauri::async_runtime::block_on(config.get());

    app.handle().plugin(
        tauri_plugin_log::Builder::new()
            .level(settings.log_level_filter())
            .build(),
    )?;

    if let Some(e) = load_error {
        log::warn!(
            "Ignoring settings at {}, using defaults: {e}",
            config.path().display()
        );
    }
    log::info!("Starting michel for user '{}'", settings.username);

    let registry = PluginRegistry::new();
    let plugins_root = config.plugins_root();
    if let Err(e) = tauri::async_runtime::block_on(
        registry.discover(&plugins_root, &settings.disabled_plugins),
    ) {
        log::error!("Plugin discovery failed: root={}, error={e}", plugins_root.display());
    }

    app.manage(registry);
    app.manage(config);
    app.manage(EntryBoard::new());
    app.manage(IndexCoordinator::new());

    #[cfg(desktop)]
    {
        tray::install_tray(app.handle())?;

        let accelerator = &settings.search_shortcut;
        if let Err(e) = shortcuts::register_search_shortcut(app.handle(), accelerator) {
            log::error!("Search shortcut unavailable: {e}");
        }
    }

    Ok(())
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    let builder = specta_builder();

    let mut app = tauri::Builder::default();

    #[cfg(desktop)]
    {
        app = app.plugin(tauri_plugin_single_instance::init(|app, _args, _cwd| {
            shortcuts::show_search_bar(app);
        }));
    }

    app.invoke_handler(builder.invoke_handler())
        .setup(move |app| {
            setup_app(app)?;

            #[cfg(debug_assertions)]
            {
                let typescript = specta_typescript::Typescript::default();
                if let Err(e) = builder.export(typescript, BINDINGS_PATH) {
                    log::warn!("Failed to export TypeScript bindings to {BINDINGS_PATH}: {e}");
                }
            }

            Ok(())
        })
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}

#[cfg(test)]
mod tests {
    fn tauri_conf() -> serde_json::Value {
        serde_json::from_str(include_str!("../tauri.conf.json")).unwrap()
    }

    #[test]
    fn test_release_serves_built_frontend() {
        let conf = tauri_conf();

        assert_eq!(conf["build"]["frontendDist"], "../dist");
        assert_eq!(conf["build"]["devUrl"], "http://localhost:1420");
    }

    #[cfg(desktop)]
    #[test]
    fn test_windows_match_labels_used_in_code() {
        let conf = tauri_conf();
        let windows = conf["app"]["windows"].as_array().unwrap();
        let labels: Vec<&str> = windows
            .iter()
            .filter_map(|w| w["label"].as_str())
            .collect();

        assert!(labels.contains(&crate::shortcuts::SEARCH_BAR_WINDOW));
        assert!(labels.contains(&crate::tray::SETTINGS_WINDOW));
        assert!(windows.iter().all(|w| w["visible"] == false));
    }
}
