//! Search bar window toggling and its global shortcut.

use tauri::{AppHandle, Manager, Runtime};
use tauri_plugin_global_shortcut::{GlobalShortcutExt, Shortcut, ShortcutState};

/// Label of the search bar window declared in `tauri.conf.json`
pub const SEARCH_BAR_WINDOW: &str = "search-bar";

/// Parse an accelerator such as "CommandOrControl+Space".
pub fn parse_shortcut(accelerator: &str) -> Result<Shortcut, String> {
    accelerator
        .parse::<Shortcut>()
        .map_err(|e| format!("Invalid shortcut '{accelerator}': {e}"))
}

/// Hide the search bar if visible, otherwise show, center and focus it.
pub fn toggle_search_bar<R: Runtime>(app: &AppHandle<R>) {
    let Some(window) = app.get_webview_window(SEARCH_BAR_WINDOW) else {
        log::warn!("Search bar window '{SEARCH_BAR_WINDOW}' is missing");
        return;
    };

    let visible = window.is_visible().unwrap_or(false);
    let result = if visible {
        window.hide()
    } else {
        window
            .show()
            .and_then(|_| window.center())
            .and_then(|_| window.set_focus())
    };

    if let Err(e) = result {
        log::error!("Failed to toggle search bar: {e}");
    }
}

/// Show the search bar, e.g. when a second instance is launched.
pub fn show_search_bar<R: Runtime>(app: &AppHandle<R>) {
    if let Some(window) = app.get_webview_window(SEARCH_BAR_WINDOW) {
        if let Err(e) = window.show().and_then(|_| window.set_focus()) {
            log::error!("Failed to show search bar: {e}");
        }
    }
}

/// Install the global shortcut plugin bound to `accelerator`.
///
/// An invalid accelerator falls back to the default one. If the OS refuses
/// the shortcut (e.g. it is taken by another application) the failure is
/// logged and startup continues; the tray still reaches the search bar.
///
/// # Errors
///
/// Returns an error only if the global shortcut plugin cannot be installed.
pub fn register_search_shortcut<R: Runtime>(
    app: &AppHandle<R>,
    accelerator: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let shortcut = parse_shortcut(accelerator).or_else(|e| {
        log::warn!("{e}, falling back to the default shortcut");
        parse_shortcut(&crate::config::DesktopConfig::default().search_shortcut)
    })?;

    app.plugin(
        tauri_plugin_global_shortcut::Builder::new()
            .with_handler(move |app, pressed, event| {
                if pressed == &shortcut && event.state() == ShortcutState::Pressed {
                    toggle_search_bar(app);
                }
            })
            .build(),
    )?;

    report_registration(accelerator, app.global_shortcut().register(shortcut));

    Ok(())
}

/// Log the outcome of registering the search shortcut with the OS.
///
/// # Returns
///
/// Whether the shortcut is active.
fn report_registration<E: std::fmt::Display>(accelerator: &str, result: Result<(), E>) -> bool {
    match result {
        Ok(()) => {
            log::info!("Search shortcut registered: {accelerator}");
            true
        }
        Err(e) => {
            log::error!(
                "Failed to register search shortcut {accelerator}, use the tray instead: {e}"
            );
            false
        }
    }
}
