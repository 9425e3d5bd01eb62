//! System tray menu: the way to reach the settings window and to quit.

use tauri::menu::{Menu, MenuEvent, MenuItem};
use tauri::tray::TrayIconBuilder;
use tauri::{AppHandle, Manager, Runtime};

use crate::shortcuts::toggle_search_bar;

/// Label of the settings window declared in `tauri.conf.json`
pub const SETTINGS_WINDOW: &str = "settings";

const TRAY_ID: &str = "michel-tray";

/// Actions offered by the tray menu, in menu order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayAction {
    Show,
    Settings,
    Quit,
}

impl TrayAction {
    pub const ALL: [TrayAction; 3] = [TrayAction::Show, TrayAction::Settings, TrayAction::Quit];

    /// Menu item id
    pub fn id(self) -> &'static str {
        match self {
            TrayAction::Show => "show",
            TrayAction::Settings => "settings",
            TrayAction::Quit => "quit",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TrayAction::Show => "Show",
            TrayAction::Settings => "Settings",
            TrayAction::Quit => "Quit",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.id() == id)
    }
}

/// Show, unminimize and focus the settings window.
pub fn show_settings<R: Runtime>(app: &AppHandle<R>) {
    let Some(window) = app.get_webview_window(SETTINGS_WINDOW) else {
        log::warn!("Settings window '{SETTINGS_WINDOW}' is missing");
        return;
    };

    let result = window
        .show()
        .and_then(|_| window.unminimize())
        .and_then(|_| window.set_focus());

    if let Err(e) = result {
        log::error!("Failed to show settings: {e}");
    }
}

fn handle_menu_event<R: Runtime>(app: &AppHandle<R>, event: MenuEvent) {
    match TrayAction::from_id(event.id().as_ref()) {
        Some(TrayAction::Show) => toggle_search_bar(app),
        Some(TrayAction::Settings) => show_settings(app),
        Some(TrayAction::Quit) => {
            log::info!("Quit requested from tray");
            app.exit(0);
        }
        None => log::debug!("Ignoring unknown tray menu item: {:?}", event.id()),
    }
}

/// Build the tray icon with its Show, Settings and Quit menu.
///
/// # Errors
///
/// Returns the Tauri error if the menu or the tray icon cannot be created.
pub fn install_tray<R: Runtime>(app: &AppHandle<R>) -> tauri::Result<()> {
    let items = TrayAction::ALL
        .into_iter()
        .map(|action| MenuItem::with_id(app, action.id(), action.label(), true, None::<&str>))
        .collect::<tauri::Result<Vec<_>>>()?;
    let item_refs: Vec<&dyn tauri::menu::IsMenuItem<R>> = items
        .iter()
        .map(|item| item as &dyn tauri::menu::IsMenuItem<R>)
        .collect();
    let menu = Menu::with_items(app, &item_refs)?;

    let mut builder = TrayIconBuilder::<R>::with_id(TRAY_ID)
        .tooltip("michel")
        .menu(&menu)
        .on_menu_event(handle_menu_event);
    if let Some(icon) = app.default_window_icon() {
        builder = builder.icon(icon.clone());
    }
    builder.build(app)?;

    log::debug!("Tray icon installed");
    Ok(())
}
