//! Tauri command handlers organized by domain.
//!
//! Each submodule contains related commands and their helper functions.
//! Import specific commands via their submodule (e.g., `commands::plugins::plugin_list`).

pub mod entries;
pub mod plugins;
pub mod settings;
