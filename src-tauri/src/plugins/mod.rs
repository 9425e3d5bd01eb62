//! Plugin management domain.
//!
//! Handles plugin discovery, identity and enable state.
//! Plugins are described by `app_config_dir()/plugins/<identifier>/plugin.json`.

pub mod manifest;
pub mod registry;
