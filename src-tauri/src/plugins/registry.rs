//! Plugin Registry - the set of plugins known to the launcher.
//!
//! The registry is managed by Tauri's state system and is the only place
//! where plugin identifiers are guaranteed to be unique. Records keep
//! their registration order, which is also the order the settings window
//! and the search bar use.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;

use crate::api::types::{ApiError, PluginInfo};
use crate::plugins::manifest::{read_manifest, validate_plugin_id, PluginManifest};

/// Thread-safe registry of plugin records.
pub struct PluginRegistry {
    plugins: Mutex<Vec<PluginInfo>>,
}

impl PluginRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        log::debug!("Initializing PluginRegistry");
        Self {
            plugins: Mutex::new(Vec::new()),
        }
    }

    /// Register a plugin.
    ///
    /// # Errors
    ///
    /// * `ApiError::InvalidInput` - If the identifier is not a valid plugin ID
    /// * `ApiError::PluginAlreadyRegistered` - If the identifier is taken
    pub async fn register(&self, info: PluginInfo) -> Result<(), ApiError> {
        validate_plugin_id(&info.identifier)?;

        let mut plugins = self.plugins.lock().await;
        if plugins.iter().any(|p| p.identifier == info.identifier) {
            return Err(ApiError::PluginAlreadyRegistered {
                identifier: info.identifier,
            });
        }

        log::info!(
            "Plugin registered: identifier={}, can_index={}, enable={}",
            info.identifier,
            info.can_index,
            info.enable
        );
        plugins.push(info);

        Ok(())
    }

    /// Remove a plugin and return its last known record.
    pub async fn unregister(&self, identifier: &str) -> Result<PluginInfo, ApiError> {
        let mut plugins = self.plugins.lock().await;
        let position = plugins
            .iter()
            .position(|p| p.identifier == identifier)
            .ok_or_else(|| ApiError::PluginNotFound {
                identifier: identifier.to_string(),
            })?;

        let removed = plugins.remove(position);
        log::info!("Plugin unregistered: identifier={identifier}");
        Ok(removed)
    }

    /// Look up the record of `identifier`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::PluginNotFound` if nothing is registered under it.
    pub async fn get(&self, identifier: &str) -> Result<PluginInfo, ApiError> {
        let plugins = self.plugins.lock().await;
        plugins
            .iter()
            .find(|p| p.identifier == identifier)
            .cloned()
            .ok_or_else(|| ApiError::PluginNotFound {
                identifier: identifier.to_string(),
            })
    }

    /// All plugins in registration order.
    pub async fn list(&self) -> Vec<PluginInfo> {
        self.plugins.lock().await.clone()
    }

    /// Plugins that are enabled and participate in indexing.
    pub async fn indexable(&self) -> Vec<PluginInfo> {
        let plugins = self.plugins.lock().await;
        plugins
            .iter()
            .filter(|p| p.enable && p.can_index)
            .cloned()
            .collect()
    }

    /// Enable or disable a plugin.
    ///
    /// # Returns
    ///
    /// The updated record.
    pub async fn set_enabled(
        &self,
        identifier: &str,
        enable: bool,
    ) -> Result<PluginInfo, ApiError> {
        let mut plugins = self.plugins.lock().await;
        let plugin = plugins
            .iter_mut()
            .find(|p| p.identifier == identifier)
            .ok_or_else(|| ApiError::PluginNotFound {
                identifier: identifier.to_string(),
            })?;

        if plugin.enable != enable {
            log::info!("Plugin enable changed: identifier={identifier}, enable={enable}");
        }
        plugin.enable = enable;

        Ok(plugin.clone())
    }

    /// Discover plugins installed under `root` and register them.
    ///
    /// Every sub-directory holding a valid `plugin.json` is registered,
    /// enabled unless its identifier appears in `disabled`. Directories are
    /// visited in name order. Invalid manifests and duplicate identifiers
    /// are logged and skipped. The root directory is created if missing.
    ///
    /// # Returns
    ///
    /// The number of plugins registered.
    pub async fn discover(&self, root: &Path, disabled: &[String]) -> Result<usize, ApiError> {
        let manifests = load_manifests(root).await?;

        let mut registered = 0;
        for manifest in manifests {
            if self.register_manifest(manifest, disabled).await {
                registered += 1;
            }
        }

        log::info!(
            "Plugin discovery finished: root={}, registered={registered}",
            root.display()
        );

        Ok(registered)
    }

    /// Re-scan `root` after plugins were installed or removed.
    ///
    /// Plugins whose directory disappeared are unregistered, new ones are
    /// registered like in [`PluginRegistry::discover`]. Plugins already
    /// known keep their current record.
    pub async fn refresh(
        &self,
        root: &Path,
        disabled: &[String],
    ) -> Result<RefreshOutcome, ApiError> {
        let manifests = load_manifests(root).await?;

        let present: HashSet<&str> = manifests.iter().map(|m| m.identifier.as_str()).collect();
        let gone: Vec<String> = self
            .list()
            .await
            .into_iter()
            .map(|p| p.identifier)
            .filter(|identifier| !present.contains(identifier.as_str()))
            .collect();

        let mut removed = Vec::with_capacity(gone.len());
        for identifier in gone {
            removed.push(self.unregister(&identifier).await?);
        }

        let mut added = Vec::new();
        for manifest in manifests {
            if self.get(&manifest.identifier).await.is_ok() {
                continue;
            }
            let identifier = manifest.identifier.clone();
            if self.register_manifest(manifest, disabled).await {
                added.push(identifier);
            }
        }

        log::info!(
            "Plugin refresh finished: root={}, added={}, removed={}",
            root.display(),
            added.len(),
            removed.len()
        );

        Ok(RefreshOutcome { added, removed })
    }

    async fn register_manifest(&self, manifest: PluginManifest, disabled: &[String]) -> bool {
        let enable = !disabled.contains(&manifest.identifier);
        log::debug!(
            "Discovered plugin: identifier={}, version={:?}, icon={:?}, url={:?}",
            manifest.identifier,
            manifest.version,
            manifest.icon,
            manifest.url
        );

        match self.register(manifest.into_info(enable)).await {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Skipping plugin: {e}");
                false
            }
        }
    }
}

/// Result of [`PluginRegistry::refresh`].
#[derive(Debug, Clone, Default)]
pub struct RefreshOutcome {
    /// Identifiers registered by this refresh
    pub added: Vec<String>,
    /// Records of plugins whose directory is gone
    pub removed: Vec<PluginInfo>,
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

async fn load_manifests(root: &Path) -> Result<Vec<PluginManifest>, ApiError> {
    let root = root.to_path_buf();
    tokio::task::spawn_blocking(move || scan_plugins_root(&root))
        .await
        .map_err(|e| ApiError::IoError {
            message: format!("Failed to spawn blocking task: {e}"),
        })?
}

/// Read every valid manifest below `root`, sorted by directory name.
fn scan_plugins_root(root: &Path) -> Result<Vec<PluginManifest>, ApiError> {
    std::fs::create_dir_all(root).map_err(|e| ApiError::IoError {
        message: format!("Failed to create plugins directory: {e}"),
    })?;

    let read_dir = std::fs::read_dir(root).map_err(|e| ApiError::IoError {
        message: format!("Failed to read plugins directory: {e}"),
    })?;

    let mut plugin_dirs: Vec<PathBuf> = Vec::new();
    for dir_entry in read_dir {
        match dir_entry {
            Ok(dir_entry) => {
                let path = dir_entry.path();
                if path.is_dir() {
                    plugin_dirs.push(path);
                }
            }
            Err(e) => log::warn!("Failed to read entry in {}: {e}", root.display()),
        }
    }
    plugin_dirs.sort();

    let manifests = plugin_dirs
        .iter()
        .filter_map(|dir| match read_manifest(dir) {
            Ok(manifest) => Some(manifest),
            Err(e) => {
                log::warn!("Ignoring plugin directory {}: {e}", dir.display());
                None
            }
        })
        .collect();

    Ok(manifests)
}
