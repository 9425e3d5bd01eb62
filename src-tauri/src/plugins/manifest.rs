//! Plugin manifests - the on-disk description of a plugin.
//!
//! Each plugin lives in its own directory under the plugins root and
//! describes itself with a `plugin.json` file:
//!
//! ```text
//! <app_config_dir>/
//! └── plugins/
//!     ├── spellcheck/
//!     │   └── plugin.json
//!     └── files/
//!         └── plugin.json
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::api::types::{ApiError, PluginInfo};

/// File name of the manifest inside a plugin directory
pub const MANIFEST_FILENAME: &str = "plugin.json";

/// Plugin metadata stored in `plugin.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginManifest {
    pub identifier: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Whether the plugin feeds the index (defaults to false)
    #[serde(default)]
    pub can_index: bool,
    /// Informational only
    pub version: Option<String>,
    /// Icon path relative to the plugin directory, or a URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Homepage of the plugin
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl PluginManifest {
    /// Build the registry record for this manifest.
    pub fn into_info(self, enable: bool) -> PluginInfo {
        PluginInfo {
            identifier: self.identifier,
            name: self.name,
            description: self.description,
            can_index: self.can_index,
            enable,
        }
    }
}

/// Validate the identifier declared in a `plugin.json`.
///
/// Identifiers double as directory names under the plugins root.
///
/// # Arguments
///
/// * `plugin_id` - Identifier to check (e.g., "spellcheck", "files")
///
/// # Errors
///
/// Returns `ApiError::InvalidInput` unless the identifier has 1-64
/// lowercase letters, digits and hyphens, with no leading or trailing hyphen.
pub fn validate_plugin_id(plugin_id: &str) -> Result<(), ApiError> {
    let invalid = |reason: &str| ApiError::InvalidInput {
        message: format!(
            "Invalid plugin identifier '{plugin_id}' in {MANIFEST_FILENAME}: {reason}"
        ),
    };

    if plugin_id.is_empty() {
        return Err(invalid("identifier cannot be empty"));
    }

    if plugin_id.len() > 64 {
        return Err(invalid("identifier cannot exceed 64 characters"));
    }

    if plugin_id.contains(['/', '\\']) || plugin_id.contains("..") {
        return Err(invalid("identifier must be a plain directory name"));
    }

    if let Some(c) = plugin_id
        .chars()
        .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
    {
        return Err(invalid(&format!(
            "unexpected character '{c}', only lowercase letters, digits and hyphens are allowed"
        )));
    }

    if plugin_id.starts_with('-') || plugin_id.ends_with('-') {
        return Err(invalid("identifier cannot start or end with a hyphen"));
    }

    Ok(())
}

/// Read and validate the manifest of the plugin directory `plugin_dir`.
///
/// The manifest identifier must be valid and equal to the directory name.
/// Blocking: call from `spawn_blocking` when on the async runtime.
pub fn read_manifest(plugin_dir: &Path) -> Result<PluginManifest, ApiError> {
    let manifest_path = plugin_dir.join(MANIFEST_FILENAME);

    let content = std::fs::read_to_string(&manifest_path).map_err(|e| ApiError::IoError {
        message: format!("Failed to read {}: {e}", manifest_path.display()),
    })?;

    let manifest: PluginManifest =
        serde_json::from_str(&content).map_err(|e| ApiError::InvalidInput {
            message: format!("Failed to parse {}: {e}", manifest_path.display()),
        })?;

    validate_plugin_id(&manifest.identifier)?;

    if manifest.name.trim().is_empty() {
        return Err(ApiError::InvalidInput {
            message: format!("Plugin '{}' has an empty name", manifest.identifier),
        });
    }

    let dir_name = plugin_dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    if dir_name != manifest.identifier {
        return Err(ApiError::InvalidInput {
            message: format!(
                "Plugin identifier '{}' does not match its directory '{dir_name}'",
                manifest.identifier
            ),
        });
    }

    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_manifest(root: &Path, dir: &str, content: &str) -> std::path::PathBuf {
        let plugin_dir = root.join(dir);
        std::fs::create_dir_all(&plugin_dir).unwrap();
        std::fs::write(plugin_dir.join(MANIFEST_FILENAME), content).unwrap();
        plugin_dir
    }

    #[test]
    fn test_validate_plugin_id_valid() {
        assert!(validate_plugin_id("spellcheck").is_ok());
        assert!(validate_plugin_id("files").is_ok());
        assert!(validate_plugin_id("plugin-123").is_ok());
        assert!(validate_plugin_id("a").is_ok());
    }

    #[test]
    fn test_validate_plugin_id_empty() {
        match validate_plugin_id("") {
            Err(ApiError::InvalidInput { message }) => assert!(message.contains("empty")),
            other => panic!("Expected InvalidInput error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_plugin_id_too_long() {
        let long_id = "a".repeat(65);
        match validate_plugin_id(&long_id) {
            Err(ApiError::InvalidInput { message }) => assert!(message.contains("64 characters")),
            other => panic!("Expected InvalidInput error, got {other:?}"),
        }
        assert!(validate_plugin_id(&"a".repeat(64)).is_ok());
    }

    #[test]
    fn test_validate_plugin_id_rejects_paths_and_bad_chars() {
        assert!(validate_plugin_id("../etc").is_err());
        assert!(validate_plugin_id("foo/bar").is_err());
        assert!(validate_plugin_id("foo\\bar").is_err());
        assert!(validate_plugin_id("Spellcheck").is_err());
        assert!(validate_plugin_id("spell_check").is_err());
        assert!(validate_plugin_id("spell check").is_err());
        assert!(validate_plugin_id("-spellcheck").is_err());
        assert!(validate_plugin_id("spellcheck-").is_err());
    }

    #[test]
    fn test_read_manifest_defaults() {
        let root = tempfile::tempdir().unwrap();
        let dir = write_manifest(
            root.path(),
            "spellcheck",
            r#"{"identifier": "spellcheck", "name": "Spell Checker"}"#,
        );

        let manifest = read_manifest(&dir).unwrap();

        assert_eq!(manifest.description, "");
        assert!(!manifest.can_index);
        assert!(manifest.version.is_none());

        let info = manifest.into_info(true);
        assert_eq!(info.identifier, "spellcheck");
        assert!(info.enable);
    }

    #[test]
    fn test_read_manifest_full() {
        let root = tempfile::tempdir().unwrap();
        let dir = write_manifest(
            root.path(),
            "files",
            r#"{"identifier": "files", "name": "Files", "description": "Local files",
                "canIndex": true, "version": "1.2.0"}"#,
        );

        let manifest = read_manifest(&dir).unwrap();

        assert!(manifest.can_index);
        assert_eq!(manifest.version.as_deref(), Some("1.2.0"));
        assert!(manifest.icon.is_none());
        assert!(manifest.url.is_none());
    }

    #[test]
    fn test_read_manifest_icon_and_url() {
        let root = tempfile::tempdir().unwrap();
        let dir = write_manifest(
            root.path(),
            "notes",
            r#"{"identifier": "notes", "name": "Notes", "version": "0.3.1",
                "icon": "icon.svg", "url": "https://example.org/notes"}"#,
        );

        let manifest = read_manifest(&dir).unwrap();
        assert_eq!(manifest.icon.as_deref(), Some("icon.svg"));
        assert_eq!(manifest.url.as_deref(), Some("https://example.org/notes"));

        let written = serde_json::to_string(&manifest).unwrap();
        std::fs::write(dir.join(MANIFEST_FILENAME), written).unwrap();
        let reread = read_manifest(&dir).unwrap();

        assert_eq!(reread.icon, manifest.icon);
        assert_eq!(reread.url, manifest.url);
        assert_eq!(reread.version, manifest.version);
        assert!(!reread.can_index);
    }

    #[test]
    fn test_validate_plugin_id_names_manifest() {
        match validate_plugin_id("Spell_Check") {
            Err(ApiError::InvalidInput { message }) => {
                assert!(message.contains("plugin.json"));
                assert!(message.contains("'S'"));
            }
            other => panic!("Expected InvalidInput error, got {other:?}"),
        }
    }

    #[test]
    fn test_read_manifest_directory_mismatch() {
        let root = tempfile::tempdir().unwrap();
        let dir = write_manifest(
            root.path(),
            "other",
            r#"{"identifier": "files", "name": "Files"}"#,
        );

        assert!(matches!(
            read_manifest(&dir),
            Err(ApiError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_read_manifest_missing_file() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("empty");
        std::fs::create_dir_all(&dir).unwrap();

        assert!(matches!(read_manifest(&dir), Err(ApiError::IoError { .. })));
    }

    #[test]
    fn test_read_manifest_invalid_json() {
        let root = tempfile::tempdir().unwrap();
        let dir = write_manifest(root.path(), "broken", "{not json");

        assert!(matches!(
            read_manifest(&dir),
            Err(ApiError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_read_manifest_empty_name() {
        let root = tempfile::tempdir().unwrap();
        let dir = write_manifest(
            root.path(),
            "blank",
            r#"{"identifier": "blank", "name": "  "}"#,
        );

        assert!(matches!(
            read_manifest(&dir),
            Err(ApiError::InvalidInput { .. })
        ));
    }
}
