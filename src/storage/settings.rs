use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::{Error, Result};

/// How module data files are named inside a package
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum ModuleNaming {
    /// `module_<i>.json`, which also fixes the load order
    #[default]
    Positional,
    /// Sanitised module title, suffixed with the index on collision
    Title,
}

/// Compression used for archive entries
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum ArchiveCompression {
    Stored,
    #[default]
    Deflated,
}

/// Authoring settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct MakerSettings {
    pub module_naming: ModuleNaming,
    pub compression: ArchiveCompression,
    /// Parent directory for scratch workspaces (OS temp dir when unset)
    pub workspace_dir: Option<PathBuf>,
    /// Name prefix of each scratch workspace directory
    pub workspace_prefix: String,
    /// Refuse to save while an `imgSrc` points at a missing media file
    pub check_media_on_save: bool,
    /// Delete media files that nothing references before bundling
    pub prune_unused_media: bool,
}

impl Default for MakerSettings {
    fn default() -> Self {
        Self {
            module_naming: ModuleNaming::Positional,
            compression: ArchiveCompression::Deflated,
            workspace_dir: None,
            workspace_prefix: "modulearn-maker_".to_string(),
            check_media_on_save: true,
            prune_unused_media: false,
        }
    }
}

/// Get the default settings directory
pub fn default_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|p| p.join("modulearn-maker"))
        .ok_or(Error::ConfigDirNotFound)
}

/// Get the settings file path
pub fn get_settings_path(config_dir: &Path) -> PathBuf {
    config_dir.join("settings.json")
}

/// Load settings from file, falling back to defaults when none were saved
pub fn load_settings(config_dir: &Path) -> Result<MakerSettings> {
    let settings_path = get_settings_path(config_dir);

    if !settings_path.exists() {
        return Ok(MakerSettings::default());
    }

    let content = fs::read_to_string(&settings_path)?;
    let settings: MakerSettings = serde_json::from_str(&content)?;
    Ok(settings)
}

/// Save settings to file
pub fn save_settings(config_dir: &Path, settings: &MakerSettings) -> Result<()> {
    fs::create_dir_all(config_dir)?;
    let content = serde_json::to_string_pretty(settings)?;
    fs::write(get_settings_path(config_dir), content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_settings_use_defaults() {
        let temp = TempDir::new().unwrap();
        let settings = load_settings(temp.path()).unwrap();
        assert_eq!(settings, MakerSettings::default());
        assert_eq!(settings.workspace_prefix, "modulearn-maker_");
    }

    #[test]
    fn test_settings_roundtrip() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("nested");
        let settings = MakerSettings {
            module_naming: ModuleNaming::Title,
            compression: ArchiveCompression::Stored,
            prune_unused_media: true,
            ..Default::default()
        };

        save_settings(&dir, &settings).unwrap();
        assert_eq!(load_settings(&dir).unwrap(), settings);
    }

    #[test]
    fn test_partial_settings_file() {
        let temp = TempDir::new().unwrap();
        fs::write(
            get_settings_path(temp.path()),
            r#"{ "moduleNaming": "title" }"#,
        )
        .unwrap();

        let settings = load_settings(temp.path()).unwrap();
        assert_eq!(settings.module_naming, ModuleNaming::Title);
        assert_eq!(settings.compression, ArchiveCompression::Deflated);
        assert!(settings.check_media_on_save);
    }
}
