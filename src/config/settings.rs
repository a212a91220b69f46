//! Persisted settings for the SWC client and CLI.
//! Stored in the platform-specific config directory via `directories::ProjectDirs`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Settings that can be saved and loaded. Every field is optional; unset
/// fields fall through to the environment or built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredSettings {
    /// SWC API base URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Retry with backoff on transient failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backoff: Option<bool>,
    /// Cap on a single backoff wait in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backoff_max_time_secs: Option<u64>,
    /// Retries after the first attempt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
    /// Bulk file format ("csv" or "parquet")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bulk_file_format: Option<String>,
    /// Bulk file base URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bulk_base_url: Option<String>,
}

impl StoredSettings {
    /// Get the config directory path.
    pub fn config_dir() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "sportsworldcentral", "swc-client")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the settings file path.
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("settings.json"))
    }

    /// Load settings from the config file, or defaults if it is missing or unreadable.
    pub fn load() -> Self {
        match Self::settings_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load settings from `path`, or defaults if it is missing or unreadable.
    pub fn load_from(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => return Self::default(),
        };
        match serde_json::from_str(&content) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Ignoring malformed settings file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save settings to the config file.
    pub fn save(&self) -> Result<PathBuf, String> {
        let path = Self::settings_path().ok_or("Cannot determine config directory")?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save settings to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize settings: {}", e))?;

        fs::write(path, content).map_err(|e| format!("Failed to write settings file: {}", e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = StoredSettings {
            base_url: Some("https://api.example.com".to_string()),
            backoff: Some(false),
            max_retries: Some(5),
            ..Default::default()
        };

        settings.save_to(&path).unwrap();
        assert_eq!(StoredSettings::load_from(&path), settings);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = StoredSettings::load_from(&dir.path().join("absent.json"));
        assert_eq!(loaded, StoredSettings::default());
    }

    #[test]
    fn test_malformed_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(StoredSettings::load_from(&path), StoredSettings::default());
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"base_url": "https://x.test", "theme": "dark"}"#).unwrap();
        let loaded = StoredSettings::load_from(&path);
        assert_eq!(loaded.base_url.as_deref(), Some("https://x.test"));
    }
}
