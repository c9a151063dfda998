//! Tool settings
//!
//! Handles loading and saving `config.toml` from the platform config
//! directory:
//! - default content directory
//! - run timeout
//! - default target repository

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{LayeredError, Result};

/// Persisted tool settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Directory holding issues.json, discussions.json, prs.json, labels.json
    #[serde(default = "default_content_dir")]
    pub content_dir: PathBuf,

    /// Upper bound for a whole run, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Default repository as `owner/name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
}

fn default_content_dir() -> PathBuf {
    PathBuf::from("config")
}

fn default_timeout_secs() -> u64 {
    300
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            content_dir: default_content_dir(),
            timeout_secs: default_timeout_secs(),
            repo: None,
        }
    }
}

impl Settings {
    /// Load settings from the platform config file, or defaults if absent
    pub fn load() -> Result<Self> {
        match Self::settings_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load settings from `path`, or defaults if it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|e| {
            LayeredError::file("load settings", "cannot read settings file")
                .with_context("path", path.display().to_string())
                .with_cause(e)
        })?;
        let settings = toml::from_str(&contents).map_err(|e| {
            LayeredError::config("load settings", "settings file is invalid")
                .with_context("path", path.display().to_string())
                .with_cause(e)
        })?;
        Ok(settings)
    }

    /// Save settings to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                LayeredError::file("save settings", "cannot create settings directory")
                    .with_context("path", parent.display().to_string())
                    .with_cause(e)
            })?;
        }

        let contents = toml::to_string_pretty(self).map_err(|e| {
            LayeredError::config("save settings", "cannot serialize settings").with_cause(e)
        })?;
        fs::write(path, contents).map_err(|e| {
            LayeredError::file("save settings", "cannot write settings file")
                .with_context("path", path.display().to_string())
                .with_cause(e)
        })?;
        Ok(())
    }

    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "gh-demo-seed", "gh-demo-seed")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.content_dir, PathBuf::from("config"));
        assert_eq!(settings.timeout_secs, 300);
        assert!(settings.repo.is_none());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "repo = \"octo/demo\"\n").unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.repo.as_deref(), Some("octo/demo"));
        assert_eq!(settings.timeout_secs, 300);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let settings = Settings {
            content_dir: PathBuf::from("demo-content"),
            timeout_secs: 60,
            repo: Some("octo/demo".to_string()),
        };

        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "timeout_secs = \"soon\"").unwrap();

        let err = Settings::load_from(&path).unwrap_err();
        assert_eq!(err.layer(), Some(crate::error::Layer::Config));
    }
}
