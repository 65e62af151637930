use std::env;
use std::fs;
use std::path::PathBuf;

use config::{Config, Environment, File as ConfigFile};
use serde::{Deserialize, Serialize};

use crate::error::Error;

const MB: u64 = 1_048_576;

/// Read-only inputs to the scanner and the storage router, plus the journal
/// location. Loaded from an optional TOML file with `TIDY_UP_*` environment
/// overrides; missing fields fall back to defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage_path: String,
    pub fast_storage_path: String,
    pub default_threshold_mb: u64,
    pub exclude_paths: Vec<String>,
    pub auto_archive_old_files: bool,
    pub archive_older_than_days: i64,
    pub journal_dir: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            storage_path: "/Volumes/storage1".to_string(),
            fast_storage_path: "/Volumes/flash1".to_string(),
            default_threshold_mb: 100,
            exclude_paths: vec![
                "/System".to_string(),
                "/Library/System".to_string(),
                "/usr".to_string(),
                "/private/var/db".to_string(),
                "/private/var/vm".to_string(),
            ],
            auto_archive_old_files: false,
            archive_older_than_days: 365,
            journal_dir: home_dir()
                .join(".local/share/tidy-up/journal")
                .to_string_lossy()
                .into_owned(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<AppConfig, Error> {
        let builder = Config::builder()
            .add_source(ConfigFile::from(config_file_path()).required(false))
            .add_source(Environment::with_prefix("TIDY_UP"))
            .build()?;
        Ok(builder.try_deserialize::<AppConfig>()?)
    }

    pub fn save(&self) -> Result<(), Error> {
        let path = config_file_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let rendered = toml::to_string_pretty(self)
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        fs::write(&path, rendered)?;
        Ok(())
    }

    /// Scan threshold in bytes, with an optional per-invocation MB override.
    pub fn threshold_bytes(&self, override_mb: Option<u64>) -> u64 {
        override_mb.unwrap_or(self.default_threshold_mb) * MB
    }

    /// Exclusion prefixes for the scanner; empty when system paths are
    /// explicitly requested.
    pub fn exclusions(&self, include_system: bool) -> Vec<PathBuf> {
        if include_system {
            Vec::new()
        } else {
            self.exclude_paths.iter().map(PathBuf::from).collect()
        }
    }
}

/// `$TIDY_UP_CONFIG` if set, otherwise `~/.config/tidy-up/config.toml`.
pub fn config_file_path() -> PathBuf {
    match env::var_os("TIDY_UP_CONFIG") {
        Some(path) => PathBuf::from(path),
        None => home_dir().join(".config/tidy-up/config.toml"),
    }
}

pub fn home_dir() -> PathBuf {
    env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}
