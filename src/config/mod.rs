//! Configuration module for trailhead
//!
//! Settings live in `config.toml` in the user's config directory, next to the
//! saved session cookies. Any key can be overridden for a single run with a
//! `TRAILHEAD_`-prefixed environment variable (e.g. `TRAILHEAD_BASE_URL`).

use std::fs;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::api::{DEFAULT_BASE_URL, ObjectKind};

const APP_DIR: &str = "trailhead";
const ENV_PREFIX: &str = "TRAILHEAD";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

/// Application configuration structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TrailConfig {
    /// Service root, without a trailing slash
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Account used when `--user` is not given
    #[serde(default)]
    pub username: Option<String>,

    /// Editor for `edit --interactive`
    #[serde(default)]
    pub editor: Option<String>,

    /// Snapshot file used by `edit`; defaults to `<kind>s.yml`
    #[serde(default)]
    pub edit_file: Option<PathBuf>,

    /// Log at info level without `--verbose`
    #[serde(default)]
    pub verbose: bool,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            username: None,
            editor: None,
            edit_file: None,
            verbose: false,
        }
    }
}

impl TrailConfig {
    fn app_dir() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::Message("Could not determine config directory".to_string()))?;
        Ok(config_dir.join(APP_DIR))
    }

    /// Get the path to the config file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the system config directory cannot be determined.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::app_dir()?.join("config.toml"))
    }

    /// Where the login session is kept between runs
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the system config directory cannot be determined.
    pub fn session_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::app_dir()?.join("session"))
    }

    /// Load configuration from file, creating default if it doesn't exist
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config file cannot be read, parsed, or created.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;
        if !config_path.exists() {
            Self::default().save_to(&config_path)?;
        }
        Self::load_from(&config_path)
    }

    /// Load from `path` with environment overrides applied
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be parsed.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?
            .try_deserialize()
    }

    /// Save configuration to file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config directory cannot be created, the configuration
    /// cannot be serialized to TOML, or the file cannot be written.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    fn save_to(&self, config_path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::Message(format!("Failed to create config directory: {e}")))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Message(format!("Failed to serialize config: {e}")))?;

        fs::write(config_path, toml_string)
            .map_err(|e| ConfigError::Message(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Snapshot file for bulk edits of `kind`
    #[must_use]
    pub fn edit_file_for(&self, kind: ObjectKind) -> PathBuf {
        self.edit_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}.yml", kind.plural())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = TrailConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.username.is_none());
        assert!(!config.verbose);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = TrailConfig {
            username: Some("hiker@example.com".into()),
            editor: Some("vi".into()),
            ..TrailConfig::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(TrailConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_keys_take_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "verbose = true\n").unwrap();
        let config = TrailConfig::load_from(&path).unwrap();
        assert!(config.verbose);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "verbose = = true\n").unwrap();
        assert!(TrailConfig::load_from(&path).is_err());
    }

    #[test]
    fn test_edit_file_for_kind() {
        let mut config = TrailConfig::default();
        assert_eq!(config.edit_file_for(ObjectKind::Track), PathBuf::from("tracks.yml"));
        config.edit_file = Some(PathBuf::from("/tmp/edit.yml"));
        assert_eq!(config.edit_file_for(ObjectKind::Waypoint), PathBuf::from("/tmp/edit.yml"));
    }
}
