//! # Application Configuration
//!
//! Optional YAML file read once at startup by the binary. Every field has a
//! default, so an absent file or a partial one is fine.
//!
//! ```yaml
//! data_directory: "/home/me/Finance Manager"
//! transactions_file: "transactions.json"
//! backup_directory: "backups"
//! application_name: "Finance Manager"
//! ```

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::backend::storage::json::connection::{DEFAULT_BACKUP_DIRECTORY, DEFAULT_TRANSACTIONS_FILE};

/// Name written into export envelopes and used for the default data directory
pub const DEFAULT_APPLICATION_NAME: &str = "Finance Manager";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the transactions file and the backup directory
    pub data_directory: PathBuf,
    /// Transactions file, relative to `data_directory` unless absolute
    pub transactions_file: PathBuf,
    /// Backup directory, relative to `data_directory` unless absolute
    pub backup_directory: PathBuf,
    pub application_name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_directory: default_data_directory(),
            transactions_file: PathBuf::from(DEFAULT_TRANSACTIONS_FILE),
            backup_directory: PathBuf::from(DEFAULT_BACKUP_DIRECTORY),
            application_name: DEFAULT_APPLICATION_NAME.to_string(),
        }
    }
}

impl AppConfig {
    /// Configuration rooted at `data_directory`, defaults elsewhere
    pub fn with_data_directory<P: Into<PathBuf>>(data_directory: P) -> Self {
        Self {
            data_directory: data_directory.into(),
            ..Self::default()
        }
    }

    /// Load configuration from a YAML file, falling back to defaults if it does not exist
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            info!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let yaml_content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: AppConfig = serde_yaml::from_str(&yaml_content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;

        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn transactions_path(&self) -> PathBuf {
        self.data_directory.join(&self.transactions_file)
    }

    pub fn backup_path(&self) -> PathBuf {
        self.data_directory.join(&self.backup_directory)
    }
}

/// Platform data directory joined with the application name, or the current
/// directory when the platform has none
pub fn default_data_directory() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(DEFAULT_APPLICATION_NAME))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = AppConfig::load(temp_dir.path().join("absent.yaml")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.application_name, "Finance Manager");
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        fs::write(&path, "data_directory: /tmp/finance\napplication_name: My Budget\n").unwrap();

        let config = AppConfig::load(&path).unwrap();

        assert_eq!(config.data_directory, PathBuf::from("/tmp/finance"));
        assert_eq!(config.application_name, "My Budget");
        assert_eq!(config.transactions_path(), PathBuf::from("/tmp/finance/transactions.json"));
        assert_eq!(config.backup_path(), PathBuf::from("/tmp/finance/backups"));
    }

    #[test]
    fn test_absolute_backup_directory_wins() {
        let mut config = AppConfig::with_data_directory("/data");
        config.backup_directory = PathBuf::from("/mnt/backups");
        assert_eq!(config.backup_path(), PathBuf::from("/mnt/backups"));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        fs::write(&path, "data_directory: [unclosed").unwrap();

        let err = AppConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid config file"));
    }
}
