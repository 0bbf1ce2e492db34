use log::{debug, info};
use serde::Serialize;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use super::transaction_repository::TransactionRepository;
use crate::backend::config::AppConfig;
use crate::backend::storage::error::{StoreError, StoreResult};
use crate::backend::storage::traits::Connection;

/// Default name of the transactions file inside the data directory
pub const DEFAULT_TRANSACTIONS_FILE: &str = "transactions.json";
/// Default name of the backup directory inside the data directory
pub const DEFAULT_BACKUP_DIRECTORY: &str = "backups";

/// JsonConnection owns the location of the transactions file and the backup directory
#[derive(Clone, Debug)]
pub struct JsonConnection {
    transactions_file: PathBuf,
    backup_directory: PathBuf,
}

impl JsonConnection {
    /// Create a connection using the default file names inside `data_directory`
    pub fn new<P: AsRef<Path>>(data_directory: P) -> StoreResult<Self> {
        let data_directory = data_directory.as_ref();
        Self::with_paths(
            data_directory.join(DEFAULT_TRANSACTIONS_FILE),
            data_directory.join(DEFAULT_BACKUP_DIRECTORY),
        )
    }

    /// Create a connection for the locations named in the application config
    pub fn from_config(config: &AppConfig) -> StoreResult<Self> {
        Self::with_paths(config.transactions_path(), config.backup_path())
    }

    /// Create a connection with explicit locations.
    /// The transactions file is created (holding an empty list) if it is missing.
    pub fn with_paths<P: Into<PathBuf>, B: Into<PathBuf>>(
        transactions_file: P,
        backup_directory: B,
    ) -> StoreResult<Self> {
        let connection = Self {
            transactions_file: transactions_file.into(),
            backup_directory: backup_directory.into(),
        };
        connection.ensure_transactions_file_exists()?;
        Ok(connection)
    }

    pub fn transactions_file_path(&self) -> &Path {
        &self.transactions_file
    }

    /// Create the transactions file with an empty JSON array if it does not exist
    pub fn ensure_transactions_file_exists(&self) -> StoreResult<()> {
        if self.transactions_file.exists() {
            return Ok(());
        }

        if let Some(parent) = self.transactions_file.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
            }
        }

        fs::write(&self.transactions_file, "[]")
            .map_err(|e| StoreError::io(&self.transactions_file, e))?;
        info!("Created empty transactions file at {}", self.transactions_file.display());
        Ok(())
    }
}

impl Connection for JsonConnection {
    type TransactionRepository = TransactionRepository;

    fn create_transaction_repository(&self) -> Self::TransactionRepository {
        TransactionRepository::new(self.clone())
    }

    fn backup_directory(&self) -> &Path {
        &self.backup_directory
    }

    fn ensure_backup_directory_exists(&self) -> StoreResult<&Path> {
        if !self.backup_directory.exists() {
            fs::create_dir_all(&self.backup_directory)
                .map_err(|e| StoreError::io(&self.backup_directory, e))?;
            info!("Created backup directory at {}", self.backup_directory.display());
        }
        Ok(&self.backup_directory)
    }
}

/// Path of the scratch file used while rewriting `path`
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

/// Serialize `value` as pretty-printed UTF-8 JSON (non-ASCII kept literal) and
/// move it over `path` in one rename, so readers never observe a half-written file.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> StoreResult<()> {
    let content = serde_json::to_vec_pretty(value)?;
    let temp_path = temp_path_for(path);

    fs::write(&temp_path, &content).map_err(|e| StoreError::io(&temp_path, e))?;
    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(StoreError::io(path, e));
    }

    debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}
