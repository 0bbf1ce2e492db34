//! Transaction service domain logic for the finance tracker.
//!
//! Business rules on top of a `TransactionStorage`: form-driven add and edit,
//! category listing, balance, filtering and search, plus the export, import
//! and backup flows. Nothing is cached; every call sees the file as it is now.

use anyhow::Context;
use chrono::Local;
use log::{error, info, warn};
use shared::{TransactionForm, TransactionSummary};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::backend::domain::balance_service::BalanceService;
use crate::backend::domain::commands::transactions::TransactionCommand;
use crate::backend::domain::export_service::{
    unique_backup_path, ExportService, ImportError, ImportReport, BACKUP_PREFIX,
    PRE_IMPORT_BACKUP_PREFIX,
};
use crate::backend::domain::models::{Transaction, TransactionId};
use crate::backend::domain::validator::ValidationErrors;
use crate::backend::storage::error::{StoreError, StoreResult};
use crate::backend::storage::traits::{Connection, TransactionStorage};

/// Failure of a form-driven add or edit
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct TransactionService<C: Connection> {
    connection: Arc<C>,
    transaction_repository: C::TransactionRepository,
    balance_service: BalanceService,
    export_service: ExportService,
}

impl<C: Connection> TransactionService<C> {
    pub fn new(connection: Arc<C>, export_service: ExportService) -> Self {
        let transaction_repository = connection.create_transaction_repository();
        Self {
            connection,
            transaction_repository,
            balance_service: BalanceService::new(),
            export_service,
        }
    }

    /// Append a new record. Values are stored as given; validate them first.
    pub fn add(
        &self,
        amount: f64,
        category: &str,
        date: &str,
        description: &str,
    ) -> StoreResult<Transaction> {
        let transaction = Transaction::new(amount, category, date, description);
        self.transaction_repository.append(&transaction)?;
        Ok(transaction)
    }

    /// Validate a raw form and append the resulting record
    pub fn add_from_form(&self, form: &TransactionForm) -> Result<Transaction, TransactionError> {
        let command = TransactionCommand::from_form(form)?;
        let transaction = command.into_transaction(TransactionId::generate());
        self.transaction_repository.append(&transaction)?;
        Ok(transaction)
    }

    pub fn get_all(&self) -> StoreResult<Vec<Transaction>> {
        self.transaction_repository.read_all()
    }

    /// The record at `index` in the current listing, or `None` when out of range
    pub fn get_by_index(&self, index: usize) -> StoreResult<Option<Transaction>> {
        Ok(self.transaction_repository.read_all()?.into_iter().nth(index))
    }

    /// Replace the record at `index`, keeping its identifier
    pub fn update(&self, index: usize, command: TransactionCommand) -> StoreResult<()> {
        // update_at keeps the stored id, the generated one is discarded
        let transaction = command.into_transaction(TransactionId::generate());
        self.transaction_repository.update_at(index, &transaction)
    }

    /// Validate a raw form and replace the record at `index` with it
    pub fn update_from_form(&self, index: usize, form: &TransactionForm) -> Result<(), TransactionError> {
        let command = TransactionCommand::from_form(form)?;
        self.update(index, command)?;
        Ok(())
    }

    /// Remove the record at `index`; false when there was none
    pub fn delete(&self, index: usize) -> StoreResult<bool> {
        self.transaction_repository.delete_at(index)
    }

    pub fn get_by_id(&self, id: &TransactionId) -> StoreResult<Option<Transaction>> {
        self.transaction_repository.get_by_id(id)
    }

    pub fn update_by_id(&self, id: &TransactionId, command: TransactionCommand) -> StoreResult<()> {
        let transaction = command.into_transaction(id.clone());
        self.transaction_repository.update_by_id(id, &transaction)
    }

    pub fn delete_by_id(&self, id: &TransactionId) -> StoreResult<()> {
        self.transaction_repository.delete_by_id(id)
    }

    pub fn get_categories(&self) -> StoreResult<Vec<String>> {
        let transactions = self.transaction_repository.read_all()?;
        Ok(self.balance_service.categories(&transactions))
    }

    pub fn calculate_balance(&self) -> StoreResult<f64> {
        let transactions = self.transaction_repository.read_all()?;
        Ok(self.balance_service.calculate_balance(&transactions))
    }

    /// Records whose category equals `category` exactly, in stored order
    pub fn filter_by_category(&self, category: &str) -> StoreResult<Vec<Transaction>> {
        let transactions = self.transaction_repository.read_all()?;
        Ok(transactions
            .into_iter()
            .filter(|t| t.category == category)
            .collect())
    }

    /// Case-insensitive substring search over category and description.
    /// An empty query matches every record.
    pub fn search(&self, query: &str) -> StoreResult<Vec<Transaction>> {
        let needle = query.to_lowercase();
        let transactions = self.transaction_repository.read_all()?;
        Ok(transactions
            .into_iter()
            .filter(|t| t.matches_lowercase(&needle))
            .collect())
    }

    pub fn count(&self) -> StoreResult<usize> {
        self.transaction_repository.count()
    }

    pub fn summary(&self) -> StoreResult<TransactionSummary> {
        let transactions = self.transaction_repository.read_all()?;
        Ok(self.balance_service.summarize(&transactions))
    }

    /// Write the whole collection to `path` as an export envelope.
    /// Failures are logged and reported as `false`.
    pub fn export_to_json(&self, path: &Path) -> bool {
        let result = self
            .transaction_repository
            .read_all()
            .context("Failed to load transactions for export")
            .and_then(|transactions| self.export_service.write_export(path, transactions));

        match result {
            Ok(_) => true,
            Err(e) => {
                error!("❌ EXPORT: {:#}", e);
                false
            }
        }
    }

    /// Export to `path`, or to a timestamped file in the backup directory when none is given.
    /// Unlike a plain export, a backup also keeps stored elements that are not
    /// readable as transactions.
    pub fn create_backup(&self, path: Option<&Path>) -> bool {
        let target = match path {
            Some(path) => Ok(path.to_path_buf()),
            None => self.backup_target(BACKUP_PREFIX),
        };
        let result = target.and_then(|target| {
            self.write_snapshot(&target)?;
            Ok(target)
        });

        match result {
            Ok(target) => {
                info!("💾 BACKUP: Created {}", target.display());
                true
            }
            Err(e) => {
                error!("❌ BACKUP: {:#}", e);
                false
            }
        }
    }

    /// Replace the whole collection with the transactions in an export or
    /// bare-array file.
    ///
    /// The current collection is snapshotted to the backup directory first;
    /// if that snapshot fails the import still goes ahead.
    pub fn import_from_json(&self, path: &Path) -> Result<ImportReport, ImportError> {
        info!("📥 IMPORT: Reading {}", path.display());

        let candidates = self.export_service.read_import_file(path)?;
        let (admitted, skipped) = self.export_service.admit(candidates.records);
        if admitted.is_empty() {
            warn!("📥 IMPORT: No valid transactions in {}", path.display());
            return Err(ImportError::EmptyImport);
        }

        let transactions = self.export_service.normalize_all(admitted);
        let backup_path = self.pre_import_backup();

        self.transaction_repository.replace_all(&transactions)?;

        let report = self.export_service.build_report(
            &transactions,
            candidates.export_info.as_ref(),
            skipped,
            backup_path,
        );
        info!(
            "📥 IMPORT: Loaded {} transactions ({} skipped) from {}",
            report.summary.total,
            skipped,
            path.display()
        );
        Ok(report)
    }

    /// Backup files, newest first. Empty when the backup directory does not exist.
    pub fn list_backups(&self) -> StoreResult<Vec<PathBuf>> {
        let backup_dir = self.connection.backup_directory();
        if !backup_dir.is_dir() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(backup_dir).map_err(|e| StoreError::io(backup_dir, e))?;
        let mut backups = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| StoreError::io(backup_dir, e))?.path();
            let is_json = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
            if is_json && path.is_file() {
                backups.push(path);
            }
        }

        // Names embed the timestamp, so name order is time order
        backups.sort_by(|a, b| b.file_name().cmp(&a.file_name()));
        Ok(backups)
    }

    /// Import a backup file, which replaces the current collection
    pub fn restore_from_backup(&self, path: &Path) -> Result<ImportReport, ImportError> {
        let backup_dir = self.connection.backup_directory();
        if !backup_dir.is_dir() {
            return Err(ImportError::NoBackups(backup_dir.to_path_buf()));
        }

        info!("♻️ RESTORE: Restoring from {}", path.display());
        self.import_from_json(path)
    }

    pub fn backup_directory(&self) -> &Path {
        self.connection.backup_directory()
    }

    fn backup_target(&self, prefix: &str) -> anyhow::Result<PathBuf> {
        let backup_dir = self
            .connection
            .ensure_backup_directory_exists()
            .context("Failed to prepare backup directory")?;
        Ok(unique_backup_path(backup_dir, prefix, &Local::now()))
    }

    /// Write every stored element, readable or not, as a backup envelope
    fn write_snapshot(&self, target: &Path) -> anyhow::Result<usize> {
        let current = self
            .transaction_repository
            .read_all_raw()
            .context("Failed to load current transactions")?;
        self.export_service.write_export(target, current)
    }

    fn pre_import_backup(&self) -> Option<PathBuf> {
        let result = self.backup_target(PRE_IMPORT_BACKUP_PREFIX).and_then(|target| {
            self.write_snapshot(&target)?;
            Ok(target)
        });

        match result {
            Ok(target) => {
                info!("💾 BACKUP: Saved pre-import snapshot to {}", target.display());
                Some(target)
            }
            Err(e) => {
                warn!("⚠️ Pre-import backup failed, continuing with import: {:#}", e);
                None
            }
        }
    }
}
