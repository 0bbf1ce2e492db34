//! # Storage Traits
//!
//! This module defines the storage abstraction traits that allow the domain
//! layer to work against any backing store without knowing its file format.
//!
//! Every operation is synchronous and works on the whole collection: there is
//! no caching between calls, so each read reflects what is on disk right now.

use serde_json::Value;
use std::path::Path;

use super::error::StoreResult;
use crate::backend::domain::models::{Transaction, TransactionId};

/// Trait defining the interface for transaction storage operations
///
/// Records are kept in insertion order. Index-based operations address a record
/// by its position in the current full listing; id-based operations address it
/// by its stable identifier and survive reordering or deletion of other records.
pub trait TransactionStorage: Send + Sync {
    /// Load every stored transaction in insertion order
    fn read_all(&self) -> StoreResult<Vec<Transaction>>;

    /// Every stored element as JSON, including elements that are not readable
    /// as transactions. Used for snapshots that must match the file.
    fn read_all_raw(&self) -> StoreResult<Vec<Value>>;

    /// Append a transaction at the end of the collection
    fn append(&self, transaction: &Transaction) -> StoreResult<()>;

    /// Replace the record at `index`, keeping its identifier.
    /// Fails with `IndexOutOfRange` if `index` does not address a record.
    fn update_at(&self, index: usize, transaction: &Transaction) -> StoreResult<()>;

    /// Remove the record at `index`.
    /// Returns false (and leaves the collection alone) when `index` is out of range.
    fn delete_at(&self, index: usize) -> StoreResult<bool>;

    /// Discard the current contents and persist `transactions` instead
    fn replace_all(&self, transactions: &[Transaction]) -> StoreResult<()>;

    /// Retrieve a specific transaction by ID
    fn get_by_id(&self, id: &TransactionId) -> StoreResult<Option<Transaction>>;

    /// Replace the record with the given ID, keeping the ID. Fails with `NotFound`.
    fn update_by_id(&self, id: &TransactionId, transaction: &Transaction) -> StoreResult<()>;

    /// Remove the record with the given ID. Fails with `NotFound`.
    fn delete_by_id(&self, id: &TransactionId) -> StoreResult<()>;

    fn count(&self) -> StoreResult<usize> {
        Ok(self.read_all()?.len())
    }
}

/// Trait defining the interface for storage connections
///
/// A connection knows where data lives and hands out repositories bound to it.
pub trait Connection: Send + Sync + Clone {
    /// The type of TransactionStorage this connection creates
    type TransactionRepository: TransactionStorage;

    /// Create a new transaction repository for this connection
    fn create_transaction_repository(&self) -> Self::TransactionRepository;

    /// Directory that receives backup snapshots (may not exist yet)
    fn backup_directory(&self) -> &Path;

    /// Create the backup directory if needed and return its path
    fn ensure_backup_directory_exists(&self) -> StoreResult<&Path>;
}
