use log::{debug, info, warn};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;

use super::connection::{write_json_atomic, JsonConnection};
use crate::backend::domain::models::transaction::StoredTransaction;
use crate::backend::domain::models::{Transaction, TransactionId};
use crate::backend::domain::validator::is_valid_transaction_structure;
use crate::backend::storage::error::{StoreError, StoreResult};
use crate::backend::storage::traits::TransactionStorage;

/// One element of the stored array
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
enum StoredEntry {
    Record(Transaction),
    /// Element that is not a transaction; kept in place and written back as found
    Unreadable(Value),
}

/// Everything in the transactions file, in file order
#[derive(Debug, Default)]
struct StoredFile {
    entries: Vec<StoredEntry>,
}

impl StoredFile {
    fn transactions(&self) -> impl Iterator<Item = &Transaction> {
        self.entries.iter().filter_map(|entry| match entry {
            StoredEntry::Record(transaction) => Some(transaction),
            StoredEntry::Unreadable(_) => None,
        })
    }

    fn into_transactions(self) -> Vec<Transaction> {
        self.entries
            .into_iter()
            .filter_map(|entry| match entry {
                StoredEntry::Record(transaction) => Some(transaction),
                StoredEntry::Unreadable(_) => None,
            })
            .collect()
    }

    fn len(&self) -> usize {
        self.transactions().count()
    }

    /// Mutable access to the `index`-th transaction, skipping unreadable elements
    fn record_at_mut(&mut self, index: usize) -> Option<&mut Transaction> {
        self.entries
            .iter_mut()
            .filter_map(|entry| match entry {
                StoredEntry::Record(transaction) => Some(transaction),
                StoredEntry::Unreadable(_) => None,
            })
            .nth(index)
    }

    /// Position in `entries` of the `index`-th transaction
    fn entry_position(&self, index: usize) -> Option<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| matches!(entry, StoredEntry::Record(_)))
            .nth(index)
            .map(|(position, _)| position)
    }

    fn entry_position_of(&self, id: &TransactionId) -> StoreResult<usize> {
        self.entries
            .iter()
            .position(|entry| matches!(entry, StoredEntry::Record(t) if &t.id == id))
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }
}

/// JSON-file transaction repository.
///
/// Every call reloads the whole file and every mutation rewrites it. Array
/// elements that are not transactions are hidden from callers but survive
/// every rewrite except `replace_all`.
#[derive(Clone)]
pub struct TransactionRepository {
    connection: JsonConnection,
}

impl TransactionRepository {
    /// Create a new JSON transaction repository
    pub fn new(connection: JsonConnection) -> Self {
        Self { connection }
    }

    /// Read the whole file.
    ///
    /// A missing or undecodable file reads as empty. Elements that fail the
    /// structural check are kept as unreadable entries. Records without an
    /// identifier (or sharing one) get a fresh one, and the file is rewritten
    /// once; if that rewrite fails the records are still returned.
    fn read_file(&self) -> StoreResult<StoredFile> {
        let file_path = self.connection.transactions_file_path();

        let content = match fs::read_to_string(file_path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Transactions file {} is missing, starting empty", file_path.display());
                return Ok(StoredFile::default());
            }
            Err(e) => return Err(StoreError::io(file_path, e)),
        };

        let values = match serde_json::from_str::<Value>(&content) {
            Ok(Value::Array(values)) => values,
            Ok(_) => {
                warn!("Transactions file {} does not hold a list, starting empty", file_path.display());
                return Ok(StoredFile::default());
            }
            Err(e) => {
                warn!("Transactions file {} is malformed ({}), starting empty", file_path.display(), e);
                return Ok(StoredFile::default());
            }
        };

        let mut entries = Vec::with_capacity(values.len());
        let mut seen_ids = HashSet::new();
        let mut assigned = 0;

        for (index, value) in values.into_iter().enumerate() {
            if !is_valid_transaction_structure(&value) {
                warn!("Stored element #{} is not a transaction, leaving it untouched: {}", index, value);
                entries.push(StoredEntry::Unreadable(value));
                continue;
            }

            let stored: StoredTransaction = match serde_json::from_value(value.clone()) {
                Ok(stored) => stored,
                Err(e) => {
                    warn!("Stored element #{} cannot be decoded ({}), leaving it untouched", index, e);
                    entries.push(StoredEntry::Unreadable(value));
                    continue;
                }
            };

            let id = match stored.id {
                Some(id) if !id.trim().is_empty() && !seen_ids.contains(&id) => TransactionId::from(id),
                _ => {
                    assigned += 1;
                    TransactionId::generate()
                }
            };
            seen_ids.insert(id.as_str().to_string());

            entries.push(StoredEntry::Record(Transaction {
                amount: stored.amount,
                category: stored.category,
                date: stored.date,
                description: stored.description.unwrap_or_default(),
                id,
            }));
        }

        let file = StoredFile { entries };

        if assigned > 0 {
            match self.write_file(&file) {
                Ok(()) => info!("Assigned identifiers to {} stored transactions", assigned),
                Err(e) => warn!(
                    "Assigned identifiers to {} stored transactions but could not save them: {}",
                    assigned, e
                ),
            }
        }

        debug!("Loaded {} transactions from {}", file.len(), file_path.display());
        Ok(file)
    }

    /// Write every entry back to the file
    fn write_file(&self, file: &StoredFile) -> StoreResult<()> {
        write_json_atomic(self.connection.transactions_file_path(), &file.entries)
    }
}

impl TransactionStorage for TransactionRepository {
    fn read_all(&self) -> StoreResult<Vec<Transaction>> {
        Ok(self.read_file()?.into_transactions())
    }

    fn read_all_raw(&self) -> StoreResult<Vec<Value>> {
        let file = self.read_file()?;
        let values = file
            .entries
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(values)
    }

    fn append(&self, transaction: &Transaction) -> StoreResult<()> {
        let mut file = self.read_file()?;
        file.entries.push(StoredEntry::Record(transaction.clone()));
        self.write_file(&file)?;

        info!("Stored transaction {} ({} total)", transaction.id, file.len());
        Ok(())
    }

    fn update_at(&self, index: usize, transaction: &Transaction) -> StoreResult<()> {
        let mut file = self.read_file()?;
        let len = file.len();

        let Some(existing) = file.record_at_mut(index) else {
            warn!("Cannot update transaction #{}: only {} stored", index, len);
            return Err(StoreError::IndexOutOfRange { index, len });
        };
        *existing = Transaction {
            id: existing.id.clone(),
            ..transaction.clone()
        };

        self.write_file(&file)?;
        info!("Updated transaction #{}", index);
        Ok(())
    }

    fn delete_at(&self, index: usize) -> StoreResult<bool> {
        let mut file = self.read_file()?;

        let Some(position) = file.entry_position(index) else {
            warn!("Transaction #{} not found for deletion ({} stored)", index, file.len());
            return Ok(false);
        };

        file.entries.remove(position);
        self.write_file(&file)?;
        info!("Deleted transaction #{}", index);
        Ok(true)
    }

    fn replace_all(&self, transactions: &[Transaction]) -> StoreResult<()> {
        write_json_atomic(self.connection.transactions_file_path(), transactions)?;
        info!("Replaced all transactions, new count: {}", transactions.len());
        Ok(())
    }

    fn get_by_id(&self, id: &TransactionId) -> StoreResult<Option<Transaction>> {
        let file = self.read_file()?;
        Ok(file.into_transactions().into_iter().find(|t| &t.id == id))
    }

    fn update_by_id(&self, id: &TransactionId, transaction: &Transaction) -> StoreResult<()> {
        let mut file = self.read_file()?;
        let position = file.entry_position_of(id)?;

        file.entries[position] = StoredEntry::Record(Transaction {
            id: id.clone(),
            ..transaction.clone()
        });

        self.write_file(&file)?;
        info!("Updated transaction {}", id);
        Ok(())
    }

    fn delete_by_id(&self, id: &TransactionId) -> StoreResult<()> {
        let mut file = self.read_file()?;
        let position = file.entry_position_of(id)?;

        file.entries.remove(position);
        self.write_file(&file)?;
        info!("Deleted transaction {}", id);
        Ok(())
    }
}
