//! Test utilities module for automatic cleanup and consistent test infrastructure
//!
//! This module provides RAII-based cleanup that guarantees test data is removed
//! even if tests panic or fail.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::connection::JsonConnection;
use super::transaction_repository::TransactionRepository;
use crate::backend::domain::models::Transaction;
use crate::backend::storage::traits::TransactionStorage;

/// RAII Test Environment that automatically cleans up on drop
pub struct TestEnvironment {
    /// The temporary directory - kept alive to prevent auto-cleanup until drop
    _temp_dir: TempDir,
    /// The JSON connection for the test
    pub connection: JsonConnection,
    /// Data directory path for manual inspection if needed
    pub base_path: PathBuf,
}

impl TestEnvironment {
    /// Create a new test environment with a fresh, empty transactions file
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let base_path = temp_dir.path().to_path_buf();
        let connection = JsonConnection::new(&base_path).expect("open json connection");

        TestEnvironment {
            _temp_dir: temp_dir,
            connection,
            base_path,
        }
    }

    pub fn repository(&self) -> TransactionRepository {
        TransactionRepository::new(self.connection.clone())
    }

    pub fn transactions_file(&self) -> &Path {
        self.connection.transactions_file_path()
    }

    /// Overwrite the transactions file with raw text
    pub fn write_raw(&self, content: &str) {
        fs::write(self.transactions_file(), content).expect("write transactions file");
    }

    pub fn read_raw(&self) -> String {
        fs::read_to_string(self.transactions_file()).expect("read transactions file")
    }

    /// Store the given transactions directly, bypassing any service logic
    pub fn seed(&self, transactions: &[Transaction]) {
        self.repository()
            .replace_all(transactions)
            .expect("seed transactions");
    }

    /// Path for an auxiliary file inside the test directory
    pub fn path(&self, name: &str) -> PathBuf {
        self.base_path.join(name)
    }
}

pub fn sample(amount: f64, category: &str, description: &str) -> Transaction {
    Transaction::new(amount, category, "2024-01-15", description)
}
