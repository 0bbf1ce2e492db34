//! Domain model for a transaction.
use serde::{Deserialize, Serialize};
use shared::TransactionType;
use std::fmt;
use uuid::Uuid;

/// Stable identifier of a stored transaction (UUID v4 text).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TransactionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TransactionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single income or expense entry.
///
/// Field order matches the on-disk layout: the four user-facing fields first,
/// then the identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Positive for income, negative for expense
    pub amount: f64,
    pub category: String,
    /// Calendar date, `YYYY-MM-DD`
    pub date: String,
    #[serde(default)]
    pub description: String,
    pub id: TransactionId,
}

impl Transaction {
    /// Create a transaction with a freshly generated identifier
    pub fn new(amount: f64, category: &str, date: &str, description: &str) -> Self {
        Self {
            amount,
            category: category.to_string(),
            date: date.to_string(),
            description: description.to_string(),
            id: TransactionId::generate(),
        }
    }

    pub fn transaction_type(&self) -> Option<TransactionType> {
        TransactionType::from_amount(self.amount)
    }

    /// Case-insensitive substring match against category or description.
    /// `needle` must already be lowercased.
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        self.category.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {} | {:+.2}", self.date, self.category, self.amount)?;
        if !self.description.is_empty() {
            write!(f, " | {}", self.description)?;
        }
        Ok(())
    }
}

/// Shape of a record as found on disk. Files written before identifiers
/// existed carry no `id`, and hand-edited files may carry a null description.
#[derive(Debug, Deserialize)]
pub(crate) struct StoredTransaction {
    pub amount: f64,
    pub category: String,
    pub date: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
}
