use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw values of the add/edit transaction form, exactly as the user typed them.
///
/// Nothing here has been parsed or trimmed yet; the backend validator decides
/// whether the form can become a transaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionForm {
    /// Amount text (positive for income, negative for expense)
    pub amount: String,
    /// Category name, trimmed before storing (max 100 characters)
    pub category: String,
    /// Calendar date in `YYYY-MM-DD` form
    pub date: String,
    /// Free text description (max 500 characters)
    pub description: String,
}

impl TransactionForm {
    pub fn new(
        amount: impl Into<String>,
        category: impl Into<String>,
        date: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            amount: amount.into(),
            category: category.into(),
            date: date.into(),
            description: description.into(),
        }
    }
}

/// Type of transaction for rendering and reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    /// Money received (positive amount)
    Income,
    /// Money spent (negative amount)
    Expense,
}

impl TransactionType {
    /// Classify an amount. Zero is neither income nor expense.
    pub fn from_amount(amount: f64) -> Option<Self> {
        if amount > 0.0 {
            Some(TransactionType::Income)
        } else if amount < 0.0 {
            Some(TransactionType::Expense)
        } else {
            None
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionType::Income => write!(f, "Income"),
            TransactionType::Expense => write!(f, "Expense"),
        }
    }
}

/// Aggregate counts over a set of transactions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub total: usize,
    pub income: usize,
    pub expense: usize,
    /// Number of distinct categories
    pub categories: usize,
}

impl TransactionSummary {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

impl fmt::Display for TransactionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "• Total transactions: {}", self.total)?;
        writeln!(f, "• Income: {}", self.income)?;
        writeln!(f, "• Expenses: {}", self.expense)?;
        write!(f, "• Unique categories: {}", self.categories)
    }
}

/// Metadata block written at the top of every export or backup file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportInfo {
    /// Envelope format version
    pub version: String,
    /// When the export was produced (RFC 3339)
    pub export_date: String,
    pub transaction_count: usize,
    /// Name of the application that wrote the file
    pub application: String,
}

/// Current envelope format version
pub const EXPORT_FORMAT_VERSION: &str = "1.0";
