//! Balance and aggregate calculations over a list of transactions.
//!
//! These work on whatever slice they are given; the transaction service passes
//! a freshly loaded collection (or an import candidate list) each time.

use shared::{TransactionSummary, TransactionType};
use std::collections::BTreeSet;

use crate::backend::domain::models::Transaction;

#[derive(Clone, Debug, Default)]
pub struct BalanceService;

impl BalanceService {
    pub fn new() -> Self {
        Self
    }

    /// Sum of all amounts; zero for an empty list
    pub fn calculate_balance(&self, transactions: &[Transaction]) -> f64 {
        transactions.iter().map(|t| t.amount).sum()
    }

    /// Distinct categories in byte order (case-sensitive, so "Food" < "Transport" < "food")
    pub fn categories(&self, transactions: &[Transaction]) -> Vec<String> {
        transactions
            .iter()
            .map(|t| t.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Count income, expense and distinct categories
    pub fn summarize(&self, transactions: &[Transaction]) -> TransactionSummary {
        let mut summary = TransactionSummary {
            total: transactions.len(),
            categories: self.categories(transactions).len(),
            ..TransactionSummary::default()
        };

        for transaction in transactions {
            match transaction.transaction_type() {
                Some(TransactionType::Income) => summary.income += 1,
                Some(TransactionType::Expense) => summary.expense += 1,
                None => {}
            }
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(amount: f64, category: &str) -> Transaction {
        Transaction::new(amount, category, "2024-01-01", "")
    }

    #[test]
    fn test_balance_is_exact_sum() {
        let service = BalanceService::new();
        let transactions = vec![tx(1500.0, "Salary"), tx(-250.5, "Food"), tx(-49.5, "Transport")];

        assert_eq!(service.calculate_balance(&transactions), 1200.0);
        assert_eq!(service.calculate_balance(&[]), 0.0);
    }

    #[test]
    fn test_categories_are_deduplicated_in_byte_order() {
        let service = BalanceService::new();
        let transactions = vec![tx(1.0, "Food"), tx(2.0, "food"), tx(3.0, "Transport"), tx(4.0, "Food")];

        assert_eq!(service.categories(&transactions), vec!["Food", "Transport", "food"]);
    }

    #[test]
    fn test_summarize_ignores_zero_amounts_in_income_and_expense() {
        let service = BalanceService::new();
        let transactions = vec![tx(10.0, "A"), tx(-5.0, "B"), tx(0.0, "B"), tx(7.0, "A")];

        let summary = service.summarize(&transactions);

        assert_eq!(
            summary,
            TransactionSummary {
                total: 4,
                income: 2,
                expense: 1,
                categories: 2,
            }
        );
    }
}
