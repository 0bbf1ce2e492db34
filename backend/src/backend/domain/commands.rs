//! Domain-level command types.
//! The presentation layer hands over a raw `shared::TransactionForm`; these are
//! the typed values the services work with once the form has been validated.

pub mod transactions {
    use chrono::Local;
    use shared::TransactionForm;

    use crate::backend::domain::models::{Transaction, TransactionId};
    use crate::backend::domain::validator::{
        parse_amount, validate_transaction_data, ValidationErrors, DATE_FORMAT,
    };

    /// Typed values for creating a transaction or replacing an existing one.
    #[derive(Debug, Clone, PartialEq)]
    pub struct TransactionCommand {
        pub amount: f64,
        pub category: String,
        pub date: String,
        pub description: String,
    }

    impl TransactionCommand {
        pub fn new(amount: f64, category: &str, date: &str, description: &str) -> Self {
            Self {
                amount,
                category: category.to_string(),
                date: date.to_string(),
                description: description.to_string(),
            }
        }

        /// Validate a raw form and convert it.
        ///
        /// Category and description are trimmed before they are checked; an empty date becomes today.
        pub fn from_form(form: &TransactionForm) -> Result<Self, ValidationErrors> {
            let category = form.category.trim();
            let description = form.description.trim();
            validate_transaction_data(
                &form.amount,
                category,
                Some(form.date.trim()),
                Some(description),
            )?;

            // Validation already proved the amount parses.
            let amount = parse_amount(&form.amount).unwrap_or_default();

            let date = match form.date.trim() {
                "" => Local::now().date_naive().format(DATE_FORMAT).to_string(),
                date => date.to_string(),
            };

            Ok(Self {
                amount,
                category: category.to_string(),
                date,
                description: description.to_string(),
            })
        }

        pub(crate) fn into_transaction(self, id: TransactionId) -> Transaction {
            Transaction {
                amount: self.amount,
                category: self.category,
                date: self.date,
                description: self.description,
                id,
            }
        }
    }

}
