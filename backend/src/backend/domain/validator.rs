//! # Transaction Validation
//!
//! Two independent checks live here:
//!
//! - **Form validation** (`validate_transaction_data`, `validate_amount`) works on
//!   the untyped text a user typed and has to parse it. Every violated rule is
//!   collected so the user sees all problems at once.
//! - **Structural validation** (`is_valid_transaction_structure`) works on JSON
//!   that is already typed (a stored file or an import) and only checks field
//!   presence and types. It is the admission filter in front of normalization.

use chrono::NaiveDate;
use serde_json::Value;
use std::fmt;

/// Largest accepted absolute amount
pub const MAX_AMOUNT: f64 = 1_000_000_000.0;
/// Maximum category length in characters, measured after trimming
pub const MAX_CATEGORY_LENGTH: usize = 100;
/// Maximum description length in characters
pub const MAX_DESCRIPTION_LENGTH: usize = 500;
/// Accepted calendar date layout
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single violated form rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Amount is required")]
    MissingAmount,
    #[error("Amount must be a number")]
    AmountNotANumber,
    #[error("Amount cannot be zero")]
    ZeroAmount,
    #[error("Amount is too large")]
    AmountTooLarge,
    #[error("Category is required")]
    MissingCategory,
    #[error("Category is too long (max 100 characters)")]
    CategoryTooLong,
    #[error("Description is too long (max 500 characters)")]
    DescriptionTooLong,
    #[error("Invalid date format, expected YYYY-MM-DD")]
    InvalidDate,
}

/// Every rule a submitted form violated, in check order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    pub fn contains(&self, error: ValidationError) -> bool {
        self.0.contains(&error)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Found errors:")?;
        for error in &self.0 {
            write!(f, "\n• {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Outcome of the as-you-type amount check
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("Must be a number")]
    NotANumber,
    #[error("Amount is too large")]
    TooLarge,
}

/// Parse amount text, enforcing the magnitude bound. Surrounding whitespace is ignored.
pub fn parse_amount(text: &str) -> Result<f64, AmountError> {
    let value: f64 = text.trim().parse().map_err(|_| AmountError::NotANumber)?;
    if value.is_nan() {
        return Err(AmountError::NotANumber);
    }
    // inf lands here as well
    if value.abs() > MAX_AMOUNT {
        return Err(AmountError::TooLarge);
    }
    Ok(value)
}

/// Validate the raw fields of the add/edit form before they become a record.
///
/// `date` and `description` are optional; an empty date is treated as absent.
pub fn validate_transaction_data(
    amount_text: &str,
    category: &str,
    date: Option<&str>,
    description: Option<&str>,
) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();

    if amount_text.trim().is_empty() {
        errors.push(ValidationError::MissingAmount);
    } else {
        match parse_amount(amount_text) {
            Ok(amount) if amount == 0.0 => errors.push(ValidationError::ZeroAmount),
            Ok(_) => {}
            Err(AmountError::NotANumber) => errors.push(ValidationError::AmountNotANumber),
            Err(AmountError::TooLarge) => errors.push(ValidationError::AmountTooLarge),
        }
    }

    let category = category.trim();
    if category.is_empty() {
        errors.push(ValidationError::MissingCategory);
    } else if category.chars().count() > MAX_CATEGORY_LENGTH {
        errors.push(ValidationError::CategoryTooLong);
    }

    if let Some(description) = description {
        if description.chars().count() > MAX_DESCRIPTION_LENGTH {
            errors.push(ValidationError::DescriptionTooLong);
        }
    }

    if let Some(date) = date.filter(|d| !d.is_empty()) {
        if NaiveDate::parse_from_str(date, DATE_FORMAT).is_err() {
            errors.push(ValidationError::InvalidDate);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(errors))
    }
}

/// Live check for the amount field. An empty field is fine while the user is typing.
pub fn validate_amount(text: &str) -> Result<(), AmountError> {
    if text.trim().is_empty() {
        return Ok(());
    }
    parse_amount(text).map(|_| ())
}

/// Check that a typed JSON value looks like a transaction record:
/// an object with a numeric `amount` and non-blank `category` and `date` strings.
///
/// Date parseability and amount bounds are not checked here.
pub fn is_valid_transaction_structure(value: &Value) -> bool {
    let Some(record) = value.as_object() else {
        return false;
    };

    let amount_ok = record.get("amount").is_some_and(Value::is_number);
    let non_blank = |key: &str| {
        record
            .get(key)
            .and_then(Value::as_str)
            .is_some_and(|s| !s.trim().is_empty())
    };

    amount_ok && non_blank("category") && non_blank("date")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_form_passes() {
        assert!(validate_transaction_data("1500.50", "Salary", Some("2024-01-31"), Some("January")).is_ok());
        assert!(validate_transaction_data("-20", "  Food  ", None, None).is_ok());
        assert!(validate_transaction_data(" 7 ", "Food", Some(""), Some("")).is_ok());
    }

    #[test]
    fn test_all_violations_are_collected() {
        let long_description = "x".repeat(501);
        let errors = validate_transaction_data("abc", "   ", Some("31/01/2024"), Some(&long_description))
            .unwrap_err();

        assert_eq!(
            errors.errors(),
            &[
                ValidationError::AmountNotANumber,
                ValidationError::MissingCategory,
                ValidationError::DescriptionTooLong,
                ValidationError::InvalidDate,
            ]
        );

        let message = errors.to_string();
        assert!(message.starts_with("Found errors:\n• Amount must be a number"));
        assert_eq!(message.matches("\n• ").count(), 4);
    }

    #[test]
    fn test_amount_rules() {
        let missing = validate_transaction_data("", "Food", None, None).unwrap_err();
        assert!(missing.contains(ValidationError::MissingAmount));

        let zero = validate_transaction_data("0.0", "Food", None, None).unwrap_err();
        assert!(zero.contains(ValidationError::ZeroAmount));

        let too_large = validate_transaction_data("-1000000000.01", "Food", None, None).unwrap_err();
        assert!(too_large.contains(ValidationError::AmountTooLarge));

        assert!(validate_transaction_data("1000000000", "Food", None, None).is_ok());

        let nan = validate_transaction_data("NaN", "Food", None, None).unwrap_err();
        assert!(nan.contains(ValidationError::AmountNotANumber));

        let inf = validate_transaction_data("inf", "Food", None, None).unwrap_err();
        assert!(inf.contains(ValidationError::AmountTooLarge));
    }

    #[test]
    fn test_category_length_is_measured_after_trim_in_characters() {
        let exactly_max = format!("  {}  ", "к".repeat(100));
        assert!(validate_transaction_data("1", &exactly_max, None, None).is_ok());

        let too_long = "к".repeat(101);
        let errors = validate_transaction_data("1", &too_long, None, None).unwrap_err();
        assert_eq!(errors.errors(), &[ValidationError::CategoryTooLong]);
    }

    #[test]
    fn test_description_length_is_untrimmed() {
        let padded = format!("{}  ", "d".repeat(499));
        let errors = validate_transaction_data("1", "Food", None, Some(&padded)).unwrap_err();
        assert_eq!(errors.errors(), &[ValidationError::DescriptionTooLong]);
    }

    #[test]
    fn test_date_must_be_a_real_calendar_date() {
        assert!(validate_transaction_data("1", "Food", Some("2024-02-29"), None).is_ok());
        let errors = validate_transaction_data("1", "Food", Some("2023-02-29"), None).unwrap_err();
        assert_eq!(errors.errors(), &[ValidationError::InvalidDate]);
    }

    #[test]
    fn test_validate_amount_live() {
        assert_eq!(validate_amount(""), Ok(()));
        assert_eq!(validate_amount("   "), Ok(()));
        assert_eq!(validate_amount("-12.5"), Ok(()));
        // zero is not rejected while typing
        assert_eq!(validate_amount("0"), Ok(()));
        assert_eq!(validate_amount("12a"), Err(AmountError::NotANumber));
        assert_eq!(validate_amount("2e9"), Err(AmountError::TooLarge));
    }

    #[test]
    fn test_structure_check() {
        assert!(is_valid_transaction_structure(&json!({
            "amount": 10, "category": "Food", "date": "2024-01-01"
        })));
        assert!(is_valid_transaction_structure(&json!({
            "amount": -2.5, "category": "Food", "date": "not a date", "description": 7
        })));

        assert!(!is_valid_transaction_structure(&json!([1, 2])));
        assert!(!is_valid_transaction_structure(&json!({
            "amount": "10", "category": "Food", "date": "2024-01-01"
        })));
        assert!(!is_valid_transaction_structure(&json!({
            "amount": 10, "category": "   ", "date": "2024-01-01"
        })));
        assert!(!is_valid_transaction_structure(&json!({
            "amount": 10, "category": "Food"
        })));
        assert!(!is_valid_transaction_structure(&json!({
            "amount": 10, "category": "Food", "date": 20240101
        })));
    }
}
