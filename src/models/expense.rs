//! Expense record model
//!
//! An expense is immutable once created; the only change it ever sees is
//! being removed from the collection.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::currency::Currency;
use super::ids::ExpenseId;

/// Maximum accepted name length when validating
pub const MAX_NAME_LEN: usize = 100;

/// Kind of expense
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ExpenseType {
    #[default]
    Personal,
    Business,
}

impl ExpenseType {
    /// Parse expense type from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "personal" => Some(Self::Personal),
            "business" => Some(Self::Business),
            _ => None,
        }
    }
}

impl fmt::Display for ExpenseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Personal => write!(f, "Personal"),
            Self::Business => write!(f, "Business"),
        }
    }
}

/// A single user-entered expense
///
/// Field order matches the persisted schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    /// Unique identifier
    pub id: ExpenseId,

    /// Display label
    pub name: String,

    /// Personal or business
    #[serde(rename = "type")]
    pub expense_type: ExpenseType,

    /// Amount in `currency`; may be zero or negative but must be finite
    pub amount: f64,

    /// Currency of `amount`
    pub currency: Currency,
}

impl ExpenseRecord {
    /// Create a new record with a fresh id
    pub fn new(
        name: impl Into<String>,
        expense_type: ExpenseType,
        amount: f64,
        currency: Currency,
    ) -> Self {
        Self {
            id: ExpenseId::new(),
            name: name.into(),
            expense_type,
            amount,
            currency,
        }
    }

    /// Validate the record
    pub fn validate(&self) -> Result<(), ExpenseValidationError> {
        // JSON has no encoding for NaN or infinity
        if !self.amount.is_finite() {
            return Err(ExpenseValidationError::NonFiniteAmount(self.amount));
        }

        if self.name.trim().is_empty() {
            return Err(ExpenseValidationError::EmptyName);
        }

        let len = self.name.chars().count();
        if len > MAX_NAME_LEN {
            return Err(ExpenseValidationError::NameTooLong(len));
        }

        Ok(())
    }
}

impl fmt::Display for ExpenseRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}): {:.2} {}",
            self.name, self.expense_type, self.amount, self.currency
        )
    }
}

/// Input of the "add expense" form
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub name: String,
    pub expense_type: ExpenseType,
    pub amount: f64,
    pub currency: Currency,
}

impl Default for NewExpense {
    fn default() -> Self {
        Self {
            name: String::new(),
            expense_type: ExpenseType::Personal,
            amount: 0.0,
            currency: Currency::Usd,
        }
    }
}

impl NewExpense {
    pub fn new(
        name: impl Into<String>,
        expense_type: ExpenseType,
        amount: f64,
        currency: Currency,
    ) -> Self {
        Self {
            name: name.into(),
            expense_type,
            amount,
            currency,
        }
    }

    /// Turn the form into a record with a freshly generated id
    pub fn into_record(self) -> ExpenseRecord {
        ExpenseRecord::new(self.name, self.expense_type, self.amount, self.currency)
    }
}

/// Validation errors for expenses
#[derive(Debug, Clone, PartialEq)]
pub enum ExpenseValidationError {
    EmptyName,
    NameTooLong(usize),
    NonFiniteAmount(f64),
}

impl fmt::Display for ExpenseValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Expense name cannot be empty"),
            Self::NameTooLong(len) => {
                write!(f, "Expense name too long ({} chars, max {})", len, MAX_NAME_LEN)
            }
            Self::NonFiniteAmount(amount) => {
                write!(f, "Expense amount must be a finite number, got {}", amount)
            }
        }
    }
}

impl std::error::Error for ExpenseValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record() {
        let record = ExpenseRecord::new("Coffee", ExpenseType::Personal, 3.5, Currency::Eur);
        assert_eq!(record.name, "Coffee");
        assert_eq!(record.expense_type, ExpenseType::Personal);
        assert_eq!(record.amount, 3.5);
        assert_eq!(record.currency, Currency::Eur);
    }

    #[test]
    fn test_validation() {
        let mut record = ExpenseRecord::new("Taxi", ExpenseType::Business, 20.0, Currency::Usd);
        assert!(record.validate().is_ok());

        record.name = "   ".into();
        assert_eq!(record.validate(), Err(ExpenseValidationError::EmptyName));

        record.name = "a".repeat(101);
        assert!(matches!(
            record.validate(),
            Err(ExpenseValidationError::NameTooLong(101))
        ));
    }

    #[test]
    fn test_non_finite_amount_is_invalid() {
        for amount in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let record = ExpenseRecord::new("", ExpenseType::Personal, amount, Currency::Usd);
            assert!(matches!(
                record.validate(),
                Err(ExpenseValidationError::NonFiniteAmount(_))
            ));
        }

        let record = ExpenseRecord::new("Refund", ExpenseType::Personal, -0.0, Currency::Usd);
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_persisted_field_names_and_order() {
        let id = ExpenseId::parse("550e8400-e29b-41d4-a716-446655440000").unwrap();
        let record = ExpenseRecord {
            id,
            name: "Hotel".into(),
            expense_type: ExpenseType::Business,
            amount: 120.5,
            currency: Currency::Cny,
        };

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"id":"550E8400-E29B-41D4-A716-446655440000","name":"Hotel","type":"Business","amount":120.5,"currency":"CNY"}"#
        );
    }

    #[test]
    fn test_decodes_stored_record() {
        let json = r#"{"id":"E621E1F8-C36C-495A-93FC-0C247A3E6E5F","name":"Lunch","type":"Personal","amount":12,"currency":"RUB"}"#;
        let record: ExpenseRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.name, "Lunch");
        assert_eq!(record.expense_type, ExpenseType::Personal);
        assert_eq!(record.amount, 12.0);
        assert_eq!(record.currency, Currency::Rub);
    }

    #[test]
    fn test_unknown_type_fails_to_decode() {
        let json = r#"{"id":"E621E1F8-C36C-495A-93FC-0C247A3E6E5F","name":"Lunch","type":"Family","amount":12,"currency":"RUB"}"#;
        assert!(serde_json::from_str::<ExpenseRecord>(json).is_err());
    }

    #[test]
    fn test_expense_type_parsing() {
        assert_eq!(ExpenseType::parse("personal"), Some(ExpenseType::Personal));
        assert_eq!(ExpenseType::parse("BUSINESS"), Some(ExpenseType::Business));
        assert_eq!(ExpenseType::parse("family"), None);
    }

    #[test]
    fn test_form_defaults() {
        let form = NewExpense::default();
        assert!(form.name.is_empty());
        assert_eq!(form.expense_type, ExpenseType::Personal);
        assert_eq!(form.amount, 0.0);
        assert_eq!(form.currency, Currency::Usd);
    }

    #[test]
    fn test_form_generates_distinct_ids() {
        let form = NewExpense::new("Book", ExpenseType::Personal, 15.0, Currency::Usd);
        let a = form.clone().into_record();
        let b = form.into_record();
        assert_ne!(a.id, b.id);
        assert_eq!(a.name, b.name);
    }

    #[test]
    fn test_display() {
        let record = ExpenseRecord::new("Taxi", ExpenseType::Business, 20.0, Currency::Usd);
        assert_eq!(format!("{}", record), "Taxi (Business): 20.00 USD");
    }
}
