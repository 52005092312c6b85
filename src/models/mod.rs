//! Core data models for iexpense
//!
//! Expense records, their currencies, and the display-only risk level derived
//! from a record's USD equivalent.

pub mod currency;
pub mod expense;
pub mod ids;
pub mod risk;

pub use currency::{usd_value, Currency};
pub use expense::{ExpenseRecord, ExpenseType, ExpenseValidationError, NewExpense};
pub use ids::ExpenseId;
pub use risk::{classify, RiskLevel};
