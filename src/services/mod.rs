//! Service layer for iexpense
//!
//! The service layer sits on top of the storage layer: it owns the expense
//! collection, validates and persists mutations, and derives listings.

pub mod expense_store;
pub mod list_view;
pub mod query;

pub use expense_store::{ExpenseStore, LoadOutcome, SaveStatus, StoreOptions};
pub use list_view::{ExpenseListView, ExpenseRow};
pub use query::{ExpenseFilter, SortKey};
