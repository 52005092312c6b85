//! iexpense - personal expense tracker
//!
//! Users add named expenses with a type (personal or business), an amount and
//! a currency, list them filtered and sorted, and delete them. The collection
//! is kept in a key-value store and rewritten after every change.
//!
//! # Architecture
//!
//! - `config`: Path resolution and user settings
//! - `error`: Custom error types
//! - `models`: Expense records, currencies and risk levels
//! - `storage`: Key-value store trait with file and in-memory backends
//! - `services`: The expense store and listing derivations
//! - `display`: Terminal formatting
//! - `cli`: Command handlers for the `iexpense` binary
//!
//! # Example
//!
//! ```rust
//! use iexpense::models::{Currency, ExpenseType, NewExpense};
//! use iexpense::services::{ExpenseFilter, ExpenseStore, SortKey};
//! use iexpense::storage::MemoryStore;
//!
//! let mut store = ExpenseStore::open(MemoryStore::new())?;
//! let (_id, status) =
//!     store.add_expense(NewExpense::new("Lunch", ExpenseType::Personal, 12.0, Currency::Eur))?;
//! assert!(status.is_saved());
//!
//! let listing = store.filtered_and_sorted(ExpenseFilter::All, Some(SortKey::ByName));
//! assert_eq!(listing[0].name, "Lunch");
//! # Ok::<(), iexpense::ExpenseError>(())
//! ```

pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{ExpenseError, ExpenseResult};
