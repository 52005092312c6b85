//! Filtering and sorting of expense listings
//!
//! Derivations never touch the collection they read from. Sorting is stable,
//! so records with equal keys keep their insertion order.

use std::cmp::Ordering;
use std::fmt;

use crate::models::{ExpenseRecord, ExpenseType};

/// Which expenses a listing shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExpenseFilter {
    #[default]
    All,
    Only(ExpenseType),
}

impl ExpenseFilter {
    /// Returns true if `record` passes the filter
    pub fn matches(&self, record: &ExpenseRecord) -> bool {
        match self {
            Self::All => true,
            Self::Only(expense_type) => record.expense_type == *expense_type,
        }
    }

    /// Parse "all", "personal" or "business"
    pub fn parse(s: &str) -> Option<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Some(Self::All);
        }
        ExpenseType::parse(s).map(Self::Only)
    }
}

impl From<ExpenseType> for ExpenseFilter {
    fn from(expense_type: ExpenseType) -> Self {
        Self::Only(expense_type)
    }
}

impl fmt::Display for ExpenseFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "All"),
            Self::Only(expense_type) => write!(f, "{}", expense_type),
        }
    }
}

/// Ordering applied to a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    /// Ascending, case-sensitive comparison of names
    ByName,
    /// Ascending raw amount
    ///
    /// Currency is ignored: 50 RUB sorts after 10 USD even though it is worth
    /// less. Use `usd_value` when a normalized comparison is wanted. NaN
    /// sorts after every number.
    ByAmount,
}

impl SortKey {
    /// Compare two records under this key
    pub fn compare(&self, a: &ExpenseRecord, b: &ExpenseRecord) -> Ordering {
        match self {
            Self::ByName => a.name.cmp(&b.name),
            Self::ByAmount => a.amount.total_cmp(&b.amount),
        }
    }

    /// Parse "name" or "amount"
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "name" => Some(Self::ByName),
            "amount" => Some(Self::ByAmount),
            _ => None,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ByName => write!(f, "Name"),
            Self::ByAmount => write!(f, "Amount"),
        }
    }
}

/// Filter then sort `records`, keeping each survivor's position in `records`
///
/// Without a sort key the result stays in insertion order.
pub fn derive_indexed(
    records: &[ExpenseRecord],
    filter: ExpenseFilter,
    sort_key: Option<SortKey>,
) -> Vec<(usize, &ExpenseRecord)> {
    let mut rows: Vec<_> = records
        .iter()
        .enumerate()
        .filter(|(_, record)| filter.matches(record))
        .collect();

    if let Some(key) = sort_key {
        rows.sort_by(|(_, a), (_, b)| key.compare(a, b));
    }

    rows
}
