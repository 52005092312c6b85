//! Listing state for a presentation layer
//!
//! Holds the filter and sort key chosen from menus and turns the store's
//! collection into display rows. Delete gestures arrive as positions in the
//! displayed list and are translated back to collection positions here.

use crate::error::{ExpenseError, ExpenseResult};
use crate::models::{classify, usd_value, ExpenseRecord, RiskLevel};
use crate::storage::KeyValueStore;

use super::expense_store::{ExpenseStore, SaveStatus};
use super::query::{ExpenseFilter, SortKey};

/// One displayed expense
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseRow<'a> {
    /// Position of the record in the store's collection
    pub index: usize,
    pub record: &'a ExpenseRecord,
    pub usd_value: i64,
    pub risk: RiskLevel,
}

/// Current filter and sort selection of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExpenseListView {
    filter: ExpenseFilter,
    sort_key: Option<SortKey>,
}

impl ExpenseListView {
    pub fn new(filter: ExpenseFilter, sort_key: Option<SortKey>) -> Self {
        Self { filter, sort_key }
    }

    pub fn filter(&self) -> ExpenseFilter {
        self.filter
    }

    pub fn sort_key(&self) -> Option<SortKey> {
        self.sort_key
    }

    pub fn set_filter(&mut self, filter: ExpenseFilter) {
        self.filter = filter;
    }

    /// Set the sort key; `None` restores insertion order
    pub fn set_sort_key(&mut self, sort_key: Option<SortKey>) {
        self.sort_key = sort_key;
    }

    /// Rows to render for the current selection
    pub fn rows<'a, S: KeyValueStore>(&self, store: &'a ExpenseStore<S>) -> Vec<ExpenseRow<'a>> {
        store
            .filtered_and_sorted_indexed(self.filter, self.sort_key)
            .into_iter()
            .map(|(index, record)| ExpenseRow {
                index,
                record,
                usd_value: usd_value(&record.currency, record.amount),
                risk: classify(record),
            })
            .collect()
    }

    /// Sum of the USD equivalents of the displayed rows, saturating at the
    /// `i64` bounds
    pub fn total_usd<S: KeyValueStore>(&self, store: &ExpenseStore<S>) -> i64 {
        self.rows(store)
            .iter()
            .fold(0i64, |total, row| total.saturating_add(row.usd_value))
    }

    /// Remove the records shown at the given displayed positions
    pub fn remove_displayed<S, I>(&self, store: &mut ExpenseStore<S>, displayed: I) -> ExpenseResult<SaveStatus>
    where
        S: KeyValueStore,
        I: IntoIterator<Item = usize>,
    {
        let positions: Vec<usize> = {
            let rows = store.filtered_and_sorted_indexed(self.filter, self.sort_key);
            displayed
                .into_iter()
                .map(|shown| {
                    rows.get(shown)
                        .map(|(index, _)| *index)
                        .ok_or(ExpenseError::IndexOutOfRange {
                            index: shown,
                            len: rows.len(),
                        })
                })
                .collect::<ExpenseResult<_>>()?
        };

        store.remove(positions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Currency, ExpenseType, NewExpense};
    use crate::storage::MemoryStore;

    fn sample_store() -> ExpenseStore<MemoryStore> {
        let mut store = ExpenseStore::open(MemoryStore::new()).unwrap();
        let forms = [
            NewExpense::new("Taxi", ExpenseType::Business, 25.0, Currency::Usd),
            NewExpense::new("Groceries", ExpenseType::Personal, 4500.0, Currency::Rub),
            NewExpense::new("Laptop", ExpenseType::Business, 1200.0, Currency::Eur),
            NewExpense::new("Coffee", ExpenseType::Personal, 3.0, Currency::Usd),
        ];
        for form in forms {
            let (_, status) = store.add_expense(form).unwrap();
            assert!(status.is_saved());
        }
        store
    }

    fn row_names(rows: &[ExpenseRow<'_>]) -> Vec<String> {
        rows.iter().map(|row| row.record.name.clone()).collect()
    }

    #[test]
    fn test_default_view_is_insertion_order() {
        let store = sample_store();
        let view = ExpenseListView::default();

        let rows = view.rows(&store);
        assert_eq!(row_names(&rows), vec!["Taxi", "Groceries", "Laptop", "Coffee"]);
        assert_eq!(rows[2].index, 2);
    }

    #[test]
    fn test_rows_carry_usd_value_and_risk() {
        let store = sample_store();
        let rows = ExpenseListView::default().rows(&store);

        assert_eq!(rows[0].usd_value, 25);
        assert_eq!(rows[0].risk, RiskLevel::Medium);
        assert_eq!(rows[1].usd_value, 50);
        assert_eq!(rows[2].usd_value, 1080);
        assert_eq!(rows[2].risk, RiskLevel::High);
        assert_eq!(rows[3].risk, RiskLevel::Low);
    }

    #[test]
    fn test_setters_change_rows() {
        let store = sample_store();
        let mut view = ExpenseListView::default();

        view.set_filter(ExpenseFilter::Only(ExpenseType::Personal));
        view.set_sort_key(Some(SortKey::ByName));
        assert_eq!(row_names(&view.rows(&store)), vec!["Coffee", "Groceries"]);

        view.set_filter(ExpenseFilter::All);
        view.set_sort_key(Some(SortKey::ByAmount));
        assert_eq!(
            row_names(&view.rows(&store)),
            vec!["Coffee", "Taxi", "Laptop", "Groceries"]
        );

        view.set_sort_key(None);
        assert_eq!(
            row_names(&view.rows(&store)),
            vec!["Taxi", "Groceries", "Laptop", "Coffee"]
        );
    }

    #[test]
    fn test_total_usd() {
        let store = sample_store();
        let mut view = ExpenseListView::default();
        assert_eq!(view.total_usd(&store), 25 + 50 + 1080 + 3);

        view.set_filter(ExpenseFilter::Only(ExpenseType::Business));
        assert_eq!(view.total_usd(&store), 25 + 1080);
    }

    #[test]
    fn test_total_usd_saturates() {
        let mut store = ExpenseStore::open(MemoryStore::new()).unwrap();
        for _ in 0..2 {
            let (_, status) = store
                .add_expense(NewExpense::new("Huge", ExpenseType::Personal, 1e19, Currency::Usd))
                .unwrap();
            assert!(status.is_saved());
        }
        let (_, status) = store
            .add_expense(NewExpense::new("Debt", ExpenseType::Business, -1e19, Currency::Usd))
            .unwrap();
        assert!(status.is_saved());

        let mut view = ExpenseListView::new(ExpenseFilter::Only(ExpenseType::Personal), None);
        assert_eq!(view.total_usd(&store), i64::MAX);

        view.set_filter(ExpenseFilter::Only(ExpenseType::Business));
        assert_eq!(view.total_usd(&store), i64::MIN);
    }

    #[test]
    fn test_remove_displayed_maps_to_collection() {
        let mut store = sample_store();
        let view = ExpenseListView::new(
            ExpenseFilter::Only(ExpenseType::Business),
            Some(SortKey::ByAmount),
        );

        // Displayed: Taxi (25), Laptop (1200); remove Laptop
        assert!(view.remove_displayed(&mut store, [1]).unwrap().is_saved());

        let names: Vec<&str> = store.items().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Taxi", "Groceries", "Coffee"]);
    }

    #[test]
    fn test_remove_displayed_out_of_range() {
        let mut store = sample_store();
        let view = ExpenseListView::new(ExpenseFilter::Only(ExpenseType::Personal), None);

        let err = view.remove_displayed(&mut store, [0, 2]).unwrap_err();
        assert!(matches!(
            err,
            ExpenseError::IndexOutOfRange { index: 2, len: 2 }
        ));
        assert_eq!(store.len(), 4);
    }
}
