//! Expense store
//!
//! Owns the expense collection, mediates every mutation, and writes the whole
//! collection back to the key-value store after each one. Reads are pure
//! derivations over the in-memory collection.

use std::collections::BTreeSet;

use chrono::Utc;

use crate::config::{DecodePolicy, Settings};
use crate::error::{ExpenseError, ExpenseResult};
use crate::models::{
    classify, usd_value, Currency, ExpenseId, ExpenseRecord, ExpenseValidationError, NewExpense,
    RiskLevel,
};
use crate::storage::{KeyValueStore, DEFAULT_STORAGE_KEY};

use super::query::{derive_indexed, ExpenseFilter, SortKey};

/// Behaviour knobs for an [`ExpenseStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    /// Key the collection is stored under
    pub key: String,
    /// Handling of an undecodable blob
    pub decode_policy: DecodePolicy,
    /// Move an undecodable blob to a side key instead of leaving it in place
    pub preserve_corrupt_blobs: bool,
    /// Refuse records whose name is blank
    pub reject_empty_names: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            key: DEFAULT_STORAGE_KEY.to_string(),
            decode_policy: DecodePolicy::FallbackEmpty,
            preserve_corrupt_blobs: true,
            reject_empty_names: false,
        }
    }
}

impl From<&Settings> for StoreOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            key: settings.storage_key.clone(),
            decode_policy: settings.decode_policy,
            preserve_corrupt_blobs: settings.preserve_corrupt_blobs,
            reject_empty_names: settings.reject_empty_names,
        }
    }
}

/// How the collection was hydrated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Nothing was stored under the key
    Missing,
    /// The stored blob decoded into `count` records
    Loaded { count: usize },
    /// The stored blob could not be decoded; the collection started empty
    Recovered {
        reason: String,
        /// Side key the undecodable blob was moved to
        preserved_as: Option<String>,
    },
}

impl LoadOutcome {
    /// Returns true if stored data was discarded during load
    pub fn is_recovered(&self) -> bool {
        matches!(self, Self::Recovered { .. })
    }
}

/// Result of writing the collection after a mutation
///
/// A failed save never rolls back the in-memory change.
#[must_use]
#[derive(Debug)]
pub enum SaveStatus {
    Saved,
    Failed(ExpenseError),
}

impl SaveStatus {
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved)
    }

    /// The write error, if the save failed
    pub fn error(&self) -> Option<&ExpenseError> {
        match self {
            Self::Saved => None,
            Self::Failed(err) => Some(err),
        }
    }
}

/// The expense collection together with its persistent store
pub struct ExpenseStore<S: KeyValueStore> {
    backend: S,
    options: StoreOptions,
    items: Vec<ExpenseRecord>,
    load_outcome: LoadOutcome,
}

impl<S: KeyValueStore> ExpenseStore<S> {
    /// Hydrate a store from `backend`
    ///
    /// A missing blob yields an empty collection. An undecodable blob yields an
    /// empty collection under [`DecodePolicy::FallbackEmpty`] and
    /// [`ExpenseError::DecodeFailure`] under [`DecodePolicy::Strict`].
    pub fn load(mut backend: S, options: StoreOptions) -> ExpenseResult<Self> {
        let key = options.key.clone();

        let (items, load_outcome) = match backend.get(&key)? {
            None => {
                tracing::debug!(key = %key, "no stored expenses");
                (Vec::new(), LoadOutcome::Missing)
            }
            Some(bytes) => match serde_json::from_slice::<Vec<ExpenseRecord>>(&bytes) {
                Ok(items) => {
                    tracing::debug!(key = %key, count = items.len(), "loaded expenses");
                    let count = items.len();
                    (items, LoadOutcome::Loaded { count })
                }
                Err(err) => {
                    let reason = err.to_string();
                    if options.decode_policy == DecodePolicy::Strict {
                        return Err(ExpenseError::DecodeFailure { key, reason });
                    }

                    tracing::warn!(
                        key = %key,
                        error = %reason,
                        "stored expenses could not be decoded, starting empty"
                    );

                    let preserved_as = if options.preserve_corrupt_blobs {
                        preserve_blob(&mut backend, &key, &bytes)
                    } else {
                        None
                    };

                    (
                        Vec::new(),
                        LoadOutcome::Recovered {
                            reason,
                            preserved_as,
                        },
                    )
                }
            },
        };

        Ok(Self {
            backend,
            options,
            items,
            load_outcome,
        })
    }

    /// Hydrate a store with default options
    pub fn open(backend: S) -> ExpenseResult<Self> {
        Self::load(backend, StoreOptions::default())
    }

    /// How the collection was hydrated
    pub fn load_outcome(&self) -> &LoadOutcome {
        &self.load_outcome
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// All records in insertion order
    pub fn items(&self) -> &[ExpenseRecord] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get a record by ID
    pub fn get(&self, id: ExpenseId) -> Option<&ExpenseRecord> {
        self.items.iter().find(|r| r.id == id)
    }

    /// Resolve an id as printed by the CLI (`exp-xxxxxxxx`) or a full UUID
    ///
    /// A short form must match exactly one record.
    pub fn resolve_id(&self, input: &str) -> ExpenseResult<ExpenseId> {
        if let Ok(id) = input.parse::<ExpenseId>() {
            return Ok(id);
        }

        let prefix = input
            .trim()
            .strip_prefix(ExpenseId::DISPLAY_PREFIX)
            .unwrap_or(input.trim())
            .to_lowercase();
        if prefix.is_empty() {
            return Err(ExpenseError::Validation(format!("Invalid expense ID: {}", input)));
        }

        let mut matches = self
            .items
            .iter()
            .map(|r| r.id)
            .filter(|id| id.as_uuid().to_string().starts_with(&prefix));

        match (matches.next(), matches.next()) {
            (Some(id), None) => Ok(id),
            (None, _) => Err(ExpenseError::expense_not_found(input)),
            (Some(_), Some(_)) => Err(ExpenseError::Validation(format!(
                "Expense ID '{}' is ambiguous",
                input
            ))),
        }
    }

    /// Position of a record in the collection
    pub fn position(&self, id: ExpenseId) -> Option<usize> {
        self.items.iter().position(|r| r.id == id)
    }

    /// Borrow the underlying key-value store
    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Mutably borrow the underlying key-value store
    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.backend
    }

    /// Append a record and persist the collection
    ///
    /// Blank names are accepted with a warning unless `reject_empty_names` is
    /// set. A duplicate id or a non-finite amount is rejected.
    pub fn add(&mut self, record: ExpenseRecord) -> ExpenseResult<SaveStatus> {
        if self.get(record.id).is_some() {
            return Err(ExpenseError::Validation(format!(
                "Expense id already present: {}",
                record.id
            )));
        }

        match record.validate() {
            Ok(()) => {}
            Err(ExpenseValidationError::EmptyName) if !self.options.reject_empty_names => {
                tracing::warn!(id = %record.id, "adding expense with an empty name");
            }
            Err(ExpenseValidationError::NameTooLong(_)) => {}
            Err(e) => return Err(ExpenseError::Validation(e.to_string())),
        }

        tracing::debug!(id = %record.id, name = %record.name, "adding expense");
        self.items.push(record);
        Ok(self.save_after_mutation())
    }

    /// Build a record from the add-expense form and append it
    pub fn add_expense(&mut self, form: NewExpense) -> ExpenseResult<(ExpenseId, SaveStatus)> {
        let record = form.into_record();
        let id = record.id;
        let status = self.add(record)?;
        Ok((id, status))
    }

    /// Remove the records at the given positions in one operation
    ///
    /// Duplicated positions are removed once. If any position is out of range
    /// nothing is removed.
    pub fn remove<I>(&mut self, indices: I) -> ExpenseResult<SaveStatus>
    where
        I: IntoIterator<Item = usize>,
    {
        let indices: BTreeSet<usize> = indices.into_iter().collect();
        let len = self.items.len();

        if let Some(&index) = indices.iter().find(|&&i| i >= len) {
            return Err(ExpenseError::IndexOutOfRange { index, len });
        }

        let mut position = 0;
        self.items.retain(|_| {
            let keep = !indices.contains(&position);
            position += 1;
            keep
        });

        tracing::debug!(removed = indices.len(), remaining = self.items.len(), "removed expenses");
        Ok(self.save_after_mutation())
    }

    /// Remove a single record by ID
    pub fn remove_by_id(&mut self, id: ExpenseId) -> ExpenseResult<SaveStatus> {
        let position = self
            .position(id)
            .ok_or_else(|| ExpenseError::expense_not_found(id.to_string()))?;
        self.remove([position])
    }

    /// Serialize the whole collection and overwrite the stored blob
    pub fn persist(&mut self) -> ExpenseResult<()> {
        let bytes = serde_json::to_vec(&self.items)?;
        self.backend.set(&self.options.key, &bytes)?;
        tracing::debug!(key = %self.options.key, count = self.items.len(), "persisted expenses");
        Ok(())
    }

    fn save_after_mutation(&mut self) -> SaveStatus {
        match self.persist() {
            Ok(()) => SaveStatus::Saved,
            Err(err) => {
                tracing::warn!(
                    key = %self.options.key,
                    error = %err,
                    "failed to save expenses, changes kept in memory"
                );
                SaveStatus::Failed(err)
            }
        }
    }

    /// Filtered and sorted view of the collection
    ///
    /// `ByAmount` compares raw amounts without converting currencies.
    pub fn filtered_and_sorted(
        &self,
        filter: ExpenseFilter,
        sort_key: Option<SortKey>,
    ) -> Vec<&ExpenseRecord> {
        derive_indexed(&self.items, filter, sort_key)
            .into_iter()
            .map(|(_, record)| record)
            .collect()
    }

    /// Same as [`filtered_and_sorted`](Self::filtered_and_sorted), paired with
    /// each record's position in the collection
    pub fn filtered_and_sorted_indexed(
        &self,
        filter: ExpenseFilter,
        sort_key: Option<SortKey>,
    ) -> Vec<(usize, &ExpenseRecord)> {
        derive_indexed(&self.items, filter, sort_key)
    }

    /// Risk level of a record
    pub fn classify(record: &ExpenseRecord) -> RiskLevel {
        classify(record)
    }

    /// Whole-dollar USD equivalent of an amount
    pub fn usd_value(currency: &Currency, amount: f64) -> i64 {
        usd_value(currency, amount)
    }
}

/// Move an undecodable blob to a timestamped side key
///
/// The blob is only removed from `key` once the side copy is written, so a
/// later load of the same store finds nothing to recover.
fn preserve_blob<S: KeyValueStore>(backend: &mut S, key: &str, bytes: &[u8]) -> Option<String> {
    let side_key = format!("{}.corrupt-{}", key, Utc::now().format("%Y%m%dT%H%M%S%.3fZ"));
    if let Err(err) = backend.set(&side_key, bytes) {
        tracing::warn!(key = %key, error = %err, "could not keep a copy of undecodable data");
        return None;
    }

    if let Err(err) = backend.remove(key) {
        tracing::warn!(key = %key, error = %err, "could not clear undecodable data after copying it");
    }
    tracing::warn!(key = %key, preserved_as = %side_key, "moved undecodable data aside");
    Some(side_key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExpenseType;
    use crate::storage::{FileStore, MemoryStore};
    use tempfile::TempDir;

    fn record(name: &str, expense_type: ExpenseType, amount: f64, currency: Currency) -> ExpenseRecord {
        ExpenseRecord::new(name, expense_type, amount, currency)
    }

    fn empty_store() -> ExpenseStore<MemoryStore> {
        ExpenseStore::open(MemoryStore::new()).unwrap()
    }

    fn store_with(names: &[&str]) -> ExpenseStore<MemoryStore> {
        let mut store = empty_store();
        for name in names {
            let status = store
                .add(record(name, ExpenseType::Personal, 1.0, Currency::Usd))
                .unwrap();
            assert!(status.is_saved());
        }
        store
    }

    fn names(store: &ExpenseStore<MemoryStore>) -> Vec<String> {
        store.items().iter().map(|r| r.name.clone()).collect()
    }

    #[test]
    fn test_load_missing_is_empty() {
        let store = empty_store();
        assert!(store.is_empty());
        assert_eq!(store.load_outcome(), &LoadOutcome::Missing);
    }

    #[test]
    fn test_add_appends_and_persists() {
        let store = store_with(&["First", "Second", "Third"]);
        assert_eq!(store.len(), 3);
        assert_eq!(names(&store), vec!["First", "Second", "Third"]);

        let blob = store.backend().get("Items").unwrap().unwrap();
        let stored: Vec<ExpenseRecord> = serde_json::from_slice(&blob).unwrap();
        assert_eq!(stored, store.items());
    }

    #[test]
    fn test_round_trip_through_backend() {
        let mut store = empty_store();
        for expense in [
            record("Hotel", ExpenseType::Business, 250.75, Currency::Eur),
            record("Tea", ExpenseType::Personal, 0.0, Currency::Cny),
            record("Refund", ExpenseType::Personal, -12.5, Currency::Rub),
        ] {
            assert!(store.add(expense).unwrap().is_saved());
        }

        let expected = store.items().to_vec();
        let backend = store.backend().clone();

        let reloaded = ExpenseStore::open(backend).unwrap();
        assert_eq!(reloaded.items(), expected.as_slice());
        assert_eq!(reloaded.load_outcome(), &LoadOutcome::Loaded { count: 3 });
    }

    #[test]
    fn test_round_trip_through_files() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = ExpenseStore::open(FileStore::new(temp_dir.path())).unwrap();
        let (id, status) = store
            .add_expense(NewExpense::new("Train", ExpenseType::Business, 42.0, Currency::Usd))
            .unwrap();
        assert!(status.is_saved());

        let reloaded = ExpenseStore::open(FileStore::new(temp_dir.path())).unwrap();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.get(id).unwrap().name, "Train");
    }

    #[test]
    fn test_remove_single() {
        let mut store = store_with(&["A", "B", "C"]);
        assert!(store.remove([1]).unwrap().is_saved());
        assert_eq!(names(&store), vec!["A", "C"]);
    }

    #[test]
    fn test_remove_multiple() {
        let mut store = store_with(&["A", "B", "C"]);
        assert!(store.remove([0, 2]).unwrap().is_saved());
        assert_eq!(names(&store), vec!["B"]);

        let reloaded = ExpenseStore::open(store.backend().clone()).unwrap();
        assert_eq!(reloaded.items(), store.items());
    }

    #[test]
    fn test_remove_duplicate_indices() {
        let mut store = store_with(&["A", "B"]);
        assert!(store.remove([0, 0]).unwrap().is_saved());
        assert_eq!(names(&store), vec!["B"]);
    }

    #[test]
    fn test_remove_out_of_range_changes_nothing() {
        let mut store = store_with(&["A", "B", "C"]);

        let err = store.remove([0, 3]).unwrap_err();
        assert!(matches!(
            err,
            ExpenseError::IndexOutOfRange { index: 3, len: 3 }
        ));
        assert_eq!(names(&store), vec!["A", "B", "C"]);

        let err = empty_store().remove([0]).unwrap_err();
        assert!(matches!(
            err,
            ExpenseError::IndexOutOfRange { index: 0, len: 0 }
        ));
    }

    #[test]
    fn test_remove_by_id() {
        let mut store = store_with(&["A", "B"]);
        let id = store.items()[0].id;

        assert!(store.remove_by_id(id).unwrap().is_saved());
        assert_eq!(names(&store), vec!["B"]);
        assert!(store.remove_by_id(id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_malformed_blob_falls_back_to_empty() {
        let backend = MemoryStore::with_entry("Items", "definitely not json");
        let store = ExpenseStore::open(backend).unwrap();

        assert!(store.is_empty());
        assert!(store.load_outcome().is_recovered());
    }

    #[test]
    fn test_malformed_blob_is_preserved() {
        let backend = MemoryStore::with_entry("Items", r#"[{"name": "no id"}]"#);
        let store = ExpenseStore::open(backend).unwrap();

        let preserved = match store.load_outcome() {
            LoadOutcome::Recovered { preserved_as, .. } => preserved_as.clone().unwrap(),
            other => panic!("unexpected outcome: {:?}", other),
        };
        assert!(preserved.starts_with("Items.corrupt-"));
        assert_eq!(
            store.backend().get(&preserved).unwrap(),
            Some(br#"[{"name": "no id"}]"#.to_vec())
        );
        assert!(store.backend().get("Items").unwrap().is_none());
    }

    #[test]
    fn test_malformed_blob_is_moved_only_once() {
        let mut backend = MemoryStore::with_entry("Items", "not json");
        for _ in 0..3 {
            backend = ExpenseStore::open(backend).unwrap().backend().clone();
        }

        let keys = backend.keys();
        assert_eq!(keys.len(), 1);
        assert!(keys[0].starts_with("Items.corrupt-"));

        let store = ExpenseStore::open(backend).unwrap();
        assert_eq!(store.load_outcome(), &LoadOutcome::Missing);
    }

    #[test]
    fn test_malformed_blob_not_preserved_when_disabled() {
        let backend = MemoryStore::with_entry("Items", "{}");
        let options = StoreOptions {
            preserve_corrupt_blobs: false,
            ..StoreOptions::default()
        };
        let store = ExpenseStore::load(backend, options).unwrap();

        assert!(matches!(
            store.load_outcome(),
            LoadOutcome::Recovered {
                preserved_as: None,
                ..
            }
        ));
        assert_eq!(store.backend().keys(), vec!["Items".to_string()]);
    }

    #[test]
    fn test_malformed_blob_strict_policy_fails() {
        let backend = MemoryStore::with_entry("Items", "[1, 2");
        let options = StoreOptions {
            decode_policy: DecodePolicy::Strict,
            ..StoreOptions::default()
        };

        let err = ExpenseStore::load(backend, options).err().unwrap();
        assert!(err.is_decode_failure());
    }

    #[test]
    fn test_unknown_currency_survives_load() {
        let blob = r#"[{"id":"E621E1F8-C36C-495A-93FC-0C247A3E6E5F","name":"Souvenir","type":"Personal","amount":100,"currency":"XYZ"}]"#;
        let store = ExpenseStore::open(MemoryStore::with_entry("Items", blob)).unwrap();

        let record = &store.items()[0];
        assert_eq!(record.currency, Currency::Other("XYZ".into()));
        assert_eq!(ExpenseStore::<MemoryStore>::classify(record), RiskLevel::Low);
    }

    #[test]
    fn test_custom_key() {
        let options = StoreOptions {
            key: "Expenses".into(),
            ..StoreOptions::default()
        };
        let mut store = ExpenseStore::load(MemoryStore::new(), options).unwrap();
        let status = store
            .add(record("Gift", ExpenseType::Personal, 30.0, Currency::Usd))
            .unwrap();
        assert!(status.is_saved());

        assert!(store.backend().get("Expenses").unwrap().is_some());
        assert!(store.backend().get("Items").unwrap().is_none());
    }

    #[test]
    fn test_failed_save_keeps_items() {
        let mut store = store_with(&["A"]);
        store.backend_mut().set_fail_writes(true);

        let status = store
            .add(record("B", ExpenseType::Personal, 1.0, Currency::Usd))
            .unwrap();
        assert!(!status.is_saved());
        assert!(matches!(status.error(), Some(ExpenseError::Storage(_))));
        assert_eq!(names(&store), vec!["A", "B"]);

        store.backend_mut().set_fail_writes(false);
        store.persist().unwrap();
        let reloaded = ExpenseStore::open(store.backend().clone()).unwrap();
        assert_eq!(reloaded.len(), 2);
    }

    #[test]
    fn test_empty_name_accepted_by_default() {
        let mut store = empty_store();
        let status = store
            .add(record("", ExpenseType::Personal, 1.0, Currency::Usd))
            .unwrap();
        assert!(status.is_saved());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_empty_name_rejected_when_configured() {
        let options = StoreOptions {
            reject_empty_names: true,
            ..StoreOptions::default()
        };
        let mut store = ExpenseStore::load(MemoryStore::new(), options).unwrap();

        let err = store
            .add(record("  ", ExpenseType::Personal, 1.0, Currency::Usd))
            .unwrap_err();
        assert!(err.is_validation());
        assert!(store.is_empty());
        assert!(store.backend().get("Items").unwrap().is_none());
    }

    #[test]
    fn test_non_finite_amount_rejected() {
        let mut store = store_with(&["Rent"]);

        for amount in [f64::INFINITY, f64::NAN] {
            let err = store
                .add(record("", ExpenseType::Personal, amount, Currency::Usd))
                .unwrap_err();
            assert!(err.is_validation());
        }
        assert_eq!(names(&store), vec!["Rent"]);

        let reloaded = ExpenseStore::open(store.backend().clone()).unwrap();
        assert_eq!(reloaded.load_outcome(), &LoadOutcome::Loaded { count: 1 });
    }

    #[test]
    fn test_resolve_id_accepts_printed_form() {
        let store = store_with(&["A", "B"]);
        let id = store.items()[1].id;

        assert_eq!(store.resolve_id(&id.to_string()).unwrap(), id);
        assert_eq!(store.resolve_id(&id.as_uuid().to_string()).unwrap(), id);
        assert_eq!(
            store
                .resolve_id(&id.as_uuid().to_string()[..8].to_uppercase())
                .unwrap(),
            id
        );
    }

    #[test]
    fn test_resolve_id_errors() {
        let store = store_with(&["A"]);
        assert!(store.resolve_id("exp-").unwrap_err().is_validation());
        assert!(store.resolve_id("exp-zzzzzzzz").unwrap_err().is_not_found());

        let with_shared_prefix = ExpenseStore::open(MemoryStore::with_entry(
            "Items",
            r#"[{"id":"550E8400-E29B-41D4-A716-446655440000","name":"A","type":"Personal","amount":1,"currency":"USD"},{"id":"550E8400-0000-41D4-A716-446655440000","name":"B","type":"Personal","amount":2,"currency":"USD"}]"#,
        ))
        .unwrap();
        assert!(with_shared_prefix
            .resolve_id("exp-550e8400")
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut store = empty_store();
        let first = record("A", ExpenseType::Personal, 1.0, Currency::Usd);
        assert!(store.add(first.clone()).unwrap().is_saved());

        assert!(store.add(first).unwrap_err().is_validation());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_filtered_and_sorted_does_not_mutate() {
        let mut store = empty_store();
        for expense in [
            record("Bob", ExpenseType::Personal, 5.0, Currency::Usd),
            record("Amy", ExpenseType::Business, 5.0, Currency::Usd),
        ] {
            assert!(store.add(expense).unwrap().is_saved());
        }

        let view: Vec<&str> = store
            .filtered_and_sorted(ExpenseFilter::All, Some(SortKey::ByName))
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(view, vec!["Amy", "Bob"]);
        assert_eq!(names(&store), vec!["Bob", "Amy"]);

        let business = store.filtered_and_sorted(
            ExpenseFilter::Only(ExpenseType::Business),
            Some(SortKey::ByAmount),
        );
        assert_eq!(business.len(), 1);
        assert_eq!(business[0].name, "Amy");
    }

    #[test]
    fn test_usd_value_via_store() {
        assert_eq!(ExpenseStore::<MemoryStore>::usd_value(&Currency::Rub, 900.0), 10);
        assert_eq!(ExpenseStore::<MemoryStore>::usd_value(&Currency::Eur, 100.0), 90);
        assert_eq!(
            ExpenseStore::<MemoryStore>::usd_value(&Currency::Other("XYZ".into()), 100.0),
            0
        );
    }
}
