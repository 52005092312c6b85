//! In-memory key-value store
//!
//! Used by tests and by embedders that manage persistence themselves.

use std::collections::HashMap;

use crate::error::ExpenseError;

use super::KeyValueStore;

/// Key-value store held in a `HashMap`
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, Vec<u8>>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with one blob
    pub fn with_entry(key: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let mut store = Self::new();
        store.entries.insert(key.into(), bytes.into());
        store
    }

    /// Make every subsequent `set` fail, simulating a full or read-only disk
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Keys currently stored, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.entries.keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ExpenseError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, bytes: &[u8]) -> Result<(), ExpenseError> {
        if self.fail_writes {
            return Err(ExpenseError::Storage(format!(
                "Write to '{}' rejected",
                key
            )));
        }
        self.entries.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), ExpenseError> {
        self.entries.remove(key);
        Ok(())
    }
}
