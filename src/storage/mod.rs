//! Storage layer for iexpense
//!
//! The expense store only needs a key-value byte store: one `get` at startup
//! and one `set` after every mutation. Two backends are provided, a JSON file
//! per key on disk and an in-memory map.

pub mod file_io;
pub mod file_store;
pub mod memory;

pub use file_io::{read_bytes, write_bytes_atomic};
pub use file_store::FileStore;
pub use memory::MemoryStore;

use crate::error::ExpenseError;

/// Key under which the expense collection is stored
pub const DEFAULT_STORAGE_KEY: &str = "Items";

/// Persistent key-value byte store
pub trait KeyValueStore {
    /// Read the blob stored under `key`, if any
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ExpenseError>;

    /// Overwrite the blob stored under `key`
    fn set(&mut self, key: &str, bytes: &[u8]) -> Result<(), ExpenseError>;

    /// Delete the blob stored under `key`; missing keys are not an error
    fn remove(&mut self, key: &str) -> Result<(), ExpenseError>;
}
