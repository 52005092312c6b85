//! Directory-backed key-value store
//!
//! Each key maps to `<data_dir>/<sanitized key>.json`.

use std::path::{Path, PathBuf};

use crate::error::ExpenseError;

use super::file_io::{read_bytes, remove_file_if_exists, write_bytes_atomic};
use super::KeyValueStore;

/// Key-value store keeping one file per key
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`; the directory is created on first write
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the stored files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key(key)))
    }
}

/// Map a key to a file stem that cannot escape the store directory
fn sanitize_key(key: &str) -> String {
    let cleaned: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        "_".to_string()
    } else {
        trimmed.to_string()
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ExpenseError> {
        read_bytes(self.path_for(key))
    }

    fn set(&mut self, key: &str, bytes: &[u8]) -> Result<(), ExpenseError> {
        write_bytes_atomic(self.path_for(key), bytes)
    }

    fn remove(&mut self, key: &str) -> Result<(), ExpenseError> {
        remove_file_if_exists(self.path_for(key))
    }
}
