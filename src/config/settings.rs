//! User settings for iexpense
//!
//! Controls where the expense collection is stored, how an undecodable blob is
//! handled, and the defaults of the add-expense form.

use serde::{Deserialize, Serialize};

use super::paths::ExpensePaths;
use crate::error::ExpenseError;
use crate::models::{Currency, ExpenseType};
use crate::storage::DEFAULT_STORAGE_KEY;

/// What to do when the stored blob exists but cannot be decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DecodePolicy {
    /// Log a warning and start from an empty collection
    #[default]
    FallbackEmpty,
    /// Fail the load with `DecodeFailure`
    Strict,
}

/// User settings for iexpense
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Key the expense collection is stored under
    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    /// Handling of an undecodable stored blob
    #[serde(default)]
    pub decode_policy: DecodePolicy,

    /// Move an undecodable blob to a side key instead of leaving it in place
    #[serde(default = "default_true")]
    pub preserve_corrupt_blobs: bool,

    /// Refuse to add expenses whose name is blank
    #[serde(default)]
    pub reject_empty_names: bool,

    /// Currency preselected in the add-expense form
    #[serde(default)]
    pub default_currency: Currency,

    /// Expense type preselected in the add-expense form
    #[serde(default)]
    pub default_type: ExpenseType,
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
            decode_policy: DecodePolicy::default(),
            preserve_corrupt_blobs: true,
            reject_empty_names: false,
            default_currency: Currency::default(),
            default_type: ExpenseType::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &ExpensePaths) -> Result<Self, ExpenseError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path).map_err(|e| {
                ExpenseError::Io(format!("Failed to read settings file: {}", e))
            })?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                ExpenseError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            if settings.storage_key.trim().is_empty() {
                return Err(ExpenseError::Config("storage_key cannot be empty".into()));
            }

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &ExpensePaths) -> Result<(), ExpenseError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            ExpenseError::Config(format!("Failed to serialize settings: {}", e))
        })?;

        std::fs::write(paths.settings_file(), contents).map_err(|e| {
            ExpenseError::Io(format!("Failed to write settings file: {}", e))
        })?;

        Ok(())
    }
}
