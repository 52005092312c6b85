//! Risk level used to emphasize expenses in listings

use serde::{Deserialize, Serialize};
use std::fmt;

use super::currency::usd_value;
use super::expense::ExpenseRecord;

/// USD equivalent above which an expense is `High`
pub const HIGH_THRESHOLD_USD: i64 = 100;

/// USD equivalent at or below which an expense is `Low`
pub const LOW_THRESHOLD_USD: i64 = 10;

/// Display-only classification of an expense by its USD equivalent
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Classify a whole-dollar USD value
    pub fn from_usd(usd: i64) -> Self {
        if usd > HIGH_THRESHOLD_USD {
            Self::High
        } else if usd <= LOW_THRESHOLD_USD {
            Self::Low
        } else {
            Self::Medium
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
        }
    }
}

/// Classify an expense record
pub fn classify(record: &ExpenseRecord) -> RiskLevel {
    if !record.currency.is_known() {
        tracing::warn!(
            id = %record.id,
            currency = record.currency.code(),
            "no conversion rate for currency, treating as 0 USD"
        );
    }
    RiskLevel::from_usd(usd_value(&record.currency, record.amount))
}
