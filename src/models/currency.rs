//! Currencies and the fixed USD conversion table
//!
//! Rates are static constants. Conversions truncate toward zero, so
//! `usd_value(Currency::Rub, 899.0)` is 9, not 10.

use serde::{Deserialize, Serialize};
use std::fmt;

/// CNY per USD
pub const CNY_PER_USD: f64 = 7.12;

/// RUB per USD
pub const RUB_PER_USD: f64 = 90.0;

/// USD per EUR
pub const USD_PER_EUR: f64 = 0.9;

/// Currency of an expense
///
/// Codes outside the supported set are kept verbatim in `Other` so that a
/// blob written by another client still loads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Rub,
    Cny,
    Other(String),
}

impl Currency {
    /// ISO code as stored
    pub fn code(&self) -> &str {
        match self {
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Rub => "RUB",
            Self::Cny => "CNY",
            Self::Other(code) => code,
        }
    }

    /// Returns true if a conversion rate exists for this currency
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// Parse a supported currency code (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "USD" => Some(Self::Usd),
            "EUR" => Some(Self::Eur),
            "RUB" => Some(Self::Rub),
            "CNY" => Some(Self::Cny),
            _ => None,
        }
    }
}

impl From<String> for Currency {
    fn from(code: String) -> Self {
        match code.as_str() {
            "USD" => Self::Usd,
            "EUR" => Self::Eur,
            "RUB" => Self::Rub,
            "CNY" => Self::Cny,
            _ => Self::Other(code),
        }
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        match currency {
            Currency::Other(code) => code,
            known => known.code().to_string(),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Whole-dollar USD equivalent of `amount` in `currency`
///
/// Unknown currencies are worth 0.
pub fn usd_value(currency: &Currency, amount: f64) -> i64 {
    let usd = match currency {
        Currency::Usd => amount,
        Currency::Cny => amount / CNY_PER_USD,
        Currency::Rub => amount / RUB_PER_USD,
        Currency::Eur => amount * USD_PER_EUR,
        Currency::Other(_) => return 0,
    };
    // `as` truncates toward zero and saturates at the i64 bounds
    usd as i64
}
