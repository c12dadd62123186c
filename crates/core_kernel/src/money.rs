//! Currency codes and decimal helpers
//!
//! Amounts throughout the system are `rust_decimal::Decimal` values tagged with
//! a [`CurrencyCode`]. Codes are kept as free-form strings because expenses may
//! arrive without one (they then fall into the `"default"` bucket) and the
//! engine never converts between currencies.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Bucket name used for expenses that carry no currency
pub const DEFAULT_CURRENCY: &str = "default";

/// Minor units assumed for codes missing from the ISO 4217 tables below
pub const DEFAULT_MINOR_UNITS: u32 = 2;

const ZERO_DECIMAL_CODES: &[&str] = &[
    "BIF", "CLP", "DJF", "GNF", "ISK", "JPY", "KMF", "KRW", "PYG", "RWF", "UGX", "UYI",
    "VND", "VUV", "XAF", "XOF", "XPF",
];

const THREE_DECIMAL_CODES: &[&str] = &["BHD", "IQD", "JOD", "KWD", "LYD", "OMR", "TND"];

/// Errors that can occur while handling currency codes
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CurrencyError {
    #[error("Invalid currency code: {0:?}")]
    InvalidCode(String),
}

/// A currency code as supplied by the expense store
///
/// Codes compare verbatim: `"usd"` and `"USD"` are different buckets unless the
/// caller normalises them with [`CurrencyCode::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Wraps a code without validation; blank codes map to the default bucket
    pub fn new(code: impl Into<String>) -> Self {
        let code = code.into();
        if code.trim().is_empty() {
            Self::default_bucket()
        } else {
            Self(code)
        }
    }

    /// Parses a strict three-letter ISO 4217 style code, uppercasing it
    pub fn parse(code: &str) -> Result<Self, CurrencyError> {
        let trimmed = code.trim();
        if trimmed.len() != 3 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CurrencyError::InvalidCode(code.to_string()));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// The bucket used for expenses without a currency
    pub fn default_bucket() -> Self {
        Self(DEFAULT_CURRENCY.to_string())
    }

    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_CURRENCY
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of decimal places in the currency's minor unit
    pub fn minor_units(&self) -> u32 {
        let upper = self.0.to_ascii_uppercase();
        if ZERO_DECIMAL_CODES.contains(&upper.as_str()) {
            0
        } else if THREE_DECIMAL_CODES.contains(&upper.as_str()) {
            3
        } else {
            DEFAULT_MINOR_UNITS
        }
    }

    /// The smallest representable amount, e.g. 0.01 for USD and 1 for JPY
    pub fn smallest_unit(&self) -> Decimal {
        Decimal::new(1, self.minor_units())
    }

    /// Rounds an amount to this currency's minor unit (half away from zero)
    pub fn round(&self, amount: Decimal) -> Decimal {
        amount.round_dp_with_strategy(
            self.minor_units(),
            rust_decimal::RoundingStrategy::MidpointAwayFromZero,
        )
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::default_bucket()
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CurrencyCode {
    type Err = CurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<&str> for CurrencyCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<String> for CurrencyCode {
    fn from(code: String) -> Self {
        Self::new(code)
    }
}

/// A proportional rate such as a split percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rate {
    /// The rate as a decimal (e.g., 0.25 for 25%)
    value: Decimal,
}

impl Rate {
    /// Creates a rate from a percentage (e.g., 25 for 25%)
    pub fn from_percentage(percentage: Decimal) -> Self {
        Self {
            value: percentage / dec!(100),
        }
    }

    pub fn as_decimal(&self) -> Decimal {
        self.value
    }

    pub fn as_percentage(&self) -> Decimal {
        self.value * dec!(100)
    }

    /// Applies this rate to an amount
    pub fn apply(&self, amount: Decimal) -> Decimal {
        self.value * amount
    }

    /// Applies this rate, returning None on overflow
    pub fn checked_apply(&self, amount: Decimal) -> Option<Decimal> {
        self.value.checked_mul(amount)
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percentage().round_dp(4).normalize())
    }
}

/// Returns true when two amounts differ by less than `tolerance`
pub fn approx_eq(a: Decimal, b: Decimal, tolerance: Decimal) -> bool {
    (a - b).abs() < tolerance
}
