//! Settlement domain errors
//!
//! The calculator itself never fails on data-quality problems. These errors
//! come from strict expense validation and calculator configuration.

use rust_decimal::Decimal;
use thiserror::Error;

use core_kernel::{CurrencyError, MemberId};
use crate::expense::SplitMethod;

/// Errors that can occur in the settlement domain
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettlementError {
    /// Expense amount is zero or negative
    #[error("Expense amount must be positive, got {0}")]
    InvalidAmount(Decimal),

    /// The payer has no entry in the expense's split details
    #[error("Payer {0} is not listed among the expense participants")]
    PayerNotParticipant(MemberId),

    /// Nobody is enabled to share the expense
    #[error("Expense has no enabled participants")]
    NoEnabledParticipants,

    /// Fixed amounts or percentages do not add up
    #[error("{method} split does not reconcile: expected {expected}, got {actual}")]
    SplitMismatch {
        method: SplitMethod,
        expected: Decimal,
        actual: Decimal,
    },

    /// Split amounts add up to more than a `Decimal` can hold
    #[error("Split amounts are out of range")]
    ArithmeticOverflow,

    /// Currency code present but not a three-letter code
    #[error(transparent)]
    Currency(#[from] CurrencyError),

    /// Tolerance must be strictly positive
    #[error("Invalid settlement tolerance: {0}")]
    InvalidTolerance(Decimal),
}
