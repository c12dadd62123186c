//! Settlement Domain - Expense Splitting and Debt Simplification
//!
//! This crate turns a group's expenses into the payments that settle it.
//!
//! # Pipeline
//!
//! For each currency (expenses are never merged across currencies):
//!
//! 1. **Accrual**: the payer is credited the full amount and each enabled
//!    participant is debited their share (`equal`, `fixed`, or `percentage`)
//! 2. **Net balance**: `paid - owes` per member; positive means the member is
//!    owed money, negative means they owe
//! 3. **Simplification**: debtors are matched to creditors, largest first,
//!    ignoring amounts at or below [`SETTLEMENT_EPSILON`]
//! 4. **Projection**: debts touching the viewer are collected into a
//!    [`CalculationResult`]
//!
//! # Data quality
//!
//! The calculator never fails on bad data. Expenses whose payer is not one of
//! their participants are skipped, fixed and percentage splits that don't add
//! up are tolerated by default (see [`SplitPolicy`]), and every such case is
//! recorded as an [`ExpenseAnomaly`] on the [`SettlementReport`].
//!
//! # Example
//!
//! ```rust
//! use domain_settlement::{calculate_balances, Expense, SplitDetail, SplitMethod};
//! use core_kernel::MemberId;
//! use rust_decimal_macros::dec;
//!
//! let dinner = Expense::new(dec!(90), "alice", SplitMethod::Equal)
//!     .with_currency("USD")
//!     .with_splits([
//!         SplitDetail::enabled("alice"),
//!         SplitDetail::enabled("bob"),
//!         SplitDetail::enabled("carol"),
//!     ]);
//!
//! let result = calculate_balances(&[dinner], &MemberId::from("alice"));
//! assert_eq!(result.owed_to_user.len(), 2);
//! assert!(result.user_owes.is_empty());
//! ```

pub mod expense;
pub mod split;
pub mod balance;
pub mod simplify;
pub mod report;
pub mod calculator;
pub mod error;

pub use expense::{Expense, SplitDetail, SplitMethod};
pub use split::SplitPolicy;
pub use balance::{BalanceSheet, MemberBalance};
pub use simplify::{SimplificationStrategy, MAX_EXACT_MEMBERS};
pub use report::{AnomalyKind, CalculationResult, CurrencyBucket, Debt, ExpenseAnomaly, SettlementReport};
pub use calculator::{CalculatorConfig, SettlementCalculator, ToleranceMode};
pub use error::SettlementError;

use core_kernel::MemberId;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Dust threshold in currency units: settlements at or below it are not
/// emitted, and debtors or creditors with less than it remaining are done
pub const SETTLEMENT_EPSILON: Decimal = dec!(0.01);

/// Settles `expenses` with the default configuration and returns `viewer`'s view
///
/// An empty expense list yields [`CalculationResult::empty`].
pub fn calculate_balances(expenses: &[Expense], viewer: &MemberId) -> CalculationResult {
    SettlementCalculator::default().calculate_balances(expenses, viewer)
}
