//! The settlement calculator
//!
//! Groups expenses by currency, accrues what each member paid and owes,
//! simplifies the resulting net balances into debts, and projects them onto a
//! viewer. Every call works on freshly allocated accumulators and performs no
//! I/O, so a single calculator can be shared freely across threads.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use core_kernel::{CurrencyCode, MemberId};
use crate::balance::BalanceSheet;
use crate::error::SettlementError;
use crate::expense::Expense;
use crate::report::{AnomalyKind, CalculationResult, CurrencyBucket, ExpenseAnomaly, SettlementReport};
use crate::simplify::SimplificationStrategy;
use crate::split::{compute_shares, SplitPolicy};
use crate::SETTLEMENT_EPSILON;

/// How the dust threshold for a currency bucket is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ToleranceMode {
    /// Same epsilon for every currency
    Fixed { epsilon: Decimal },
    /// One minor unit of the bucket's currency (1 for JPY, 0.001 for KWD)
    CurrencyPrecision,
}

impl Default for ToleranceMode {
    fn default() -> Self {
        ToleranceMode::Fixed {
            epsilon: SETTLEMENT_EPSILON,
        }
    }
}

impl ToleranceMode {
    pub fn epsilon_for(&self, currency: &CurrencyCode) -> Decimal {
        match self {
            ToleranceMode::Fixed { epsilon } => *epsilon,
            ToleranceMode::CurrencyPrecision => currency.smallest_unit(),
        }
    }
}

/// Calculator settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorConfig {
    pub tolerance: ToleranceMode,
    pub split_policy: SplitPolicy,
    pub strategy: SimplificationStrategy,
}

impl CalculatorConfig {
    pub fn with_tolerance(mut self, tolerance: ToleranceMode) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_split_policy(mut self, split_policy: SplitPolicy) -> Self {
        self.split_policy = split_policy;
        self
    }

    pub fn with_strategy(mut self, strategy: SimplificationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// # Errors
    ///
    /// Returns `InvalidTolerance` for a fixed epsilon that is not positive
    pub fn validate(&self) -> Result<(), SettlementError> {
        if let ToleranceMode::Fixed { epsilon } = self.tolerance {
            if epsilon <= Decimal::ZERO {
                return Err(SettlementError::InvalidTolerance(epsilon));
            }
        }
        Ok(())
    }
}

/// Computes settlements from expense lists
#[derive(Debug, Clone, Default)]
pub struct SettlementCalculator {
    config: CalculatorConfig,
}

impl SettlementCalculator {
    /// Creates a calculator after validating its configuration
    pub fn new(config: CalculatorConfig) -> Result<Self, SettlementError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    /// Settles the group and projects the result onto `viewer`
    pub fn calculate_balances(&self, expenses: &[Expense], viewer: &MemberId) -> CalculationResult {
        if expenses.is_empty() {
            return CalculationResult::empty();
        }
        self.settle(expenses).project(viewer)
    }

    /// Settles the whole group, one currency bucket at a time
    pub fn settle(&self, expenses: &[Expense]) -> SettlementReport {
        let mut report = SettlementReport::default();

        for (currency, items) in partition_by_currency(expenses) {
            let epsilon = self.config.tolerance.epsilon_for(&currency);
            let mut sheet = BalanceSheet::new();

            for (position, expense) in items {
                if let Some(kind) = self.accrue(&mut sheet, expense, epsilon) {
                    let anomaly = ExpenseAnomaly {
                        expense_id: expense.id,
                        position,
                        currency: currency.clone(),
                        kind,
                    };
                    log_anomaly(&anomaly);
                    report.anomalies.push(anomaly);
                }
            }

            let imbalance = sheet.imbalance();
            let members = sheet.into_members();
            let debts = self.config.strategy.simplify(&members, &currency, epsilon);

            report.buckets.push(CurrencyBucket {
                currency,
                members,
                debts,
                imbalance,
            });
        }

        tracing::debug!(
            expenses = expenses.len(),
            buckets = report.buckets.len(),
            debts = report.debts().count(),
            anomalies = report.anomalies.len(),
            "Settlement calculated"
        );

        report
    }

    /// Accrues one expense; returns the anomaly it raised, if any
    ///
    /// Shares are computed before anything is credited and the sheet applies
    /// them all or nothing, so a skipped expense leaves it untouched.
    fn accrue(&self, sheet: &mut BalanceSheet, expense: &Expense, epsilon: Decimal) -> Option<AnomalyKind> {
        if !expense.payer_listed() {
            return Some(AnomalyKind::PayerNotParticipant);
        }

        let shares = match compute_shares(expense, self.config.split_policy, epsilon) {
            Ok(shares) => shares,
            Err(kind) => return Some(kind),
        };

        let owed = shares.iter().map(|share| (share.member, share.amount));
        if let Err(kind) = sheet.accrue(&expense.paid_by, expense.amount, owed) {
            return Some(kind);
        }

        if shares.is_empty() {
            return Some(if expense.enabled_count() == 0 {
                AnomalyKind::NoEnabledParticipants
            } else {
                AnomalyKind::UnallocatedShares
            });
        }

        None
    }
}

/// Groups expenses by currency, keeping first-appearance order of buckets and
/// input order within each bucket
fn partition_by_currency(expenses: &[Expense]) -> Vec<(CurrencyCode, Vec<(usize, &Expense)>)> {
    let mut index: HashMap<CurrencyCode, usize> = HashMap::new();
    let mut buckets: Vec<(CurrencyCode, Vec<(usize, &Expense)>)> = Vec::new();

    for (position, expense) in expenses.iter().enumerate() {
        let currency = expense.bucket();
        let slot = match index.get(&currency) {
            Some(&slot) => slot,
            None => {
                index.insert(currency.clone(), buckets.len());
                buckets.push((currency, Vec::new()));
                buckets.len() - 1
            }
        };
        buckets[slot].1.push((position, expense));
    }

    buckets
}

fn log_anomaly(anomaly: &ExpenseAnomaly) {
    if anomaly.kind.is_skip() {
        tracing::warn!(
            expense_id = ?anomaly.expense_id,
            position = anomaly.position,
            currency = %anomaly.currency,
            kind = ?anomaly.kind,
            "Skipping expense"
        );
    } else {
        tracing::debug!(
            expense_id = ?anomaly.expense_id,
            position = anomaly.position,
            currency = %anomaly.currency,
            kind = ?anomaly.kind,
            "Expense accrued without shares"
        );
    }
}
