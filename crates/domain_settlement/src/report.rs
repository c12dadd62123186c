//! Settlement output: debts, per-currency buckets, and the viewer projection

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use core_kernel::{CurrencyCode, ExpenseId, MemberId};
use crate::balance::MemberBalance;

/// "`from` owes `to` `amount` in `currency`"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Debt {
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Decimal,
    pub currency: CurrencyCode,
}

impl Debt {
    pub fn new(from: MemberId, to: MemberId, amount: Decimal, currency: CurrencyCode) -> Self {
        Self {
            from,
            to,
            amount,
            currency,
        }
    }

    /// True when `member` is on either side of this debt
    pub fn involves(&self, member: &MemberId) -> bool {
        &self.from == member || &self.to == member
    }
}

/// Why an expense contributed less than its face value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnomalyKind {
    /// Payer missing from the split details; the expense is inert
    PayerNotParticipant,
    /// Nobody enabled; the payer is credited but nobody owes anything
    NoEnabledParticipants,
    /// Normalisation found only zero split amounts; the payer is credited
    /// but nobody owes anything
    UnallocatedShares,
    /// Split rejected by policy; the expense is inert
    SplitMismatch { expected: Decimal, actual: Decimal },
    /// Shares or balances would leave `Decimal` range; the expense is inert
    ArithmeticOverflow,
}

impl AnomalyKind {
    /// True when the expense was dropped from the calculation entirely
    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            AnomalyKind::PayerNotParticipant
                | AnomalyKind::SplitMismatch { .. }
                | AnomalyKind::ArithmeticOverflow
        )
    }
}

/// A data-quality problem found while accruing one expense
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseAnomaly {
    /// Store identifier, when the expense carried one
    pub expense_id: Option<ExpenseId>,
    /// Index of the expense in the input list
    pub position: usize,
    pub currency: CurrencyCode,
    #[serde(flatten)]
    pub kind: AnomalyKind,
}

/// Everything computed for one currency
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrencyBucket {
    pub currency: CurrencyCode,
    /// Balances in the order members were first referenced
    pub members: Vec<MemberBalance>,
    pub debts: Vec<Debt>,
    /// Sum of all net balances; non-zero when fixed or percentage splits drift
    pub imbalance: Decimal,
}

impl CurrencyBucket {
    pub fn member(&self, user: &MemberId) -> Option<&MemberBalance> {
        self.members.iter().find(|m| &m.user == user)
    }
}

/// Whole-group settlement across all currencies
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SettlementReport {
    /// Buckets in order of first appearance in the input
    pub buckets: Vec<CurrencyBucket>,
    pub anomalies: Vec<ExpenseAnomaly>,
}

impl SettlementReport {
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn bucket(&self, currency: &CurrencyCode) -> Option<&CurrencyBucket> {
        self.buckets.iter().find(|b| &b.currency == currency)
    }

    /// All debts, bucket by bucket
    pub fn debts(&self) -> impl Iterator<Item = &Debt> {
        self.buckets.iter().flat_map(|b| b.debts.iter())
    }

    /// A member's net position in one currency, if they appear in it
    pub fn net_balance(&self, member: &MemberId, currency: &CurrencyCode) -> Option<Decimal> {
        self.bucket(currency)?.member(member).map(MemberBalance::net)
    }

    /// Expenses that were dropped entirely
    pub fn skipped(&self) -> impl Iterator<Item = &ExpenseAnomaly> {
        self.anomalies.iter().filter(|a| a.kind.is_skip())
    }

    /// Projects the group settlement onto one member's point of view
    pub fn project(&self, viewer: &MemberId) -> CalculationResult {
        let mut result = CalculationResult::default();

        for debt in self.debts() {
            if &debt.from == viewer {
                *result
                    .total_user_owes
                    .entry(debt.currency.clone())
                    .or_insert(Decimal::ZERO) += debt.amount;
                *result
                    .balances
                    .entry(debt.to.clone())
                    .or_default()
                    .entry(debt.currency.clone())
                    .or_insert(Decimal::ZERO) += debt.amount;
                result.user_owes.push(debt.clone());
            } else if &debt.to == viewer {
                *result
                    .total_owed_to_user
                    .entry(debt.currency.clone())
                    .or_insert(Decimal::ZERO) += debt.amount;
                *result
                    .balances
                    .entry(debt.from.clone())
                    .or_default()
                    .entry(debt.currency.clone())
                    .or_insert(Decimal::ZERO) -= debt.amount;
                result.owed_to_user.push(debt.clone());
            }
        }

        result
    }
}

/// One member's view of the group settlement
///
/// `balances[other][currency] > 0` means the viewer owes `other`; a negative
/// value means `other` owes the viewer. Debts between two other members do
/// not appear.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub user_owes: Vec<Debt>,
    pub owed_to_user: Vec<Debt>,
    pub total_user_owes: BTreeMap<CurrencyCode, Decimal>,
    pub total_owed_to_user: BTreeMap<CurrencyCode, Decimal>,
    pub balances: BTreeMap<MemberId, BTreeMap<CurrencyCode, Decimal>>,
}

impl CalculationResult {
    /// The all-empty result returned for an empty expense list
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.user_owes.is_empty()
            && self.owed_to_user.is_empty()
            && self.total_user_owes.is_empty()
            && self.total_owed_to_user.is_empty()
            && self.balances.is_empty()
    }

    /// Signed balance with `other` in `currency`, zero when there is none
    pub fn balance_with(&self, other: &MemberId, currency: &CurrencyCode) -> Decimal {
        self.balances
            .get(other)
            .and_then(|by_currency| by_currency.get(currency))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }
}
