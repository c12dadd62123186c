//! Expense records as supplied by the expense store
//!
//! Field names follow the domain's snake_case convention; the camelCase names
//! used by the web and mobile clients are accepted as aliases.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{CurrencyCode, ExpenseId, MemberId, Rate};
use crate::error::SettlementError;
use crate::SETTLEMENT_EPSILON;

/// Rule for dividing an expense among its enabled participants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitMethod {
    /// Everyone enabled owes `amount / enabled_count`
    Equal,
    /// Each participant owes their `split_amount` verbatim
    Fixed,
    /// Each participant owes `split_amount` percent of the total
    Percentage,
}

impl fmt::Display for SplitMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SplitMethod::Equal => "equal",
            SplitMethod::Fixed => "fixed",
            SplitMethod::Percentage => "percentage",
        };
        f.write_str(name)
    }
}

/// One member's entry in an expense split
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitDetail {
    /// The member; entries without one are ignored
    #[serde(default)]
    pub user: Option<MemberId>,
    /// Fixed amount or percentage, depending on the split method
    #[serde(default, alias = "splitAmount")]
    pub split_amount: Option<Decimal>,
    /// Whether the member owes a share of this expense
    #[serde(default, alias = "isEnabled")]
    pub is_enabled: bool,
}

impl SplitDetail {
    /// An enabled participant with no explicit split amount
    pub fn enabled(user: impl Into<MemberId>) -> Self {
        Self {
            user: Some(user.into()),
            split_amount: None,
            is_enabled: true,
        }
    }

    /// A listed member who does not owe anything for this expense
    pub fn disabled(user: impl Into<MemberId>) -> Self {
        Self {
            user: Some(user.into()),
            split_amount: None,
            is_enabled: false,
        }
    }

    /// An enabled participant owing a fixed amount or percentage
    pub fn with_amount(user: impl Into<MemberId>, split_amount: Decimal) -> Self {
        Self {
            user: Some(user.into()),
            split_amount: Some(split_amount),
            is_enabled: true,
        }
    }

    /// Returns the member if this entry takes part in the split
    pub fn participant(&self) -> Option<&MemberId> {
        if self.is_enabled {
            self.user.as_ref()
        } else {
            None
        }
    }
}

/// A group expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// Store identifier, used only for diagnostics
    #[serde(default)]
    pub id: Option<ExpenseId>,
    /// Total value of the expense
    pub amount: Decimal,
    /// Currency code; absent or blank codes fall into the default bucket
    #[serde(default)]
    pub currency: Option<CurrencyCode>,
    /// Member who fronted the money
    #[serde(alias = "paidBy")]
    pub paid_by: MemberId,
    #[serde(alias = "splitMethod")]
    pub split_method: SplitMethod,
    #[serde(default, alias = "splitDetails")]
    pub split_details: Vec<SplitDetail>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Expense {
    /// Creates an expense with no participants yet
    pub fn new(amount: Decimal, paid_by: impl Into<MemberId>, split_method: SplitMethod) -> Self {
        Self {
            id: None,
            amount,
            currency: None,
            paid_by: paid_by.into(),
            split_method,
            split_details: Vec::new(),
            description: None,
        }
    }

    pub fn with_id(mut self, id: ExpenseId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_currency(mut self, currency: impl Into<CurrencyCode>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_split(mut self, detail: SplitDetail) -> Self {
        self.split_details.push(detail);
        self
    }

    pub fn with_splits(mut self, details: impl IntoIterator<Item = SplitDetail>) -> Self {
        self.split_details.extend(details);
        self
    }

    /// The currency bucket this expense belongs to
    pub fn bucket(&self) -> CurrencyCode {
        match &self.currency {
            Some(code) if !code.as_str().trim().is_empty() => code.clone(),
            _ => CurrencyCode::default_bucket(),
        }
    }

    /// True when the payer appears among the split details, enabled or not
    pub fn payer_listed(&self) -> bool {
        self.split_details
            .iter()
            .any(|detail| detail.user.as_ref() == Some(&self.paid_by))
    }

    /// Enabled participants with a present user, in split order
    pub fn participants(&self) -> impl Iterator<Item = &SplitDetail> {
        self.split_details
            .iter()
            .filter(|detail| detail.participant().is_some())
    }

    pub fn enabled_count(&self) -> usize {
        self.participants().count()
    }

    /// Sum of the enabled participants' split amounts (missing amounts count
    /// as zero), or `None` if it overflows
    pub fn split_total(&self) -> Option<Decimal> {
        self.participants()
            .map(|detail| detail.split_amount.unwrap_or(Decimal::ZERO))
            .try_fold(Decimal::ZERO, |total, amount| total.checked_add(amount))
    }

    /// The value the split amounts should add up to, if the method has one
    pub fn expected_split_total(&self) -> Option<Decimal> {
        match self.split_method {
            SplitMethod::Equal => None,
            SplitMethod::Fixed => Some(self.amount),
            SplitMethod::Percentage => Some(dec!(100)),
        }
    }

    /// Compares fixed amounts or percentages with the total they should reach
    ///
    /// A percentage gap is weighed by the money it moves, so `tolerance` is
    /// always an amount in the expense's currency. Returns the expected and
    /// actual totals when they miss by `tolerance` or more.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticOverflow` if the totals are out of range
    pub fn split_mismatch(
        &self,
        tolerance: Decimal,
    ) -> Result<Option<(Decimal, Decimal)>, SettlementError> {
        let expected = match self.expected_split_total() {
            Some(expected) => expected,
            None => return Ok(None),
        };
        let actual = self.split_total().ok_or(SettlementError::ArithmeticOverflow)?;
        let gap = actual
            .checked_sub(expected)
            .ok_or(SettlementError::ArithmeticOverflow)?
            .abs();

        let gap = match self.split_method {
            SplitMethod::Percentage => Rate::from_percentage(gap)
                .checked_apply(self.amount.abs())
                .ok_or(SettlementError::ArithmeticOverflow)?,
            _ => gap,
        };

        Ok((gap >= tolerance).then_some((expected, actual)))
    }

    /// Strict validation using the default settlement tolerance
    pub fn validate(&self) -> Result<(), SettlementError> {
        self.validate_with_tolerance(SETTLEMENT_EPSILON)
    }

    /// Strict validation for callers that want to reject inconsistent expenses
    /// before they are stored
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` if the amount is not positive
    /// - `Currency` if a currency code is present but malformed
    /// - `PayerNotParticipant` if the payer has no split entry
    /// - `NoEnabledParticipants` if nobody owes a share
    /// - `SplitMismatch` if fixed amounts or percentages do not reconcile
    /// - `ArithmeticOverflow` if the split amounts are out of range
    pub fn validate_with_tolerance(&self, tolerance: Decimal) -> Result<(), SettlementError> {
        if self.amount <= Decimal::ZERO {
            return Err(SettlementError::InvalidAmount(self.amount));
        }

        if let Some(code) = &self.currency {
            if !code.is_default() && !code.as_str().trim().is_empty() {
                CurrencyCode::parse(code.as_str())?;
            }
        }

        if !self.payer_listed() {
            return Err(SettlementError::PayerNotParticipant(self.paid_by.clone()));
        }

        if self.enabled_count() == 0 {
            return Err(SettlementError::NoEnabledParticipants);
        }

        if let Some((expected, actual)) = self.split_mismatch(tolerance)? {
            return Err(SettlementError::SplitMismatch {
                method: self.split_method,
                expected,
                actual,
            });
        }

        Ok(())
    }
}
