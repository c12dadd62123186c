//! Test Data Builders
//!
//! Provides builder patterns for constructing test expenses with sensible
//! defaults. Tests specify only the relevant fields and take defaults for
//! everything else.

use core_kernel::{CurrencyCode, ExpenseId, MemberId};
use domain_settlement::{Expense, SplitDetail, SplitMethod};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::fixtures::{CurrencyFixtures, MemberFixtures};

/// Builder for test expenses
///
/// Defaults to 100 USD paid by alice, split equally, with no participants.
pub struct ExpenseBuilder {
    id: Option<ExpenseId>,
    amount: Decimal,
    currency: Option<CurrencyCode>,
    paid_by: MemberId,
    split_method: SplitMethod,
    split_details: Vec<SplitDetail>,
    description: Option<String>,
}

impl Default for ExpenseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpenseBuilder {
    /// Creates a new builder with default values
    pub fn new() -> Self {
        Self {
            id: None,
            amount: dec!(100),
            currency: Some(CurrencyFixtures::usd()),
            paid_by: MemberFixtures::alice(),
            split_method: SplitMethod::Equal,
            split_details: Vec::new(),
            description: None,
        }
    }

    /// Starts an equal split paid by `payer` and shared by `participants`
    pub fn equal<I, M>(amount: Decimal, payer: impl Into<MemberId>, participants: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<MemberId>,
    {
        Self::new()
            .amount(amount)
            .paid_by(payer)
            .participants(participants)
    }

    pub fn with_id(mut self) -> Self {
        self.id = Some(ExpenseId::new());
        self
    }

    pub fn amount(mut self, amount: Decimal) -> Self {
        self.amount = amount;
        self
    }

    pub fn currency(mut self, currency: impl Into<CurrencyCode>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    /// Leaves the currency unset so the expense lands in the default bucket
    pub fn no_currency(mut self) -> Self {
        self.currency = None;
        self
    }

    pub fn paid_by(mut self, payer: impl Into<MemberId>) -> Self {
        self.paid_by = payer.into();
        self
    }

    pub fn method(mut self, split_method: SplitMethod) -> Self {
        self.split_method = split_method;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds enabled participants with no explicit split amount
    pub fn participants<I, M>(mut self, members: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<MemberId>,
    {
        self.split_details
            .extend(members.into_iter().map(|member| SplitDetail::enabled(member)));
        self
    }

    /// Adds a listed but disabled member
    pub fn disabled(mut self, member: impl Into<MemberId>) -> Self {
        self.split_details.push(SplitDetail::disabled(member));
        self
    }

    /// Adds a fixed amount or percentage share; also switches the method
    /// away from `Equal` if it is still the default
    pub fn share(mut self, member: impl Into<MemberId>, split_amount: Decimal) -> Self {
        if self.split_method == SplitMethod::Equal {
            self.split_method = SplitMethod::Fixed;
        }
        self.split_details
            .push(SplitDetail::with_amount(member, split_amount));
        self
    }

    /// Adds a raw split entry
    pub fn detail(mut self, detail: SplitDetail) -> Self {
        self.split_details.push(detail);
        self
    }

    pub fn build(self) -> Expense {
        let mut expense = Expense::new(self.amount, self.paid_by, self.split_method)
            .with_splits(self.split_details);
        expense.id = self.id;
        expense.currency = self.currency;
        expense.description = self.description;
        expense
    }
}
