//! Per-currency paid/owed accumulators

use rust_decimal::Decimal;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::collections::HashMap;

use core_kernel::MemberId;
use crate::report::AnomalyKind;

/// What one member paid and owes within a single currency bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberBalance {
    pub user: MemberId,
    pub paid: Decimal,
    pub owes: Decimal,
}

impl MemberBalance {
    pub fn new(user: MemberId) -> Self {
        Self {
            user,
            paid: Decimal::ZERO,
            owes: Decimal::ZERO,
        }
    }

    /// Paid minus owed: positive for creditors, negative for debtors
    ///
    /// Saturates at the `Decimal` bounds. Balances taken from a
    /// [`BalanceSheet`] always fit.
    pub fn net(&self) -> Decimal {
        self.paid.saturating_sub(self.owes)
    }

    pub fn checked_net(&self) -> Option<Decimal> {
        self.paid.checked_sub(self.owes)
    }

    pub fn is_creditor(&self) -> bool {
        self.net() > Decimal::ZERO
    }

    pub fn is_debtor(&self) -> bool {
        self.net() < Decimal::ZERO
    }
}

impl Serialize for MemberBalance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("MemberBalance", 4)?;
        state.serialize_field("user", &self.user)?;
        state.serialize_field("paid", &self.paid)?;
        state.serialize_field("owes", &self.owes)?;
        state.serialize_field("net", &self.net())?;
        state.end()
    }
}

/// Accumulators for one currency bucket
///
/// Members are kept in the order they were first referenced, which is the
/// tie-break order used when ranking debtors and creditors.
///
/// Every member's net, the sum of positive nets and the sum of negative nets
/// stay within `Decimal` range, so nothing computed from the balances later
/// can overflow.
#[derive(Debug, Default)]
pub struct BalanceSheet {
    index: HashMap<MemberId, usize>,
    members: Vec<MemberBalance>,
    credits: Decimal,
    debits: Decimal,
}

impl BalanceSheet {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, user: &MemberId) -> &mut MemberBalance {
        let position = match self.index.get(user) {
            Some(&position) => position,
            None => {
                let position = self.members.len();
                self.index.insert(user.clone(), position);
                self.members.push(MemberBalance::new(user.clone()));
                position
            }
        };
        &mut self.members[position]
    }

    /// Credits `amount` to `payer` and adds each owed share, all or nothing
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticOverflow`, leaving the sheet untouched, when the
    /// expense would push a balance or the bucket totals out of range.
    pub fn accrue<'a>(
        &mut self,
        payer: &MemberId,
        amount: Decimal,
        owed: impl IntoIterator<Item = (&'a MemberId, Decimal)>,
    ) -> Result<(), AnomalyKind> {
        let mut staged: Vec<MemberBalance> = Vec::new();
        let mut slots: HashMap<MemberId, usize> = HashMap::new();

        let slot = self.stage(&mut staged, &mut slots, payer);
        staged[slot].paid = overflow(staged[slot].paid.checked_add(amount))?;

        for (member, share) in owed {
            let slot = self.stage(&mut staged, &mut slots, member);
            staged[slot].owes = overflow(staged[slot].owes.checked_add(share))?;
        }

        let (mut credits, mut debits) = (self.credits, self.debits);
        for balance in &staged {
            let before = self.get(&balance.user).map_or(Decimal::ZERO, MemberBalance::net);
            let after = overflow(balance.checked_net())?;

            if before > Decimal::ZERO {
                credits = overflow(credits.checked_sub(before))?;
            } else {
                debits = overflow(debits.checked_sub(before))?;
            }
            if after > Decimal::ZERO {
                credits = overflow(credits.checked_add(after))?;
            } else {
                debits = overflow(debits.checked_add(after))?;
            }
        }

        for balance in staged {
            let slot = self.entry(&balance.user);
            *slot = balance;
        }
        self.credits = credits;
        self.debits = debits;
        Ok(())
    }

    /// Copies `user`'s current balance into `staged` on first touch
    fn stage(
        &self,
        staged: &mut Vec<MemberBalance>,
        slots: &mut HashMap<MemberId, usize>,
        user: &MemberId,
    ) -> usize {
        *slots.entry(user.clone()).or_insert_with(|| {
            let current = self
                .get(user)
                .cloned()
                .unwrap_or_else(|| MemberBalance::new(user.clone()));
            staged.push(current);
            staged.len() - 1
        })
    }

    pub fn get(&self, user: &MemberId) -> Option<&MemberBalance> {
        self.index.get(user).map(|&position| &self.members[position])
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Sum of all nets; non-zero when accrued shares drift from what was paid
    pub fn imbalance(&self) -> Decimal {
        // Opposite signs, cannot overflow
        self.credits + self.debits
    }

    /// Balances in first-reference order
    pub fn into_members(self) -> Vec<MemberBalance> {
        self.members
    }
}

fn overflow(value: Option<Decimal>) -> Result<Decimal, AnomalyKind> {
    value.ok_or(AnomalyKind::ArithmeticOverflow)
}
