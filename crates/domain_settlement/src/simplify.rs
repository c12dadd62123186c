//! Debt simplification
//!
//! Reduces a bucket's net balances to a list of settling payments. Neither
//! strategy touches the balances themselves, so both settle exactly the same
//! net positions; they differ only in how many payments they emit.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{CurrencyCode, MemberId};
use crate::balance::MemberBalance;
use crate::report::Debt;

/// Largest number of non-zero members settled with the exact search
pub const MAX_EXACT_MEMBERS: usize = 16;

/// How net balances are turned into payments
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimplificationStrategy {
    /// Largest debtor pays largest creditor, repeatedly
    #[default]
    Greedy,
    /// Fewest possible payments; falls back to `Greedy` above
    /// [`MAX_EXACT_MEMBERS`] non-zero members
    MinimumTransfers,
}

impl SimplificationStrategy {
    /// Produces the settling payments for one currency bucket
    pub fn simplify(
        &self,
        members: &[MemberBalance],
        currency: &CurrencyCode,
        epsilon: Decimal,
    ) -> Vec<Debt> {
        let positions: Vec<Position<'_>> = members
            .iter()
            .map(|m| Position { member: &m.user, net: m.net() })
            .collect();

        match self {
            SimplificationStrategy::Greedy => greedy(&positions, currency, epsilon),
            SimplificationStrategy::MinimumTransfers => {
                minimum_transfers(&positions, currency, epsilon)
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Position<'a> {
    member: &'a MemberId,
    net: Decimal,
}

#[derive(Debug)]
struct Party<'a> {
    member: &'a MemberId,
    remaining: Decimal,
}

fn exhausted(remaining: Decimal, epsilon: Decimal) -> bool {
    remaining <= Decimal::ZERO || remaining < epsilon
}

/// Two-pointer sweep over debtors and creditors ranked by magnitude
///
/// `sort_by` is stable, so exact ties keep the order in which members were
/// first referenced. Residual imbalance is left unsettled.
fn greedy(positions: &[Position<'_>], currency: &CurrencyCode, epsilon: Decimal) -> Vec<Debt> {
    let mut debtors: Vec<Party<'_>> = positions
        .iter()
        .filter(|p| p.net < Decimal::ZERO)
        .map(|p| Party { member: p.member, remaining: -p.net })
        .collect();
    let mut creditors: Vec<Party<'_>> = positions
        .iter()
        .filter(|p| p.net > Decimal::ZERO)
        .map(|p| Party { member: p.member, remaining: p.net })
        .collect();

    debtors.sort_by(|a, b| b.remaining.cmp(&a.remaining));
    creditors.sort_by(|a, b| b.remaining.cmp(&a.remaining));

    let mut debts = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < debtors.len() && j < creditors.len() {
        let settle = debtors[i].remaining.min(creditors[j].remaining);

        if settle > epsilon {
            debts.push(Debt::new(
                debtors[i].member.clone(),
                creditors[j].member.clone(),
                settle,
                currency.clone(),
            ));
        }

        debtors[i].remaining -= settle;
        creditors[j].remaining -= settle;

        if exhausted(debtors[i].remaining, epsilon) {
            i += 1;
        }
        if exhausted(creditors[j].remaining, epsilon) {
            j += 1;
        }
    }

    debts
}

/// Exact minimum-payment settlement
///
/// A group of k members whose balances sum to zero can always be settled with
/// k - 1 payments, so the fewest payments overall come from splitting the
/// members into as many zero-sum groups as possible. `best[mask]` holds the
/// most zero-sum prefixes reachable when adding the members of `mask` one at a
/// time; walking the table back yields an ordering whose zero-sum prefixes
/// delimit the groups, and each group is then settled greedily.
fn minimum_transfers(
    positions: &[Position<'_>],
    currency: &CurrencyCode,
    epsilon: Decimal,
) -> Vec<Debt> {
    let active: Vec<Position<'_>> = positions
        .iter()
        .copied()
        .filter(|p| !p.net.is_zero())
        .collect();

    if active.len() > MAX_EXACT_MEMBERS {
        tracing::debug!(
            members = active.len(),
            limit = MAX_EXACT_MEMBERS,
            "Too many members for exact settlement, using greedy"
        );
        return greedy(positions, currency, epsilon);
    }
    if active.is_empty() {
        return Vec::new();
    }

    let n = active.len();
    let full = (1usize << n) - 1;
    let is_zero = |sum: Decimal| sum.abs() < epsilon;

    let mut sums = vec![Decimal::ZERO; full + 1];
    for mask in 1..=full {
        let low = mask.trailing_zeros() as usize;
        sums[mask] = sums[mask & (mask - 1)].saturating_add(active[low].net);
    }

    let mut best = vec![0u8; full + 1];
    for mask in 1..=full {
        let mut most = 0u8;
        for i in 0..n {
            if mask & (1 << i) != 0 {
                most = most.max(best[mask ^ (1 << i)]);
            }
        }
        best[mask] = most + u8::from(is_zero(sums[mask]));
    }

    // Walk back from the full set, removing one member per step
    let mut removal = Vec::with_capacity(n);
    let mut mask = full;
    while mask != 0 {
        let bonus = u8::from(is_zero(sums[mask]));
        let pick = (0..n)
            .find(|&i| mask & (1 << i) != 0 && best[mask ^ (1 << i)] + bonus == best[mask])
            .unwrap_or_else(|| mask.trailing_zeros() as usize);
        removal.push(pick);
        mask ^= 1 << pick;
    }

    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut current = Vec::new();
    let mut prefix = 0usize;
    for &i in removal.iter().rev() {
        prefix |= 1 << i;
        current.push(i);
        if is_zero(sums[prefix]) {
            groups.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        groups.push(current);
    }

    for group in groups.iter_mut() {
        group.sort_unstable();
    }
    groups.sort_by_key(|group| group[0]);

    let mut debts = Vec::new();
    for group in groups {
        let members: Vec<Position<'_>> = group.into_iter().map(|i| active[i]).collect();
        debts.extend(greedy(&members, currency, epsilon));
    }

    debts
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn balances(nets: &[(&str, Decimal)]) -> Vec<MemberBalance> {
        nets.iter()
            .map(|(user, net)| {
                let mut balance = MemberBalance::new(MemberId::from(*user));
                if *net > Decimal::ZERO {
                    balance.paid = *net;
                } else {
                    balance.owes = -*net;
                }
                balance
            })
            .collect()
    }

    fn edges(debts: &[Debt]) -> Vec<(String, String, Decimal)> {
        debts
            .iter()
            .map(|d| (d.from.to_string(), d.to.to_string(), d.amount))
            .collect()
    }

    fn usd() -> CurrencyCode {
        CurrencyCode::new("USD")
    }

    #[test]
    fn test_greedy_matches_largest_first() {
        let members = balances(&[("a", dec!(60)), ("b", dec!(-30)), ("c", dec!(-30))]);
        let debts = SimplificationStrategy::Greedy.simplify(&members, &usd(), dec!(0.01));

        assert_eq!(
            edges(&debts),
            vec![
                ("b".to_string(), "a".to_string(), dec!(30)),
                ("c".to_string(), "a".to_string(), dec!(30)),
            ]
        );
    }

    #[test]
    fn test_greedy_ties_keep_reference_order() {
        let members = balances(&[("x", dec!(-10)), ("y", dec!(-10)), ("z", dec!(20))]);
        let debts = SimplificationStrategy::Greedy.simplify(&members, &usd(), dec!(0.01));

        assert_eq!(debts[0].from.as_str(), "x");
        assert_eq!(debts[1].from.as_str(), "y");
    }

    #[test]
    fn test_greedy_drops_dust() {
        let members = balances(&[("a", dec!(0.005)), ("b", dec!(-0.005))]);
        let debts = SimplificationStrategy::Greedy.simplify(&members, &usd(), dec!(0.01));
        assert!(debts.is_empty());
    }

    #[test]
    fn test_greedy_leaves_residual_imbalance() {
        let members = balances(&[("a", dec!(50)), ("b", dec!(-80))]);
        let debts = SimplificationStrategy::Greedy.simplify(&members, &usd(), dec!(0.01));
        assert_eq!(edges(&debts), vec![("b".to_string(), "a".to_string(), dec!(50))]);
    }

    #[test]
    fn test_greedy_terminates_with_zero_epsilon() {
        let members = balances(&[("a", dec!(10)), ("b", dec!(-10))]);
        let debts = SimplificationStrategy::Greedy.simplify(&members, &usd(), Decimal::ZERO);
        assert_eq!(debts.len(), 1);
    }

    #[test]
    fn test_minimum_transfers_beats_greedy() {
        // Greedy sends d's 6 to a first and needs four payments; the exact
        // search finds the zero-sum groups {a, e} and {b, c, d}.
        let members = balances(&[
            ("a", dec!(4)),
            ("b", dec!(3)),
            ("c", dec!(3)),
            ("d", dec!(-6)),
            ("e", dec!(-4)),
        ]);

        let greedy = SimplificationStrategy::Greedy.simplify(&members, &usd(), dec!(0.01));
        let exact = SimplificationStrategy::MinimumTransfers.simplify(&members, &usd(), dec!(0.01));

        assert_eq!(greedy.len(), 4);
        assert_eq!(
            edges(&exact),
            vec![
                ("e".to_string(), "a".to_string(), dec!(4)),
                ("d".to_string(), "b".to_string(), dec!(3)),
                ("d".to_string(), "c".to_string(), dec!(3)),
            ]
        );
    }

    #[test]
    fn test_minimum_transfers_splits_independent_pairs() {
        let members = balances(&[
            ("a", dec!(-10)),
            ("b", dec!(-3)),
            ("c", dec!(3)),
            ("d", dec!(10)),
        ]);

        let debts = SimplificationStrategy::MinimumTransfers.simplify(&members, &usd(), dec!(0.01));
        let mut found = edges(&debts);
        found.sort();

        assert_eq!(
            found,
            vec![
                ("a".to_string(), "d".to_string(), dec!(10)),
                ("b".to_string(), "c".to_string(), dec!(3)),
            ]
        );
    }

    #[test]
    fn test_minimum_transfers_empty() {
        let debts = SimplificationStrategy::MinimumTransfers.simplify(&[], &usd(), dec!(0.01));
        assert!(debts.is_empty());
    }
}
