//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for settlement results that give
//! more meaningful error messages than standard assertions.

use core_kernel::money::approx_eq;
use core_kernel::MemberId;
use domain_settlement::{CalculationResult, CurrencyBucket, Debt, SettlementReport};
use rust_decimal::Decimal;
use std::collections::BTreeSet;

/// Asserts that two decimals differ by less than `tolerance`
pub fn assert_decimal_approx_eq(actual: Decimal, expected: Decimal, tolerance: Decimal) {
    assert!(
        approx_eq(actual, expected, tolerance),
        "Decimals differ by more than tolerance: actual={}, expected={}, diff={}, tolerance={}",
        actual,
        expected,
        (actual - expected).abs(),
        tolerance
    );
}

/// Asserts that `debts` contains exactly the given `(from, to, amount)` edges,
/// in any order
pub fn assert_debts_eq(debts: &[Debt], expected: &[(&str, &str, Decimal)]) {
    let actual: BTreeSet<(String, String, Decimal)> = debts
        .iter()
        .map(|d| (d.from.to_string(), d.to.to_string(), d.amount))
        .collect();
    let expected: BTreeSet<(String, String, Decimal)> = expected
        .iter()
        .map(|(from, to, amount)| (from.to_string(), to.to_string(), *amount))
        .collect();

    assert_eq!(actual, expected, "Debt sets differ");
}

/// Asserts every debt is above the dust threshold, between two different
/// members, and in the currency of its bucket
pub fn assert_debts_well_formed(report: &SettlementReport, epsilon: Decimal) {
    for bucket in &report.buckets {
        for debt in &bucket.debts {
            assert!(
                debt.amount > epsilon,
                "Debt {} -> {} of {} is not above {}",
                debt.from,
                debt.to,
                debt.amount,
                epsilon
            );
            assert_ne!(debt.from, debt.to, "Self-debt for {}", debt.from);
            assert_eq!(debt.currency, bucket.currency, "Debt filed in the wrong bucket");
        }
    }
}

/// Net amount the debts of `bucket` move for `member`: received minus paid
pub fn settled_position(bucket: &CurrencyBucket, member: &MemberId) -> Decimal {
    bucket.debts.iter().fold(Decimal::ZERO, |acc, debt| {
        if &debt.to == member {
            acc + debt.amount
        } else if &debt.from == member {
            acc - debt.amount
        } else {
            acc
        }
    })
}

/// Asserts that, in a balanced bucket, the debts settle every member's net
/// balance up to dust
///
/// Each member can be left with at most one dust remainder per counterparty.
pub fn assert_bucket_settles(bucket: &CurrencyBucket, epsilon: Decimal) {
    let tolerance = epsilon * Decimal::from(bucket.members.len().max(1) * 2);
    for member in &bucket.members {
        assert_decimal_approx_eq(settled_position(bucket, &member.user), member.net(), tolerance);
    }
}

/// Asserts the viewer projection agrees with the group report
pub fn assert_projection_consistent(
    report: &SettlementReport,
    result: &CalculationResult,
    viewer: &MemberId,
) {
    let touching: Vec<&Debt> = report.debts().filter(|d| d.involves(viewer)).collect();
    assert_eq!(
        touching.len(),
        result.user_owes.len() + result.owed_to_user.len(),
        "Projection dropped or invented debts"
    );
    assert!(result.user_owes.iter().all(|d| &d.from == viewer));
    assert!(result.owed_to_user.iter().all(|d| &d.to == viewer));

    for (currency, total) in &result.total_user_owes {
        let sum: Decimal = result
            .user_owes
            .iter()
            .filter(|d| &d.currency == currency)
            .map(|d| d.amount)
            .sum();
        assert_eq!(*total, sum, "total_user_owes mismatch in {}", currency);
    }
    for (currency, total) in &result.total_owed_to_user {
        let sum: Decimal = result
            .owed_to_user
            .iter()
            .filter(|d| &d.currency == currency)
            .map(|d| d.amount)
            .sum();
        assert_eq!(*total, sum, "total_owed_to_user mismatch in {}", currency);
    }
}
