//! Tests for the settlement calculator
//!
//! Covers the accrual rules for each split method, debt simplification,
//! viewer projection, data-quality tolerance, and the configurable policies.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeSet;

use core_kernel::{CurrencyCode, ExpenseId, MemberId};
use domain_settlement::{
    calculate_balances, AnomalyKind, CalculationResult, CalculatorConfig, Debt, Expense,
    SettlementCalculator, SimplificationStrategy, SplitDetail, SplitMethod, SplitPolicy,
    ToleranceMode,
};

// ============================================================================
// Helpers
// ============================================================================

fn member(id: &str) -> MemberId {
    MemberId::from(id)
}

fn usd() -> CurrencyCode {
    CurrencyCode::new("USD")
}

fn equal(amount: Decimal, payer: &str, participants: &[&str]) -> Expense {
    Expense::new(amount, payer, SplitMethod::Equal)
        .with_currency("USD")
        .with_splits(participants.iter().map(|p| SplitDetail::enabled(*p)))
}

fn edge_set(debts: &[Debt]) -> BTreeSet<(String, String, Decimal)> {
    debts
        .iter()
        .map(|d| (d.from.to_string(), d.to.to_string(), d.amount))
        .collect()
}

fn edge(from: &str, to: &str, amount: Decimal) -> (String, String, Decimal) {
    (from.to_string(), to.to_string(), amount)
}

// ============================================================================
// Empty input
// ============================================================================

mod empty_input {
    use super::*;

    #[test]
    fn test_empty_expenses_return_sentinel() {
        let result = calculate_balances(&[], &member("a"));

        assert_eq!(result, CalculationResult::empty());
        assert!(result.user_owes.is_empty());
        assert!(result.owed_to_user.is_empty());
        assert!(result.total_user_owes.is_empty());
        assert!(result.total_owed_to_user.is_empty());
        assert!(result.balances.is_empty());
    }

    #[test]
    fn test_viewer_outside_group_sees_nothing() {
        let expenses = vec![equal(dec!(90), "a", &["a", "b", "c"])];
        let result = calculate_balances(&expenses, &member("zed"));
        assert!(result.is_empty());
    }
}

// ============================================================================
// Equal splits
// ============================================================================

mod equal_split {
    use super::*;

    #[test]
    fn test_three_way_dinner() {
        let expenses = vec![equal(dec!(90), "a", &["a", "b", "c"])];
        let report = SettlementCalculator::default().settle(&expenses);

        assert_eq!(report.net_balance(&member("a"), &usd()), Some(dec!(60)));
        assert_eq!(report.net_balance(&member("b"), &usd()), Some(dec!(-30)));
        assert_eq!(report.net_balance(&member("c"), &usd()), Some(dec!(-30)));

        let result = report.project(&member("a"));
        assert!(result.user_owes.is_empty());
        assert_eq!(
            edge_set(&result.owed_to_user),
            BTreeSet::from([edge("b", "a", dec!(30)), edge("c", "a", dec!(30))])
        );
        assert_eq!(result.total_owed_to_user[&usd()], dec!(60));
    }

    #[test]
    fn test_two_member_symmetry() {
        let expenses = vec![equal(dec!(100), "a", &["a", "b"])];

        let from_a = calculate_balances(&expenses, &member("a"));
        let from_b = calculate_balances(&expenses, &member("b"));

        assert_eq!(edge_set(&from_a.owed_to_user), BTreeSet::from([edge("b", "a", dec!(50))]));
        assert_eq!(edge_set(&from_b.user_owes), BTreeSet::from([edge("b", "a", dec!(50))]));
        assert_eq!(from_a.balance_with(&member("b"), &usd()), dec!(-50));
        assert_eq!(from_b.balance_with(&member("a"), &usd()), dec!(50));
    }

    #[test]
    fn test_balances_sign_convention() {
        // The viewer owes b, so b's entry is positive from the viewer's side
        let expenses = vec![equal(dec!(40), "b", &["a", "b"])];
        let result = calculate_balances(&expenses, &member("a"));

        assert_eq!(result.balance_with(&member("b"), &usd()), dec!(20));
        assert_eq!(result.total_user_owes[&usd()], dec!(20));
    }

    #[test]
    fn test_disabled_member_owes_nothing() {
        let expense = Expense::new(dec!(60), "a", SplitMethod::Equal)
            .with_currency("USD")
            .with_splits([
                SplitDetail::enabled("a"),
                SplitDetail::enabled("b"),
                SplitDetail::disabled("c"),
            ]);

        let report = SettlementCalculator::default().settle(&[expense]);
        assert_eq!(report.net_balance(&member("b"), &usd()), Some(dec!(-30)));
        assert_eq!(report.net_balance(&member("c"), &usd()), None);
    }

    #[test]
    fn test_payer_may_be_disabled() {
        let expense = Expense::new(dec!(30), "a", SplitMethod::Equal)
            .with_currency("USD")
            .with_splits([
                SplitDetail::disabled("a"),
                SplitDetail::enabled("b"),
                SplitDetail::enabled("c"),
            ]);

        let result = calculate_balances(&[expense], &member("a"));
        assert_eq!(
            edge_set(&result.owed_to_user),
            BTreeSet::from([edge("b", "a", dec!(15)), edge("c", "a", dec!(15))])
        );
    }

    #[test]
    fn test_thirds_leave_no_dust_debts() {
        let expenses = vec![equal(dec!(100), "a", &["a", "b", "c"])];
        let report = SettlementCalculator::default().settle(&expenses);

        assert_eq!(report.debts().count(), 2);
        let settled: Decimal = report.debts().map(|d| d.amount).sum();
        assert!((settled - dec!(66.67)).abs() < dec!(0.01));
    }

    #[test]
    fn test_offsetting_expenses_cancel() {
        let expenses = vec![
            equal(dec!(50), "a", &["a", "b"]),
            equal(dec!(50), "b", &["a", "b"]),
        ];

        let result = calculate_balances(&expenses, &member("a"));
        assert!(result.is_empty());
    }
}

// ============================================================================
// Fixed and percentage splits
// ============================================================================

mod fixed_and_percentage {
    use super::*;

    #[test]
    fn test_fixed_split() {
        let expense = Expense::new(dec!(100), "a", SplitMethod::Fixed)
            .with_currency("USD")
            .with_splits([
                SplitDetail::with_amount("a", dec!(20)),
                SplitDetail::with_amount("b", dec!(80)),
            ]);

        let result = calculate_balances(&[expense], &member("b"));
        assert_eq!(edge_set(&result.user_owes), BTreeSet::from([edge("b", "a", dec!(80))]));
    }

    #[test]
    fn test_percentage_split() {
        let expense = Expense::new(dec!(200), "a", SplitMethod::Percentage)
            .with_currency("USD")
            .with_splits([
                SplitDetail::with_amount("a", dec!(10)),
                SplitDetail::with_amount("b", dec!(30)),
                SplitDetail::with_amount("c", dec!(60)),
            ]);

        let result = calculate_balances(&[expense], &member("a"));
        assert_eq!(
            edge_set(&result.owed_to_user),
            BTreeSet::from([edge("c", "a", dec!(120)), edge("b", "a", dec!(60))])
        );
    }

    #[test]
    fn test_fixed_drift_is_tolerated() {
        // Shares cover 70 of 100: the payer is owed more than anyone owes
        let expense = Expense::new(dec!(100), "a", SplitMethod::Fixed)
            .with_currency("USD")
            .with_splits([
                SplitDetail::with_amount("a", dec!(10)),
                SplitDetail::with_amount("b", dec!(60)),
            ]);

        let report = SettlementCalculator::default().settle(&[expense]);
        let bucket = report.bucket(&usd()).unwrap();

        assert_eq!(bucket.imbalance, dec!(30));
        assert_eq!(edge_set(&bucket.debts), BTreeSet::from([edge("b", "a", dec!(60))]));
        assert!(report.anomalies.is_empty());
    }

    #[test]
    fn test_percentage_overshoot_is_tolerated() {
        let expense = Expense::new(dec!(100), "a", SplitMethod::Percentage)
            .with_currency("USD")
            .with_splits([
                SplitDetail::with_amount("a", dec!(60)),
                SplitDetail::with_amount("b", dec!(60)),
            ]);

        let report = SettlementCalculator::default().settle(&[expense]);
        let bucket = report.bucket(&usd()).unwrap();

        // a: 100 - 60 = +40, b: -60; only 40 can be settled
        assert_eq!(bucket.imbalance, dec!(-20));
        assert_eq!(edge_set(&bucket.debts), BTreeSet::from([edge("b", "a", dec!(40))]));
    }
}

// ============================================================================
// Data quality
// ============================================================================

mod data_quality {
    use super::*;

    #[test]
    fn test_payer_not_participant_is_inert() {
        let id = ExpenseId::new();
        let corrupt = Expense::new(dec!(500), "ghost", SplitMethod::Equal)
            .with_id(id)
            .with_currency("USD")
            .with_splits([SplitDetail::enabled("a"), SplitDetail::enabled("b")]);
        let valid = equal(dec!(20), "a", &["a", "b"]);

        let with_corrupt = SettlementCalculator::default().settle(&[corrupt, valid.clone()]);
        let without = SettlementCalculator::default().settle(&[valid]);

        assert_eq!(with_corrupt.buckets, without.buckets);
        assert_eq!(with_corrupt.anomalies.len(), 1);
        assert_eq!(with_corrupt.anomalies[0].expense_id, Some(id));
        assert_eq!(with_corrupt.anomalies[0].position, 0);
        assert_eq!(with_corrupt.anomalies[0].kind, AnomalyKind::PayerNotParticipant);
        assert_eq!(with_corrupt.net_balance(&member("ghost"), &usd()), None);
    }

    #[test]
    fn test_no_enabled_participants_still_credits_payer() {
        let expense = Expense::new(dec!(40), "a", SplitMethod::Equal)
            .with_currency("USD")
            .with_splits([SplitDetail::disabled("a"), SplitDetail::disabled("b")]);

        let report = SettlementCalculator::default().settle(&[expense]);

        assert_eq!(report.net_balance(&member("a"), &usd()), Some(dec!(40)));
        assert_eq!(report.debts().count(), 0);
        assert_eq!(report.anomalies[0].kind, AnomalyKind::NoEnabledParticipants);
        assert_eq!(report.skipped().count(), 0);
    }

    #[test]
    fn test_anonymous_entries_are_ignored() {
        let expense = Expense::new(dec!(30), "a", SplitMethod::Equal)
            .with_currency("USD")
            .with_splits([
                SplitDetail::enabled("a"),
                SplitDetail { user: None, split_amount: None, is_enabled: true },
                SplitDetail::enabled("b"),
            ]);

        let report = SettlementCalculator::default().settle(&[expense]);
        assert_eq!(report.net_balance(&member("b"), &usd()), Some(dec!(-15)));
    }

    #[test]
    fn test_missing_currency_uses_default_bucket() {
        let expense = Expense::new(dec!(10), "a", SplitMethod::Equal)
            .with_splits([SplitDetail::enabled("a"), SplitDetail::enabled("b")]);

        let result = calculate_balances(&[expense], &member("a"));
        assert_eq!(result.total_owed_to_user[&CurrencyCode::default_bucket()], dec!(5));
    }

    #[test]
    fn test_out_of_range_totals_are_skipped() {
        let huge = Decimal::MAX / dec!(2) + Decimal::ONE;
        let unshared = |payer: &str| {
            Expense::new(huge, payer, SplitMethod::Fixed)
                .with_currency("USD")
                .with_splits([
                    SplitDetail::with_amount("a", Decimal::ZERO),
                    SplitDetail::with_amount("b", Decimal::ZERO),
                ])
        };
        let expenses = vec![unshared("a"), unshared("b")];

        assert!(calculate_balances(&expenses, &member("a")).is_empty());

        let report = SettlementCalculator::default().settle(&expenses);
        assert_eq!(report.skipped().count(), 1);
        assert_eq!(report.anomalies[0].position, 1);
        assert_eq!(report.anomalies[0].kind, AnomalyKind::ArithmeticOverflow);

        let bucket = report.bucket(&usd()).unwrap();
        assert_eq!(bucket.imbalance, huge);
        assert!(bucket.debts.is_empty());
    }

    #[test]
    fn test_out_of_range_net_is_skipped() {
        let expenses = vec![
            Expense::new(Decimal::MAX, "a", SplitMethod::Fixed)
                .with_currency("USD")
                .with_splits([
                    SplitDetail::with_amount("a", Decimal::MIN),
                    SplitDetail::with_amount("b", dec!(10)),
                ]),
            equal(dec!(10), "a", &["a", "b"]),
        ];

        let result = calculate_balances(&expenses, &member("b"));
        assert_eq!(edge_set(&result.user_owes), BTreeSet::from([edge("b", "a", dec!(5))]));

        let report = SettlementCalculator::default().settle(&expenses);
        assert_eq!(report.anomalies.len(), 1);
        assert_eq!(report.anomalies[0].kind, AnomalyKind::ArithmeticOverflow);
    }
}

// ============================================================================
// Multiple currencies
// ============================================================================

mod multi_currency {
    use super::*;

    #[test]
    fn test_currencies_are_never_merged() {
        let expenses = vec![
            equal(dec!(100), "a", &["a", "b"]),
            Expense::new(dec!(100), "b", SplitMethod::Equal)
                .with_currency("EUR")
                .with_splits([SplitDetail::enabled("a"), SplitDetail::enabled("b")]),
        ];

        let result = calculate_balances(&expenses, &member("a"));
        let eur = CurrencyCode::new("EUR");

        assert_eq!(result.total_owed_to_user[&usd()], dec!(50));
        assert_eq!(result.total_user_owes[&eur], dec!(50));
        assert_eq!(result.balance_with(&member("b"), &usd()), dec!(-50));
        assert_eq!(result.balance_with(&member("b"), &eur), dec!(50));
    }

    #[test]
    fn test_buckets_follow_first_appearance() {
        let expenses = vec![
            Expense::new(dec!(10), "a", SplitMethod::Equal)
                .with_currency("GBP")
                .with_splits([SplitDetail::enabled("a"), SplitDetail::enabled("b")]),
            equal(dec!(10), "a", &["a", "b"]),
        ];

        let report = SettlementCalculator::default().settle(&expenses);
        let order: Vec<_> = report.buckets.iter().map(|b| b.currency.to_string()).collect();
        assert_eq!(order, vec!["GBP", "USD"]);
    }
}

// ============================================================================
// Configurable policies
// ============================================================================

mod policies {
    use super::*;

    fn drifting_fixed() -> Expense {
        Expense::new(dec!(100), "a", SplitMethod::Fixed)
            .with_currency("USD")
            .with_splits([
                SplitDetail::with_amount("a", dec!(25)),
                SplitDetail::with_amount("b", dec!(25)),
            ])
    }

    #[test]
    fn test_normalize_policy_rescales() {
        let calculator = SettlementCalculator::new(
            CalculatorConfig::default().with_split_policy(SplitPolicy::Normalize),
        )
        .unwrap();

        let report = calculator.settle(&[drifting_fixed()]);
        let bucket = report.bucket(&usd()).unwrap();

        assert_eq!(bucket.imbalance, Decimal::ZERO);
        assert_eq!(edge_set(&bucket.debts), BTreeSet::from([edge("b", "a", dec!(50))]));
    }

    #[test]
    fn test_reject_policy_skips() {
        let calculator = SettlementCalculator::new(
            CalculatorConfig::default().with_split_policy(SplitPolicy::Reject),
        )
        .unwrap();

        let report = calculator.settle(&[drifting_fixed(), equal(dec!(10), "b", &["a", "b"])]);

        assert_eq!(report.skipped().count(), 1);
        assert_eq!(
            report.anomalies[0].kind,
            AnomalyKind::SplitMismatch { expected: dec!(100), actual: dec!(50) }
        );
        assert_eq!(report.net_balance(&member("b"), &usd()), Some(dec!(5)));
    }

    #[test]
    fn test_currency_precision_tolerance_for_yen() {
        let expense = Expense::new(dec!(1000), "a", SplitMethod::Equal)
            .with_currency("JPY")
            .with_splits([
                SplitDetail::enabled("a"),
                SplitDetail::enabled("b"),
                SplitDetail::enabled("c"),
            ]);

        let calculator = SettlementCalculator::new(
            CalculatorConfig::default().with_tolerance(ToleranceMode::CurrencyPrecision),
        )
        .unwrap();

        let report = calculator.settle(&[expense]);
        assert_eq!(report.debts().count(), 2);
        assert!(report.debts().all(|d| d.amount > dec!(1)));
    }

    #[test]
    fn test_fixed_tolerance_hides_small_debts() {
        let expense = equal(dec!(0.50), "a", &["a", "b"]);
        let calculator = SettlementCalculator::new(
            CalculatorConfig::default().with_tolerance(ToleranceMode::Fixed { epsilon: dec!(1) }),
        )
        .unwrap();

        assert_eq!(calculator.settle(&[expense]).debts().count(), 0);
    }

    #[test]
    fn test_minimum_transfers_preserves_net_balances() {
        let expenses = vec![
            equal(dec!(12), "a", &["a", "b", "c", "d"]),
            equal(dec!(20), "b", &["b", "e"]),
            equal(dec!(9), "c", &["a", "c", "e"]),
        ];

        let greedy = SettlementCalculator::default().settle(&expenses);
        let exact = SettlementCalculator::new(
            CalculatorConfig::default().with_strategy(SimplificationStrategy::MinimumTransfers),
        )
        .unwrap()
        .settle(&expenses);

        assert_eq!(greedy.buckets[0].members, exact.buckets[0].members);
        assert!(exact.debts().count() <= greedy.debts().count());
    }

    #[test]
    fn test_reject_weighs_percentages_in_bucket_currency() {
        let percentages = |amount: Decimal, currency: &str, second: Decimal| {
            Expense::new(amount, "a", SplitMethod::Percentage)
                .with_currency(currency)
                .with_splits([
                    SplitDetail::with_amount("a", dec!(50)),
                    SplitDetail::with_amount("b", second),
                ])
        };
        let calculator = SettlementCalculator::new(
            CalculatorConfig::default()
                .with_split_policy(SplitPolicy::Reject)
                .with_tolerance(ToleranceMode::CurrencyPrecision),
        )
        .unwrap();

        // Half a point of 10000 yen is 50 yen
        let yen = calculator.settle(&[percentages(dec!(10000), "JPY", dec!(49.5))]);
        assert_eq!(yen.skipped().count(), 1);

        // A thousandth of a point of 10 dinar is a tenth of a fils
        let dinar = calculator.settle(&[percentages(dec!(10), "KWD", dec!(49.999))]);
        assert!(dinar.anomalies.is_empty());
        assert_eq!(
            dinar.net_balance(&member("b"), &CurrencyCode::new("KWD")),
            Some(dec!(-4.9999))
        );
    }
}
