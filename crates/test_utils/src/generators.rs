//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating expense lists. Members are
//! drawn from a small fixed pool so generated expenses overlap and produce
//! interesting balances.

use core_kernel::{CurrencyCode, MemberId};
use domain_settlement::{Expense, SplitDetail, SplitMethod};
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::builders::ExpenseBuilder;

/// Members used by the generators
pub const MEMBER_POOL: [&str; 6] = ["ana", "ben", "cai", "dov", "eli", "fay"];

/// Strategy for generating a member from the pool
pub fn member_strategy() -> impl Strategy<Value = MemberId> {
    prop::sample::select(MEMBER_POOL.to_vec()).prop_map(MemberId::from)
}

/// Strategy for generating currency buckets, including the default one
pub fn currency_strategy() -> impl Strategy<Value = CurrencyCode> {
    prop_oneof![
        Just(CurrencyCode::new("USD")),
        Just(CurrencyCode::new("EUR")),
        Just(CurrencyCode::new("JPY")),
        Just(CurrencyCode::default_bucket()),
    ]
}

/// Strategy for generating split methods
pub fn split_method_strategy() -> impl Strategy<Value = SplitMethod> {
    prop_oneof![
        Just(SplitMethod::Equal),
        Just(SplitMethod::Fixed),
        Just(SplitMethod::Percentage),
    ]
}

/// Strategy for generating positive amounts in cents, from 1.00 to 10 000.00
pub fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (100i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for generating well-formed equal splits
///
/// The payer is always one of the enabled participants.
pub fn equal_expense_strategy() -> impl Strategy<Value = Expense> {
    (
        amount_strategy(),
        currency_strategy(),
        prop::sample::subsequence(MEMBER_POOL.to_vec(), 1..=MEMBER_POOL.len()),
    )
        .prop_flat_map(|(amount, currency, members)| {
            let payer = prop::sample::select(members.clone());
            (Just(amount), Just(currency), Just(members), payer)
        })
        .prop_map(|(amount, currency, members, payer)| {
            ExpenseBuilder::equal(amount, payer, members)
                .currency(currency)
                .build()
        })
}

/// Strategy for generating equal splits that divide into whole units
///
/// Every resulting net balance is an integer, so zero-sum groups of members
/// are exact.
pub fn whole_share_expense_strategy() -> impl Strategy<Value = Expense> {
    (
        1i64..500i64,
        prop::sample::subsequence(MEMBER_POOL.to_vec(), 1..=MEMBER_POOL.len()),
    )
        .prop_flat_map(|(per_head, members)| {
            let payer = prop::sample::select(members.clone());
            (Just(per_head), Just(members), payer)
        })
        .prop_map(|(per_head, members, payer)| {
            let amount = Decimal::from(per_head * members.len() as i64);
            ExpenseBuilder::equal(amount, payer, members).build()
        })
}

/// Strategy for generating arbitrary, possibly inconsistent expenses
///
/// Payers may be missing from the split, participants may be disabled, and
/// fixed or percentage shares rarely add up.
pub fn expense_strategy() -> impl Strategy<Value = Expense> {
    (
        amount_strategy(),
        currency_strategy(),
        member_strategy(),
        split_method_strategy(),
        prop::sample::subsequence(MEMBER_POOL.to_vec(), 0..=MEMBER_POOL.len()),
        prop::collection::vec((any::<bool>(), 0i64..10_000i64), MEMBER_POOL.len()),
    )
        .prop_map(|(amount, currency, payer, method, members, entries)| {
            let mut builder = ExpenseBuilder::new()
                .amount(amount)
                .currency(currency)
                .paid_by(payer)
                .method(method);

            for (member, (is_enabled, raw)) in members.into_iter().zip(entries) {
                builder = builder.detail(SplitDetail {
                    user: Some(MemberId::from(member)),
                    split_amount: Some(Decimal::new(raw, 2)),
                    is_enabled,
                });
            }

            builder.build()
        })
}

/// Strategy for generating lists of well-formed equal splits
pub fn equal_expenses_strategy(max_len: usize) -> impl Strategy<Value = Vec<Expense>> {
    prop::collection::vec(equal_expense_strategy(), 0..max_len)
}

/// Strategy for generating lists of arbitrary expenses
pub fn expenses_strategy(max_len: usize) -> impl Strategy<Value = Vec<Expense>> {
    prop::collection::vec(expense_strategy(), 0..max_len)
}
