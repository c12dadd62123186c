//! Pre-built Test Fixtures
//!
//! Provides ready-to-use members, currencies, and expense scenarios. Fixed
//! fixtures are predictable for unit tests; `random_member` and friends use
//! `fake` when a test only needs distinct, realistic identifiers.

use core_kernel::{CurrencyCode, MemberId};
use domain_settlement::{Expense, SplitDetail, SplitMethod};
use fake::faker::name::en::FirstName;
use fake::Fake;
use rust_decimal_macros::dec;

/// Fixture for group members
pub struct MemberFixtures;

impl MemberFixtures {
    pub fn alice() -> MemberId {
        MemberId::from("alice")
    }

    pub fn bob() -> MemberId {
        MemberId::from("bob")
    }

    pub fn carol() -> MemberId {
        MemberId::from("carol")
    }

    pub fn dave() -> MemberId {
        MemberId::from("dave")
    }

    /// Member that never appears in any fixture expense
    pub fn outsider() -> MemberId {
        MemberId::from("outsider")
    }

    /// A random first name with a numeric suffix, so repeated calls differ
    pub fn random_member() -> MemberId {
        let name: String = FirstName().fake();
        let suffix: u32 = (1000..9999).fake();
        MemberId::new(format!("{}-{}", name.to_lowercase(), suffix))
    }

    /// `count` distinct random members
    pub fn random_group(count: usize) -> Vec<MemberId> {
        let mut members: Vec<MemberId> = Vec::with_capacity(count);
        while members.len() < count {
            let member = Self::random_member();
            if !members.contains(&member) {
                members.push(member);
            }
        }
        members
    }
}

/// Fixture for currency codes
pub struct CurrencyFixtures;

impl CurrencyFixtures {
    pub fn usd() -> CurrencyCode {
        CurrencyCode::new("USD")
    }

    pub fn eur() -> CurrencyCode {
        CurrencyCode::new("EUR")
    }

    /// Zero decimal places
    pub fn jpy() -> CurrencyCode {
        CurrencyCode::new("JPY")
    }

    /// Three decimal places
    pub fn kwd() -> CurrencyCode {
        CurrencyCode::new("KWD")
    }
}

/// Fixture for whole expense scenarios
pub struct ExpenseFixtures;

impl ExpenseFixtures {
    /// 90 USD paid by alice, split equally among alice, bob, and carol
    pub fn dinner() -> Expense {
        Expense::new(dec!(90), MemberFixtures::alice(), SplitMethod::Equal)
            .with_currency(CurrencyFixtures::usd())
            .with_description("Dinner")
            .with_splits([
                SplitDetail::enabled(MemberFixtures::alice()),
                SplitDetail::enabled(MemberFixtures::bob()),
                SplitDetail::enabled(MemberFixtures::carol()),
            ])
    }

    /// 100 USD paid by alice, split equally with bob
    pub fn taxi() -> Expense {
        Expense::new(dec!(100), MemberFixtures::alice(), SplitMethod::Equal)
            .with_currency(CurrencyFixtures::usd())
            .with_description("Taxi")
            .with_splits([
                SplitDetail::enabled(MemberFixtures::alice()),
                SplitDetail::enabled(MemberFixtures::bob()),
            ])
    }

    /// 300 EUR paid by bob: alice 100, bob 50, carol 150
    pub fn hotel_fixed() -> Expense {
        Expense::new(dec!(300), MemberFixtures::bob(), SplitMethod::Fixed)
            .with_currency(CurrencyFixtures::eur())
            .with_description("Hotel")
            .with_splits([
                SplitDetail::with_amount(MemberFixtures::alice(), dec!(100)),
                SplitDetail::with_amount(MemberFixtures::bob(), dec!(50)),
                SplitDetail::with_amount(MemberFixtures::carol(), dec!(150)),
            ])
    }

    /// 200 USD paid by carol: alice 25%, carol 25%, dave 50%
    pub fn groceries_percentage() -> Expense {
        Expense::new(dec!(200), MemberFixtures::carol(), SplitMethod::Percentage)
            .with_currency(CurrencyFixtures::usd())
            .with_description("Groceries")
            .with_splits([
                SplitDetail::with_amount(MemberFixtures::alice(), dec!(25)),
                SplitDetail::with_amount(MemberFixtures::carol(), dec!(25)),
                SplitDetail::with_amount(MemberFixtures::dave(), dec!(50)),
            ])
    }

    /// Paid by someone missing from the split details
    pub fn orphaned_payer() -> Expense {
        Expense::new(dec!(500), MemberFixtures::outsider(), SplitMethod::Equal)
            .with_currency(CurrencyFixtures::usd())
            .with_splits([
                SplitDetail::enabled(MemberFixtures::alice()),
                SplitDetail::enabled(MemberFixtures::bob()),
            ])
    }

    /// A trip mixing every split method and two currencies
    pub fn trip() -> Vec<Expense> {
        vec![
            Self::dinner(),
            Self::hotel_fixed(),
            Self::groceries_percentage(),
            Self::taxi(),
        ]
    }
}
