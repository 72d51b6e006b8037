//! Dated running balances.
//!
//! Both ledger accounts and flat wallets keep their balance as a series of
//! dated entries, one per effective date. A posting reads the latest entry at
//! or before its date, applies the effect, and writes the result under its own
//! date. Past entries on other dates are never touched.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::effect::LedgerEffect;

/// One dated point in a balance series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceEntry {
    /// Effective date of the entry.
    pub date: NaiveDate,
    /// Balance after every posting up to and including this date.
    pub cumulative_balance: Decimal,
}

/// Result of applying one posting to a series.
///
/// - `previous_balance`: latest cumulative value at or before the date
/// - `current_balance`: value written for the date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningBalance {
    /// Date the posting is recorded under.
    pub effective_date: NaiveDate,
    /// Balance before this posting.
    pub previous_balance: Decimal,
    /// Balance after this posting.
    pub current_balance: Decimal,
}

impl RunningBalance {
    /// Applies a posting on top of the latest prior entry.
    ///
    /// A missing prior entry opens the series at zero.
    #[must_use]
    pub fn post(
        previous: Option<&BalanceEntry>,
        amount: Decimal,
        effect: LedgerEffect,
        effective_date: NaiveDate,
    ) -> Self {
        let previous_balance = previous.map_or(Decimal::ZERO, |e| e.cumulative_balance);
        Self {
            effective_date,
            previous_balance,
            current_balance: effect.apply(previous_balance, amount),
        }
    }

    /// Returns the entry to persist for this posting.
    #[must_use]
    pub fn into_entry(self) -> BalanceEntry {
        BalanceEntry {
            date: self.effective_date,
            cumulative_balance: self.current_balance,
        }
    }
}

/// Finds the latest entry dated on or before `date`.
///
/// Entries may be in any order.
#[must_use]
pub fn latest_at_or_before(entries: &[BalanceEntry], date: NaiveDate) -> Option<&BalanceEntry> {
    entries
        .iter()
        .filter(|e| e.date <= date)
        .max_by_key(|e| e.date)
}

/// Returns the balance as of `date`, zero if no entry exists yet.
#[must_use]
pub fn balance_as_of(entries: &[BalanceEntry], date: NaiveDate) -> Decimal {
    latest_at_or_before(entries, date).map_or(Decimal::ZERO, |e| e.cumulative_balance)
}

/// Applies a posting to an in-memory series, replacing any entry on the same
/// date.
///
/// Returns the new cumulative balance for `date`.
pub fn post_to_series(
    entries: &mut Vec<BalanceEntry>,
    amount: Decimal,
    effect: LedgerEffect,
    date: NaiveDate,
) -> Decimal {
    let running = RunningBalance::post(latest_at_or_before(entries, date), amount, effect, date);
    let balance = running.current_balance;
    entries.retain(|e| e.date != date);
    entries.push(running.into_entry());
    entries.sort_by_key(|e| e.date);
    balance
}

/// The two independent balance series every flat carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlatSeries {
    /// General advance wallet, used by bill settlement.
    #[default]
    Current,
    /// Ring-fenced deposit, never used by bill settlement.
    Deposit,
}

impl FlatSeries {
    /// Collection name of the series under the flat document.
    #[must_use]
    pub const fn collection(self) -> &'static str {
        match self {
            Self::Current => "currentBalance",
            Self::Deposit => "deposit",
        }
    }

    /// Returns the series targeted by a record.
    #[must_use]
    pub const fn for_deposit(is_deposit: bool) -> Self {
        if is_deposit { Self::Deposit } else { Self::Current }
    }
}

impl std::str::FromStr for FlatSeries {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "current" | "currentbalance" => Ok(Self::Current),
            "deposit" => Ok(Self::Deposit),
            other => Err(format!("unknown balance series: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..10_000_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    #[test]
    fn test_first_posting_opens_at_zero() {
        let rb = RunningBalance::post(None, dec!(200), LedgerEffect::Add, date(2024, 2, 10));
        assert_eq!(rb.previous_balance, Decimal::ZERO);
        assert_eq!(rb.current_balance, dec!(200));
    }

    #[test]
    fn test_subtract_can_go_negative() {
        let rb = RunningBalance::post(None, dec!(75.25), LedgerEffect::Subtract, date(2024, 1, 1));
        assert_eq!(rb.current_balance, dec!(-75.25));
    }

    #[test]
    fn test_same_day_posting_supersedes_entry() {
        let mut series = Vec::new();
        let d = date(2024, 3, 1);
        post_to_series(&mut series, dec!(100), LedgerEffect::Add, d);
        let balance = post_to_series(&mut series, dec!(40), LedgerEffect::Add, d);

        assert_eq!(balance, dec!(140));
        assert_eq!(series.len(), 1);
        assert_eq!(balance_as_of(&series, d), dec!(140));
    }

    #[test]
    fn test_backdated_posting_leaves_later_entries() {
        let mut series = Vec::new();
        post_to_series(&mut series, dec!(100), LedgerEffect::Add, date(2024, 3, 10));
        post_to_series(&mut series, dec!(30), LedgerEffect::Add, date(2024, 3, 1));

        assert_eq!(balance_as_of(&series, date(2024, 3, 5)), dec!(30));
        assert_eq!(balance_as_of(&series, date(2024, 3, 10)), dec!(100));
    }

    #[test]
    fn test_balance_before_first_entry_is_zero() {
        let series = vec![BalanceEntry {
            date: date(2024, 5, 1),
            cumulative_balance: dec!(10),
        }];
        assert_eq!(balance_as_of(&series, date(2024, 4, 30)), Decimal::ZERO);
    }

    #[test]
    fn test_flat_series_names() {
        assert_eq!(FlatSeries::Current.collection(), "currentBalance");
        assert_eq!(FlatSeries::for_deposit(true), FlatSeries::Deposit);
        assert_eq!("deposit".parse::<FlatSeries>().unwrap(), FlatSeries::Deposit);
        assert!("wallet".parse::<FlatSeries>().is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Posting an amount and then its inverse on the same date restores
        /// the balance exactly.
        #[test]
        fn prop_post_then_inverse_restores(
            opening in amount_strategy(),
            amount in amount_strategy(),
            add in any::<bool>(),
        ) {
            let d = date(2024, 6, 15);
            let mut series = vec![BalanceEntry { date: date(2024, 6, 1), cumulative_balance: opening }];
            let effect = if add { LedgerEffect::Add } else { LedgerEffect::Subtract };

            post_to_series(&mut series, amount, effect, d);
            let restored = post_to_series(&mut series, amount, effect.inverse(), d);

            prop_assert_eq!(restored, opening);
        }

        /// A query anywhere in [D2, D3) returns the value written at D2.
        #[test]
        fn prop_as_of_returns_latest_prior_entry(
            a1 in amount_strategy(),
            a2 in amount_strategy(),
            a3 in amount_strategy(),
            gap1 in 1i64..30,
            gap2 in 2i64..30,
            offset in 0i64..30,
        ) {
            let d1 = date(2024, 1, 1);
            let d2 = d1 + chrono::Duration::days(gap1);
            let d3 = d2 + chrono::Duration::days(gap2);
            let query = d2 + chrono::Duration::days(offset % gap2);

            let mut series = Vec::new();
            post_to_series(&mut series, a1, LedgerEffect::Add, d1);
            let at_d2 = post_to_series(&mut series, a2, LedgerEffect::Add, d2);
            post_to_series(&mut series, a3, LedgerEffect::Subtract, d3);

            prop_assert!(query >= d2 && query < d3);
            prop_assert_eq!(balance_as_of(&series, query), at_d2);
        }

        /// Same-date postings in sequence accumulate into one entry.
        #[test]
        fn prop_same_day_postings_accumulate(
            amounts in prop::collection::vec(amount_strategy(), 1..10),
        ) {
            let d = date(2024, 8, 20);
            let mut series = Vec::new();
            for amount in &amounts {
                post_to_series(&mut series, *amount, LedgerEffect::Add, d);
            }
            let total: Decimal = amounts.iter().copied().sum();
            prop_assert_eq!(series.len(), 1);
            prop_assert_eq!(balance_as_of(&series, d), total);
        }
    }
}
