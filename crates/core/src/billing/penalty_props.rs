//! Property-based tests for the penalty calculator.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::bill::{PenaltyConfig, PenaltyOccurrence, PenaltyType};
use super::penalty::{calculate_penalty, penalty_unit_amount, penalty_units};

fn due_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|paise| Decimal::new(paise, 2))
}

fn config_strategy() -> impl Strategy<Value = PenaltyConfig> {
    (
        any::<bool>(),
        prop_oneof![Just(PenaltyOccurrence::OneTime), Just(PenaltyOccurrence::Recurring)],
        prop::option::of(0u32..90),
        prop_oneof![Just(PenaltyType::Fixed), Just(PenaltyType::Percentage)],
        (0i64..10_000i64).prop_map(|n| Decimal::new(n, 2)),
    )
        .prop_map(|(enabled, occurrence, frequency_days, penalty_type, value)| PenaltyConfig {
            enabled,
            occurrence,
            frequency_days,
            penalty_type,
            value,
            ledger_account: "Penalty Income".into(),
            ledger_group: "Indirect Income".into(),
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// A one-time fixed penalty of 50 is zero on the due date and 50 on
    /// every later day.
    #[test]
    fn prop_one_time_fixed_fifty(days_late in 1i64..2_000) {
        let cfg = PenaltyConfig {
            enabled: true,
            occurrence: PenaltyOccurrence::OneTime,
            frequency_days: None,
            penalty_type: PenaltyType::Fixed,
            value: Decimal::from(50),
            ledger_account: "Penalty Income".into(),
            ledger_group: "Indirect Income".into(),
        };
        let bill_amount = Decimal::from(1000);

        prop_assert_eq!(calculate_penalty(due_date(), due_date(), bill_amount, &cfg), Decimal::ZERO);
        prop_assert_eq!(
            calculate_penalty(due_date(), due_date() + Duration::days(days_late), bill_amount, &cfg),
            Decimal::from(50)
        );
    }

    /// Penalty is never negative and never decreases as time passes.
    #[test]
    fn prop_penalty_monotonic(
        cfg in config_strategy(),
        amount in amount_strategy(),
        offset in -30i64..400,
        step in 0i64..120,
    ) {
        let earlier = due_date() + Duration::days(offset);
        let later = earlier + Duration::days(step);

        let p1 = calculate_penalty(due_date(), earlier, amount, &cfg);
        let p2 = calculate_penalty(due_date(), later, amount, &cfg);

        prop_assert!(p1 >= Decimal::ZERO);
        prop_assert!(p2 >= p1);
    }

    /// Penalty is zero whenever the bill is not overdue or the config is off.
    #[test]
    fn prop_zero_when_not_overdue_or_disabled(
        cfg in config_strategy(),
        amount in amount_strategy(),
        offset in -400i64..400,
    ) {
        let today = due_date() + Duration::days(offset);
        if offset <= 0 || !cfg.enabled {
            prop_assert_eq!(calculate_penalty(due_date(), today, amount, &cfg), Decimal::ZERO);
        }
    }

    /// The total is always a whole number of units.
    #[test]
    fn prop_total_is_units_times_unit(
        cfg in config_strategy(),
        amount in amount_strategy(),
        offset in 1i64..400,
    ) {
        let today = due_date() + Duration::days(offset);
        let units = penalty_units(due_date(), today, &cfg);
        let expected = penalty_unit_amount(amount, &cfg) * Decimal::from(units);
        prop_assert_eq!(calculate_penalty(due_date(), today, amount, &cfg), expected);
    }
}
