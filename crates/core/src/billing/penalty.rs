//! Late payment penalty calculation.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use society_shared::types::round_money;

use super::bill::{Bill, PenaltyConfig, PenaltyOccurrence, PenaltyType};

/// Number of penalty units due on `today`.
///
/// - not overdue (today ≤ due date) → 0
/// - one-time → 1
/// - recurring every f days → one unit per started period:
///   days 1..=f → 1, f+1..=2f → 2, and so on
///
/// A recurring config without a positive frequency charges once.
#[must_use]
pub fn penalty_units(due_date: NaiveDate, today: NaiveDate, config: &PenaltyConfig) -> u64 {
    if !config.enabled || today <= due_date {
        return 0;
    }

    let days_overdue = u64::try_from((today - due_date).num_days()).unwrap_or(0);
    match (config.occurrence, config.frequency_days) {
        (PenaltyOccurrence::Recurring, Some(freq)) if freq > 0 => {
            days_overdue.div_ceil(u64::from(freq))
        }
        _ => 1,
    }
}

/// Amount of a single penalty unit.
#[must_use]
pub fn penalty_unit_amount(bill_amount: Decimal, config: &PenaltyConfig) -> Decimal {
    match config.penalty_type {
        PenaltyType::Fixed => config.value,
        PenaltyType::Percentage => {
            round_money(bill_amount.saturating_mul(config.value) / Decimal::ONE_HUNDRED)
        }
    }
}

/// Computes the penalty owed on a bill amount as of `today`.
///
/// Units are additive: each elapsed period adds one more unit, nothing
/// compounds on previous penalties. Never negative; saturates at
/// `Decimal::MAX` instead of overflowing.
#[must_use]
pub fn calculate_penalty(
    due_date: NaiveDate,
    today: NaiveDate,
    bill_amount: Decimal,
    config: &PenaltyConfig,
) -> Decimal {
    let units = penalty_units(due_date, today, config);
    if units == 0 {
        return Decimal::ZERO;
    }
    let total = penalty_unit_amount(bill_amount, config).saturating_mul(Decimal::from(units));
    round_money(total).max(Decimal::ZERO)
}

/// Penalty owed on a bill as of `today`, zero when it has no penalty config.
#[must_use]
pub fn bill_penalty(bill: &Bill, today: NaiveDate) -> Decimal {
    bill.penalty
        .as_ref()
        .map_or(Decimal::ZERO, |config| {
            calculate_penalty(bill.due_date, today, bill.amount, config)
        })
}
