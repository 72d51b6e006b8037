//! Amount parsing and rounding.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! All amounts are `rust_decimal::Decimal` with two decimal places.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;
use thiserror::Error;

/// Number of decimal places kept for rupee amounts.
pub const MONEY_SCALE: u32 = 2;

/// Errors raised while reading an amount entered by a user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    /// No amount was provided.
    #[error("amount is required")]
    Missing,
    /// The amount is not a number.
    #[error("amount is not a valid number: {0}")]
    Invalid(String),
    /// The amount is zero or negative.
    #[error("amount must be greater than zero")]
    NotPositive,
}

/// Parses a user-entered amount, requiring a strictly positive value.
///
/// Thousands separators are tolerated (`"1,000.50"`).
pub fn parse_amount(raw: &str) -> Result<Decimal, AmountError> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return Err(AmountError::Missing);
    }

    let amount = Decimal::from_str(&cleaned).map_err(|_| AmountError::Invalid(raw.to_string()))?;
    let amount = round_money(amount);
    if amount <= Decimal::ZERO {
        return Err(AmountError::NotPositive);
    }

    Ok(amount)
}

/// Rounds to paise, half away from zero.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}
