//! Ledger effect resolution.
//!
//! Every account movement is stored as either an `Add` or a `Subtract`
//! against the account's running balance. Which one applies depends on the
//! account group crossed with the side of the voucher the account plays.
//!
//! - Cash-like groups (bank, cash): balance grows on the receiving side.
//! - Every other group: balance grows on the paying side.

use std::collections::BTreeSet;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use society_shared::LedgerSettings;

/// Direction applied to a running balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LedgerEffect {
    /// `new = old + amount`.
    Add,
    /// `new = old - amount`.
    Subtract,
}

impl LedgerEffect {
    /// Returns the effect that undoes this one.
    #[must_use]
    pub const fn inverse(self) -> Self {
        match self {
            Self::Add => Self::Subtract,
            Self::Subtract => Self::Add,
        }
    }

    /// Applies the effect to a balance.
    #[must_use]
    pub fn apply(self, balance: Decimal, amount: Decimal) -> Decimal {
        balance + self.signed(amount)
    }

    /// Returns `amount` with the sign this effect gives it.
    #[must_use]
    pub fn signed(self, amount: Decimal) -> Decimal {
        match self {
            Self::Add => amount,
            Self::Subtract => -amount,
        }
    }

    /// Returns the string representation of the effect.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "Add",
            Self::Subtract => "Subtract",
        }
    }
}

impl fmt::Display for LedgerEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Side of a voucher an account plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegSide {
    /// The `paid_from` account.
    From,
    /// The `paid_to` account (the receiving, credit side).
    To,
}

impl LegSide {
    /// Returns true for the receiving side.
    #[must_use]
    pub const fn is_credit_side(self) -> bool {
        matches!(self, Self::To)
    }
}

/// Classification of one voucher leg, computed once per leg by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegClassification {
    /// Account group of the leg.
    pub group: String,
    /// Side the account plays.
    pub side: LegSide,
    /// Whether the group is cash-like.
    pub is_cash_like: bool,
    /// Whether the leg is the credit (receiving) side.
    pub is_credit_side: bool,
}

/// Maps (account group, credit side) to a ledger effect.
#[derive(Debug, Clone)]
pub struct EffectResolver {
    cash_like: BTreeSet<String>,
}

impl EffectResolver {
    /// Groups treated as cash-like when nothing is configured.
    pub const DEFAULT_CASH_LIKE_GROUPS: [&'static str; 2] = ["Bank Accounts", "Cash in Hand"];

    /// Creates a resolver for the given cash-like groups.
    ///
    /// Group names are compared case-insensitively with surrounding
    /// whitespace ignored.
    #[must_use]
    pub fn new<I, S>(cash_like_groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            cash_like: cash_like_groups
                .into_iter()
                .map(|g| normalize(g.as_ref()))
                .filter(|g| !g.is_empty())
                .collect(),
        }
    }

    /// Creates a resolver from ledger settings.
    #[must_use]
    pub fn from_settings(settings: &LedgerSettings) -> Self {
        Self::new(&settings.cash_like_groups)
    }

    /// Returns true if the group behaves like cash.
    #[must_use]
    pub fn is_cash_like(&self, group: &str) -> bool {
        self.cash_like.contains(&normalize(group))
    }

    /// Classifies one leg of a voucher.
    #[must_use]
    pub fn classify(&self, group: &str, side: LegSide) -> LegClassification {
        LegClassification {
            group: group.to_string(),
            side,
            is_cash_like: self.is_cash_like(group),
            is_credit_side: side.is_credit_side(),
        }
    }

    /// Resolves the effect for an account group.
    ///
    /// Cash-like: credit side adds, debit side subtracts.
    /// Other groups: the polarity is inverted.
    #[must_use]
    pub fn resolve(&self, group: &str, is_credit_side: bool) -> LedgerEffect {
        if self.is_cash_like(group) == is_credit_side {
            LedgerEffect::Add
        } else {
            LedgerEffect::Subtract
        }
    }

    /// Resolves the effect for a classified leg.
    #[must_use]
    pub fn resolve_leg(&self, leg: &LegClassification) -> LedgerEffect {
        self.resolve(&leg.group, leg.is_credit_side)
    }
}

impl Default for EffectResolver {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CASH_LIKE_GROUPS)
    }
}

fn normalize(group: &str) -> String {
    group.trim().to_lowercase()
}
