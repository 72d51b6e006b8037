//! Posting plans.
//!
//! Business operations are turned into an ordered list of postings before
//! anything is written. The store layer executes the list strictly in order
//! and undoes the already-applied prefix if a later posting fails.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::balance::FlatSeries;
use super::effect::{EffectResolver, LedgerEffect, LegSide};
use super::types::{AccountSelection, Voucher};

/// One movement against a ledger account balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerPosting {
    /// Account group.
    pub group: String,
    /// Account name.
    pub account: String,
    /// Positive amount.
    pub amount: Decimal,
    /// Direction.
    pub effect: LedgerEffect,
    /// Date the posting is recorded under.
    pub effective_date: NaiveDate,
}

impl LedgerPosting {
    /// Creates a posting for an account selection.
    #[must_use]
    pub fn new(
        account: &AccountSelection,
        amount: Decimal,
        effect: LedgerEffect,
        effective_date: NaiveDate,
    ) -> Self {
        Self {
            group: account.group.clone(),
            account: account.name.clone(),
            amount,
            effect,
            effective_date,
        }
    }

    /// Returns the posting that undoes this one on the same date.
    #[must_use]
    pub fn inverse(&self) -> Self {
        Self {
            effect: self.effect.inverse(),
            ..self.clone()
        }
    }

    /// Returns the posting that undoes this one, recorded on `date`.
    #[must_use]
    pub fn inverse_on(&self, date: NaiveDate) -> Self {
        Self {
            effective_date: date,
            ..self.inverse()
        }
    }

    /// Signed change to the account balance.
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        self.effect.signed(self.amount)
    }
}

/// One movement against a flat balance series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatBalancePosting {
    /// Target series.
    pub series: FlatSeries,
    /// Positive amount.
    pub amount: Decimal,
    /// Direction.
    pub effect: LedgerEffect,
    /// Date the entry is recorded under.
    pub effective_date: NaiveDate,
}

impl FlatBalancePosting {
    /// Returns the posting that undoes this one, recorded on `date`.
    #[must_use]
    pub fn inverse_on(&self, date: NaiveDate) -> Self {
        Self {
            effect: self.effect.inverse(),
            effective_date: date,
            ..self.clone()
        }
    }

    /// Signed change to the series.
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        self.effect.signed(self.amount)
    }
}

/// A single step of a posting plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum Posting {
    /// Ledger account posting.
    Ledger(LedgerPosting),
    /// Flat series posting.
    Flat(FlatBalancePosting),
}

impl Posting {
    /// Returns the same step recorded on `date`.
    #[must_use]
    pub fn booked_on(&self, date: NaiveDate) -> Self {
        match self {
            Self::Ledger(p) => Self::Ledger(LedgerPosting {
                effective_date: date,
                ..p.clone()
            }),
            Self::Flat(p) => Self::Flat(FlatBalancePosting {
                effective_date: date,
                ..p.clone()
            }),
        }
    }

    /// Returns the inverse step recorded on `date`.
    #[must_use]
    pub fn inverse_on(&self, date: NaiveDate) -> Self {
        match self {
            Self::Ledger(p) => Self::Ledger(p.inverse_on(date)),
            Self::Flat(p) => Self::Flat(p.inverse_on(date)),
        }
    }
}

/// Ordered postings for one business operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingPlan {
    /// Steps in execution order.
    pub steps: Vec<Posting>,
}

impl PostingPlan {
    /// Creates an empty plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a ledger posting.
    pub fn ledger(&mut self, posting: LedgerPosting) -> &mut Self {
        self.steps.push(Posting::Ledger(posting));
        self
    }

    /// Appends a flat series posting.
    pub fn flat(&mut self, posting: FlatBalancePosting) -> &mut Self {
        self.steps.push(Posting::Flat(posting));
        self
    }

    /// Appends every step of another plan.
    pub fn extend(&mut self, other: Self) -> &mut Self {
        self.steps.extend(other.steps);
        self
    }

    /// Returns the same steps, every one recorded on `date`.
    #[must_use]
    pub fn booked_on(&self, date: NaiveDate) -> Self {
        Self {
            steps: self.steps.iter().map(|s| s.booked_on(date)).collect(),
        }
    }

    /// Returns the plan undoing this one: steps reversed, effects inverted,
    /// every step recorded on `date`.
    #[must_use]
    pub fn inverse_on(&self, date: NaiveDate) -> Self {
        Self {
            steps: self.steps.iter().rev().map(|s| s.inverse_on(date)).collect(),
        }
    }

    /// Number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true if the plan has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Ledger postings in order.
    pub fn ledger_postings(&self) -> impl Iterator<Item = &LedgerPosting> {
        self.steps.iter().filter_map(|s| match s {
            Posting::Ledger(p) => Some(p),
            Posting::Flat(_) => None,
        })
    }

    /// Flat postings in order.
    pub fn flat_postings(&self) -> impl Iterator<Item = &FlatBalancePosting> {
        self.steps.iter().filter_map(|s| match s {
            Posting::Flat(p) => Some(p),
            Posting::Ledger(_) => None,
        })
    }

    /// Net signed change the plan makes to one ledger account.
    #[must_use]
    pub fn net_ledger_change(&self, group: &str, account: &str) -> Decimal {
        self.ledger_postings()
            .filter(|p| p.group == group && p.account == account)
            .map(LedgerPosting::signed_amount)
            .sum()
    }

    /// Net signed change the plan makes to one flat series.
    #[must_use]
    pub fn net_flat_change(&self, series: FlatSeries) -> Decimal {
        self.flat_postings()
            .filter(|p| p.series == series)
            .map(FlatBalancePosting::signed_amount)
            .sum()
    }
}

/// Builds the two postings a voucher causes: from leg first, then to leg.
#[must_use]
pub fn plan_voucher_postings(resolver: &EffectResolver, voucher: &Voucher) -> PostingPlan {
    let from = voucher.from_account();
    let to = voucher.to_account();
    let from_leg = resolver.classify(&from.group, LegSide::From);
    let to_leg = resolver.classify(&to.group, LegSide::To);

    let mut plan = PostingPlan::new();
    plan.ledger(LedgerPosting::new(
        &from,
        voucher.amount,
        resolver.resolve_leg(&from_leg),
        voucher.transaction_date,
    ))
    .ledger(LedgerPosting::new(
        &to,
        voucher.amount,
        resolver.resolve_leg(&to_leg),
        voucher.transaction_date,
    ));
    plan
}

/// Date an edit is booked on: the edit date, pushed forward to the original
/// or edited transaction date when either is later.
///
/// Balance series are append-only, so booking an edit earlier than postings
/// that followed the original would leave those later entries carrying it.
#[must_use]
pub fn edit_booking_date(original: &Voucher, edited: &Voucher, edited_on: NaiveDate) -> NaiveDate {
    edited_on
        .max(original.transaction_date)
        .max(edited.transaction_date)
}

/// Builds the four postings of an edit: revert-from, revert-to, apply-from,
/// apply-to, all booked on [`edit_booking_date`].
///
/// The reversal is recomputed from the original voucher's own groups.
#[must_use]
pub fn plan_voucher_edit(
    resolver: &EffectResolver,
    original: &Voucher,
    edited: &Voucher,
    edited_on: NaiveDate,
) -> PostingPlan {
    let date = edit_booking_date(original, edited, edited_on);
    let mut plan = plan_voucher_reversal(resolver, original, date);
    plan.extend(plan_voucher_postings(resolver, edited).booked_on(date));
    plan
}

/// Builds the two postings undoing a voucher: revert-from, then revert-to,
/// both on `on` but never earlier than the voucher's own date.
#[must_use]
pub fn plan_voucher_reversal(
    resolver: &EffectResolver,
    voucher: &Voucher,
    on: NaiveDate,
) -> PostingPlan {
    let date = on.max(voucher.transaction_date);
    let mut plan = PostingPlan::new();
    for posting in plan_voucher_postings(resolver, voucher).ledger_postings() {
        plan.ledger(posting.inverse_on(date));
    }
    plan
}
