//! Bill settlement planning.
//!
//! A settlement pays a set of bills from one payment. For every bill:
//! - each item's flat-type amount leaves its receivable ledger (Subtract)
//! - the penalty, if any, is credited to the penalty ledger (Add)
//! - principal plus penalty lands in the payment account (Add)
//!
//! Whatever the payment does not cover, or exceeds, is the residual. It moves
//! the flat wallet, the members advanced ledger, and the payment account
//! together in the same direction.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use society_shared::types::BillId;

use super::bill::{Bill, FlatType};
use super::error::BillingError;
use super::penalty::bill_penalty;
use crate::ledger::{
    AccountSelection, FlatBalancePosting, FlatSeries, LedgerEffect, LedgerPosting, PostingPlan,
};

/// Accounts a settlement posts to besides the bill's own ledgers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementAccounts {
    /// Account the money was received into.
    pub payment: AccountSelection,
    /// Liability account tracking member advances.
    pub members_advanced: AccountSelection,
}

/// What one bill was settled for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillCharge {
    /// Settled bill.
    pub bill_id: BillId,
    /// Sum of item amounts for the flat type.
    pub principal: Decimal,
    /// Penalty charged at settlement.
    pub penalty: Decimal,
}

impl BillCharge {
    /// Principal plus penalty.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.principal.saturating_add(self.penalty)
    }
}

/// A computed settlement, ready to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    /// Postings in execution order.
    pub plan: PostingPlan,
    /// Per-bill charges, in bill order.
    pub charges: Vec<BillCharge>,
    /// Signed wallet movement: positive credits the wallet, negative draws
    /// from it.
    pub residual: Decimal,
}

impl Settlement {
    /// Total of every bill charge.
    #[must_use]
    pub fn total_due(&self) -> Decimal {
        sum_charges(&self.charges)
    }
}

fn sum_charges(charges: &[BillCharge]) -> Decimal {
    charges
        .iter()
        .map(BillCharge::total)
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Plans the settlement of `bills` by `amount_received` on `date`.
///
/// Penalties are computed as of `date`. A shortfall is drawn from the
/// current wallet when it suffices.
///
/// # Errors
///
/// - `AlreadyPaid` if a bill is no longer settleable
/// - `DuplicateBill` if a bill appears twice
/// - `InsufficientBalance` if the shortfall exceeds `wallet_balance`
pub fn plan_settlement(
    bills: &[Bill],
    flat_type: FlatType,
    amount_received: Decimal,
    wallet_balance: Decimal,
    accounts: &SettlementAccounts,
    date: NaiveDate,
) -> Result<Settlement, BillingError> {
    let mut seen = BTreeSet::new();
    for bill in bills {
        if !seen.insert(bill.id.as_str()) {
            return Err(BillingError::DuplicateBill(bill.id.to_string()));
        }
        if !bill.status.is_settleable() {
            return Err(BillingError::AlreadyPaid(bill.id.to_string()));
        }
    }

    let charges: Vec<BillCharge> = bills
        .iter()
        .map(|bill| BillCharge {
            bill_id: bill.id.clone(),
            principal: bill.receivable_total(flat_type),
            penalty: bill_penalty(bill, date),
        })
        .collect();

    let total_due = sum_charges(&charges);
    let residual = amount_received - total_due;
    if residual < Decimal::ZERO && wallet_balance < -residual {
        return Err(BillingError::InsufficientBalance {
            required: -residual,
            available: wallet_balance,
        });
    }

    let plan = build_plan(bills, &charges, flat_type, residual, accounts, date);
    Ok(Settlement {
        plan,
        charges,
        residual,
    })
}

/// Rebuilds the postings of a settlement that already happened, from the
/// charges and residual it recorded.
///
/// Used to reverse a settlement exactly, whatever penalties or wallet
/// balance would be computed today.
#[must_use]
pub fn replay_settlement(
    bills: &[Bill],
    charges: &[BillCharge],
    flat_type: FlatType,
    residual: Decimal,
    accounts: &SettlementAccounts,
    date: NaiveDate,
) -> PostingPlan {
    build_plan(bills, charges, flat_type, residual, accounts, date)
}

fn build_plan(
    bills: &[Bill],
    charges: &[BillCharge],
    flat_type: FlatType,
    residual: Decimal,
    accounts: &SettlementAccounts,
    date: NaiveDate,
) -> PostingPlan {
    let mut plan = PostingPlan::new();

    for (bill, charge) in bills.iter().zip(charges) {
        for item in &bill.items {
            let amount = item.amount_for(flat_type);
            if amount > Decimal::ZERO {
                plan.ledger(LedgerPosting::new(
                    &item.account(),
                    amount,
                    LedgerEffect::Subtract,
                    date,
                ));
            }
        }
        if charge.penalty > Decimal::ZERO
            && let Some(config) = &bill.penalty
        {
            plan.ledger(LedgerPosting::new(
                &config.account(),
                charge.penalty,
                LedgerEffect::Add,
                date,
            ));
        }
        if charge.total() > Decimal::ZERO {
            plan.ledger(LedgerPosting::new(
                &accounts.payment,
                charge.total(),
                LedgerEffect::Add,
                date,
            ));
        }
    }

    plan.extend(residual_plan(residual, accounts, date));
    plan
}

/// Postings moving a signed residual through the wallet, members advanced,
/// and the payment account.
#[must_use]
pub fn residual_plan(residual: Decimal, accounts: &SettlementAccounts, date: NaiveDate) -> PostingPlan {
    let mut plan = PostingPlan::new();
    if residual.is_zero() {
        return plan;
    }

    let effect = if residual > Decimal::ZERO {
        LedgerEffect::Add
    } else {
        LedgerEffect::Subtract
    };
    let amount = residual.abs();

    plan.flat(FlatBalancePosting {
        series: FlatSeries::Current,
        amount,
        effect,
        effective_date: date,
    })
    .ledger(LedgerPosting::new(&accounts.members_advanced, amount, effect, date))
    .ledger(LedgerPosting::new(&accounts.payment, amount, effect, date));
    plan
}
