//! Posting sets of uncleared balance records and their reversals.
//!
//! Deleting a posted record undoes exactly what it posted. The original set is
//! rebuilt from the record itself (amounts, flat type snapshot, recorded
//! charges), never recomputed from today's bills or penalties.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::types::{UnclearedBalance, UnclearedType};
use crate::billing::{Bill, BillCharge, FlatType, SettlementAccounts, replay_settlement, residual_plan};
use crate::ledger::{
    AccountSelection, FlatBalancePosting, LedgerEffect, LedgerPosting, PostingPlan,
};

/// Postings of a wallet movement (advance or refund).
///
/// Order: flat series, payment account, members advanced.
#[must_use]
pub fn plan_wallet_movement(
    record: &UnclearedBalance,
    members_advanced: &AccountSelection,
    effect: LedgerEffect,
) -> PostingPlan {
    let date = record.posting_date();
    let mut plan = PostingPlan::new();
    plan.flat(FlatBalancePosting {
        series: record.series(),
        amount: record.amount,
        effect,
        effective_date: date,
    })
    .ledger(LedgerPosting::new(&record.account(), record.amount, effect, date))
    .ledger(LedgerPosting::new(members_advanced, record.amount, effect, date));
    plan
}

/// Postings of an advance: everything adds.
#[must_use]
pub fn plan_advance(record: &UnclearedBalance, members_advanced: &AccountSelection) -> PostingPlan {
    plan_wallet_movement(record, members_advanced, LedgerEffect::Add)
}

/// Postings of a refund: everything subtracts.
#[must_use]
pub fn plan_refund(record: &UnclearedBalance, members_advanced: &AccountSelection) -> PostingPlan {
    plan_wallet_movement(record, members_advanced, LedgerEffect::Subtract)
}

/// Postings a settled record caused, in the order they were applied.
///
/// `bills` must hold the settled bills; bills without a recorded charge are
/// skipped.
#[must_use]
pub fn plan_settlement_postings(
    record: &UnclearedBalance,
    bills: &[Bill],
    members_advanced: &AccountSelection,
) -> PostingPlan {
    let accounts = settlement_accounts(record, members_advanced);
    let flat_type = record.flat_type.unwrap_or_default();
    let date = record.posting_date();

    let mut plan = PostingPlan::new();
    for (bill, charge) in paired(record, bills) {
        plan.extend(replay_settlement(
            std::slice::from_ref(bill),
            std::slice::from_ref(charge),
            flat_type,
            Decimal::ZERO,
            &accounts,
            date,
        ));
    }
    plan.extend(residual_plan(record.current_balance_portion, &accounts, date));
    plan
}

/// Postings a posted record caused, whatever its type.
#[must_use]
pub fn plan_record_postings(
    record: &UnclearedBalance,
    bills: &[Bill],
    members_advanced: &AccountSelection,
) -> PostingPlan {
    match record.record_type {
        UnclearedType::Advance => plan_advance(record, members_advanced),
        UnclearedType::Refund => plan_refund(record, members_advanced),
        UnclearedType::BillSettlement => plan_settlement_postings(record, bills, members_advanced),
    }
}

/// Postings that undo a posted record, recorded on `deleted_on`.
///
/// Settled bills are undone first, bill by bill (receivables re-added,
/// penalty reversed, payment account reversed), then the wallet residual.
/// Refund deletion adds back what the refund subtracted.
#[must_use]
pub fn plan_deletion(
    record: &UnclearedBalance,
    bills: &[Bill],
    members_advanced: &AccountSelection,
    deleted_on: NaiveDate,
) -> PostingPlan {
    match record.record_type {
        UnclearedType::Advance | UnclearedType::Refund => {
            plan_record_postings(record, bills, members_advanced).inverse_on(deleted_on)
        }
        UnclearedType::BillSettlement => {
            let accounts = settlement_accounts(record, members_advanced);
            let flat_type: FlatType = record.flat_type.unwrap_or_default();
            let date = record.posting_date();

            let mut plan = PostingPlan::new();
            for (bill, charge) in paired(record, bills) {
                let original = replay_settlement(
                    std::slice::from_ref(bill),
                    std::slice::from_ref(charge),
                    flat_type,
                    Decimal::ZERO,
                    &accounts,
                    date,
                );
                plan.extend(original.inverse_on(deleted_on));
            }
            plan.extend(
                residual_plan(record.current_balance_portion, &accounts, date).inverse_on(deleted_on),
            );
            plan
        }
    }
}

fn settlement_accounts(
    record: &UnclearedBalance,
    members_advanced: &AccountSelection,
) -> SettlementAccounts {
    SettlementAccounts {
        payment: record.account(),
        members_advanced: members_advanced.clone(),
    }
}

fn paired<'a>(
    record: &'a UnclearedBalance,
    bills: &'a [Bill],
) -> impl Iterator<Item = (&'a Bill, &'a BillCharge)> {
    record.charges.iter().filter_map(move |charge| {
        bills
            .iter()
            .find(|b| b.id == charge.bill_id)
            .map(|bill| (bill, charge))
    })
}
