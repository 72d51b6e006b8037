//! Property-based tests for uncleared balance reversals.

use chrono::{Duration, NaiveDate, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use society_shared::types::{BillId, FlatId, OrganizationId, TransactionId};

use crate::billing::{
    Bill, BillItem, FlatType, NewBill, SettlementAccounts, plan_settlement,
};
use crate::ledger::{AccountSelection, FlatSeries};
use crate::uncleared::reversal::{plan_deletion, plan_record_postings};
use crate::uncleared::types::{
    PaymentMode, RecordOrigin, UnclearedBalance, UnclearedStatus, UnclearedType,
};

fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn arb_flat_type() -> impl Strategy<Value = FlatType> {
    prop_oneof![Just(FlatType::Closed), Just(FlatType::Rent), Just(FlatType::Owner)]
}

fn members_advanced() -> AccountSelection {
    AccountSelection::new("Members Advanced", "Current Liabilities")
}

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 2, 10).unwrap()
}

fn record(record_type: UnclearedType, amount: Decimal, is_deposit: bool) -> UnclearedBalance {
    UnclearedBalance {
        transaction_id: TransactionId::new("TXN"),
        organization_id: OrganizationId::new("org"),
        flat_id: FlatId::new("A-101"),
        status: UnclearedStatus::Cleared,
        record_type,
        amount,
        amount_received: amount,
        ledger_account: "HDFC".into(),
        ledger_group: "Bank Accounts".into(),
        payment_mode: PaymentMode::BankTransfer,
        voucher_number: "VCH-00009".into(),
        origin: RecordOrigin::Admin,
        cheque: None,
        bill_ids: vec![],
        is_deposit,
        current_balance_portion: Decimal::ZERO,
        flat_type: None,
        charges: vec![],
        transaction_date: base_date(),
        settled_at: Some(base_date()),
        narration: String::new(),
        created_at: Utc::now(),
    }
}

fn bill(id: usize, amounts: (Decimal, Decimal, Decimal)) -> Bill {
    Bill::new(
        FlatId::new("A-101"),
        FlatType::Owner,
        NewBill {
            id: Some(BillId::new(format!("b{id}"))),
            items: vec![BillItem {
                name: format!("Item {id}"),
                ledger_account: format!("Receivable {id}"),
                ledger_group: "Sundry Debtors".into(),
                closed_unit_amount: amounts.0,
                rent_amount: amounts.1,
                owner_amount: amounts.2,
            }],
            due_date: base_date() + Duration::days(30),
            penalty: None,
        },
        Utc::now(),
    )
    .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Posting an advance or refund and then deleting it leaves every
    /// account and series where it started.
    #[test]
    fn prop_wallet_movement_deletion_nets_zero(
        amount in arb_amount(),
        is_refund in any::<bool>(),
        is_deposit in any::<bool>(),
        days_later in 0i64..365,
    ) {
        let record_type = if is_refund { UnclearedType::Refund } else { UnclearedType::Advance };
        let rec = record(record_type, amount, is_deposit);
        let posted = plan_record_postings(&rec, &[], &members_advanced());
        let undone = plan_deletion(&rec, &[], &members_advanced(), base_date() + Duration::days(days_later));

        for series in [FlatSeries::Current, FlatSeries::Deposit] {
            prop_assert_eq!(posted.net_flat_change(series) + undone.net_flat_change(series), Decimal::ZERO);
        }
        for (group, account) in [("Bank Accounts", "HDFC"), ("Current Liabilities", "Members Advanced")] {
            prop_assert_eq!(
                posted.net_ledger_change(group, account) + undone.net_ledger_change(group, account),
                Decimal::ZERO
            );
        }
    }

    /// Deleting a settlement undoes it exactly for whichever flat type the
    /// bills were settled at.
    #[test]
    fn prop_settlement_deletion_nets_zero(
        flat_type in arb_flat_type(),
        item_amounts in prop::collection::vec((arb_amount(), arb_amount(), arb_amount()), 1..4),
        extra in arb_amount(),
    ) {
        let bills: Vec<Bill> = item_amounts.into_iter().enumerate().map(|(i, a)| bill(i, a)).collect();
        let accounts = SettlementAccounts {
            payment: AccountSelection::new("HDFC", "Bank Accounts"),
            members_advanced: members_advanced(),
        };
        let due: Decimal = bills.iter().map(|b| b.receivable_total(flat_type)).sum();
        let settlement = plan_settlement(&bills, flat_type, due + extra, Decimal::ZERO, &accounts, base_date())
            .unwrap();

        let mut rec = record(UnclearedType::BillSettlement, due, false);
        rec.amount_received = due + extra;
        rec.bill_ids = bills.iter().map(|b| b.id.clone()).collect();
        rec.flat_type = Some(flat_type);
        rec.charges = settlement.charges.clone();
        rec.current_balance_portion = settlement.residual;

        let undone = plan_deletion(&rec, &bills, &members_advanced(), base_date());

        prop_assert_eq!(
            settlement.plan.net_flat_change(FlatSeries::Current) + undone.net_flat_change(FlatSeries::Current),
            Decimal::ZERO
        );
        for posting in settlement.plan.ledger_postings() {
            prop_assert_eq!(
                settlement.plan.net_ledger_change(&posting.group, &posting.account)
                    + undone.net_ledger_change(&posting.group, &posting.account),
                Decimal::ZERO
            );
        }
    }
}
