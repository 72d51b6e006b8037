//! Advances, refunds, bill settlement, and deletion against the in-memory
//! store.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use rstest::rstest;

use society_core::billing::{
    BillItem, BillPayment, BillStatus, BillingError, FlatType, NewBill, PenaltyConfig, PenaltyOccurrence,
    PenaltyType,
};
use society_core::ledger::{AccountSelection, FlatSeries};
use society_core::uncleared::{
    PaymentInput, PaymentMode, RecordOrigin, UnclearedError, UnclearedStatus, UnclearedType,
    WalletMovementInput,
};
use society_db::repositories::BillRepository;
use society_db::services::BillingService;
use society_db::{
    DocumentStore, InMemoryDocumentStore, ServiceError, UnclearedBalanceService, VoucherService,
};
use society_shared::LedgerSettings;
use society_shared::types::{BillId, FlatId, OrganizationId, TransactionId};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

struct Society {
    store: Arc<InMemoryDocumentStore>,
    uncleared: UnclearedBalanceService,
    vouchers: VoucherService,
    billing: BillingService,
    org: OrganizationId,
    flat: FlatId,
}

impl Society {
    fn new() -> Self {
        let store = Arc::new(InMemoryDocumentStore::new());
        let shared: Arc<dyn DocumentStore> = store.clone();
        let settings = LedgerSettings::default();
        Self {
            uncleared: UnclearedBalanceService::new(Arc::clone(&shared), &settings),
            vouchers: VoucherService::new(Arc::clone(&shared), &settings),
            billing: BillingService::new(shared),
            store,
            org: OrganizationId::new("green-acres"),
            flat: FlatId::new("A-101"),
        }
    }

    async fn ledger(&self, group: &str, account: &str, on: NaiveDate) -> Decimal {
        self.vouchers
            .ledger_balance(&self.org, group, account, on)
            .await
            .unwrap()
    }

    async fn wallet(&self, on: NaiveDate) -> Decimal {
        self.uncleared
            .flat_balance(&self.org, &self.flat, FlatSeries::Current, on)
            .await
            .unwrap()
    }

    async fn members_advanced(&self, on: NaiveDate) -> Decimal {
        self.ledger("Current Liabilities", "Members Advanced", on).await
    }

    async fn advance(&self, amount: &str, on: NaiveDate) {
        self.uncleared
            .create_advance(&self.org, &self.flat, &wallet_input(amount, on), RecordOrigin::Admin)
            .await
            .unwrap();
    }

    async fn maintenance_bill(&self, id: &str, due: NaiveDate) {
        self.billing
            .create_bill(
                &self.org,
                &self.flat,
                NewBill {
                    id: Some(BillId::new(id)),
                    items: vec![BillItem {
                        name: "Maintenance".into(),
                        ledger_account: "Maintenance Charges".into(),
                        ledger_group: "Maintenance Income".into(),
                        closed_unit_amount: dec!(400),
                        rent_amount: dec!(1200),
                        owner_amount: dec!(1000),
                    }],
                    due_date: due,
                    penalty: Some(PenaltyConfig {
                        enabled: true,
                        occurrence: PenaltyOccurrence::OneTime,
                        frequency_days: None,
                        penalty_type: PenaltyType::Fixed,
                        value: dec!(50),
                        ledger_account: "Late Fee".into(),
                        ledger_group: "Indirect Income".into(),
                    }),
                },
            )
            .await
            .unwrap();
    }
}

fn hdfc() -> AccountSelection {
    AccountSelection::new("HDFC", "Bank Accounts")
}

fn wallet_input(amount: &str, on: NaiveDate) -> WalletMovementInput {
    WalletMovementInput {
        amount: amount.to_string(),
        account: Some(hdfc()),
        payment_mode: PaymentMode::BankTransfer,
        cheque: None,
        is_deposit: false,
        transaction_date: on,
        narration: String::new(),
    }
}

fn payment(bill_ids: &[&str], amount: &str, on: NaiveDate) -> PaymentInput {
    PaymentInput {
        bill_ids: bill_ids.iter().map(|id| BillId::new(*id)).collect(),
        amount: amount.to_string(),
        account: Some(hdfc()),
        payment_mode: PaymentMode::Upi,
        cheque: None,
        transaction_date: on,
        narration: String::new(),
    }
}

#[tokio::test]
async fn test_advance_posts_wallet_bank_and_members_advanced() {
    let society = Society::new();
    let on = date(2024, 2, 10);

    let record = society
        .uncleared
        .create_advance(&society.org, &society.flat, &wallet_input("200", on), RecordOrigin::Admin)
        .await
        .unwrap();

    assert_eq!(record.status, UnclearedStatus::Cleared);
    assert_eq!(record.record_type, UnclearedType::Advance);
    assert_eq!(record.transaction_id.as_str().len(), 12);
    assert_eq!(society.wallet(on).await, dec!(200));
    assert_eq!(society.members_advanced(on).await, dec!(200));
    assert_eq!(society.ledger("Bank Accounts", "HDFC", on).await, dec!(200));
}

#[tokio::test]
async fn test_deleting_cleared_advance_reverses_on_deletion_date() {
    let society = Society::new();
    let created = date(2024, 2, 10);
    let deleted = date(2024, 3, 1);

    let record = society
        .uncleared
        .create_advance(&society.org, &society.flat, &wallet_input("200", created), RecordOrigin::Admin)
        .await
        .unwrap();
    society
        .uncleared
        .delete(&society.org, &society.flat, &record.transaction_id, deleted)
        .await
        .unwrap();

    assert_eq!(society.wallet(deleted).await, Decimal::ZERO);
    assert_eq!(society.members_advanced(deleted).await, Decimal::ZERO);
    assert_eq!(society.ledger("Bank Accounts", "HDFC", deleted).await, Decimal::ZERO);
    assert_eq!(society.wallet(date(2024, 2, 20)).await, dec!(200));

    let err = society
        .uncleared
        .get(&society.org, &society.flat, &record.transaction_id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Uncleared(UnclearedError::RecordNotFound(_))));
}

#[tokio::test]
async fn test_refund_larger_than_wallet_is_rejected_before_any_write() {
    let society = Society::new();
    society.advance("300", date(2024, 3, 1)).await;
    let docs_before = society.store.len().await;

    let err = society
        .uncleared
        .create_refund(
            &society.org,
            &society.flat,
            &wallet_input("500", date(2024, 3, 2)),
            RecordOrigin::Admin,
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Uncleared(UnclearedError::InsufficientBalance { .. })
    ));
    assert_eq!(err.http_status_code(), 422);
    assert_eq!(society.store.len().await, docs_before);
    assert_eq!(society.wallet(date(2024, 3, 2)).await, dec!(300));
}

#[tokio::test]
async fn test_refund_and_its_deletion() {
    let society = Society::new();
    society.advance("300", date(2024, 3, 1)).await;

    let refund = society
        .uncleared
        .create_refund(
            &society.org,
            &society.flat,
            &wallet_input("120", date(2024, 3, 5)),
            RecordOrigin::Admin,
        )
        .await
        .unwrap();
    assert_eq!(society.wallet(date(2024, 3, 5)).await, dec!(180));
    assert_eq!(society.members_advanced(date(2024, 3, 5)).await, dec!(180));

    society
        .uncleared
        .delete(&society.org, &society.flat, &refund.transaction_id, date(2024, 3, 9))
        .await
        .unwrap();
    assert_eq!(society.wallet(date(2024, 3, 9)).await, dec!(300));
    assert_eq!(society.members_advanced(date(2024, 3, 9)).await, dec!(300));
    assert_eq!(society.ledger("Bank Accounts", "HDFC", date(2024, 3, 9)).await, dec!(300));
}

#[tokio::test]
async fn test_deposit_series_is_separate_from_wallet() {
    let society = Society::new();
    let on = date(2024, 1, 15);
    let mut deposit = wallet_input("10000", on);
    deposit.is_deposit = true;

    society
        .uncleared
        .create_advance(&society.org, &society.flat, &deposit, RecordOrigin::Admin)
        .await
        .unwrap();

    assert_eq!(society.wallet(on).await, Decimal::ZERO);
    assert_eq!(
        society
            .uncleared
            .flat_balance(&society.org, &society.flat, FlatSeries::Deposit, on)
            .await
            .unwrap(),
        dec!(10000)
    );
}

#[tokio::test]
async fn test_submitted_payment_settles_on_clear_and_reverses_on_delete() {
    let society = Society::new();
    society.advance("100", date(2024, 3, 1)).await;
    society.maintenance_bill("2024-03", date(2024, 3, 10)).await;

    let paid_on = date(2024, 3, 15);
    let submitted = society
        .uncleared
        .submit_payment(&society.org, &society.flat, &payment(&["2024-03"], "1000", paid_on))
        .await
        .unwrap();
    assert_eq!(submitted.status, UnclearedStatus::Uncleared);
    let bill = society
        .billing
        .get_bill(&society.org, &society.flat, &BillId::new("2024-03"))
        .await
        .unwrap();
    assert_eq!(bill.status, BillStatus::PendingApproval);
    assert_eq!(society.ledger("Bank Accounts", "HDFC", paid_on).await, dec!(100));

    // 1000 received against 1000 + 50 penalty: 50 comes out of the wallet.
    let cleared = society
        .uncleared
        .clear(&society.org, &society.flat, &submitted.transaction_id)
        .await
        .unwrap();
    assert_eq!(cleared.status, UnclearedStatus::Cleared);
    assert_eq!(cleared.current_balance_portion, dec!(-50));
    assert_eq!(cleared.settled_at, Some(paid_on));
    assert_eq!(cleared.flat_type, Some(FlatType::Owner));

    assert_eq!(society.wallet(paid_on).await, dec!(50));
    assert_eq!(society.members_advanced(paid_on).await, dec!(50));
    assert_eq!(society.ledger("Bank Accounts", "HDFC", paid_on).await, dec!(1100));
    assert_eq!(
        society.ledger("Maintenance Income", "Maintenance Charges", paid_on).await,
        dec!(-1000)
    );
    assert_eq!(society.ledger("Indirect Income", "Late Fee", paid_on).await, dec!(50));

    let bill = society
        .billing
        .get_bill(&society.org, &society.flat, &BillId::new("2024-03"))
        .await
        .unwrap();
    assert_eq!(bill.status, BillStatus::Paid);
    let receipt = bill.payment.unwrap();
    assert_eq!(receipt.penalty_amount, dec!(50));
    assert_eq!(receipt.voucher_number, cleared.voucher_number);

    let deleted_on = date(2024, 3, 20);
    society
        .uncleared
        .delete(&society.org, &society.flat, &cleared.transaction_id, deleted_on)
        .await
        .unwrap();

    assert_eq!(society.wallet(deleted_on).await, dec!(100));
    assert_eq!(society.members_advanced(deleted_on).await, dec!(100));
    assert_eq!(society.ledger("Bank Accounts", "HDFC", deleted_on).await, dec!(100));
    assert_eq!(
        society.ledger("Maintenance Income", "Maintenance Charges", deleted_on).await,
        Decimal::ZERO
    );
    assert_eq!(society.ledger("Indirect Income", "Late Fee", deleted_on).await, Decimal::ZERO);

    let bill = society
        .billing
        .get_bill(&society.org, &society.flat, &BillId::new("2024-03"))
        .await
        .unwrap();
    assert_eq!(bill.status, BillStatus::Unpaid);
    assert!(bill.payment.is_none());
}

#[tokio::test]
async fn test_shortfall_without_wallet_rejects_clear() {
    let society = Society::new();
    society.maintenance_bill("2024-03", date(2024, 3, 10)).await;

    let submitted = society
        .uncleared
        .submit_payment(
            &society.org,
            &society.flat,
            &payment(&["2024-03"], "500", date(2024, 3, 5)),
        )
        .await
        .unwrap();
    let err = society
        .uncleared
        .approve(&society.org, &society.flat, &submitted.transaction_id)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Billing(BillingError::InsufficientBalance { .. })
    ));
    let record = society
        .uncleared
        .get(&society.org, &society.flat, &submitted.transaction_id)
        .await
        .unwrap();
    assert_eq!(record.status, UnclearedStatus::Uncleared);
    assert_eq!(
        society.ledger("Bank Accounts", "HDFC", date(2024, 3, 5)).await,
        Decimal::ZERO
    );
}

#[tokio::test]
async fn test_direct_settlement_credits_excess_to_wallet() {
    let society = Society::new();
    society.maintenance_bill("2024-04", date(2024, 4, 10)).await;

    let on = date(2024, 4, 1);
    let record = society
        .uncleared
        .settle_direct(&society.org, &society.flat, &payment(&["2024-04"], "1500", on))
        .await
        .unwrap();

    assert_eq!(record.status, UnclearedStatus::Cleared);
    assert_eq!(record.current_balance_portion, dec!(500));
    assert_eq!(record.charges.len(), 1);
    assert_eq!(record.charges[0].penalty, Decimal::ZERO);
    assert_eq!(society.wallet(on).await, dec!(500));
    assert_eq!(society.members_advanced(on).await, dec!(500));
    assert_eq!(society.ledger("Bank Accounts", "HDFC", on).await, dec!(1500));

    let again = society
        .uncleared
        .settle_direct(&society.org, &society.flat, &payment(&["2024-04"], "1000", on))
        .await
        .unwrap_err();
    assert!(matches!(again, ServiceError::Billing(BillingError::AlreadyPaid(_))));
}

#[tokio::test]
async fn test_deleting_uncleared_payment_only_reverts_bills() {
    let society = Society::new();
    society.maintenance_bill("2024-03", date(2024, 3, 10)).await;

    let submitted = society
        .uncleared
        .submit_payment(
            &society.org,
            &society.flat,
            &payment(&["2024-03"], "1000", date(2024, 3, 5)),
        )
        .await
        .unwrap();
    society
        .uncleared
        .delete(&society.org, &society.flat, &submitted.transaction_id, date(2024, 3, 6))
        .await
        .unwrap();

    let bill = society
        .billing
        .get_bill(&society.org, &society.flat, &BillId::new("2024-03"))
        .await
        .unwrap();
    assert_eq!(bill.status, BillStatus::Unpaid);
    assert_eq!(
        society.ledger("Maintenance Income", "Maintenance Charges", date(2024, 3, 6)).await,
        Decimal::ZERO
    );
}

#[tokio::test]
async fn test_direct_settlement_rejects_bill_awaiting_approval() {
    let society = Society::new();
    society.maintenance_bill("2024-03", date(2024, 3, 10)).await;

    let on = date(2024, 3, 5);
    let submitted = society
        .uncleared
        .submit_payment(&society.org, &society.flat, &payment(&["2024-03"], "1000", on))
        .await
        .unwrap();
    let err = society
        .uncleared
        .settle_direct(&society.org, &society.flat, &payment(&["2024-03"], "1000", on))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Billing(BillingError::AlreadyPaid(_))));
    assert_eq!(society.ledger("Bank Accounts", "HDFC", on).await, Decimal::ZERO);

    let records = society.uncleared.list(&society.org, &society.flat).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].transaction_id, submitted.transaction_id);
}

#[tokio::test]
async fn test_deleting_record_leaves_bill_paid_by_another() {
    let society = Society::new();
    society.maintenance_bill("2024-03", date(2024, 3, 10)).await;

    let submitted = society
        .uncleared
        .submit_payment(
            &society.org,
            &society.flat,
            &payment(&["2024-03"], "1000", date(2024, 3, 5)),
        )
        .await
        .unwrap();

    // The bill gets settled elsewhere while the submission still lists it.
    let bills = BillRepository::new(society.store.clone());
    let mut bill = bills
        .get(&society.org, &society.flat, &BillId::new("2024-03"))
        .await
        .unwrap()
        .unwrap();
    bill.mark_paid(BillPayment {
        paid_amount: dec!(1000),
        penalty_amount: Decimal::ZERO,
        paid_on: date(2024, 3, 6),
        voucher_number: "VCH-00099".into(),
        transaction_id: TransactionId::new("elsewhere"),
        payment_mode: PaymentMode::Cash,
    });
    bills.save(&society.org, &bill).await.unwrap();

    society
        .uncleared
        .delete(&society.org, &society.flat, &submitted.transaction_id, date(2024, 3, 7))
        .await
        .unwrap();

    let after = society
        .billing
        .get_bill(&society.org, &society.flat, &BillId::new("2024-03"))
        .await
        .unwrap();
    assert_eq!(after.status, BillStatus::Paid);
    assert_eq!(
        after.payment.map(|p| p.transaction_id),
        Some(TransactionId::new("elsewhere"))
    );
}

#[rstest]
#[case::bill_release("bills/")]
#[case::record_removal("unclearedBalances/")]
#[tokio::test]
async fn test_failed_deletion_leaves_settlement_intact(#[case] failing_path: &str) {
    let society = Society::new();
    society.maintenance_bill("2024-04", date(2024, 4, 10)).await;

    let record = society
        .uncleared
        .settle_direct(
            &society.org,
            &society.flat,
            &payment(&["2024-04"], "1500", date(2024, 4, 1)),
        )
        .await
        .unwrap();

    society.store.fail_next_write(failing_path).await;
    let deleted_on = date(2024, 4, 5);
    let err = society
        .uncleared
        .delete(&society.org, &society.flat, &record.transaction_id, deleted_on)
        .await
        .unwrap_err();
    assert_eq!(err.http_status_code(), 500);

    let kept = society
        .uncleared
        .get(&society.org, &society.flat, &record.transaction_id)
        .await
        .unwrap();
    assert_eq!(kept.status, UnclearedStatus::Cleared);

    let bill = society
        .billing
        .get_bill(&society.org, &society.flat, &BillId::new("2024-04"))
        .await
        .unwrap();
    assert_eq!(bill.status, BillStatus::Paid);
    assert_eq!(
        bill.payment.map(|p| p.transaction_id),
        Some(record.transaction_id.clone())
    );

    assert_eq!(society.wallet(deleted_on).await, dec!(500));
    assert_eq!(society.members_advanced(deleted_on).await, dec!(500));
    assert_eq!(society.ledger("Bank Accounts", "HDFC", deleted_on).await, dec!(1500));
    assert_eq!(
        society.ledger("Maintenance Income", "Maintenance Charges", deleted_on).await,
        dec!(-1000)
    );
}

#[tokio::test]
async fn test_status_moves_forward_only() {
    let society = Society::new();
    let record = society
        .uncleared
        .create_advance(
            &society.org,
            &society.flat,
            &wallet_input("50", date(2024, 3, 1)),
            RecordOrigin::Member,
        )
        .await
        .unwrap();

    let err = society
        .uncleared
        .approve(&society.org, &society.flat, &record.transaction_id)
        .await
        .unwrap_err();
    assert_eq!(err.http_status_code(), 409);

    let closed = society
        .uncleared
        .check_out(&society.org, &society.flat, &record.transaction_id)
        .await
        .unwrap();
    assert_eq!(closed.status, UnclearedStatus::CheckedOut);

    let err = society
        .uncleared
        .check_out(&society.org, &society.flat, &record.transaction_id)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Uncleared(UnclearedError::InvalidTransition { .. })
    ));
}
