//! Advances, refunds, bill payments, and their deletion.
//!
//! Records move `Uncleared → Cleared | Approved → CheckedOut`. Advances,
//! refunds, and admin-direct settlements are created already cleared and
//! post immediately; member payments post when an admin clears or approves
//! them. Deleting a posted record reverses everything it posted.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use society_core::billing::{
    Bill, BillPayment, BillStatus, BillingError, FlatType, Settlement, SettlementAccounts,
    plan_settlement,
};
use society_core::ledger::{AccountSelection, BalanceEntry, FlatSeries, PostingPlan};
use society_core::uncleared::{
    ChequeDetails, DeletionKind, PaymentInput, PaymentMode, RecordOrigin, UnclearedBalance,
    UnclearedError, UnclearedStatus, UnclearedType, UnclearedWorkflow, WalletMovementInput,
    ensure_refundable, plan_advance, plan_deletion, plan_refund, validate_payment,
    validate_wallet_movement,
};
use society_shared::config::LedgerSettings;
use society_shared::types::{BillId, FlatId, OrganizationId, TransactionId};
use tracing::{error, info, warn};

use super::error::ServiceError;
use super::posting::PostingExecutor;
use crate::repositories::{
    BillRepository, FlatRepository, StoreVoucherNumbers, UnclearedRepository,
    VoucherNumberGenerator,
};
use crate::store::DocumentStore;

/// Uncleared balance lifecycle service.
#[derive(Clone)]
pub struct UnclearedBalanceService {
    records: UnclearedRepository,
    bills: BillRepository,
    flats: FlatRepository,
    executor: PostingExecutor,
    numbers: Arc<dyn VoucherNumberGenerator>,
    members_advanced: AccountSelection,
}

struct NewRecord<'a> {
    record_type: UnclearedType,
    status: UnclearedStatus,
    amount: Decimal,
    account: AccountSelection,
    origin: RecordOrigin,
    details: RecordDetails<'a>,
}

struct RecordDetails<'a> {
    payment_mode: PaymentMode,
    cheque: Option<&'a ChequeDetails>,
    is_deposit: bool,
    bill_ids: &'a [BillId],
    transaction_date: NaiveDate,
    narration: &'a str,
}

impl<'a> RecordDetails<'a> {
    fn wallet(input: &'a WalletMovementInput) -> Self {
        Self {
            payment_mode: input.payment_mode,
            cheque: input.cheque.as_ref(),
            is_deposit: input.is_deposit,
            bill_ids: &[],
            transaction_date: input.transaction_date,
            narration: &input.narration,
        }
    }

    fn payment(input: &'a PaymentInput) -> Self {
        Self {
            payment_mode: input.payment_mode,
            cheque: input.cheque.as_ref(),
            is_deposit: false,
            bill_ids: &input.bill_ids,
            transaction_date: input.transaction_date,
            narration: &input.narration,
        }
    }
}

impl UnclearedBalanceService {
    /// Creates the service numbering records from a store counter.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, settings: &LedgerSettings) -> Self {
        let numbers = Arc::new(StoreVoucherNumbers::new(
            Arc::clone(&store),
            settings.voucher_prefix.clone(),
        ));
        Self::with_numbers(store, settings, numbers)
    }

    /// Creates the service with a custom number generator.
    #[must_use]
    pub fn with_numbers(
        store: Arc<dyn DocumentStore>,
        settings: &LedgerSettings,
        numbers: Arc<dyn VoucherNumberGenerator>,
    ) -> Self {
        Self {
            records: UnclearedRepository::new(Arc::clone(&store), settings.transaction_id_length),
            bills: BillRepository::new(Arc::clone(&store)),
            flats: FlatRepository::new(Arc::clone(&store)),
            executor: PostingExecutor::new(store),
            numbers,
            members_advanced: AccountSelection::new(
                &settings.members_advanced_account,
                &settings.members_advanced_group,
            ),
        }
    }

    // ========== Wallet movements ==========

    /// Records money paid into a flat's wallet or deposit and posts it.
    ///
    /// # Errors
    ///
    /// Returns a validation error before any write, or the first store error.
    pub async fn create_advance(
        &self,
        org: &OrganizationId,
        flat: &FlatId,
        input: &WalletMovementInput,
        origin: RecordOrigin,
    ) -> Result<UnclearedBalance, ServiceError> {
        let (amount, account) = validate_wallet_movement(input)?;
        self.post_wallet_movement(org, flat, UnclearedType::Advance, amount, account, origin, input)
            .await
    }

    /// Records money paid back out of a flat's wallet or deposit and posts
    /// it. Rejected without any write when the series balance is short.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientBalance`, a validation error, or the first store
    /// error.
    pub async fn create_refund(
        &self,
        org: &OrganizationId,
        flat: &FlatId,
        input: &WalletMovementInput,
        origin: RecordOrigin,
    ) -> Result<UnclearedBalance, ServiceError> {
        let (amount, account) = validate_wallet_movement(input)?;
        let series = FlatSeries::for_deposit(input.is_deposit);
        let available = self
            .executor
            .flats()
            .balance_as_of(org, flat, series, input.transaction_date)
            .await?;
        ensure_refundable(amount, available)?;

        self.post_wallet_movement(org, flat, UnclearedType::Refund, amount, account, origin, input)
            .await
    }

    #[allow(clippy::too_many_arguments)]
    async fn post_wallet_movement(
        &self,
        org: &OrganizationId,
        flat: &FlatId,
        record_type: UnclearedType,
        amount: Decimal,
        account: AccountSelection,
        origin: RecordOrigin,
        input: &WalletMovementInput,
    ) -> Result<UnclearedBalance, ServiceError> {
        let mut record = self
            .new_record(
                org,
                flat,
                NewRecord {
                    record_type,
                    status: UnclearedStatus::Cleared,
                    amount,
                    account,
                    origin,
                    details: RecordDetails::wallet(input),
                },
            )
            .await?;
        record.settled_at = Some(record.transaction_date);
        self.records.insert(&record).await?;

        let plan = match record_type {
            UnclearedType::Refund => plan_refund(&record, &self.members_advanced),
            _ => plan_advance(&record, &self.members_advanced),
        };
        if let Err(err) = self.executor.apply(org, Some(flat), &plan).await {
            self.discard(&record).await;
            return Err(err);
        }

        info!(
            org_id = %org,
            flat_id = %flat,
            transaction_id = %record.transaction_id,
            voucher_number = %record.voucher_number,
            record_type = ?record.record_type,
            series = ?record.series(),
            amount = %record.amount,
            "Wallet movement posted"
        );
        Ok(record)
    }

    // ========== Bill payments ==========

    /// Member-side payment: stores an `Uncleared` record and moves its bills
    /// to pending approval. Nothing is posted until an admin clears it.
    ///
    /// # Errors
    ///
    /// Returns a validation error, `BillNotFound`, `AlreadyPaid`, or a store
    /// error.
    pub async fn submit_payment(
        &self,
        org: &OrganizationId,
        flat: &FlatId,
        input: &PaymentInput,
    ) -> Result<UnclearedBalance, ServiceError> {
        let (amount, account) = validate_payment(input)?;
        let bills = self.load_unpaid_bills(org, flat, &input.bill_ids).await?;

        let record = self
            .new_record(
                org,
                flat,
                NewRecord {
                    record_type: UnclearedType::BillSettlement,
                    status: UnclearedStatus::Uncleared,
                    amount,
                    account,
                    origin: RecordOrigin::Member,
                    details: RecordDetails::payment(input),
                },
            )
            .await?;
        self.records.insert(&record).await?;
        for bill in &bills {
            self.bills
                .set_status(org, flat, &bill.id, BillStatus::PendingApproval)
                .await?;
        }

        info!(
            org_id = %org,
            flat_id = %flat,
            transaction_id = %record.transaction_id,
            bills = bills.len(),
            amount = %record.amount,
            "Payment submitted for approval"
        );
        Ok(record)
    }

    /// Admin-side payment settled on entry.
    ///
    /// # Errors
    ///
    /// Returns a validation or settlement error before any write, or the
    /// first store error.
    pub async fn settle_direct(
        &self,
        org: &OrganizationId,
        flat: &FlatId,
        input: &PaymentInput,
    ) -> Result<UnclearedBalance, ServiceError> {
        let (amount, account) = validate_payment(input)?;
        let bills = self.load_unpaid_bills(org, flat, &input.bill_ids).await?;
        let flat_type = self.flats.flat_type(org, flat).await?;
        let settlement = self
            .plan(org, flat, &bills, flat_type, amount, &account, input.transaction_date)
            .await?;

        let mut record = self
            .new_record(
                org,
                flat,
                NewRecord {
                    record_type: UnclearedType::BillSettlement,
                    status: UnclearedStatus::Cleared,
                    amount,
                    account,
                    origin: RecordOrigin::Admin,
                    details: RecordDetails::payment(input),
                },
            )
            .await?;
        record.settled_at = Some(record.transaction_date);
        record.flat_type = Some(flat_type);
        record.charges.clone_from(&settlement.charges);
        record.current_balance_portion = settlement.residual;
        self.records.insert(&record).await?;

        if let Err(err) = self.executor.apply(org, Some(flat), &settlement.plan).await {
            self.discard(&record).await;
            return Err(err);
        }
        if let Err(err) = self.mark_bills_paid(org, &record, bills).await {
            self.undo(org, flat, &settlement.plan, record.transaction_date).await;
            self.discard(&record).await;
            return Err(err);
        }

        info!(
            org_id = %org,
            flat_id = %flat,
            transaction_id = %record.transaction_id,
            voucher_number = %record.voucher_number,
            total_due = %settlement.total_due(),
            residual = %settlement.residual,
            "Bills settled"
        );
        Ok(record)
    }

    // ========== Transitions ==========

    /// Admin verification. Settles a pending payment.
    ///
    /// # Errors
    ///
    /// Returns `RecordNotFound`, `InvalidTransition`, `InsufficientBalance`
    /// (before any write), or the first store error.
    pub async fn clear(
        &self,
        org: &OrganizationId,
        flat: &FlatId,
        id: &TransactionId,
    ) -> Result<UnclearedBalance, ServiceError> {
        let record = self.load(org, flat, id).await?;
        let next = UnclearedWorkflow::clear(record.status)?;
        self.transition(org, flat, record, next).await
    }

    /// Admin approval. Settles a pending payment.
    ///
    /// # Errors
    ///
    /// Returns `RecordNotFound`, `InvalidTransition`, `InsufficientBalance`
    /// (before any write), or the first store error.
    pub async fn approve(
        &self,
        org: &OrganizationId,
        flat: &FlatId,
        id: &TransactionId,
    ) -> Result<UnclearedBalance, ServiceError> {
        let record = self.load(org, flat, id).await?;
        let next = UnclearedWorkflow::approve(record.status)?;
        self.transition(org, flat, record, next).await
    }

    /// Closes a posted record. No postings.
    ///
    /// # Errors
    ///
    /// Returns `RecordNotFound`, `InvalidTransition`, or a store error.
    pub async fn check_out(
        &self,
        org: &OrganizationId,
        flat: &FlatId,
        id: &TransactionId,
    ) -> Result<UnclearedBalance, ServiceError> {
        let mut record = self.load(org, flat, id).await?;
        record.status = UnclearedWorkflow::check_out(record.status)?;
        self.records.save(&record).await?;
        info!(org_id = %org, flat_id = %flat, transaction_id = %id, "Record checked out");
        Ok(record)
    }

    async fn transition(
        &self,
        org: &OrganizationId,
        flat: &FlatId,
        mut record: UnclearedBalance,
        next: UnclearedStatus,
    ) -> Result<UnclearedBalance, ServiceError> {
        if !(UnclearedWorkflow::triggers_settlement(record.status, next)
            && record.record_type == UnclearedType::BillSettlement)
        {
            record.status = next;
            self.records.save(&record).await?;
            return Ok(record);
        }

        let bills = self.load_bills(org, flat, &record.bill_ids).await?;
        let flat_type = self.flats.flat_type(org, flat).await?;
        let date = record.transaction_date;
        let settlement = self
            .plan(org, flat, &bills, flat_type, record.amount_received, &record.account(), date)
            .await?;

        self.executor.apply(org, Some(flat), &settlement.plan).await?;

        record.status = next;
        record.settled_at = Some(date);
        record.flat_type = Some(flat_type);
        record.charges.clone_from(&settlement.charges);
        record.current_balance_portion = settlement.residual;

        let written = match self.mark_bills_paid(org, &record, bills).await {
            Ok(()) => self.records.save(&record).await.map_err(ServiceError::from),
            Err(err) => Err(err),
        };
        if let Err(err) = written {
            self.undo(org, flat, &settlement.plan, date).await;
            return Err(err);
        }

        info!(
            org_id = %org,
            flat_id = %flat,
            transaction_id = %record.transaction_id,
            status = %record.status,
            total_due = %settlement.total_due(),
            residual = %settlement.residual,
            "Payment settled"
        );
        Ok(record)
    }

    // ========== Deletion ==========

    /// Deletes a record. A posted record has every posting reversed on
    /// `deleted_on`; linked bills go back to unpaid either way.
    ///
    /// # Errors
    ///
    /// Returns `RecordNotFound` or the first store error.
    pub async fn delete(
        &self,
        org: &OrganizationId,
        flat: &FlatId,
        id: &TransactionId,
        deleted_on: NaiveDate,
    ) -> Result<(), ServiceError> {
        let record = self.load(org, flat, id).await?;
        let bills = self.load_linked_bills(org, flat, &record.bill_ids).await?;

        let kind = UnclearedWorkflow::deletion_kind(record.status);
        let reversal = (kind == DeletionKind::ReversePostings)
            .then(|| plan_deletion(&record, &bills, &self.members_advanced, deleted_on));
        if let Some(plan) = &reversal {
            self.executor.apply(org, Some(flat), plan).await?;
        }

        let held: Vec<Bill> = bills.into_iter().filter(|b| record.holds_bill(b)).collect();
        if let Err(err) = self.release_and_remove(org, &record, &held).await {
            if let Some(plan) = &reversal {
                self.undo(org, flat, plan, deleted_on).await;
            }
            return Err(err);
        }

        info!(
            org_id = %org,
            flat_id = %flat,
            transaction_id = %id,
            record_type = ?record.record_type,
            reversed = reversal.is_some(),
            released_bills = held.len(),
            %deleted_on,
            "Record deleted"
        );
        Ok(())
    }

    // ========== Reads ==========

    /// Reads one record.
    ///
    /// # Errors
    ///
    /// Returns `RecordNotFound` or a store error.
    pub async fn get(
        &self,
        org: &OrganizationId,
        flat: &FlatId,
        id: &TransactionId,
    ) -> Result<UnclearedBalance, ServiceError> {
        self.load(org, flat, id).await
    }

    /// Records of a flat, newest first.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub async fn list(
        &self,
        org: &OrganizationId,
        flat: &FlatId,
    ) -> Result<Vec<UnclearedBalance>, ServiceError> {
        Ok(self.records.list(org, flat).await?)
    }

    /// Flat series balance as of `date`.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub async fn flat_balance(
        &self,
        org: &OrganizationId,
        flat: &FlatId,
        series: FlatSeries,
        date: NaiveDate,
    ) -> Result<Decimal, ServiceError> {
        Ok(self
            .executor
            .flats()
            .balance_as_of(org, flat, series, date)
            .await?)
    }

    /// Every dated entry of a flat series.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub async fn flat_history(
        &self,
        org: &OrganizationId,
        flat: &FlatId,
        series: FlatSeries,
    ) -> Result<Vec<BalanceEntry>, ServiceError> {
        Ok(self.executor.flats().history(org, flat, series).await?)
    }

    // ========== Helpers ==========

    async fn new_record(
        &self,
        org: &OrganizationId,
        flat: &FlatId,
        new: NewRecord<'_>,
    ) -> Result<UnclearedBalance, ServiceError> {
        let transaction_id = self.records.allocate_id().await?;
        let voucher_number = self.numbers.next(org).await?;
        Ok(UnclearedBalance {
            transaction_id,
            organization_id: org.clone(),
            flat_id: flat.clone(),
            status: new.status,
            record_type: new.record_type,
            amount: new.amount,
            amount_received: new.amount,
            ledger_account: new.account.name,
            ledger_group: new.account.group,
            payment_mode: new.details.payment_mode,
            voucher_number,
            origin: new.origin,
            cheque: new.details.cheque.cloned(),
            bill_ids: new.details.bill_ids.to_vec(),
            is_deposit: new.details.is_deposit,
            current_balance_portion: Decimal::ZERO,
            flat_type: None,
            charges: Vec::new(),
            transaction_date: new.details.transaction_date,
            settled_at: None,
            narration: new.details.narration.to_string(),
            created_at: Utc::now(),
        })
    }

    async fn load(
        &self,
        org: &OrganizationId,
        flat: &FlatId,
        id: &TransactionId,
    ) -> Result<UnclearedBalance, ServiceError> {
        self.records
            .get(org, flat, id)
            .await?
            .ok_or_else(|| UnclearedError::RecordNotFound(id.to_string()).into())
    }

    #[allow(clippy::too_many_arguments)]
    async fn plan(
        &self,
        org: &OrganizationId,
        flat: &FlatId,
        bills: &[Bill],
        flat_type: FlatType,
        amount_received: Decimal,
        payment: &AccountSelection,
        date: NaiveDate,
    ) -> Result<Settlement, ServiceError> {
        let wallet = self
            .executor
            .flats()
            .balance_as_of(org, flat, FlatSeries::Current, date)
            .await?;
        let accounts = SettlementAccounts {
            payment: payment.clone(),
            members_advanced: self.members_advanced.clone(),
        };
        Ok(plan_settlement(bills, flat_type, amount_received, wallet, &accounts, date)?)
    }

    /// Loads every listed bill, failing on the first missing one.
    async fn load_bills(
        &self,
        org: &OrganizationId,
        flat: &FlatId,
        ids: &[BillId],
    ) -> Result<Vec<Bill>, ServiceError> {
        let mut seen = BTreeSet::new();
        let mut bills = Vec::with_capacity(ids.len());
        for id in ids {
            if !seen.insert(id) {
                return Err(BillingError::DuplicateBill(id.to_string()).into());
            }
            let bill = self
                .bills
                .get(org, flat, id)
                .await?
                .ok_or_else(|| BillingError::BillNotFound(id.to_string()))?;
            bills.push(bill);
        }
        Ok(bills)
    }

    /// Loads every listed bill and requires each to be unpaid.
    async fn load_unpaid_bills(
        &self,
        org: &OrganizationId,
        flat: &FlatId,
        ids: &[BillId],
    ) -> Result<Vec<Bill>, ServiceError> {
        let bills = self.load_bills(org, flat, ids).await?;
        if let Some(bill) = bills.iter().find(|b| b.status != BillStatus::Unpaid) {
            return Err(BillingError::AlreadyPaid(bill.id.to_string()).into());
        }
        Ok(bills)
    }

    /// Returns held bills to unpaid, then deletes the record. If any write
    /// fails, bills already released are written back as they were.
    async fn release_and_remove(
        &self,
        org: &OrganizationId,
        record: &UnclearedBalance,
        held: &[Bill],
    ) -> Result<(), ServiceError> {
        let mut released = 0;
        let mut outcome = Ok(());
        for bill in held {
            let mut unpaid = bill.clone();
            unpaid.revert_to_unpaid();
            if let Err(err) = self.bills.save(org, &unpaid).await {
                outcome = Err(err);
                break;
            }
            released += 1;
        }
        if outcome.is_ok() {
            outcome = self.records.delete(record).await;
        }
        let Err(err) = outcome else {
            return Ok(());
        };

        for bill in &held[..released] {
            if let Err(restore) = self.bills.save(org, bill).await {
                error!(
                    org_id = %org,
                    transaction_id = %record.transaction_id,
                    bill_id = %bill.id,
                    error = %restore,
                    "Could not restore bill after failed deletion"
                );
            }
        }
        Err(err.into())
    }

    /// Loads the listed bills that still exist.
    async fn load_linked_bills(
        &self,
        org: &OrganizationId,
        flat: &FlatId,
        ids: &[BillId],
    ) -> Result<Vec<Bill>, ServiceError> {
        let mut bills = Vec::with_capacity(ids.len());
        for id in ids {
            match self.bills.get(org, flat, id).await? {
                Some(bill) => bills.push(bill),
                None => warn!(org_id = %org, flat_id = %flat, bill_id = %id, "Linked bill is gone"),
            }
        }
        Ok(bills)
    }

    async fn mark_bills_paid(
        &self,
        org: &OrganizationId,
        record: &UnclearedBalance,
        bills: Vec<Bill>,
    ) -> Result<(), ServiceError> {
        for mut bill in bills {
            let Some(charge) = record.charges.iter().find(|c| c.bill_id == bill.id) else {
                continue;
            };
            bill.mark_paid(BillPayment {
                paid_amount: charge.principal,
                penalty_amount: charge.penalty,
                paid_on: record.posting_date(),
                voucher_number: record.voucher_number.clone(),
                transaction_id: record.transaction_id.clone(),
                payment_mode: record.payment_mode,
            });
            self.bills.save(org, &bill).await?;
        }
        Ok(())
    }

    /// Reverses a fully applied plan after a later write failed.
    async fn undo(&self, org: &OrganizationId, flat: &FlatId, plan: &PostingPlan, date: NaiveDate) {
        if let Err(err) = self.executor.apply(org, Some(flat), &plan.inverse_on(date)).await {
            error!(
                org_id = %org,
                flat_id = %flat,
                error = %err,
                "Could not reverse postings after a failed write"
            );
        }
    }

    /// Removes a record whose postings did not go through.
    async fn discard(&self, record: &UnclearedBalance) {
        if let Err(err) = self.records.delete(record).await {
            error!(
                org_id = %record.organization_id,
                transaction_id = %record.transaction_id,
                error = %err,
                "Could not remove record after failed posting"
            );
        }
    }
}
