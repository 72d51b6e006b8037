//! Voucher create and edit workflows.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use society_core::ledger::{
    AccountOption, EffectResolver, LedgerError, PostingPlan, Voucher, VoucherFilter, VoucherInput,
    edit_booking_date, plan_voucher_postings, plan_voucher_reversal, validate_voucher,
};
use society_shared::config::LedgerSettings;
use society_shared::types::{OrganizationId, PageRequest, PageResponse, VoucherId};
use tracing::{error, info};

use super::error::ServiceError;
use super::posting::PostingExecutor;
use crate::repositories::{
    AccountRepository, StoreVoucherNumbers, VoucherNumberGenerator, VoucherRepository,
};
use crate::store::DocumentStore;

/// Creates, edits, and reads vouchers, keeping ledger balances in step.
#[derive(Clone)]
pub struct VoucherService {
    vouchers: VoucherRepository,
    accounts: AccountRepository,
    executor: PostingExecutor,
    numbers: Arc<dyn VoucherNumberGenerator>,
    resolver: EffectResolver,
}

impl VoucherService {
    /// Creates a voucher service numbering vouchers from a store counter.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, settings: &LedgerSettings) -> Self {
        let numbers = Arc::new(StoreVoucherNumbers::new(
            Arc::clone(&store),
            settings.voucher_prefix.clone(),
        ));
        Self::with_numbers(store, settings, numbers)
    }

    /// Creates a voucher service with a custom number generator.
    #[must_use]
    pub fn with_numbers(
        store: Arc<dyn DocumentStore>,
        settings: &LedgerSettings,
        numbers: Arc<dyn VoucherNumberGenerator>,
    ) -> Self {
        Self {
            vouchers: VoucherRepository::new(Arc::clone(&store)),
            accounts: AccountRepository::new(Arc::clone(&store)),
            executor: PostingExecutor::new(store),
            numbers,
            resolver: EffectResolver::from_settings(settings),
        }
    }

    /// Validates, numbers, stores, and posts a new voucher.
    ///
    /// The voucher document is written before its two postings. If a posting
    /// fails, the applied leg is compensated and the error returned; the
    /// document stays.
    ///
    /// # Errors
    ///
    /// Returns a validation error before any write, or the first store error.
    pub async fn create(
        &self,
        org: &OrganizationId,
        input: &VoucherInput,
    ) -> Result<Voucher, ServiceError> {
        let validated = validate_voucher(input)?;
        let number = self.numbers.next(org).await?;
        let voucher = Voucher::from_validated(
            VoucherId::generate(),
            org.clone(),
            number,
            validated,
            Utc::now(),
        );
        self.vouchers.insert(&voucher).await?;

        let plan = plan_voucher_postings(&self.resolver, &voucher);
        if let Err(err) = self.executor.apply(org, None, &plan).await {
            error!(
                org_id = %org,
                voucher_number = %voucher.voucher_number,
                error = %err,
                "Voucher stored but its postings failed"
            );
            return Err(err);
        }

        info!(
            org_id = %org,
            voucher_id = %voucher.id,
            voucher_number = %voucher.voucher_number,
            voucher_type = %voucher.voucher_type,
            amount = %voucher.amount,
            "Voucher created"
        );
        Ok(voucher)
    }

    /// Edits a voucher: reverses the original postings, updates the
    /// document, and posts the new legs. The voucher number is kept.
    ///
    /// Reversal and new legs are booked on `edited_on`, or on the original or
    /// edited transaction date when either is later, so postings made after
    /// the original voucher stay intact.
    ///
    /// When a later stage fails, earlier stages are rolled back so balances
    /// and the document return to the original voucher.
    ///
    /// # Errors
    ///
    /// Returns a validation error, `VoucherNotFound`, or the first store
    /// error.
    pub async fn edit(
        &self,
        org: &OrganizationId,
        id: &VoucherId,
        input: &VoucherInput,
        edited_on: NaiveDate,
    ) -> Result<Voucher, ServiceError> {
        let validated = validate_voucher(input)?;
        let original = self
            .vouchers
            .get(org, id)
            .await?
            .ok_or_else(|| LedgerError::VoucherNotFound(id.to_string()))?;
        let edited = original.with_edit(validated, Utc::now());

        let booked_on = edit_booking_date(&original, &edited, edited_on);
        let reversal = plan_voucher_reversal(&self.resolver, &original, booked_on);
        self.executor.apply(org, None, &reversal).await?;

        let reinstate = reversal.inverse_on(booked_on);
        if let Err(err) = self.vouchers.update(&edited).await {
            self.restore(org, &original, &reinstate, false).await;
            return Err(err.into());
        }

        let repost = plan_voucher_postings(&self.resolver, &edited).booked_on(booked_on);
        if let Err(err) = self.executor.apply(org, None, &repost).await {
            self.restore(org, &original, &reinstate, true).await;
            return Err(err);
        }

        info!(
            org_id = %org,
            voucher_id = %edited.id,
            voucher_number = %edited.voucher_number,
            old_amount = %original.amount,
            new_amount = %edited.amount,
            %booked_on,
            "Voucher edited"
        );
        Ok(edited)
    }

    /// Cancels an applied reversal and, if the document was already replaced,
    /// writes the original back.
    async fn restore(
        &self,
        org: &OrganizationId,
        original: &Voucher,
        reinstate: &PostingPlan,
        document_replaced: bool,
    ) {
        if document_replaced && let Err(err) = self.vouchers.update(original).await {
            error!(
                org_id = %org,
                voucher_number = %original.voucher_number,
                error = %err,
                "Could not restore voucher document after failed edit"
            );
        }
        if let Err(err) = self.executor.apply(org, None, reinstate).await {
            error!(
                org_id = %org,
                voucher_number = %original.voucher_number,
                error = %err,
                "Could not restore original postings after failed edit"
            );
        }
    }

    /// Reads one voucher.
    ///
    /// # Errors
    ///
    /// Returns `VoucherNotFound` or a store error.
    pub async fn get(&self, org: &OrganizationId, id: &VoucherId) -> Result<Voucher, ServiceError> {
        Ok(self
            .vouchers
            .get(org, id)
            .await?
            .ok_or_else(|| LedgerError::VoucherNotFound(id.to_string()))?)
    }

    /// Lists vouchers, newest first.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub async fn list(
        &self,
        org: &OrganizationId,
        filter: &VoucherFilter,
        page: PageRequest,
    ) -> Result<PageResponse<Voucher>, ServiceError> {
        Ok(self.vouchers.list(org, filter, &page.normalized()).await?)
    }

    /// Balance of a ledger account as of `date`.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub async fn ledger_balance(
        &self,
        org: &OrganizationId,
        group: &str,
        account: &str,
        date: NaiveDate,
    ) -> Result<Decimal, ServiceError> {
        Ok(self
            .executor
            .ledger()
            .balance_as_of(org, group, account, date)
            .await?)
    }

    /// Accounts offered in the voucher forms.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub async fn account_options(&self, org: &OrganizationId) -> Result<Vec<AccountOption>, ServiceError> {
        Ok(self.accounts.list(org).await?)
    }

    /// Registers an account offered in the voucher forms.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub async fn register_account(
        &self,
        org: &OrganizationId,
        account: &AccountOption,
    ) -> Result<(), ServiceError> {
        Ok(self.accounts.upsert(org, account).await?)
    }
}
