//! Running balance per (organization, account group, account).

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use society_core::ledger::{BalanceEntry, LedgerPosting, RunningBalance};
use society_shared::types::OrganizationId;

use super::paths;
use super::series::BalanceSeriesStore;
use crate::store::{DocumentStore, StoreError};

/// Ledger account balance repository.
#[derive(Clone)]
pub struct LedgerBalanceRepository {
    series: BalanceSeriesStore,
}

impl LedgerBalanceRepository {
    /// Creates a new ledger balance repository.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            series: BalanceSeriesStore::new(store),
        }
    }

    /// Applies a posting. A missing account opens at zero.
    ///
    /// # Errors
    ///
    /// Returns `VersionConflict` on a concurrent write, or any store error.
    pub async fn post(
        &self,
        org: &OrganizationId,
        posting: &LedgerPosting,
    ) -> Result<RunningBalance, StoreError> {
        let head = paths::ledger_balance(org, &posting.group, &posting.account);
        self.series
            .post(&head, posting.amount, posting.effect, posting.effective_date)
            .await
    }

    /// Balance of an account as of `date`.
    ///
    /// # Errors
    ///
    /// Returns any store error.
    pub async fn balance_as_of(
        &self,
        org: &OrganizationId,
        group: &str,
        account: &str,
        date: NaiveDate,
    ) -> Result<Decimal, StoreError> {
        self.series
            .balance_as_of(&paths::ledger_balance(org, group, account), date)
            .await
    }

    /// Every dated entry of an account, oldest first.
    ///
    /// # Errors
    ///
    /// Returns any store error.
    pub async fn history(
        &self,
        org: &OrganizationId,
        group: &str,
        account: &str,
    ) -> Result<Vec<BalanceEntry>, StoreError> {
        self.series
            .history(&paths::ledger_balance(org, group, account))
            .await
    }
}
