//! Per-flat current balance (wallet) and deposit series.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use society_core::ledger::{BalanceEntry, FlatBalancePosting, FlatSeries, RunningBalance};
use society_shared::types::{FlatId, OrganizationId};

use super::paths;
use super::series::BalanceSeriesStore;
use crate::store::{DocumentStore, StoreError};

/// Flat balance repository.
#[derive(Clone)]
pub struct FlatBalanceRepository {
    series: BalanceSeriesStore,
}

impl FlatBalanceRepository {
    /// Creates a new flat balance repository.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            series: BalanceSeriesStore::new(store),
        }
    }

    /// Applies a posting and returns the new cumulative balance.
    ///
    /// # Errors
    ///
    /// Returns `VersionConflict` on a concurrent write, or any store error.
    pub async fn post(
        &self,
        org: &OrganizationId,
        flat: &FlatId,
        posting: &FlatBalancePosting,
    ) -> Result<RunningBalance, StoreError> {
        let head = paths::flat_series(org, flat, posting.series);
        self.series
            .post(&head, posting.amount, posting.effect, posting.effective_date)
            .await
    }

    /// Balance of a series as of `date`.
    ///
    /// # Errors
    ///
    /// Returns any store error.
    pub async fn balance_as_of(
        &self,
        org: &OrganizationId,
        flat: &FlatId,
        series: FlatSeries,
        date: NaiveDate,
    ) -> Result<Decimal, StoreError> {
        self.series
            .balance_as_of(&paths::flat_series(org, flat, series), date)
            .await
    }

    /// Every dated entry of a series, oldest first.
    ///
    /// # Errors
    ///
    /// Returns any store error.
    pub async fn history(
        &self,
        org: &OrganizationId,
        flat: &FlatId,
        series: FlatSeries,
    ) -> Result<Vec<BalanceEntry>, StoreError> {
        self.series.history(&paths::flat_series(org, flat, series)).await
    }
}
