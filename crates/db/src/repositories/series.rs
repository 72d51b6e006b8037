//! Dated balance series on the document store.
//!
//! A series is a head document plus an `entries` collection with one document
//! per effective date. Postings claim the head with a conditional write before
//! the entry is written, so two writers racing on the same series cannot both
//! succeed from the same read.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use society_core::ledger::{BalanceEntry, LedgerEffect, RunningBalance};
use tracing::{debug, warn};

use super::paths::{entry_id, series_entries};
use crate::store::{DocPath, DocumentStore, FilterOp, Direction, Query, StoreError, encode};

/// Head document of a series.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesHead {
    /// Latest date any entry was written for.
    #[serde(default)]
    pub latest_date: Option<NaiveDate>,
    /// Number of postings applied.
    #[serde(default)]
    pub postings: u64,
}

/// Reads and posts dated balance series.
#[derive(Clone)]
pub struct BalanceSeriesStore {
    store: Arc<dyn DocumentStore>,
}

impl BalanceSeriesStore {
    /// Creates a series store.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Applies one posting to the series under `head`.
    ///
    /// Reads the latest entry at or before `date` (zero if none), applies
    /// the effect, and writes the entry for `date`. A same-date entry is
    /// replaced; entries on other dates are left alone, including later
    /// ones when the posting is backdated.
    ///
    /// # Errors
    ///
    /// Returns `VersionConflict` if another writer touched the series since
    /// it was read, or any store error.
    pub async fn post(
        &self,
        head: &DocPath,
        amount: Decimal,
        effect: LedgerEffect,
        date: NaiveDate,
    ) -> Result<RunningBalance, StoreError> {
        let head_doc = self.store.get(head).await?;
        let (mut head_data, version) = match &head_doc {
            Some(doc) => (doc.decode::<SeriesHead>()?, Some(doc.version)),
            None => (SeriesHead::default(), None),
        };

        let previous = self.latest_at_or_before(head, date).await?;
        let running = RunningBalance::post(previous.as_ref(), amount, effect, date);

        if let Some(latest) = head_data.latest_date
            && latest > date
        {
            warn!(
                series = %head,
                %date,
                %latest,
                "Backdated posting; later entries keep their balances"
            );
        }

        head_data.latest_date = Some(head_data.latest_date.map_or(date, |d| d.max(date)));
        head_data.postings += 1;
        self.store
            .set_if_version(head, encode(&head_data)?, version)
            .await?;

        let entry = running.clone().into_entry();
        self.store
            .set(&series_entries(head).doc(&entry_id(date)), encode(&entry)?)
            .await?;

        debug!(
            series = %head,
            %date,
            effect = %effect,
            %amount,
            previous = %running.previous_balance,
            current = %running.current_balance,
            "Posted to balance series"
        );
        Ok(running)
    }

    /// Latest entry dated on or before `date`.
    ///
    /// # Errors
    ///
    /// Returns any store error.
    pub async fn latest_at_or_before(
        &self,
        head: &DocPath,
        date: NaiveDate,
    ) -> Result<Option<BalanceEntry>, StoreError> {
        let query = Query::collection(series_entries(head))
            .filter("date", FilterOp::Le, json!(entry_id(date)))
            .order_by("date", Direction::Descending)
            .limit(1);
        self.store
            .query(&query)
            .await?
            .first()
            .map(|doc| doc.decode::<BalanceEntry>())
            .transpose()
    }

    /// Balance as of `date`, zero before the first entry.
    ///
    /// # Errors
    ///
    /// Returns any store error.
    pub async fn balance_as_of(&self, head: &DocPath, date: NaiveDate) -> Result<Decimal, StoreError> {
        Ok(self
            .latest_at_or_before(head, date)
            .await?
            .map_or(Decimal::ZERO, |e| e.cumulative_balance))
    }

    /// Every entry of the series, oldest first.
    ///
    /// # Errors
    ///
    /// Returns any store error.
    pub async fn history(&self, head: &DocPath) -> Result<Vec<BalanceEntry>, StoreError> {
        let query =
            Query::collection(series_entries(head)).order_by("date", Direction::Ascending);
        self.store
            .query(&query)
            .await?
            .iter()
            .map(|doc| doc.decode::<BalanceEntry>())
            .collect()
    }
}
