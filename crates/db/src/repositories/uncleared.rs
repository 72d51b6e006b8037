//! Uncleared balance records.

use std::sync::Arc;

use rand::Rng;
use rand::distr::Alphanumeric;
use society_core::uncleared::UnclearedBalance;
use society_shared::types::{FlatId, OrganizationId, TransactionId};
use tracing::warn;

use super::paths::{self, UNCLEARED_BALANCES};
use crate::store::{Direction, DocumentStore, FilterOp, Query, StoreError, encode};

const MAX_ID_ATTEMPTS: usize = 8;

/// Random uppercase alphanumeric transaction id.
#[must_use]
pub fn random_transaction_id(length: usize) -> TransactionId {
    let id: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(|b| char::from(b).to_ascii_uppercase())
        .collect();
    TransactionId::new(id)
}

/// Uncleared balance repository.
#[derive(Clone)]
pub struct UnclearedRepository {
    store: Arc<dyn DocumentStore>,
    id_length: usize,
}

impl UnclearedRepository {
    /// Creates a repository issuing transaction ids of `id_length` characters.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, id_length: usize) -> Self {
        Self {
            store,
            id_length: id_length.max(1),
        }
    }

    /// Picks a transaction id no record in any flat carries yet.
    ///
    /// # Errors
    ///
    /// Returns `Backend` if every attempt collided, or any store error.
    pub async fn allocate_id(&self) -> Result<TransactionId, StoreError> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let candidate = random_transaction_id(self.id_length);
            if !self.id_exists(&candidate).await? {
                return Ok(candidate);
            }
            warn!(transaction_id = %candidate, "Transaction id collision, drawing again");
        }
        Err(StoreError::Backend(format!(
            "no free transaction id after {MAX_ID_ATTEMPTS} attempts"
        )))
    }

    /// Returns true if some record already uses `id`.
    ///
    /// # Errors
    ///
    /// Returns any store error.
    pub async fn id_exists(&self, id: &TransactionId) -> Result<bool, StoreError> {
        let query = Query::collection_group(UNCLEARED_BALANCES)
            .filter("transaction_id", FilterOp::Eq, id.as_str())
            .limit(1);
        Ok(!self.store.query(&query).await?.is_empty())
    }

    /// Stores a new record.
    ///
    /// # Errors
    ///
    /// Returns `VersionConflict` if the id is taken, or any store error.
    pub async fn insert(&self, record: &UnclearedBalance) -> Result<(), StoreError> {
        let path = Self::path(record);
        self.store.set_if_version(&path, encode(record)?, None).await?;
        Ok(())
    }

    /// Reads a record.
    ///
    /// # Errors
    ///
    /// Returns any store error.
    pub async fn get(
        &self,
        org: &OrganizationId,
        flat: &FlatId,
        id: &TransactionId,
    ) -> Result<Option<UnclearedBalance>, StoreError> {
        self.store
            .get(&paths::uncleared_balance(org, flat, id))
            .await?
            .map(|doc| doc.decode())
            .transpose()
    }

    /// Replaces a record.
    ///
    /// # Errors
    ///
    /// Returns any store error.
    pub async fn save(&self, record: &UnclearedBalance) -> Result<(), StoreError> {
        self.store.set(&Self::path(record), encode(record)?).await?;
        Ok(())
    }

    /// Deletes a record.
    ///
    /// # Errors
    ///
    /// Returns any store error.
    pub async fn delete(&self, record: &UnclearedBalance) -> Result<(), StoreError> {
        self.store.delete(&Self::path(record)).await
    }

    /// Records of a flat, newest first.
    ///
    /// # Errors
    ///
    /// Returns any store error.
    pub async fn list(
        &self,
        org: &OrganizationId,
        flat: &FlatId,
    ) -> Result<Vec<UnclearedBalance>, StoreError> {
        let query = Query::collection(paths::uncleared_balances(org, flat))
            .order_by("created_at", Direction::Descending);
        self.store
            .query(&query)
            .await?
            .iter()
            .map(|doc| doc.decode::<UnclearedBalance>())
            .collect()
    }

    fn path(record: &UnclearedBalance) -> crate::store::DocPath {
        paths::uncleared_balance(&record.organization_id, &record.flat_id, &record.transaction_id)
    }
}
