//! Bill documents of a flat.

use std::sync::Arc;

use serde_json::Map;
use society_core::billing::{Bill, BillStatus};
use society_shared::types::{BillId, FlatId, OrganizationId};

use super::paths;
use crate::store::{Direction, DocumentStore, Query, StoreError, encode};

/// Bill repository.
#[derive(Clone)]
pub struct BillRepository {
    store: Arc<dyn DocumentStore>,
}

impl BillRepository {
    /// Creates a new bill repository.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Stores a new bill.
    ///
    /// # Errors
    ///
    /// Returns `VersionConflict` if the bill id is taken, or any store error.
    pub async fn insert(&self, org: &OrganizationId, bill: &Bill) -> Result<(), StoreError> {
        let path = paths::bill(org, &bill.flat_id, &bill.id);
        self.store.set_if_version(&path, encode(bill)?, None).await?;
        Ok(())
    }

    /// Reads a bill.
    ///
    /// # Errors
    ///
    /// Returns any store error.
    pub async fn get(
        &self,
        org: &OrganizationId,
        flat: &FlatId,
        id: &BillId,
    ) -> Result<Option<Bill>, StoreError> {
        self.store
            .get(&paths::bill(org, flat, id))
            .await?
            .map(|doc| doc.decode())
            .transpose()
    }

    /// Replaces a bill with its in-memory state. Fields the bill no longer
    /// carries (payment details after a revert) disappear from the document.
    ///
    /// # Errors
    ///
    /// Returns any store error.
    pub async fn save(&self, org: &OrganizationId, bill: &Bill) -> Result<(), StoreError> {
        let path = paths::bill(org, &bill.flat_id, &bill.id);
        self.store.set(&path, encode(bill)?).await?;
        Ok(())
    }

    /// Changes only the status of a bill.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the bill does not exist, or any store error.
    pub async fn set_status(
        &self,
        org: &OrganizationId,
        flat: &FlatId,
        id: &BillId,
        status: BillStatus,
    ) -> Result<(), StoreError> {
        let mut fields = Map::new();
        fields.insert("status".to_string(), encode(&status)?);
        self.store.update(&paths::bill(org, flat, id), fields).await?;
        Ok(())
    }

    /// Bills of a flat, earliest due date first.
    ///
    /// # Errors
    ///
    /// Returns any store error.
    pub async fn list(&self, org: &OrganizationId, flat: &FlatId) -> Result<Vec<Bill>, StoreError> {
        let query = Query::collection(paths::bills(org, flat)).order_by("due_date", Direction::Ascending);
        self.store
            .query(&query)
            .await?
            .iter()
            .map(|doc| doc.decode::<Bill>())
            .collect()
    }
}
