//! Voucher documents.

use std::sync::Arc;

use society_core::ledger::{Voucher, VoucherFilter};
use society_shared::types::{OrganizationId, PageRequest, PageResponse, VoucherId};

use super::paths;
use crate::store::{Direction, DocumentStore, Query, StoreError, encode};

/// Voucher repository.
#[derive(Clone)]
pub struct VoucherRepository {
    store: Arc<dyn DocumentStore>,
}

impl VoucherRepository {
    /// Creates a new voucher repository.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Stores a new voucher.
    ///
    /// # Errors
    ///
    /// Returns `VersionConflict` if the id is taken, or any store error.
    pub async fn insert(&self, voucher: &Voucher) -> Result<(), StoreError> {
        let path = paths::voucher(&voucher.organization_id, &voucher.id);
        self.store.set_if_version(&path, encode(voucher)?, None).await?;
        Ok(())
    }

    /// Reads a voucher.
    ///
    /// # Errors
    ///
    /// Returns any store error.
    pub async fn get(
        &self,
        org: &OrganizationId,
        id: &VoucherId,
    ) -> Result<Option<Voucher>, StoreError> {
        self.store
            .get(&paths::voucher(org, id))
            .await?
            .map(|doc| doc.decode())
            .transpose()
    }

    /// Replaces an existing voucher.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the voucher is gone, or any store error.
    pub async fn update(&self, voucher: &Voucher) -> Result<(), StoreError> {
        let path = paths::voucher(&voucher.organization_id, &voucher.id);
        let Some(current) = self.store.get(&path).await? else {
            return Err(StoreError::NotFound(path.to_string()));
        };
        self.store
            .set_if_version(&path, encode(voucher)?, Some(current.version))
            .await?;
        Ok(())
    }

    /// Lists vouchers, newest transaction date first.
    ///
    /// # Errors
    ///
    /// Returns any store error.
    pub async fn list(
        &self,
        org: &OrganizationId,
        filter: &VoucherFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<Voucher>, StoreError> {
        let query =
            Query::collection(paths::vouchers(org)).order_by("transaction_date", Direction::Descending);
        let vouchers = self
            .store
            .query(&query)
            .await?
            .iter()
            .map(|doc| doc.decode::<Voucher>())
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .filter(|v| filter.matches(v))
            .collect();

        Ok(PageResponse::paginate(vouchers, page))
    }
}
