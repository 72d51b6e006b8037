//! Storing generated bills and quoting their penalties.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use society_core::billing::{Bill, BillingError, FlatType, NewBill, bill_penalty};
use society_shared::types::{BillId, FlatId, OrganizationId};
use tracing::info;

use super::error::ServiceError;
use crate::repositories::{BillRepository, FlatRepository};
use crate::store::{DocumentStore, StoreError};

/// Amount owed on a bill as of a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PenaltyQuote {
    /// Quoted bill.
    pub bill_id: BillId,
    /// Receivable amount for the flat type.
    pub principal: Decimal,
    /// Penalty as of `as_of`.
    pub penalty: Decimal,
    /// Principal plus penalty.
    pub total: Decimal,
    /// Quote date.
    pub as_of: NaiveDate,
}

/// Bill service.
#[derive(Clone)]
pub struct BillingService {
    bills: BillRepository,
    flats: FlatRepository,
}

impl BillingService {
    /// Creates a bill service over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            bills: BillRepository::new(Arc::clone(&store)),
            flats: FlatRepository::new(store),
        }
    }

    /// Stores a generated bill, priced for the flat's current type.
    ///
    /// # Errors
    ///
    /// Returns a validation error, `DuplicateBill` if the id is taken, or a
    /// store error.
    pub async fn create_bill(
        &self,
        org: &OrganizationId,
        flat: &FlatId,
        input: NewBill,
    ) -> Result<Bill, ServiceError> {
        let flat_type = self.flats.flat_type(org, flat).await?;
        let bill = Bill::new(flat.clone(), flat_type, input, Utc::now())?;

        match self.bills.insert(org, &bill).await {
            Ok(()) => {}
            Err(StoreError::VersionConflict { .. }) => {
                return Err(BillingError::DuplicateBill(bill.id.to_string()).into());
            }
            Err(err) => return Err(err.into()),
        }

        info!(
            org_id = %org,
            flat_id = %flat,
            bill_id = %bill.id,
            amount = %bill.amount,
            due_date = %bill.due_date,
            "Bill stored"
        );
        Ok(bill)
    }

    /// Reads one bill.
    ///
    /// # Errors
    ///
    /// Returns `BillNotFound` or a store error.
    pub async fn get_bill(
        &self,
        org: &OrganizationId,
        flat: &FlatId,
        id: &BillId,
    ) -> Result<Bill, ServiceError> {
        Ok(self
            .bills
            .get(org, flat, id)
            .await?
            .ok_or_else(|| BillingError::BillNotFound(id.to_string()))?)
    }

    /// Bills of a flat, earliest due first.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub async fn list_bills(&self, org: &OrganizationId, flat: &FlatId) -> Result<Vec<Bill>, ServiceError> {
        Ok(self.bills.list(org, flat).await?)
    }

    /// What settling a bill on `as_of` would charge.
    ///
    /// # Errors
    ///
    /// Returns `BillNotFound` or a store error.
    pub async fn penalty_quote(
        &self,
        org: &OrganizationId,
        flat: &FlatId,
        id: &BillId,
        as_of: NaiveDate,
    ) -> Result<PenaltyQuote, ServiceError> {
        let bill = self.get_bill(org, flat, id).await?;
        let flat_type = self.flats.flat_type(org, flat).await?;
        let principal = bill.receivable_total(flat_type);
        let penalty = bill_penalty(&bill, as_of);
        Ok(PenaltyQuote {
            bill_id: bill.id,
            principal,
            penalty,
            total: principal.saturating_add(penalty),
            as_of,
        })
    }

    /// Sets the occupancy type used to price a flat's bills.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub async fn set_flat_type(
        &self,
        org: &OrganizationId,
        flat: &FlatId,
        flat_type: FlatType,
    ) -> Result<(), ServiceError> {
        Ok(self.flats.set_flat_type(org, flat, flat_type).await?)
    }
}
