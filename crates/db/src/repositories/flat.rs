//! Flat documents.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use society_core::billing::FlatType;
use society_shared::types::{FlatId, OrganizationId};

use super::paths;
use crate::store::{DocumentStore, StoreError, encode};

/// Stored flat profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatRecord {
    /// Occupancy type, selects the bill item amounts.
    #[serde(default)]
    pub flat_type: FlatType,
}

/// Flat repository.
#[derive(Clone)]
pub struct FlatRepository {
    store: Arc<dyn DocumentStore>,
}

impl FlatRepository {
    /// Creates a new flat repository.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Occupancy type of a flat. Unknown flats are owner-occupied.
    ///
    /// # Errors
    ///
    /// Returns any store error.
    pub async fn flat_type(&self, org: &OrganizationId, flat: &FlatId) -> Result<FlatType, StoreError> {
        Ok(self
            .store
            .get(&paths::flat(org, flat))
            .await?
            .map(|doc| doc.decode::<FlatRecord>())
            .transpose()?
            .unwrap_or_default()
            .flat_type)
    }

    /// Sets the occupancy type of a flat.
    ///
    /// # Errors
    ///
    /// Returns any store error.
    pub async fn set_flat_type(
        &self,
        org: &OrganizationId,
        flat: &FlatId,
        flat_type: FlatType,
    ) -> Result<(), StoreError> {
        self.store
            .set(&paths::flat(org, flat), encode(&FlatRecord { flat_type })?)
            .await?;
        Ok(())
    }
}
