//! Ledger account options offered to the voucher forms.

use std::sync::Arc;

use society_core::ledger::AccountOption;
use society_shared::types::OrganizationId;

use super::paths;
use crate::store::{Direction, DocumentStore, Query, StoreError, encode};

/// Ledger account repository.
#[derive(Clone)]
pub struct AccountRepository {
    store: Arc<dyn DocumentStore>,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Creates or replaces an account, keyed by group and name.
    ///
    /// # Errors
    ///
    /// Returns any store error.
    pub async fn upsert(&self, org: &OrganizationId, account: &AccountOption) -> Result<(), StoreError> {
        let path = paths::ledger_accounts(org).doc(&paths::ledger_key(&account.group, &account.value));
        self.store.set(&path, encode(account)?).await?;
        Ok(())
    }

    /// Every account of an organization, sorted by label.
    ///
    /// # Errors
    ///
    /// Returns any store error.
    pub async fn list(&self, org: &OrganizationId) -> Result<Vec<AccountOption>, StoreError> {
        let query = Query::collection(paths::ledger_accounts(org)).order_by("label", Direction::Ascending);
        self.store
            .query(&query)
            .await?
            .iter()
            .map(|doc| doc.decode::<AccountOption>())
            .collect()
    }
}
