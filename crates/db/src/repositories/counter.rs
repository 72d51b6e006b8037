//! Sequential voucher numbers per organization.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use society_shared::types::OrganizationId;
use tracing::debug;

use super::paths;
use crate::store::{DocumentStore, StoreError, encode};

const MAX_ATTEMPTS: usize = 5;

/// Issues voucher numbers.
#[async_trait]
pub trait VoucherNumberGenerator: Send + Sync {
    /// Next voucher number for `org`. Never reissues a number.
    async fn next(&self, org: &OrganizationId) -> Result<String, StoreError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Counter {
    last: u64,
}

/// Voucher numbers from a counter document, formatted `{prefix}{n:05}`.
#[derive(Clone)]
pub struct StoreVoucherNumbers {
    store: Arc<dyn DocumentStore>,
    prefix: String,
}

impl StoreVoucherNumbers {
    /// Creates a generator with the given prefix.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }
}

#[async_trait]
impl VoucherNumberGenerator for StoreVoucherNumbers {
    async fn next(&self, org: &OrganizationId) -> Result<String, StoreError> {
        let path = paths::voucher_counter(org);
        let mut last_err = None;

        for _ in 0..MAX_ATTEMPTS {
            let doc = self.store.get(&path).await?;
            let (counter, version) = match &doc {
                Some(doc) => (doc.decode::<Counter>()?, Some(doc.version)),
                None => (Counter::default(), None),
            };
            let next = Counter {
                last: counter.last + 1,
            };

            match self.store.set_if_version(&path, encode(&next)?, version).await {
                Ok(_) => return Ok(format!("{}{:05}", self.prefix, next.last)),
                Err(err) if err.is_retryable() => {
                    debug!(org_id = %org, "Voucher counter contended, retrying");
                    last_err = Some(err);
                }
                Err(err) => return Err(err),
            }
        }

        Err(last_err.unwrap_or_else(|| StoreError::Backend("voucher counter unavailable".into())))
    }
}
