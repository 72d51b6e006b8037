//! Executes posting plans step by step.
//!
//! The store has no multi-document transactions. Steps run in order; when one
//! fails, the steps already applied are undone in reverse order on their own
//! dates before the error is returned.

use std::sync::Arc;

use chrono::NaiveDate;
use society_core::ledger::{Posting, PostingPlan, RunningBalance};
use society_shared::types::{FlatId, OrganizationId};
use tracing::{error, warn};

use super::error::ServiceError;
use crate::repositories::{FlatBalanceRepository, LedgerBalanceRepository};
use crate::store::DocumentStore;

/// Applies posting plans to ledger and flat balance series.
#[derive(Clone)]
pub struct PostingExecutor {
    ledger: LedgerBalanceRepository,
    flats: FlatBalanceRepository,
}

impl PostingExecutor {
    /// Creates an executor over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            ledger: LedgerBalanceRepository::new(Arc::clone(&store)),
            flats: FlatBalanceRepository::new(store),
        }
    }

    /// Ledger balance repository used by the executor.
    #[must_use]
    pub const fn ledger(&self) -> &LedgerBalanceRepository {
        &self.ledger
    }

    /// Flat balance repository used by the executor.
    #[must_use]
    pub const fn flats(&self) -> &FlatBalanceRepository {
        &self.flats
    }

    /// Applies every step of `plan`.
    ///
    /// Flat steps need `flat`. On failure the applied prefix is compensated
    /// and the original error returned.
    ///
    /// # Errors
    ///
    /// Returns the error of the failing step.
    pub async fn apply(
        &self,
        org: &OrganizationId,
        flat: Option<&FlatId>,
        plan: &PostingPlan,
    ) -> Result<Vec<RunningBalance>, ServiceError> {
        let mut balances = Vec::with_capacity(plan.len());

        for (index, step) in plan.steps.iter().enumerate() {
            match self.apply_step(org, flat, step).await {
                Ok(balance) => balances.push(balance),
                Err(err) => {
                    warn!(
                        org_id = %org,
                        failed_step = index,
                        error = %err,
                        "Posting failed, compensating applied steps"
                    );
                    self.compensate(org, flat, &plan.steps[..index]).await;
                    return Err(err);
                }
            }
        }
        Ok(balances)
    }

    /// Undoes applied steps in reverse order. Best effort: failures are
    /// logged and the remaining steps still run.
    async fn compensate(&self, org: &OrganizationId, flat: Option<&FlatId>, applied: &[Posting]) {
        for step in applied.iter().rev() {
            let undo = step.inverse_on(step_date(step));
            if let Err(err) = self.apply_step(org, flat, &undo).await {
                error!(
                    org_id = %org,
                    step = ?undo,
                    error = %err,
                    "Compensation failed; balance needs manual correction"
                );
            }
        }
    }

    async fn apply_step(
        &self,
        org: &OrganizationId,
        flat: Option<&FlatId>,
        step: &Posting,
    ) -> Result<RunningBalance, ServiceError> {
        match step {
            Posting::Ledger(posting) => Ok(self.ledger.post(org, posting).await?),
            Posting::Flat(posting) => {
                let flat = flat.ok_or_else(|| {
                    ServiceError::Internal("flat posting without a flat".to_string())
                })?;
                Ok(self.flats.post(org, flat, posting).await?)
            }
        }
    }
}

fn step_date(step: &Posting) -> NaiveDate {
    match step {
        Posting::Ledger(p) => p.effective_date,
        Posting::Flat(p) => p.effective_date,
    }
}
