//! Service-level errors.

use society_core::billing::BillingError;
use society_core::ledger::LedgerError;
use society_core::uncleared::UnclearedError;
use thiserror::Error;

use crate::store::StoreError;

/// Errors returned by the posting services.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// Voucher validation or lookup failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Bill validation or settlement failed.
    #[error(transparent)]
    Billing(#[from] BillingError),

    /// Uncleared balance validation or transition failed.
    #[error(transparent)]
    Uncleared(#[from] UnclearedError),

    /// Another writer changed the same balance first. Safe to retry.
    #[error("Concurrent modification: {0}")]
    ConcurrentModification(String),

    /// Store failure.
    #[error(transparent)]
    Store(StoreError),

    /// Internal invariant broken.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::VersionConflict { path, .. } => Self::ConcurrentModification(path),
            other => Self::Store(other),
        }
    }
}

impl ServiceError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Ledger(e) => e.error_code(),
            Self::Billing(e) => e.error_code(),
            Self::Uncleared(e) => e.error_code(),
            Self::ConcurrentModification(_) => "CONCURRENT_MODIFICATION",
            Self::Store(StoreError::NotFound(_)) => "NOT_FOUND",
            Self::Store(_) => "STORE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Ledger(e) => e.http_status_code(),
            Self::Billing(e) => e.http_status_code(),
            Self::Uncleared(e) => e.http_status_code(),
            Self::ConcurrentModification(_) => 409,
            Self::Store(StoreError::NotFound(_)) => 404,
            Self::Store(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns true if the whole operation may be retried.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentModification(_))
    }
}
