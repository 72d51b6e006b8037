//! Uncleared balance error types.

use rust_decimal::Decimal;
use society_shared::types::AmountError;
use thiserror::Error;

use super::types::UnclearedStatus;
use crate::billing::BillingError;

/// Errors that can occur during uncleared balance operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnclearedError {
    /// Attempted an invalid status transition.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: UnclearedStatus,
        /// The attempted target status.
        to: UnclearedStatus,
    },

    /// Amount missing, not a number, or not positive.
    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),

    /// No payment account selected.
    #[error("Ledger account is required")]
    MissingAccount,

    /// A payment must settle at least one bill.
    #[error("At least one bill is required")]
    NoBills,

    /// Refund larger than the balance it comes out of.
    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance {
        /// Refund amount.
        requested: Decimal,
        /// Series balance.
        available: Decimal,
    },

    /// Record does not exist.
    #[error("Uncleared balance not found: {0}")]
    RecordNotFound(String),

    /// Settlement failed.
    #[error(transparent)]
    Billing(#[from] BillingError),
}

impl UnclearedError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::MissingAccount => "MISSING_ACCOUNT",
            Self::NoBills => "NO_BILLS",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::RecordNotFound(_) => "UNCLEARED_BALANCE_NOT_FOUND",
            Self::Billing(e) => e.error_code(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidAmount(_) | Self::MissingAccount | Self::NoBills => 400,
            Self::RecordNotFound(_) => 404,
            Self::InvalidTransition { .. } => 409,
            Self::InsufficientBalance { .. } => 422,
            Self::Billing(e) => e.http_status_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        let err = UnclearedError::InvalidTransition {
            from: UnclearedStatus::CheckedOut,
            to: UnclearedStatus::Cleared,
        };
        assert_eq!(err.error_code(), "INVALID_TRANSITION");
        assert_eq!(err.http_status_code(), 409);
        assert_eq!(
            err.to_string(),
            "Invalid status transition from CheckedOut to Cleared"
        );
    }

    #[test]
    fn test_billing_errors_pass_through() {
        let err: UnclearedError = BillingError::BillNotFound("b9".into()).into();
        assert_eq!(err.error_code(), "BILL_NOT_FOUND");
        assert_eq!(err.http_status_code(), 404);
    }

    #[test]
    fn test_insufficient_balance() {
        let err = UnclearedError::InsufficientBalance {
            requested: dec!(500),
            available: dec!(300),
        };
        assert_eq!(err.http_status_code(), 422);
        assert_eq!(
            err.to_string(),
            "Insufficient balance: requested 500, available 300"
        );
    }
}
