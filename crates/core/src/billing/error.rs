//! Billing error types.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by bill validation and settlement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BillingError {
    /// A bill needs at least one item.
    #[error("Bill must have at least one item")]
    NoItems,

    /// An item carries a negative amount.
    #[error("Bill item {0} has a negative amount")]
    NegativeItemAmount(String),

    /// Penalty settings are unusable.
    #[error("Invalid penalty configuration: {0}")]
    InvalidPenalty(String),

    /// Bill does not exist.
    #[error("Bill not found: {0}")]
    BillNotFound(String),

    /// Bill was already settled.
    #[error("Bill {0} is already paid")]
    AlreadyPaid(String),

    /// Settlement needs no bills to be listed twice.
    #[error("Bill {0} is listed more than once")]
    DuplicateBill(String),

    /// The amount received plus the wallet cannot cover the bills.
    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance {
        /// Amount that must come from the wallet.
        required: Decimal,
        /// Wallet balance.
        available: Decimal,
    },
}

impl BillingError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NoItems => "NO_BILL_ITEMS",
            Self::NegativeItemAmount(_) => "NEGATIVE_ITEM_AMOUNT",
            Self::InvalidPenalty(_) => "INVALID_PENALTY",
            Self::BillNotFound(_) => "BILL_NOT_FOUND",
            Self::AlreadyPaid(_) => "BILL_ALREADY_PAID",
            Self::DuplicateBill(_) => "DUPLICATE_BILL",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::NoItems
            | Self::NegativeItemAmount(_)
            | Self::InvalidPenalty(_)
            | Self::DuplicateBill(_) => 400,
            Self::BillNotFound(_) => 404,
            Self::AlreadyPaid(_) => 409,
            Self::InsufficientBalance { .. } => 422,
        }
    }
}
