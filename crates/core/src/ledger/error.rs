//! Voucher and ledger error types.

use society_shared::types::AmountError;
use thiserror::Error;

/// Errors raised while validating or locating vouchers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// No paying account was selected.
    #[error("Paid from account is required")]
    MissingPaidFrom,

    /// No receiving account was selected.
    #[error("Paid to account is required")]
    MissingPaidTo,

    /// The selected account has no group.
    #[error("Account {0} has no account group")]
    MissingAccountGroup(String),

    /// Amount missing, not a number, or not positive.
    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),

    /// Journal or transfer between an account and itself.
    #[error("Paid from and paid to must differ for {voucher_type} (both are {account})")]
    SameAccount {
        /// Voucher type.
        voucher_type: String,
        /// The repeated account.
        account: String,
    },

    // ========== Not Found ==========
    /// Voucher document does not exist.
    #[error("Voucher not found: {0}")]
    VoucherNotFound(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingPaidFrom => "MISSING_PAID_FROM",
            Self::MissingPaidTo => "MISSING_PAID_TO",
            Self::MissingAccountGroup(_) => "MISSING_ACCOUNT_GROUP",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::SameAccount { .. } => "SAME_ACCOUNT",
            Self::VoucherNotFound(_) => "VOUCHER_NOT_FOUND",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::MissingPaidFrom
            | Self::MissingPaidTo
            | Self::MissingAccountGroup(_)
            | Self::InvalidAmount(_)
            | Self::SameAccount { .. } => 400,
            Self::VoucherNotFound(_) => 404,
        }
    }
}
