//! Uncleared balance lifecycle.
//!
//! This module provides:
//! - Record types for advances, refunds, and bill settlements
//! - The status state machine (clear, approve, check out)
//! - Posting sets of records and their exact reversals

pub mod error;
pub mod reversal;
pub mod service;
pub mod types;

#[cfg(test)]
mod reversal_props;

pub use error::UnclearedError;
pub use reversal::{plan_advance, plan_deletion, plan_record_postings, plan_refund};
pub use service::{
    DeletionKind, UnclearedWorkflow, ensure_refundable, validate_payment,
    validate_wallet_movement,
};
pub use types::{
    ChequeDetails, PaymentInput, PaymentMode, RecordOrigin, UnclearedBalance, UnclearedStatus,
    UnclearedType, WalletMovementInput,
};
