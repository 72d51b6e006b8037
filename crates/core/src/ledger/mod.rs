//! Voucher posting logic.
//!
//! This module implements the ledger side of the society books:
//! - Effect resolution (Add / Subtract per account group and side)
//! - Dated running balances for accounts and flats
//! - Voucher domain types and validation
//! - Posting plans for create and edit
//! - Error types for voucher operations

pub mod balance;
pub mod effect;
pub mod error;
pub mod posting;
pub mod types;
pub mod validation;

#[cfg(test)]
mod posting_props;
#[cfg(test)]
mod validation_props;

pub use balance::{BalanceEntry, FlatSeries, RunningBalance, balance_as_of, latest_at_or_before};
pub use effect::{EffectResolver, LedgerEffect, LegClassification, LegSide};
pub use error::LedgerError;
pub use posting::{
    FlatBalancePosting, LedgerPosting, Posting, PostingPlan, edit_booking_date, plan_voucher_edit,
    plan_voucher_postings, plan_voucher_reversal,
};
pub use types::{
    AccountOption, AccountSelection, ValidatedVoucher, Voucher, VoucherFilter, VoucherInput,
    VoucherType,
};
pub use validation::validate_voucher;
