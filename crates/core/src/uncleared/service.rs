//! State machine and input checks for uncleared balance records.

use rust_decimal::Decimal;
use society_shared::types::parse_amount;

use super::error::UnclearedError;
use super::types::{PaymentInput, UnclearedStatus, WalletMovementInput};
use crate::ledger::AccountSelection;

/// What deleting a record must undo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionKind {
    /// Nothing was posted; only linked bills go back to unpaid.
    RevertBillsOnly,
    /// Every posting the record caused is reversed.
    ReversePostings,
}

/// Stateless service for uncleared balance transitions.
pub struct UnclearedWorkflow;

impl UnclearedWorkflow {
    /// Admin verification of a submitted record.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless the record is `Uncleared`.
    pub fn clear(current: UnclearedStatus) -> Result<UnclearedStatus, UnclearedError> {
        Self::settle(current, UnclearedStatus::Cleared)
    }

    /// Admin approval of a submitted record.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless the record is `Uncleared`.
    pub fn approve(current: UnclearedStatus) -> Result<UnclearedStatus, UnclearedError> {
        Self::settle(current, UnclearedStatus::Approved)
    }

    /// Closes out a posted record. No postings follow.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless the record is `Cleared` or
    /// `Approved`.
    pub fn check_out(current: UnclearedStatus) -> Result<UnclearedStatus, UnclearedError> {
        match current {
            UnclearedStatus::Cleared | UnclearedStatus::Approved => Ok(UnclearedStatus::CheckedOut),
            _ => Err(UnclearedError::InvalidTransition {
                from: current,
                to: UnclearedStatus::CheckedOut,
            }),
        }
    }

    /// Returns true if moving `from` → `to` runs the settlement postings.
    #[must_use]
    pub fn triggers_settlement(from: UnclearedStatus, to: UnclearedStatus) -> bool {
        from == UnclearedStatus::Uncleared
            && matches!(to, UnclearedStatus::Cleared | UnclearedStatus::Approved)
    }

    /// What deleting a record in `status` must undo.
    #[must_use]
    pub const fn deletion_kind(status: UnclearedStatus) -> DeletionKind {
        if status.is_posted() {
            DeletionKind::ReversePostings
        } else {
            DeletionKind::RevertBillsOnly
        }
    }

    fn settle(
        current: UnclearedStatus,
        target: UnclearedStatus,
    ) -> Result<UnclearedStatus, UnclearedError> {
        match current {
            UnclearedStatus::Uncleared => Ok(target),
            _ => Err(UnclearedError::InvalidTransition {
                from: current,
                to: target,
            }),
        }
    }
}

/// Validates an advance or refund form.
///
/// # Errors
///
/// Returns an error for a bad amount or a missing account.
pub fn validate_wallet_movement(
    input: &WalletMovementInput,
) -> Result<(Decimal, AccountSelection), UnclearedError> {
    let amount = parse_amount(&input.amount)?;
    let account = selected_account(input.account.as_ref())?;
    Ok((amount, account))
}

/// Validates a bill payment form.
///
/// # Errors
///
/// Returns an error when no bill is listed, for a bad amount, or a missing
/// account.
pub fn validate_payment(input: &PaymentInput) -> Result<(Decimal, AccountSelection), UnclearedError> {
    if input.bill_ids.is_empty() {
        return Err(UnclearedError::NoBills);
    }
    let amount = parse_amount(&input.amount)?;
    let account = selected_account(input.account.as_ref())?;
    Ok((amount, account))
}

/// Rejects a refund larger than the balance it comes out of.
///
/// # Errors
///
/// Returns `InsufficientBalance` when `available < requested`.
pub fn ensure_refundable(requested: Decimal, available: Decimal) -> Result<(), UnclearedError> {
    if available < requested {
        return Err(UnclearedError::InsufficientBalance {
            requested,
            available,
        });
    }
    Ok(())
}

fn selected_account(account: Option<&AccountSelection>) -> Result<AccountSelection, UnclearedError> {
    match account {
        Some(a) if !a.name.trim().is_empty() && !a.group.trim().is_empty() => {
            Ok(AccountSelection::new(a.name.trim(), a.group.trim()))
        }
        _ => Err(UnclearedError::MissingAccount),
    }
}
