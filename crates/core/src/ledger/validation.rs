//! Voucher form validation.

use society_shared::types::parse_amount;

use super::error::LedgerError;
use super::types::{AccountSelection, ValidatedVoucher, VoucherInput};

/// Validates a voucher form.
///
/// Checks run in order and the first failure is returned:
/// 1. paid from selected
/// 2. paid to selected
/// 3. amount present and strictly positive
/// 4. both selections carry a group
/// 5. distinct accounts for Journal and transfers
///
/// # Errors
///
/// Returns the first rule the input violates. Nothing is written on failure.
pub fn validate_voucher(input: &VoucherInput) -> Result<ValidatedVoucher, LedgerError> {
    let paid_from = selected(input.paid_from.as_ref()).ok_or(LedgerError::MissingPaidFrom)?;
    let paid_to = selected(input.paid_to.as_ref()).ok_or(LedgerError::MissingPaidTo)?;
    let amount = parse_amount(&input.amount)?;

    for account in [&paid_from, &paid_to] {
        if account.group.trim().is_empty() {
            return Err(LedgerError::MissingAccountGroup(account.name.clone()));
        }
    }

    if input.voucher_type.requires_distinct_accounts() && paid_from.name == paid_to.name {
        return Err(LedgerError::SameAccount {
            voucher_type: input.voucher_type.to_string(),
            account: paid_from.name,
        });
    }

    Ok(ValidatedVoucher {
        voucher_type: input.voucher_type,
        paid_from,
        paid_to,
        amount,
        narration: input.narration.trim().to_string(),
        custom_voucher_id: input
            .custom_voucher_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        transaction_date: input.transaction_date,
    })
}

fn selected(account: Option<&AccountSelection>) -> Option<AccountSelection> {
    let account = account?;
    let name = account.name.trim();
    if name.is_empty() {
        return None;
    }
    Some(AccountSelection::new(name, account.group.trim()))
}
