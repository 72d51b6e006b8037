//! Property-based tests for voucher validation rules.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::{AccountSelection, VoucherInput, VoucherType};
use super::validation::validate_voucher;

/// Strategy to generate a valid positive amount (> 0).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|paise| Decimal::new(paise, 2))
}

/// Strategy to generate a zero or negative amount.
fn non_positive_amount() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000i64).prop_map(|paise| Decimal::new(-paise, 2))
}

fn voucher_type_strategy() -> impl Strategy<Value = VoucherType> {
    prop_oneof![
        Just(VoucherType::Income),
        Just(VoucherType::Expense),
        Just(VoucherType::Receipt),
        Just(VoucherType::Journal),
        Just(VoucherType::BankToBankTransfer),
    ]
}

fn form(voucher_type: VoucherType, from: &str, to: &str, amount: String) -> VoucherInput {
    VoucherInput {
        voucher_type,
        paid_from: Some(AccountSelection::new(from, "Sundry Debtors")),
        paid_to: Some(AccountSelection::new(to, "Bank Accounts")),
        amount,
        narration: String::new(),
        custom_voucher_id: None,
        transaction_date: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Any positive amount between distinct accounts validates, and the
    /// stored amount equals the entered amount.
    #[test]
    fn prop_positive_amount_accepted(
        voucher_type in voucher_type_strategy(),
        amount in positive_amount(),
    ) {
        let result = validate_voucher(&form(voucher_type, "A-101", "HDFC", amount.to_string()));
        prop_assert!(result.is_ok());
        prop_assert_eq!(result.unwrap().amount, amount);
    }

    /// Zero and negative amounts never validate.
    #[test]
    fn prop_non_positive_amount_rejected(
        voucher_type in voucher_type_strategy(),
        amount in non_positive_amount(),
    ) {
        let result = validate_voucher(&form(voucher_type, "A-101", "HDFC", amount.to_string()));
        prop_assert!(matches!(result, Err(LedgerError::InvalidAmount(_))));
    }

    /// Same-account vouchers are rejected exactly for Journal and transfers.
    #[test]
    fn prop_same_account_only_rejected_when_distinct_required(
        voucher_type in voucher_type_strategy(),
        account in "[A-Z][a-z]{2,12}",
        amount in positive_amount(),
    ) {
        let result = validate_voucher(&form(voucher_type, &account, &account, amount.to_string()));
        let rejected = matches!(result, Err(LedgerError::SameAccount { .. }));
        prop_assert_eq!(rejected, voucher_type.requires_distinct_accounts());
    }
}
