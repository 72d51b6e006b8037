//! Property-based tests for voucher posting plans.

use chrono::{NaiveDate, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use society_shared::types::{OrganizationId, VoucherId};

use super::effect::EffectResolver;
use super::posting::{plan_voucher_edit, plan_voucher_postings};
use super::types::{AccountSelection, ValidatedVoucher, Voucher, VoucherType};

fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|paise| Decimal::new(paise, 2))
}

fn group_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Bank Accounts".to_string()),
        Just("Cash in Hand".to_string()),
        Just("Maintenance Income".to_string()),
        Just("Direct Expenses".to_string()),
        Just("Sundry Debtors".to_string()),
    ]
}

fn account_strategy() -> impl Strategy<Value = AccountSelection> {
    ("[A-Z][a-z]{2,8}", group_strategy()).prop_map(|(name, group)| AccountSelection::new(name, group))
}

fn voucher(from: AccountSelection, to: AccountSelection, amount: Decimal, day: u32) -> Voucher {
    Voucher::from_validated(
        VoucherId::new("v"),
        OrganizationId::new("org"),
        "VCH-00001".into(),
        ValidatedVoucher {
            voucher_type: VoucherType::Receipt,
            paid_from: from,
            paid_to: to,
            amount,
            narration: String::new(),
            custom_voucher_id: None,
            transaction_date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
        },
        Utc::now(),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// A voucher always produces exactly two postings of its amount.
    #[test]
    fn prop_voucher_posts_two_legs(
        from in account_strategy(),
        to in account_strategy(),
        amount in amount_strategy(),
    ) {
        let plan = plan_voucher_postings(&EffectResolver::default(), &voucher(from, to, amount, 1));
        prop_assert_eq!(plan.len(), 2);
        prop_assert!(plan.ledger_postings().all(|p| p.amount == amount));
    }

    /// After an edit, an account that only the original voucher touched is
    /// left exactly as if the original never happened.
    #[test]
    fn prop_edit_clears_dropped_account(
        from in account_strategy(),
        dropped in account_strategy(),
        replacement in account_strategy(),
        original_amount in amount_strategy(),
        new_amount in amount_strategy(),
    ) {
        prop_assume!(dropped.name != from.name && dropped.name != replacement.name);

        let original = voucher(from.clone(), dropped.clone(), original_amount, 1);
        let edited = voucher(from, replacement, new_amount, 5);
        let plan = plan_voucher_edit(&EffectResolver::default(), &original, &edited, edited.transaction_date);

        prop_assert_eq!(plan.len(), 4);
        prop_assert_eq!(plan.net_ledger_change(&dropped.group, &dropped.name), Decimal::ZERO);
    }

    /// Editing a voucher to identical values is a net no-op on every account.
    #[test]
    fn prop_identity_edit_is_net_zero(
        from in account_strategy(),
        to in account_strategy(),
        amount in amount_strategy(),
    ) {
        let original = voucher(from.clone(), to.clone(), amount, 1);
        let plan = plan_voucher_edit(&EffectResolver::default(), &original, &original, original.transaction_date);

        prop_assert_eq!(plan.net_ledger_change(&from.group, &from.name), Decimal::ZERO);
        prop_assert_eq!(plan.net_ledger_change(&to.group, &to.name), Decimal::ZERO);
    }

    /// The edited legs carry the new amount with the same effects a fresh
    /// voucher with those values would get.
    #[test]
    fn prop_edit_applies_fresh_postings(
        from in account_strategy(),
        to in account_strategy(),
        new_to in account_strategy(),
        amount in amount_strategy(),
        new_amount in amount_strategy(),
    ) {
        let resolver = EffectResolver::default();
        let original = voucher(from.clone(), to, amount, 1);
        let edited = voucher(from, new_to, new_amount, 2);

        let plan = plan_voucher_edit(&resolver, &original, &edited, edited.transaction_date);
        let fresh = plan_voucher_postings(&resolver, &edited);

        let applied: Vec<_> = plan.ledger_postings().skip(2).cloned().collect();
        let expected: Vec<_> = fresh.ledger_postings().cloned().collect();
        prop_assert_eq!(applied, expected);
    }
}
