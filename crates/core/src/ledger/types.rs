//! Voucher domain types.
//!
//! A voucher is the persisted record of one Income, Expense, Receipt,
//! Journal, or bank transfer movement between two accounts.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use society_shared::types::{OrganizationId, VoucherId};

/// Voucher type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoucherType {
    /// Money received into the society.
    Income,
    /// Money paid out of the society.
    Expense,
    /// Receipt from a member or party.
    Receipt,
    /// Non-cash adjustment between two accounts.
    Journal,
    /// Movement between two bank or cash accounts.
    #[serde(rename = "Bank-To-Bank-Transfer")]
    BankToBankTransfer,
}

impl VoucherType {
    /// Returns true if both accounts must differ.
    #[must_use]
    pub const fn requires_distinct_accounts(self) -> bool {
        matches!(self, Self::Journal | Self::BankToBankTransfer)
    }

    /// Returns the stored name of the type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Income => "Income",
            Self::Expense => "Expense",
            Self::Receipt => "Receipt",
            Self::Journal => "Journal",
            Self::BankToBankTransfer => "Bank-To-Bank-Transfer",
        }
    }
}

impl std::fmt::Display for VoucherType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An account picked for one side of a voucher, with the group captured at
/// selection time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSelection {
    /// Account name.
    pub name: String,
    /// Account group (category).
    pub group: String,
}

impl AccountSelection {
    /// Creates a selection.
    #[must_use]
    pub fn new(name: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group: group.into(),
        }
    }
}

/// An entry offered when picking accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountOption {
    /// Display label.
    pub label: String,
    /// Account name stored on vouchers.
    pub value: String,
    /// Account group.
    pub group: String,
}

impl From<AccountOption> for AccountSelection {
    fn from(option: AccountOption) -> Self {
        Self {
            name: option.value,
            group: option.group,
        }
    }
}

/// Raw voucher form as entered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoucherInput {
    /// Voucher type.
    pub voucher_type: VoucherType,
    /// Paying account.
    pub paid_from: Option<AccountSelection>,
    /// Receiving account.
    pub paid_to: Option<AccountSelection>,
    /// Amount as typed.
    pub amount: String,
    /// Free text narration.
    #[serde(default)]
    pub narration: String,
    /// Optional user-supplied reference.
    #[serde(default)]
    pub custom_voucher_id: Option<String>,
    /// Transaction date.
    pub transaction_date: NaiveDate,
}

/// Voucher input that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedVoucher {
    /// Voucher type.
    pub voucher_type: VoucherType,
    /// Paying account.
    pub paid_from: AccountSelection,
    /// Receiving account.
    pub paid_to: AccountSelection,
    /// Positive amount rounded to paise.
    pub amount: Decimal,
    /// Narration.
    pub narration: String,
    /// Optional user-supplied reference.
    pub custom_voucher_id: Option<String>,
    /// Transaction date.
    pub transaction_date: NaiveDate,
}

/// Persisted voucher document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voucher {
    /// Document id.
    pub id: VoucherId,
    /// Owning society.
    pub organization_id: OrganizationId,
    /// Voucher type.
    pub voucher_type: VoucherType,
    /// Paying account name.
    pub paid_from: String,
    /// Receiving account name.
    pub paid_to: String,
    /// Group of the paying account.
    pub group_from: String,
    /// Group of the receiving account.
    pub group_to: String,
    /// Narration.
    pub narration: String,
    /// Amount.
    pub amount: Decimal,
    /// Optional user-supplied reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_voucher_id: Option<String>,
    /// Transaction date.
    pub transaction_date: NaiveDate,
    /// Sequential number, fixed at creation.
    pub voucher_number: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last edit timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Voucher {
    /// Builds a new voucher document.
    #[must_use]
    pub fn from_validated(
        id: VoucherId,
        organization_id: OrganizationId,
        voucher_number: String,
        input: ValidatedVoucher,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            organization_id,
            voucher_type: input.voucher_type,
            paid_from: input.paid_from.name,
            paid_to: input.paid_to.name,
            group_from: input.paid_from.group,
            group_to: input.paid_to.group,
            narration: input.narration,
            amount: input.amount,
            custom_voucher_id: input.custom_voucher_id,
            transaction_date: input.transaction_date,
            voucher_number,
            created_at: now,
            updated_at: None,
        }
    }

    /// Returns a copy carrying the edited values.
    ///
    /// Id, organization, voucher number and creation time are kept.
    #[must_use]
    pub fn with_edit(&self, input: ValidatedVoucher, now: DateTime<Utc>) -> Self {
        Self {
            voucher_type: input.voucher_type,
            paid_from: input.paid_from.name,
            paid_to: input.paid_to.name,
            group_from: input.paid_from.group,
            group_to: input.paid_to.group,
            narration: input.narration,
            amount: input.amount,
            custom_voucher_id: input.custom_voucher_id,
            transaction_date: input.transaction_date,
            updated_at: Some(now),
            ..self.clone()
        }
    }

    /// Paying side as a selection.
    #[must_use]
    pub fn from_account(&self) -> AccountSelection {
        AccountSelection::new(&self.paid_from, &self.group_from)
    }

    /// Receiving side as a selection.
    #[must_use]
    pub fn to_account(&self) -> AccountSelection {
        AccountSelection::new(&self.paid_to, &self.group_to)
    }
}

/// Filter for listing vouchers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VoucherFilter {
    /// Only this type.
    #[serde(default)]
    pub voucher_type: Option<VoucherType>,
    /// Earliest transaction date (inclusive).
    #[serde(default)]
    pub from: Option<NaiveDate>,
    /// Latest transaction date (inclusive).
    #[serde(default)]
    pub to: Option<NaiveDate>,
}

impl VoucherFilter {
    /// Returns true if the voucher passes the filter.
    #[must_use]
    pub fn matches(&self, voucher: &Voucher) -> bool {
        self.voucher_type.is_none_or(|t| t == voucher.voucher_type)
            && self.from.is_none_or(|d| voucher.transaction_date >= d)
            && self.to.is_none_or(|d| voucher.transaction_date <= d)
    }
}
