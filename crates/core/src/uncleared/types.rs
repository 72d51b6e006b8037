//! Uncleared balance record types.
//!
//! An uncleared balance record is a money movement tied to one flat: an
//! advance into the wallet, a refund out of it, or a payment settling bills.
//! Member-submitted payments start `Uncleared` and wait for an admin;
//! admin-entered records are `Cleared` from the start.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use society_shared::types::{BillId, FlatId, OrganizationId, TransactionId};
use std::fmt;

use crate::billing::{Bill, BillCharge, BillStatus, FlatType};
use crate::ledger::{AccountSelection, FlatSeries};

/// Record status.
///
/// Valid transitions:
/// - Uncleared → Cleared (clear)
/// - Uncleared → Approved (approve)
/// - Cleared | Approved → CheckedOut (check out)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnclearedStatus {
    /// Submitted, not yet verified.
    Uncleared,
    /// Verified and posted.
    Cleared,
    /// Approved and posted.
    Approved,
    /// Closed out, terminal.
    CheckedOut,
}

impl UnclearedStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uncleared => "Uncleared",
            Self::Cleared => "Cleared",
            Self::Approved => "Approved",
            Self::CheckedOut => "CheckedOut",
        }
    }

    /// Returns true once the record's postings have been applied.
    #[must_use]
    pub const fn is_posted(self) -> bool {
        !matches!(self, Self::Uncleared)
    }
}

impl fmt::Display for UnclearedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of money movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnclearedType {
    /// Money paid into the flat's wallet or deposit.
    Advance,
    /// Money paid back out of the wallet or deposit.
    Refund,
    /// Payment settling one or more bills.
    #[serde(rename = "Bill Settlement")]
    BillSettlement,
}

/// How the money moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaymentMode {
    /// Cash.
    #[default]
    Cash,
    /// Cheque.
    Cheque,
    /// Bank transfer (NEFT/RTGS/IMPS).
    #[serde(rename = "Bank Transfer")]
    BankTransfer,
    /// UPI.
    #[serde(rename = "UPI")]
    Upi,
}

/// Where a record was entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordOrigin {
    /// Entered by a society admin.
    Admin,
    /// Submitted by a member.
    Member,
}

/// Cheque or bank reference details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChequeDetails {
    /// Issuing bank.
    pub bank_name: String,
    /// Cheque or reference number.
    pub reference_number: String,
    /// Date on the cheque.
    #[serde(default)]
    pub cheque_date: Option<NaiveDate>,
}

/// Form for an advance or a refund.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletMovementInput {
    /// Amount as typed.
    pub amount: String,
    /// Account the money moved through.
    pub account: Option<AccountSelection>,
    /// Payment mode.
    #[serde(default)]
    pub payment_mode: PaymentMode,
    /// Optional cheque details.
    #[serde(default)]
    pub cheque: Option<ChequeDetails>,
    /// Targets the deposit series instead of the wallet.
    #[serde(default)]
    pub is_deposit: bool,
    /// Transaction date.
    pub transaction_date: NaiveDate,
    /// Narration.
    #[serde(default)]
    pub narration: String,
}

/// Form for a bill payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInput {
    /// Bills being paid.
    pub bill_ids: Vec<BillId>,
    /// Amount received as typed.
    pub amount: String,
    /// Account the money was received into.
    pub account: Option<AccountSelection>,
    /// Payment mode.
    #[serde(default)]
    pub payment_mode: PaymentMode,
    /// Optional cheque details.
    #[serde(default)]
    pub cheque: Option<ChequeDetails>,
    /// Transaction date.
    pub transaction_date: NaiveDate,
    /// Narration.
    #[serde(default)]
    pub narration: String,
}

/// Persisted uncleared balance record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnclearedBalance {
    /// Collision-checked id, also the document id.
    pub transaction_id: TransactionId,
    /// Owning society.
    pub organization_id: OrganizationId,
    /// Flat the money belongs to.
    pub flat_id: FlatId,
    /// Status.
    pub status: UnclearedStatus,
    /// Movement kind.
    pub record_type: UnclearedType,
    /// Amount of the movement (bills total for settlements).
    pub amount: Decimal,
    /// Money actually received or paid out.
    pub amount_received: Decimal,
    /// Payment account name.
    pub ledger_account: String,
    /// Payment account group.
    pub ledger_group: String,
    /// Payment mode.
    pub payment_mode: PaymentMode,
    /// Voucher number.
    pub voucher_number: String,
    /// Where the record was entered.
    pub origin: RecordOrigin,
    /// Optional cheque details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cheque: Option<ChequeDetails>,
    /// Bills this record settles.
    #[serde(default)]
    pub bill_ids: Vec<BillId>,
    /// Targets the deposit series.
    #[serde(default)]
    pub is_deposit: bool,
    /// Signed wallet movement: positive credits, negative debits.
    #[serde(default)]
    pub current_balance_portion: Decimal,
    /// Flat type the bills were settled at.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flat_type: Option<FlatType>,
    /// Per-bill charges recorded at settlement.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub charges: Vec<BillCharge>,
    /// Transaction date.
    pub transaction_date: NaiveDate,
    /// Date the postings were applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settled_at: Option<NaiveDate>,
    /// Narration.
    #[serde(default)]
    pub narration: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl UnclearedBalance {
    /// Payment account as a selection.
    #[must_use]
    pub fn account(&self) -> AccountSelection {
        AccountSelection::new(&self.ledger_account, &self.ledger_group)
    }

    /// Flat series advances and refunds post to.
    #[must_use]
    pub const fn series(&self) -> FlatSeries {
        FlatSeries::for_deposit(self.is_deposit)
    }

    /// Date the postings were (or will be) applied.
    #[must_use]
    pub fn posting_date(&self) -> NaiveDate {
        self.settled_at.unwrap_or(self.transaction_date)
    }

    /// Returns true if `bill` is currently tied up by this record.
    ///
    /// A posted record holds the bills it paid. A pending record holds its
    /// bills only while they still await approval; a bill settled since by
    /// another record is not released when this one goes.
    #[must_use]
    pub fn holds_bill(&self, bill: &Bill) -> bool {
        if !self.bill_ids.contains(&bill.id) {
            return false;
        }
        match (&bill.payment, self.status.is_posted()) {
            (Some(payment), true) => payment.transaction_id == self.transaction_id,
            (None, false) => bill.status == BillStatus::PendingApproval,
            _ => false,
        }
    }
}
