//! Per-flat bill types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use society_shared::types::{BillId, FlatId, TransactionId};

use super::error::BillingError;
use crate::ledger::AccountSelection;
use crate::uncleared::PaymentMode;

/// Bill status.
///
/// Valid transitions:
/// - Unpaid → PendingApproval (member submits payment)
/// - Unpaid | PendingApproval → Paid (settlement)
/// - PendingApproval | Paid → Unpaid (payment deleted)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BillStatus {
    /// Not paid.
    #[default]
    #[serde(rename = "unpaid")]
    Unpaid,
    /// Payment submitted, waiting for admin verification.
    #[serde(rename = "Pending Approval")]
    PendingApproval,
    /// Settled.
    #[serde(rename = "paid")]
    Paid,
}

impl BillStatus {
    /// Returns true if the bill can still be settled.
    #[must_use]
    pub const fn is_settleable(self) -> bool {
        matches!(self, Self::Unpaid | Self::PendingApproval)
    }
}

/// Occupancy type of a flat, selecting which item amount applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FlatType {
    /// Closed (unoccupied) unit.
    Closed,
    /// Rented unit.
    Rent,
    /// Owner occupied unit.
    #[default]
    Owner,
}

/// One charge line of a bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillItem {
    /// Display name.
    pub name: String,
    /// Receivable ledger account.
    pub ledger_account: String,
    /// Group of the receivable ledger account.
    pub ledger_group: String,
    /// Amount for closed units.
    pub closed_unit_amount: Decimal,
    /// Amount for rented units.
    pub rent_amount: Decimal,
    /// Amount for owner occupied units.
    pub owner_amount: Decimal,
}

impl BillItem {
    /// Returns the amount charged to a flat of the given type.
    #[must_use]
    pub const fn amount_for(&self, flat_type: FlatType) -> Decimal {
        match flat_type {
            FlatType::Closed => self.closed_unit_amount,
            FlatType::Rent => self.rent_amount,
            FlatType::Owner => self.owner_amount,
        }
    }

    /// Receivable account of the item.
    #[must_use]
    pub fn account(&self) -> AccountSelection {
        AccountSelection::new(&self.ledger_account, &self.ledger_group)
    }
}

/// Whether a penalty is charged once or repeatedly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PenaltyOccurrence {
    /// Charged once after the due date.
    OneTime,
    /// Charged again every `frequency_days` days.
    Recurring,
}

/// How one penalty unit is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PenaltyType {
    /// Flat amount per unit.
    Fixed,
    /// Percentage of the bill amount per unit.
    Percentage,
}

/// Late payment penalty settings of a bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenaltyConfig {
    /// Master switch.
    pub enabled: bool,
    /// One-time or recurring.
    pub occurrence: PenaltyOccurrence,
    /// Days between recurring charges.
    #[serde(default)]
    pub frequency_days: Option<u32>,
    /// Fixed or percentage.
    pub penalty_type: PenaltyType,
    /// Amount or percentage per unit.
    pub value: Decimal,
    /// Ledger account the penalty is credited to.
    pub ledger_account: String,
    /// Group of the penalty ledger account.
    pub ledger_group: String,
}

impl PenaltyConfig {
    /// Penalty ledger account.
    #[must_use]
    pub fn account(&self) -> AccountSelection {
        AccountSelection::new(&self.ledger_account, &self.ledger_group)
    }
}

/// Payment fields written on settlement and stripped on reversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillPayment {
    /// Principal plus penalty settled.
    pub paid_amount: Decimal,
    /// Penalty part of `paid_amount`.
    pub penalty_amount: Decimal,
    /// Settlement date.
    pub paid_on: NaiveDate,
    /// Voucher number of the settling record.
    pub voucher_number: String,
    /// Settling uncleared balance record.
    pub transaction_id: TransactionId,
    /// Payment mode.
    pub payment_mode: PaymentMode,
}

/// A bill raised against a flat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bill {
    /// Bill id.
    pub id: BillId,
    /// Billed flat.
    pub flat_id: FlatId,
    /// Status.
    pub status: BillStatus,
    /// Charge lines.
    pub items: Vec<BillItem>,
    /// Amount billed for the flat's type at generation.
    pub amount: Decimal,
    /// Due date.
    pub due_date: NaiveDate,
    /// Optional penalty settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub penalty: Option<PenaltyConfig>,
    /// Payment details, present only once payment was recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<BillPayment>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Input for storing a generated bill.
#[derive(Debug, Clone, Deserialize)]
pub struct NewBill {
    /// Optional id; generated when absent.
    #[serde(default)]
    pub id: Option<BillId>,
    /// Charge lines.
    pub items: Vec<BillItem>,
    /// Due date.
    pub due_date: NaiveDate,
    /// Optional penalty settings.
    #[serde(default)]
    pub penalty: Option<PenaltyConfig>,
}

impl Bill {
    /// Builds an unpaid bill for a flat of the given type.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no items, an item amount is negative,
    /// or the penalty value is negative.
    pub fn new(
        flat_id: FlatId,
        flat_type: FlatType,
        input: NewBill,
        now: DateTime<Utc>,
    ) -> Result<Self, BillingError> {
        if input.items.is_empty() {
            return Err(BillingError::NoItems);
        }
        if let Some(item) = input.items.iter().find(|i| {
            i.closed_unit_amount < Decimal::ZERO
                || i.rent_amount < Decimal::ZERO
                || i.owner_amount < Decimal::ZERO
        }) {
            return Err(BillingError::NegativeItemAmount(item.name.clone()));
        }
        if let Some(penalty) = &input.penalty
            && penalty.value < Decimal::ZERO
        {
            return Err(BillingError::InvalidPenalty(
                "penalty value cannot be negative".to_string(),
            ));
        }

        let mut bill = Self {
            id: input.id.unwrap_or_else(BillId::generate),
            flat_id,
            status: BillStatus::Unpaid,
            items: input.items,
            amount: Decimal::ZERO,
            due_date: input.due_date,
            penalty: input.penalty,
            payment: None,
            created_at: now,
        };
        bill.amount = bill.receivable_total(flat_type);
        Ok(bill)
    }

    /// Sum of item amounts for a flat type.
    #[must_use]
    pub fn receivable_total(&self, flat_type: FlatType) -> Decimal {
        self.items.iter().map(|i| i.amount_for(flat_type)).sum()
    }

    /// Marks the bill paid with the given payment details.
    pub fn mark_paid(&mut self, payment: BillPayment) {
        self.status = BillStatus::Paid;
        self.payment = Some(payment);
    }

    /// Returns the bill to unpaid and strips every payment field.
    pub fn revert_to_unpaid(&mut self) {
        self.status = BillStatus::Unpaid;
        self.payment = None;
    }
}
