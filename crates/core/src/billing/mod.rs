//! Bills, late payment penalties, and bill settlement.

pub mod bill;
pub mod error;
pub mod penalty;
pub mod settlement;

#[cfg(test)]
mod penalty_props;

pub use bill::{
    Bill, BillItem, BillPayment, BillStatus, FlatType, NewBill, PenaltyConfig, PenaltyOccurrence,
    PenaltyType,
};
pub use error::BillingError;
pub use penalty::{bill_penalty, calculate_penalty};
pub use settlement::{
    BillCharge, Settlement, SettlementAccounts, plan_settlement, replay_settlement, residual_plan,
};
