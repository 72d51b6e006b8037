//! Core business logic for the society ledger.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `ledger` - Effect resolution, dated balances, vouchers and posting plans
//! - `billing` - Bills, penalties, and bill settlement
//! - `uncleared` - Advance, refund, and settlement record lifecycle

pub mod billing;
pub mod ledger;
pub mod uncleared;
