//! Persistence and posting services for the society ledger.
//!
//! This crate provides:
//! - A hierarchical document store abstraction with an in-memory backend
//! - Repositories for vouchers, bills, uncleared balances, and balance series
//! - Services that execute posting plans against the store

pub mod repositories;
pub mod services;
pub mod store;

pub use services::{BillingService, ServiceError, UnclearedBalanceService, VoucherService};
pub use store::{DocumentStore, InMemoryDocumentStore, StoreError};
