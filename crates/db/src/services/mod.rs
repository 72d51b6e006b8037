//! Posting services.
//!
//! Services validate input with `society-core`, build posting plans, and
//! execute them through the repositories.

pub mod billing;
pub mod error;
pub mod posting;
pub mod uncleared;
pub mod voucher;

pub use billing::{BillingService, PenaltyQuote};
pub use error::ServiceError;
pub use posting::PostingExecutor;
pub use uncleared::UnclearedBalanceService;
pub use voucher::VoucherService;
