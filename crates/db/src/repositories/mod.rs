//! Repositories over the document store.
//!
//! Each repository owns one kind of document and hides its path layout
//! (see [`paths`]) from the services.

pub mod account;
pub mod bill;
pub mod counter;
pub mod flat;
pub mod flat_balance;
pub mod ledger_balance;
pub mod paths;
pub mod series;
pub mod uncleared;
pub mod voucher;

pub use account::AccountRepository;
pub use bill::BillRepository;
pub use counter::{StoreVoucherNumbers, VoucherNumberGenerator};
pub use flat::{FlatRecord, FlatRepository};
pub use flat_balance::FlatBalanceRepository;
pub use ledger_balance::LedgerBalanceRepository;
pub use series::{BalanceSeriesStore, SeriesHead};
pub use uncleared::{UnclearedRepository, random_transaction_id};
pub use voucher::VoucherRepository;
