//! Common types used across the application.

pub mod amount;
pub mod id;
pub mod pagination;

pub use amount::{AmountError, parse_amount, round_money};
pub use id::*;
pub use pagination::{PageMeta, PageRequest, PageResponse};
