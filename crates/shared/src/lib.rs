//! Shared types and configuration for the society ledger.
//!
//! This crate provides common types used across all other crates:
//! - Amount parsing and rounding with decimal precision
//! - Typed IDs for type-safe document references
//! - Pagination types for list endpoints
//! - Configuration management

pub mod config;
pub mod types;

pub use config::{AppConfig, LedgerSettings, ServerConfig};
