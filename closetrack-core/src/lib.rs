//! closetrack core — incremental daily-close history for one symbol at a time.
//!
//! - Domain types (market codes, price entries, snapshots)
//! - Quote provider trait and the Yahoo Finance implementation
//! - Snapshot store with atomic replace, and the published-URL index
//! - Refresh engine: resolve -> plan -> fetch with fallback -> merge -> persist

pub mod config;
pub mod data;
pub mod domain;
pub mod refresh;

pub use config::{Config, ConfigError, IndexConfig};
pub use refresh::{refresh, RefreshError, RefreshOutcome, RefreshRequest};
