//! Quote provider trait and structured error types.
//!
//! The DataProvider trait abstracts over the quote source so the refresh
//! engine can be driven by Yahoo Finance in production and by a scripted
//! provider in tests.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One daily row as returned by a provider, before filtering.
///
/// `close` is `None` when the provider reported the day without a closing
/// price (halts, partial sessions).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawQuote {
    pub date: NaiveDate,
    pub close: Option<f64>,
}

/// Structured error types for provider calls.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {identifier}")]
    SymbolNotFound { identifier: String },

    #[error("HTTP {status} for {identifier}")]
    Http { status: u16, identifier: String },

    #[error("data error: {0}")]
    Other(String),
}

/// Rows returned for one identifier over one window.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub identifier: String,
    pub quotes: Vec<RawQuote>,
}

/// Trait for quote providers.
///
/// `end` is exclusive. An `Ok` result with no quotes and an `Err` are both
/// "no data" to the engine; providers may return either.
pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily closes for an identifier over `[start, end)`.
    fn fetch(
        &self,
        identifier: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError>;
}
