//! Symbol resolution: user ticker + market -> provider identifiers.
//!
//! KR tickers need an exchange suffix the user usually omits. Codes that
//! start with `0` or `1` are mostly KOSPI listings, so `.KS` is tried first
//! for them and `.KQ` first for everything else. The other suffix is kept
//! as the fallback.

use super::error::RefreshError;
use crate::domain::Market;

pub const KOSPI_SUFFIX: &str = ".KS";
pub const KOSDAQ_SUFFIX: &str = ".KQ";

/// Provider identifiers to try, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidates {
    pub primary: String,
    pub fallback: Option<String>,
}

impl Candidates {
    fn single(identifier: String) -> Self {
        Self {
            primary: identifier,
            fallback: None,
        }
    }

    /// Identifiers in attempt order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary.as_str()).chain(self.fallback.as_deref())
    }
}

/// Result of resolving a ticker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Suffix-free symbol used for file identity and display.
    pub symbol: String,
    pub market: Market,
    pub candidates: Candidates,
}

/// Resolve a raw ticker for a market.
///
/// The ticker is trimmed and upper-cased. Empty tickers and tickers with
/// characters outside `[A-Z0-9._^=-]` are rejected.
pub fn resolve(ticker: &str, market: Market) -> Result<Resolution, RefreshError> {
    let ticker = normalize_ticker(ticker)?;

    let (symbol, candidates) = match market {
        Market::Us => (ticker.clone(), Candidates::single(ticker)),
        Market::Kr => match strip_kr_suffix(&ticker) {
            Some(base) => (base.to_string(), Candidates::single(ticker.clone())),
            None => {
                let (first, second) = if starts_like_kospi(&ticker) {
                    (KOSPI_SUFFIX, KOSDAQ_SUFFIX)
                } else {
                    (KOSDAQ_SUFFIX, KOSPI_SUFFIX)
                };
                let candidates = Candidates {
                    primary: format!("{ticker}{first}"),
                    fallback: Some(format!("{ticker}{second}")),
                };
                (ticker, candidates)
            }
        },
    };

    Ok(Resolution {
        symbol,
        market,
        candidates,
    })
}

fn normalize_ticker(raw: &str) -> Result<String, RefreshError> {
    let ticker = raw.trim().to_ascii_uppercase();
    if ticker.is_empty() {
        return Err(RefreshError::Validation("ticker is empty".into()));
    }
    if let Some(bad) = ticker
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '^' | '=')))
    {
        return Err(RefreshError::Validation(format!(
            "ticker '{raw}' contains invalid character '{bad}'"
        )));
    }
    Ok(ticker)
}

/// Base code if the ticker already names its KRX board.
fn strip_kr_suffix(ticker: &str) -> Option<&str> {
    ticker
        .strip_suffix(KOSPI_SUFFIX)
        .or_else(|| ticker.strip_suffix(KOSDAQ_SUFFIX))
        .filter(|base| !base.is_empty())
}

fn starts_like_kospi(ticker: &str) -> bool {
    matches!(ticker.chars().next(), Some('0' | '1'))
}
