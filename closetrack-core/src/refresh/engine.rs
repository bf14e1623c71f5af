//! Refresh orchestration: resolve -> plan -> fetch (with fallback) -> merge -> persist.

use super::error::RefreshError;
use super::merge::{merge_history, usable_entries};
use super::planner::{plan, FetchWindow, Plan, MAX_LOOKBACK_DAYS};
use super::resolver::{resolve, Candidates};
use crate::data::{DataProvider, SnapshotStore};
use crate::domain::{Market, PriceEntry, Snapshot};
use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;
use std::path::PathBuf;
use tracing::{info, warn};

/// One refresh invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshRequest {
    pub ticker: String,
    pub market: Market,
    /// Days fetched when nothing usable is stored.
    pub lookback_days: u32,
    /// Processing time. Its date is the exclusive end of the fetch window.
    pub as_of: NaiveDateTime,
}

impl RefreshRequest {
    /// Validate raw inputs before any I/O happens.
    pub fn new(
        ticker: impl Into<String>,
        market_code: &str,
        lookback_days: u32,
        as_of: NaiveDateTime,
    ) -> Result<Self, RefreshError> {
        let market = market_code
            .parse::<Market>()
            .map_err(|e| RefreshError::Validation(e.to_string()))?;
        if lookback_days == 0 {
            return Err(RefreshError::Validation(
                "lookback days must be at least 1".into(),
            ));
        }
        if lookback_days > MAX_LOOKBACK_DAYS {
            return Err(RefreshError::Validation(format!(
                "lookback days must be at most {MAX_LOOKBACK_DAYS}, got {lookback_days}"
            )));
        }
        Ok(Self {
            ticker: ticker.into(),
            market,
            lookback_days,
            as_of,
        })
    }

    pub fn today(&self) -> NaiveDate {
        self.as_of.date()
    }
}

/// Successful end states of a refresh.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// Nothing to fetch; the snapshot was not touched.
    UpToDate {
        symbol: String,
        market: Market,
        last_date: NaiveDate,
        path: PathBuf,
    },
    /// New rows were fetched and merged.
    Updated {
        symbol: String,
        market: Market,
        identifier: String,
        added: usize,
        total: usize,
        path: PathBuf,
    },
    /// The provider had nothing; stored history was rewritten unchanged.
    Degraded {
        symbol: String,
        market: Market,
        identifier: String,
        total: usize,
        path: PathBuf,
    },
}

impl RefreshOutcome {
    pub fn symbol(&self) -> &str {
        match self {
            RefreshOutcome::UpToDate { symbol, .. }
            | RefreshOutcome::Updated { symbol, .. }
            | RefreshOutcome::Degraded { symbol, .. } => symbol,
        }
    }

    pub fn market(&self) -> Market {
        match self {
            RefreshOutcome::UpToDate { market, .. }
            | RefreshOutcome::Updated { market, .. }
            | RefreshOutcome::Degraded { market, .. } => *market,
        }
    }

    /// Whether a snapshot write happened.
    pub fn wrote_snapshot(&self) -> bool {
        !matches!(self, RefreshOutcome::UpToDate { .. })
    }
}

impl fmt::Display for RefreshOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshOutcome::UpToDate { symbol, market, last_date, path } => write!(
                f,
                "{symbol} ({market}) already up to date through {last_date}: {}",
                path.display()
            ),
            RefreshOutcome::Updated { symbol, market, identifier, added, total, path } => write!(
                f,
                "{symbol} ({market}) updated via {identifier}: +{added} new, {total} total -> {}",
                path.display()
            ),
            RefreshOutcome::Degraded { symbol, market, total, path, .. } => write!(
                f,
                "{symbol} ({market}) no new data, kept {total} stored -> {}",
                path.display()
            ),
        }
    }
}

/// Fetched rows and the identifier that produced them.
#[derive(Debug)]
struct FetchAttempt {
    identifier: Option<String>,
    entries: Vec<PriceEntry>,
    attempted: Vec<String>,
}

/// Try the primary identifier, then the fallback once if the primary gave nothing.
///
/// Provider errors and empty results are treated the same.
fn fetch_with_fallback(
    provider: &dyn DataProvider,
    candidates: &Candidates,
    window: FetchWindow,
) -> FetchAttempt {
    let mut attempted = Vec::new();

    for identifier in candidates.iter() {
        attempted.push(identifier.to_string());

        let entries = match provider.fetch(identifier, window.start, window.end) {
            Ok(result) => usable_entries(&result.quotes, window.end),
            Err(e) => {
                warn!(
                    provider = provider.name(),
                    identifier,
                    start = %window.start,
                    end = %window.end,
                    error = %e,
                    "fetch failed"
                );
                continue;
            }
        };

        if entries.is_empty() {
            warn!(
                provider = provider.name(),
                identifier,
                start = %window.start,
                end = %window.end,
                "fetch returned no usable rows"
            );
            continue;
        }

        info!(identifier, rows = entries.len(), "fetched");
        return FetchAttempt {
            identifier: Some(identifier.to_string()),
            entries,
            attempted,
        };
    }

    FetchAttempt {
        identifier: None,
        entries: Vec::new(),
        attempted,
    }
}

/// Bring the stored series for one symbol up to date.
pub fn refresh(
    provider: &dyn DataProvider,
    store: &dyn SnapshotStore,
    request: &RefreshRequest,
) -> Result<RefreshOutcome, RefreshError> {
    let resolution = resolve(&request.ticker, request.market)?;
    let symbol = resolution.symbol;
    let market = resolution.market;
    let today = request.today();
    let path = store.location(market, &symbol);

    let prior = store.load(market, &symbol);
    let (window, prior, prior_identifier) =
        match plan(prior, &symbol, market, today, request.lookback_days) {
            Plan::UpToDate { last_date } => {
                info!(%symbol, %market, %last_date, "already up to date, skipping fetch");
                return Ok(RefreshOutcome::UpToDate {
                    symbol,
                    market,
                    last_date,
                    path,
                });
            }
            Plan::Fetch {
                window,
                prior,
                prior_identifier,
            } => (window, prior, prior_identifier),
        };

    info!(
        %symbol,
        %market,
        start = %window.start,
        end = %window.end,
        stored = prior.len(),
        "fetching"
    );
    let attempt = fetch_with_fallback(provider, &resolution.candidates, window);

    let (identifier, merged, degraded) = match attempt.identifier {
        Some(identifier) => (identifier, merge_history(&prior, &attempt.entries), false),
        None if prior.is_empty() => {
            return Err(RefreshError::NoData {
                symbol,
                market: market.to_string(),
                attempted: attempt.attempted,
                start: window.start,
                end: window.end,
            });
        }
        None => {
            warn!(
                %symbol,
                %market,
                path = %path.display(),
                attempted = %attempt.attempted.join(","),
                "no new data from provider, rewriting stored history"
            );
            let identifier =
                prior_identifier.unwrap_or_else(|| resolution.candidates.primary.clone());
            (identifier, merge_history(&prior, &[]), true)
        }
    };

    let total = merged.history.len();
    let snapshot = Snapshot::new(
        symbol.clone(),
        market,
        identifier.clone(),
        request.as_of,
        merged.history,
    );
    let path = store.replace(&snapshot)?;
    info!(%symbol, %market, path = %path.display(), total, added = merged.added, "snapshot written");

    Ok(if degraded {
        RefreshOutcome::Degraded {
            symbol,
            market,
            identifier,
            total,
            path,
        }
    } else {
        RefreshOutcome::Updated {
            symbol,
            market,
            identifier,
            added: merged.added,
            total,
            path,
        }
    })
}
