//! Range planning: decide what still needs fetching given the prior snapshot.

use crate::data::PriorSnapshot;
use crate::domain::{Market, PriceEntry};
use chrono::{Duration, NaiveDate};
use tracing::warn;

/// Largest accepted lookback, roughly a century of calendar days.
pub const MAX_LOOKBACK_DAYS: u32 = 36_500;

/// Date range requested from the provider. `end` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl FetchWindow {
    /// Full lookback window ending at `today`. Clamps at the earliest
    /// representable date instead of overflowing.
    pub fn lookback(today: NaiveDate, lookback_days: u32) -> Self {
        let start = today
            .checked_sub_signed(Duration::days(i64::from(lookback_days)))
            .unwrap_or(NaiveDate::MIN);
        Self { start, end: today }
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// What the rest of the run should do.
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    /// Stored history already reaches the day before `today`.
    UpToDate { last_date: NaiveDate },
    Fetch {
        window: FetchWindow,
        /// Trusted prior history, empty on first run or after corruption.
        prior: Vec<PriceEntry>,
        /// Identifier recorded in the prior snapshot, if any.
        prior_identifier: Option<String>,
    },
}

/// Derive the fetch plan for `(symbol, market)` as of `today`.
///
/// Unparseable or mismatched snapshots are discarded with a warning and
/// planned as a first run.
pub fn plan(
    prior: PriorSnapshot,
    symbol: &str,
    market: Market,
    today: NaiveDate,
    lookback_days: u32,
) -> Plan {
    let full = |prior_identifier: Option<String>| Plan::Fetch {
        window: FetchWindow::lookback(today, lookback_days),
        prior: Vec::new(),
        prior_identifier,
    };

    let snapshot = match prior {
        PriorSnapshot::Missing => return full(None),
        PriorSnapshot::Corrupt { path, reason } => {
            warn!(
                path = %path.display(),
                %reason,
                lookback_days,
                "prior snapshot unreadable, refetching full window"
            );
            return full(None);
        }
        PriorSnapshot::Loaded(snapshot) => snapshot,
    };

    if !snapshot.belongs_to(symbol, market) {
        warn!(
            symbol,
            %market,
            stored_symbol = %snapshot.ticker,
            stored_market = %snapshot.market,
            "prior snapshot belongs to another series, refetching full window"
        );
        return full(None);
    }

    let prior_identifier = Some(snapshot.yfinance_ticker_used.clone()).filter(|s| !s.is_empty());

    let Some(last_date) = snapshot.last_date() else {
        return full(prior_identifier);
    };

    let Some(start) = last_date.succ_opt() else {
        warn!(
            symbol,
            %market,
            %last_date,
            "prior snapshot has an out-of-range date, refetching full window"
        );
        return full(None);
    };

    let window = FetchWindow { start, end: today };
    if window.is_empty() {
        return Plan::UpToDate { last_date };
    }

    Plan::Fetch {
        window,
        prior: snapshot.history,
        prior_identifier,
    }
}
