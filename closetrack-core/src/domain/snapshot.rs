//! Snapshot — the persisted per-(symbol, market) close history.
//!
//! File format:
//!
//! ```json
//! {
//!   "ticker": "005930",
//!   "market": "KR",
//!   "yfinance_ticker_used": "005930.KQ",
//!   "updated": "2024-05-03T09:15:02",
//!   "history": [ { "date": "2024-05-01", "close": 70000.0 } ]
//! }
//! ```

use super::market::Market;
use super::price::PriceEntry;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Second-precision timestamp format of the `updated` field.
pub const UPDATED_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Base symbol, no exchange suffix.
    pub ticker: String,
    pub market: Market,
    /// Provider identifier used for the latest successful fetch.
    /// Older files may lack it.
    #[serde(default)]
    pub yfinance_ticker_used: String,
    #[serde(default)]
    pub updated: String,
    /// Strictly ascending by date when written by this crate.
    pub history: Vec<PriceEntry>,
}

impl Snapshot {
    pub fn new(
        ticker: impl Into<String>,
        market: Market,
        identifier: impl Into<String>,
        updated: NaiveDateTime,
        history: Vec<PriceEntry>,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            market,
            yfinance_ticker_used: identifier.into(),
            updated: updated.format(UPDATED_FORMAT).to_string(),
            history,
        }
    }

    /// Latest stored date. Does not assume the history is sorted.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.history.iter().map(|e| e.date).max()
    }

    /// Whether this snapshot was written for the given symbol and market.
    pub fn belongs_to(&self, symbol: &str, market: Market) -> bool {
        self.market == market && self.ticker.eq_ignore_ascii_case(symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn serializes_with_file_field_names() {
        let snap = Snapshot::new(
            "AAPL",
            Market::Us,
            "AAPL",
            d(2024, 5, 3).and_hms_opt(9, 15, 2).unwrap(),
            vec![PriceEntry::new(d(2024, 5, 1), 150.0)],
        );
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["ticker"], "AAPL");
        assert_eq!(json["market"], "US");
        assert_eq!(json["yfinance_ticker_used"], "AAPL");
        assert_eq!(json["updated"], "2024-05-03T09:15:02");
        assert_eq!(json["history"][0]["date"], "2024-05-01");
        assert_eq!(json["history"][0]["close"], 150.0);
    }

    #[test]
    fn legacy_file_without_identifier_loads() {
        let raw = r#"{"ticker":"TSLA","market":"US","updated":"2024-05-01","history":[]}"#;
        let snap: Snapshot = serde_json::from_str(raw).unwrap();
        assert_eq!(snap.yfinance_ticker_used, "");
        assert!(snap.history.is_empty());
    }

    #[test]
    fn last_date_ignores_order() {
        let mut snap = Snapshot::new("X", Market::Us, "X", d(2024, 1, 1).and_hms_opt(0, 0, 0).unwrap(), vec![]);
        assert_eq!(snap.last_date(), None);
        snap.history = vec![
            PriceEntry::new(d(2024, 5, 2), 1.0),
            PriceEntry::new(d(2024, 5, 1), 1.0),
        ];
        assert_eq!(snap.last_date(), Some(d(2024, 5, 2)));
    }

    #[test]
    fn belongs_to_checks_symbol_and_market() {
        let snap = Snapshot::new("005930", Market::Kr, "005930.KS", d(2024, 1, 1).and_hms_opt(0, 0, 0).unwrap(), vec![]);
        assert!(snap.belongs_to("005930", Market::Kr));
        assert!(!snap.belongs_to("005930", Market::Us));
        assert!(!snap.belongs_to("000660", Market::Kr));
    }
}
