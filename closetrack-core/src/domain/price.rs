//! PriceEntry — one daily close in a stored series.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily closing price. At most one entry per date within a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceEntry {
    pub date: NaiveDate,
    pub close: f64,
}

impl PriceEntry {
    /// Build an entry with the close rounded to 2 fractional digits.
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            close: round_close(close),
        }
    }
}

/// Round a price to cents.
pub fn round_close(price: f64) -> f64 {
    (price * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_two_decimals() {
        let d = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(PriceEntry::new(d, 150.004).close, 150.0);
        assert_eq!(PriceEntry::new(d, 150.006).close, 150.01);
        assert_eq!(PriceEntry::new(d, 70000.0).close, 70000.0);
    }

    #[test]
    fn missing_close_fails_to_deserialize() {
        let r: Result<PriceEntry, _> = serde_json::from_str(r#"{"date":"2024-05-01"}"#);
        assert!(r.is_err());
        let r: Result<PriceEntry, _> = serde_json::from_str(r#"{"close":1.0}"#);
        assert!(r.is_err());
    }
}
