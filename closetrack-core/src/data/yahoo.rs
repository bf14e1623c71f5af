//! Yahoo Finance quote provider.
//!
//! Fetches daily closes from Yahoo's v8 chart API. One HTTP request per
//! `fetch`; the engine's fallback identifier is the only retry.
//!
//! Yahoo Finance has no official API and is subject to unannounced format changes.

use super::provider::{DataError, DataProvider, FetchResult, RawQuote};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use std::time::Duration;

const CHART_BASE_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    /// Exchange offset from UTC in seconds (32400 for KRX).
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Yahoo Finance quote provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl YahooProvider {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: CHART_BASE_URL.to_string(),
        })
    }

    /// Point the provider at a different chart endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Build the chart API URL. Both bounds are midnight UTC, so `end` is exclusive.
    fn chart_url(&self, identifier: &str, start: NaiveDate, end: NaiveDate) -> String {
        let start_ts = midnight_ts(start);
        let end_ts = midnight_ts(end);
        format!(
            "{}/{identifier}?period1={start_ts}&period2={end_ts}&interval=1d",
            self.base_url
        )
    }

    /// Parse the chart API response into raw quotes.
    fn parse_response(identifier: &str, resp: ChartResponse) -> Result<Vec<RawQuote>, DataError> {
        let result = resp.chart.result.ok_or_else(|| {
            if let Some(err) = resp.chart.error {
                if err.code == "Not Found" {
                    DataError::SymbolNotFound {
                        identifier: identifier.to_string(),
                    }
                } else {
                    DataError::ResponseFormatChanged(format!("{}: {}", err.code, err.description))
                }
            } else {
                DataError::ResponseFormatChanged("empty result with no error".into())
            }
        })?;

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("result array is empty".into()))?;

        // No timestamps means no sessions in the window.
        let Some(timestamps) = data.timestamp else {
            return Ok(Vec::new());
        };

        let offset = data.meta.and_then(|m| m.gmtoffset).unwrap_or(0);

        let closes = data
            .indicators
            .quote
            .into_iter()
            .next()
            .map(|q| q.close)
            .unwrap_or_default();

        let mut quotes = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            let date = chrono::DateTime::from_timestamp(ts + offset, 0)
                .map(|dt| dt.naive_utc().date())
                .ok_or_else(|| {
                    DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}"))
                })?;

            quotes.push(RawQuote {
                date,
                close: closes.get(i).copied().flatten(),
            });
        }

        Ok(quotes)
    }
}

fn midnight_ts(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

impl DataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch(
        &self,
        identifier: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        let url = self.chart_url(identifier, start, end);
        tracing::debug!(identifier, %url, "requesting chart");

        let resp = self.client.get(&url).send().map_err(|e| {
            if e.is_timeout() {
                DataError::NetworkUnreachable(format!("timed out: {e}"))
            } else {
                DataError::NetworkUnreachable(e.to_string())
            }
        })?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(DataError::SymbolNotFound {
                identifier: identifier.to_string(),
            });
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(DataError::RateLimited {
                retry_after_secs: retry_after,
            });
        }
        if !status.is_success() {
            return Err(DataError::Http {
                status: status.as_u16(),
                identifier: identifier.to_string(),
            });
        }

        let chart: ChartResponse = resp.json().map_err(|e| {
            DataError::ResponseFormatChanged(format!(
                "failed to parse response for {identifier}: {e}"
            ))
        })?;

        let quotes = Self::parse_response(identifier, chart)?;
        Ok(FetchResult {
            identifier: identifier.to_string(),
            quotes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(identifier: &str, body: &str) -> Result<Vec<RawQuote>, DataError> {
        let resp: ChartResponse = serde_json::from_str(body).unwrap();
        YahooProvider::parse_response(identifier, resp)
    }

    #[test]
    fn chart_url_uses_exclusive_midnight_bounds() {
        let provider = YahooProvider::new(Duration::from_secs(5), "test").unwrap();
        let url = provider.chart_url(
            "AAPL",
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 3).unwrap(),
        );
        assert!(url.starts_with(CHART_BASE_URL));
        assert!(url.contains("/AAPL?"));
        assert!(url.contains("period1=1714521600"));
        assert!(url.contains("period2=1714694400"));
        assert!(url.contains("interval=1d"));
    }

    #[test]
    fn parses_closes_and_keeps_null_rows() {
        let body = r#"{"chart":{"result":[{
            "meta":{"gmtoffset":-14400},
            "timestamp":[1714570200,1714656600],
            "indicators":{"quote":[{"close":[150.0,null]}]}
        }],"error":null}}"#;
        let quotes = parse("AAPL", body).unwrap();
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(quotes[0].close, Some(150.0));
        assert_eq!(quotes[1].close, None);
    }

    #[test]
    fn applies_exchange_offset_before_taking_date() {
        // 2024-05-01 00:00 KST is 2024-04-30 15:00 UTC.
        let body = r#"{"chart":{"result":[{
            "meta":{"gmtoffset":32400},
            "timestamp":[1714489200],
            "indicators":{"quote":[{"close":[70000.0]}]}
        }],"error":null}}"#;
        let quotes = parse("005930.KS", body).unwrap();
        assert_eq!(quotes[0].date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    }

    #[test]
    fn missing_timestamps_is_empty_not_error() {
        let body = r#"{"chart":{"result":[{"meta":{},"indicators":{"quote":[{}]}}],"error":null}}"#;
        assert!(parse("005930.KQ", body).unwrap().is_empty());
    }

    #[test]
    fn not_found_error_maps_to_symbol_not_found() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found"}}}"#;
        match parse("NOPE", body) {
            Err(DataError::SymbolNotFound { identifier }) => assert_eq!(identifier, "NOPE"),
            other => panic!("expected SymbolNotFound, got {other:?}"),
        }
    }
}
