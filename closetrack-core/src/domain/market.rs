//! Market codes — the fixed set of exchanges a snapshot can belong to.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Market a symbol trades on.
///
/// Serialized as the upper-case code (`"US"`, `"KR"`) in snapshot files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Market {
    /// NYSE / NASDAQ / AMEX. Provider identifiers carry no suffix.
    #[serde(rename = "US")]
    Us,
    /// KOSPI / KOSDAQ. Provider identifiers carry `.KS` or `.KQ`.
    #[serde(rename = "KR")]
    Kr,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown market code '{0}' (expected US or KR)")]
pub struct MarketError(pub String);

impl Market {
    /// Upper-case market code as stored in snapshots.
    pub fn code(&self) -> &'static str {
        match self {
            Market::Us => "US",
            Market::Kr => "KR",
        }
    }

    /// Lower-case directory name under the data root.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Market::Us => "us",
            Market::Kr => "kr",
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Market {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "US" => Ok(Market::Us),
            "KR" => Ok(Market::Kr),
            _ => Err(MarketError(s.to_string())),
        }
    }
}
