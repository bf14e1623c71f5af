//! Run-level error taxonomy and exit codes.

use crate::data::StoreError;
use chrono::NaiveDate;
use thiserror::Error;

/// Process exit code for a bad market code, ticker or lookback.
pub const EXIT_VALIDATION: i32 = 2;
/// Process exit code when no provider data exists and nothing is stored.
pub const EXIT_NO_DATA: i32 = 3;
/// Process exit code when the snapshot or index could not be written.
pub const EXIT_WRITE: i32 = 4;

/// Fatal outcomes of a refresh.
///
/// A corrupt or mismatched prior snapshot is not here: it is logged and
/// recovered from by refetching the full lookback window.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error(
        "no data for {symbol} ({market}): tried {} over {start}..{end} and nothing is stored",
        .attempted.join(", ")
    )]
    NoData {
        symbol: String,
        market: String,
        attempted: Vec<String>,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("write failed: {0}")]
    Write(#[from] StoreError),
}

impl RefreshError {
    pub fn exit_code(&self) -> i32 {
        match self {
            RefreshError::Validation(_) => EXIT_VALIDATION,
            RefreshError::NoData { .. } => EXIT_NO_DATA,
            RefreshError::Write(_) => EXIT_WRITE,
        }
    }
}
