//! Incremental fetch-and-merge engine

pub mod engine;
pub mod error;
pub mod merge;
pub mod planner;
pub mod resolver;

pub use engine::{refresh, RefreshOutcome, RefreshRequest};
pub use error::{RefreshError, EXIT_NO_DATA, EXIT_VALIDATION, EXIT_WRITE};
pub use merge::{merge_history, usable_entries, MergeResult};
pub use planner::{plan, FetchWindow, Plan, MAX_LOOKBACK_DAYS};
pub use resolver::{resolve, Candidates, Resolution, KOSDAQ_SUFFIX, KOSPI_SUFFIX};
