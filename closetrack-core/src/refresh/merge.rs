//! Merging fetched closes into stored history.

use crate::data::RawQuote;
use crate::domain::PriceEntry;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Merged history plus how many dates it gained.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeResult {
    /// Strictly ascending by date, one entry per date.
    pub history: Vec<PriceEntry>,
    /// Dates present in the fetched rows but not in the prior history.
    pub added: usize,
}

/// Keep rows dated before `end` with a finite close, rounded to cents.
///
/// Rows on or after `end` are an unfinished session and are dropped. Rows
/// before the requested start are kept so late corrections still land.
pub fn usable_entries(quotes: &[RawQuote], end: NaiveDate) -> Vec<PriceEntry> {
    quotes
        .iter()
        .filter(|q| q.date < end)
        .filter_map(|q| match q.close {
            Some(close) if close.is_finite() => Some(PriceEntry::new(q.date, close)),
            _ => None,
        })
        .collect()
}

/// Merge `fresh` into `prior` keyed by date. Fresh entries win on collision.
pub fn merge_history(prior: &[PriceEntry], fresh: &[PriceEntry]) -> MergeResult {
    let mut by_date: BTreeMap<NaiveDate, PriceEntry> =
        prior.iter().map(|e| (e.date, *e)).collect();
    let before = by_date.len();

    for entry in fresh {
        by_date.insert(entry.date, *entry);
    }

    let added = by_date.len() - before;
    MergeResult {
        history: by_date.into_values().collect(),
        added,
    }
}
