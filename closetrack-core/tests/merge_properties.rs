//! Property tests for history merging.
//!
//! Uses proptest to verify:
//! 1. Output is strictly ascending (so no duplicate dates)
//! 2. Output dates are exactly the union of prior and fetched dates
//! 3. Fetched values win on collision; prior values survive otherwise
//! 4. Merging the same fetch twice changes nothing

use chrono::{Duration, NaiveDate};
use closetrack_core::domain::PriceEntry;
use closetrack_core::refresh::merge_history;
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_entry() -> impl Strategy<Value = PriceEntry> {
    (0..120i64, 1.0..100_000.0_f64).prop_map(|(offset, close)| {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        PriceEntry::new(base + Duration::days(offset), close)
    })
}

fn arb_history() -> impl Strategy<Value = Vec<PriceEntry>> {
    prop::collection::vec(arb_entry(), 0..60)
}

proptest! {
    #[test]
    fn merged_history_is_strictly_ascending(prior in arb_history(), fresh in arb_history()) {
        let merged = merge_history(&prior, &fresh);
        for pair in merged.history.windows(2) {
            prop_assert!(pair[0].date < pair[1].date);
        }
    }

    #[test]
    fn merged_dates_are_the_union(prior in arb_history(), fresh in arb_history()) {
        let merged = merge_history(&prior, &fresh);
        let expected: BTreeSet<NaiveDate> =
            prior.iter().chain(fresh.iter()).map(|e| e.date).collect();
        let got: BTreeSet<NaiveDate> = merged.history.iter().map(|e| e.date).collect();
        prop_assert_eq!(got, expected);
        prop_assert_eq!(merged.history.len(), merged.history.iter().map(|e| e.date).collect::<BTreeSet<_>>().len());
    }

    #[test]
    fn fetched_values_win(prior in arb_history(), fresh in arb_history()) {
        let merged = merge_history(&prior, &fresh);

        // Reference model: later writes win, fetched after prior.
        let mut model: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for e in prior.iter().chain(fresh.iter()) {
            model.insert(e.date, e.close);
        }
        let got: BTreeMap<NaiveDate, f64> =
            merged.history.iter().map(|e| (e.date, e.close)).collect();
        prop_assert_eq!(got, model);
    }

    #[test]
    fn added_counts_new_dates(prior in arb_history(), fresh in arb_history()) {
        let merged = merge_history(&prior, &fresh);
        let prior_dates: BTreeSet<NaiveDate> = prior.iter().map(|e| e.date).collect();
        let new_dates: BTreeSet<NaiveDate> = fresh
            .iter()
            .map(|e| e.date)
            .filter(|d| !prior_dates.contains(d))
            .collect();
        prop_assert_eq!(merged.added, new_dates.len());
    }

    #[test]
    fn merging_same_fetch_again_is_a_no_op(prior in arb_history(), fresh in arb_history()) {
        let once = merge_history(&prior, &fresh);
        let twice = merge_history(&once.history, &fresh);
        prop_assert_eq!(&twice.history, &once.history);
        prop_assert_eq!(twice.added, 0);
    }
}
