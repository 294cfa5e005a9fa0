//! Busiest pickup hours by explicit selection sort.
//!
//! There are only 24 buckets, so the ranking is done with a plain O(h²)
//! selection over the per-hour counters instead of a library sort. Each pass
//! picks the best remaining bucket by trips descending, then hour ascending, and
//! swaps it into place. The comparison checks the hour explicitly because
//! selection sort is not stable.

use crate::analyzers::types::{BusiestHours, HourCount};
use crate::record::TripRecord;

pub const HOURS_PER_DAY: usize = 24;

/// Pickup counts indexed by hour of day.
pub fn count_by_hour<'a>(records: impl IntoIterator<Item = &'a TripRecord>) -> [u64; HOURS_PER_DAY] {
    let mut counts = [0u64; HOURS_PER_DAY];
    for r in records {
        counts[r.pickup_hour() as usize] += 1;
    }
    counts
}

/// Whether `a` ranks ahead of `b`.
fn ranks_before(a: &HourCount, b: &HourCount) -> bool {
    a.trips > b.trips || (a.trips == b.trips && a.hour < b.hour)
}

/// Up to `k` busiest hours. Hours without trips are never listed.
pub fn rank_hours(counts: &[u64; HOURS_PER_DAY], k: usize) -> BusiestHours {
    let mut buckets: Vec<HourCount> = counts
        .iter()
        .enumerate()
        .filter(|(_, trips)| **trips > 0)
        .map(|(hour, trips)| HourCount {
            hour: hour as u32,
            trips: *trips,
        })
        .collect();

    let n = buckets.len();
    let wanted = k.min(n);

    for i in 0..wanted {
        let mut best = i;
        for j in (i + 1)..n {
            if ranks_before(&buckets[j], &buckets[best]) {
                best = j;
            }
        }
        if best != i {
            buckets.swap(i, best);
        }
    }

    buckets.truncate(wanted);
    BusiestHours { top: buckets }
}

pub fn busiest_hours<'a>(records: impl IntoIterator<Item = &'a TripRecord>, k: usize) -> BusiestHours {
    rank_hours(&count_by_hour(records), k)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::trip;

    fn counts(pairs: &[(usize, u64)]) -> [u64; HOURS_PER_DAY] {
        let mut c = [0u64; HOURS_PER_DAY];
        for (hour, trips) in pairs {
            c[*hour] = *trips;
        }
        c
    }

    fn hours(result: &BusiestHours) -> Vec<(u32, u64)> {
        result.top.iter().map(|h| (h.hour, h.trips)).collect()
    }

    fn assert_ranked(result: &BusiestHours) {
        for pair in result.top.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            assert!(
                a.trips > b.trips || (a.trips == b.trips && a.hour < b.hour),
                "{a:?} before {b:?}"
            );
        }
    }

    #[test]
    fn test_rank_descending_with_hour_tie_break() {
        let c = counts(&[(0, 1), (1, 1), (2, 2), (18, 5), (8, 5), (23, 2)]);
        let result = rank_hours(&c, 24);

        assert_eq!(hours(&result), [(8, 5), (18, 5), (2, 2), (23, 2), (0, 1), (1, 1)]);
        assert_ranked(&result);
    }

    #[test]
    fn test_tie_break_survives_unstable_swaps() {
        // The first pass swaps hour 0 to the back, behind hour 1.
        let c = counts(&[(0, 1), (1, 1), (2, 2)]);
        assert_eq!(hours(&rank_hours(&c, 3)), [(2, 2), (0, 1), (1, 1)]);
    }

    #[test]
    fn test_top_k_truncates() {
        let c = counts(&[(7, 3), (8, 9), (9, 4), (17, 9)]);
        assert_eq!(hours(&rank_hours(&c, 2)), [(8, 9), (17, 9)]);
        assert_eq!(rank_hours(&c, 0).top.len(), 0);
    }

    #[test]
    fn test_every_hour_with_equal_counts() {
        let c = [3u64; HOURS_PER_DAY];
        let result = rank_hours(&c, 100);
        let order: Vec<u32> = result.top.iter().map(|h| h.hour).collect();
        assert_eq!(order, (0..24).collect::<Vec<u32>>());
    }

    #[test]
    fn test_empty_counts() {
        assert!(rank_hours(&[0; HOURS_PER_DAY], 5).top.is_empty());
    }

    #[test]
    fn test_busiest_hours_from_records() {
        let records = vec![
            trip("a", 14, 8, 1),
            trip("b", 15, 8, 1),
            trip("c", 14, 17, 1),
            trip("d", 14, 3, 1),
            trip("e", 16, 17, 1),
            trip("f", 16, 8, 1),
        ];
        let result = busiest_hours(&records, 5);
        assert_eq!(hours(&result), [(8, 3), (17, 2), (3, 1)]);
    }
}
