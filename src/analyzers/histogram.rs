//! Fixed-width speed histogram with a terminal overflow bin.
//!
//! Counters live in a vector sized once from the layout. Each speed goes to
//! `floor(speed / width)`, and anything at or above the overflow floor goes to
//! the last slot.

use crate::analyzers::types::{HistogramBin, SpeedHistogram};
use crate::record::TripRecord;

/// Upper limit on the number of regular bins a layout may have.
pub const MAX_BINS: usize = 10_000;

/// Number of regular bins `width` cuts `[0, overflow_floor)` into, or `None`
/// when that exceeds [`MAX_BINS`] or is not a finite count.
pub fn regular_bins(width: f64, overflow_floor: f64) -> Option<usize> {
    let n = (overflow_floor / width).ceil();
    if n.is_finite() && n <= MAX_BINS as f64 {
        Some((n as usize).max(1))
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BucketLayout {
    width: f64,
    overflow_floor: f64,
    /// Number of fixed-width bins below the overflow floor.
    regular: usize,
}

impl BucketLayout {
    /// `width` and `overflow_floor` must be positive and finite, and the width
    /// should pass [`regular_bins`]. Otherwise the layout is capped at
    /// [`MAX_BINS`] regular bins and the last one absorbs the excess.
    pub fn new(width: f64, overflow_floor: f64) -> Self {
        let regular = regular_bins(width, overflow_floor).unwrap_or(MAX_BINS);
        Self {
            width,
            overflow_floor,
            regular,
        }
    }

    /// Regular bins plus the overflow bin.
    pub fn len(&self) -> usize {
        self.regular + 1
    }

    pub fn index(&self, speed_kmh: f64) -> usize {
        if speed_kmh >= self.overflow_floor {
            return self.regular;
        }
        // Negative speeds cannot be stored; the cast saturates them to 0 anyway.
        let i = (speed_kmh / self.width).floor() as usize;
        i.min(self.regular - 1)
    }

    pub fn label(&self, index: usize) -> String {
        if index >= self.regular {
            return format!("{}+", format_bound(self.overflow_floor));
        }
        let low = index as f64 * self.width;
        let high = (low + self.width).min(self.overflow_floor);
        format!("{}-{}", format_bound(low), format_bound(high))
    }
}

/// `5.0` prints as `5`, `2.5` as `2.5`, and float noise is rounded away.
fn format_bound(x: f64) -> String {
    let rounded = (x * 1_000_000.0).round() / 1_000_000.0;
    format!("{rounded}")
}

/// Counts `records` by speed bin. Every bin is reported, empty ones included.
pub fn speed_histogram<'a>(
    records: impl IntoIterator<Item = &'a TripRecord>,
    layout: &BucketLayout,
) -> SpeedHistogram {
    let mut counters = vec![0u64; layout.len()];
    for r in records {
        counters[layout.index(r.trip_speed_kmh)] += 1;
    }

    SpeedHistogram {
        bins: counters
            .into_iter()
            .enumerate()
            .map(|(i, count)| HistogramBin {
                label: layout.label(i),
                count,
            })
            .collect(),
    }
}
