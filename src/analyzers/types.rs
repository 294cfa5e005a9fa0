//! Result shapes returned by the analyzers and rendered as JSON.

use serde::Serialize;

#[cfg(test)]
use crate::record::DurationCategory;

/// Headline KPIs. All zero on an empty selection.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub trips: u64,
    pub avg_duration_s: f64,
    pub avg_km: f64,
    pub avg_kmh: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HourCount {
    pub hour: u32,
    pub trips: u64,
}

/// Hours ordered by trips descending, ties by hour ascending.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct BusiestHours {
    pub top: Vec<HourCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistogramBin {
    pub label: String,
    pub count: u64,
}

/// Bins ordered by ascending speed range, terminal overflow bin last.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct SpeedHistogram {
    pub bins: Vec<HistogramBin>,
}

/// Trip count per duration category. Serializes as `{"Short", "Medium", "Long"}`
/// in that order, every key present.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DurationMix {
    #[serde(rename = "Short")]
    pub short: u64,
    #[serde(rename = "Medium")]
    pub medium: u64,
    #[serde(rename = "Long")]
    pub long: u64,
}

impl DurationMix {
    #[cfg(test)]
    pub fn get(&self, category: DurationCategory) -> u64 {
        match category {
            DurationCategory::Short => self.short,
            DurationCategory::Medium => self.medium,
            DurationCategory::Long => self.long,
        }
    }

    /// `(category, count)` pairs in report order.
    #[cfg(test)]
    pub fn entries(&self) -> [(DurationCategory, u64); 3] {
        DurationCategory::ALL.map(|c| (c, self.get(c)))
    }

    pub fn total(&self) -> u64 {
        self.short + self.medium + self.long
    }
}
