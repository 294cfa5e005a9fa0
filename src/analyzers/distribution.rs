use crate::analyzers::types::DurationMix;
use crate::record::{DurationCategory, TripRecord};

/// Trips per duration category; absent categories count zero.
pub fn duration_mix<'a>(records: impl IntoIterator<Item = &'a TripRecord>) -> DurationMix {
    let mut mix = DurationMix::default();
    for r in records {
        match r.duration_category {
            DurationCategory::Short => mix.short += 1,
            DurationCategory::Medium => mix.medium += 1,
            DurationCategory::Long => mix.long += 1,
        }
    }
    mix
}
