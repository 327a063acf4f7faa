//! Time-aligned averaging of two point forecasts

use crate::data::ForecastPoint;
use std::collections::BTreeMap;

/// Average two forecasts at their shared timestamps.
///
/// The result has one point per shared timestamp, in time order. When the
/// inputs share no timestamp at all (e.g. different grids), both lists are
/// concatenated and sorted by time without averaging.
pub fn blend(a: &[ForecastPoint], b: &[ForecastPoint]) -> Vec<ForecastPoint> {
    // Later duplicates overwrite earlier ones within each input.
    let left: BTreeMap<i64, f64> = a.iter().map(|p| (p.time, p.value)).collect();
    let right: BTreeMap<i64, f64> = b.iter().map(|p| (p.time, p.value)).collect();

    let shared: Vec<ForecastPoint> = left
        .iter()
        .filter_map(|(time, va)| {
            right.get(time).map(|vb| ForecastPoint {
                time: *time,
                value: (va + vb) / 2.0,
            })
        })
        .collect();

    if !shared.is_empty() {
        return shared;
    }

    let mut merged: Vec<ForecastPoint> = a.iter().chain(b.iter()).copied().collect();
    merged.sort_by_key(|p| p.time);
    merged
}
