//! Alignment of irregular exogenous series onto the candle grid

use crate::data::{AlignedExogenous, ExogenousInput, RawPoint, TimeSeries};
use crate::error::{ForecastError, Result};
use tracing::debug;

/// Align `raw` onto `grid`, reporting why a series cannot be used.
///
/// Points missing a time or a finite value are dropped, the rest are sorted
/// by time and the last write wins on duplicate timestamps. Each grid point
/// then takes the latest observation at or before it. Grid points preceding
/// every observation are back-filled from the next filled grid point, and
/// from the earliest observation when the whole grid precedes the series.
pub fn try_align(grid: &[i64], raw: &[RawPoint]) -> Result<Vec<f64>> {
    if raw.is_empty() {
        return Err(ForecastError::MalformedSeries("series is empty".to_string()));
    }

    let mut points: Vec<(i64, f64)> = raw
        .iter()
        .filter_map(|p| match (p.time, p.value) {
            (Some(t), Some(v)) if v.is_finite() => Some((t, v)),
            _ => None,
        })
        .collect();
    if points.is_empty() {
        return Err(ForecastError::MalformedSeries(
            "no point carries both time and value".to_string(),
        ));
    }

    // Stable sort keeps input order among equal timestamps, so the last one wins.
    points.sort_by_key(|&(t, _)| t);
    let mut deduped: Vec<(i64, f64)> = Vec::with_capacity(points.len());
    for (t, v) in points {
        match deduped.last_mut() {
            Some(last) if last.0 == t => last.1 = v,
            _ => deduped.push((t, v)),
        }
    }

    let mut aligned: Vec<Option<f64>> = grid
        .iter()
        .map(|&t| {
            let idx = deduped.partition_point(|&(pt, _)| pt <= t);
            idx.checked_sub(1).map(|i| deduped[i].1)
        })
        .collect();

    let mut next = None;
    for slot in aligned.iter_mut().rev() {
        if slot.is_some() {
            next = *slot;
        } else {
            *slot = next;
        }
    }

    let earliest = deduped[0].1;
    Ok(aligned.into_iter().map(|v| v.unwrap_or(earliest)).collect())
}

/// Align `raw` onto `grid`; `None` means the feature is unavailable
pub fn align_to_grid(grid: &[i64], raw: &[RawPoint]) -> Option<Vec<f64>> {
    try_align(grid, raw).ok()
}

/// Align every exogenous feature, silently excluding unusable ones
pub fn align_exogenous(grid: &[i64], exog: &ExogenousInput) -> AlignedExogenous {
    let mut aligned = AlignedExogenous::with_capacity(exog.len());
    for (name, raw) in exog {
        match try_align(grid, raw).and_then(|values| TimeSeries::new(grid.to_vec(), values)) {
            Ok(series) => {
                aligned.insert(name.clone(), series);
            }
            Err(e) => debug!(feature = %name, error = %e, "skipping exogenous feature"),
        }
    }
    aligned
}
