//! Level/return transforms
//!
//! Regression and autoregression work on stationary returns rather than
//! price levels. Returns are clipped to `[-RETURN_CLIP, RETURN_CLIP]` so a
//! single bad print cannot dominate a fit.

use std::collections::BTreeMap;

/// Absolute bound applied to every period return
pub const RETURN_CLIP: f64 = 0.2;

/// Convert a level series into clipped fractional returns.
///
/// The first element has no predecessor and is always `0.0`, so the output
/// has the same length as the input. A zero previous level yields a
/// non-finite change, which is mapped to `0.0` like a missing value.
pub fn to_returns(levels: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(levels.len());
    if levels.is_empty() {
        return out;
    }

    out.push(0.0);
    for window in levels.windows(2) {
        let change = (window[1] - window[0]) / window[0];
        let change = if change.is_finite() { change } else { 0.0 };
        out.push(change.clamp(-RETURN_CLIP, RETURN_CLIP));
    }

    out
}

/// Compound returns onto `last_price`.
///
/// Element `i` of the output is `last_price * (1 + r_0) * ... * (1 + r_i)`;
/// `last_price` itself is not included.
pub fn to_price_path(last_price: f64, returns: &[f64]) -> Vec<f64> {
    returns
        .iter()
        .scan(last_price, |price, r| {
            *price *= 1.0 + r;
            Some(*price)
        })
        .collect()
}

/// Shift a series forward by `offset` positions, zero-filling the head.
///
/// Position `i` of the output holds `series[i - offset]`, never `series[i]`
/// or anything later.
pub fn lag(series: &[f64], offset: usize) -> Vec<f64> {
    let n = series.len();
    let mut out = vec![0.0; n];
    if offset < n {
        out[offset..].copy_from_slice(&series[..n - offset]);
    }
    out
}

/// Lagged copies of a series, keyed by offset
pub fn lag_many(series: &[f64], offsets: &[usize]) -> BTreeMap<usize, Vec<f64>> {
    offsets
        .iter()
        .map(|&offset| (offset, lag(series, offset)))
        .collect()
}
