//! Exponential smoothing and drift extrapolation
//!
//! Used to furnish plausible future levels for auxiliary series that a model
//! needs as regressors but does not forecast itself.

/// Smoothing factor used when extrapolating exogenous levels
pub const EXOG_SMOOTHING_ALPHA: f64 = 0.2;

/// Incremental exponential smoother seeded with the first observation
#[derive(Debug, Clone)]
struct ExponentialSmoother {
    alpha: f64,
    level: Option<f64>,
}

impl ExponentialSmoother {
    fn new(alpha: f64) -> Self {
        Self { alpha, level: None }
    }

    /// Feed the next observation and return the updated level
    fn update(&mut self, value: f64) -> f64 {
        let next = match self.level {
            None => value,
            Some(prev) => self.alpha * value + (1.0 - self.alpha) * prev,
        };
        self.level = Some(next);
        next
    }
}

/// Extrapolate `steps` future levels as a linear continuation of the
/// smoothed history.
///
/// The drift is the difference between the last two smoothed values (zero
/// with fewer than two points). An empty history yields zeros.
pub fn smoothed_extrapolate(history: &[f64], steps: usize) -> Vec<f64> {
    if history.is_empty() {
        return vec![0.0; steps];
    }

    let mut smoother = ExponentialSmoother::new(EXOG_SMOOTHING_ALPHA);
    let mut previous = None;
    let mut last = 0.0;
    for &v in history {
        previous = smoother.level;
        last = smoother.update(v);
    }
    let drift = previous.map_or(0.0, |p| last - p);

    (1..=steps).map(|i| last + i as f64 * drift).collect()
}
