//! Realized volatility proxies

use crate::{MathError, Result};

/// Rolling mean of absolute values.
///
/// Position `i` averages `|values[j]|` over the trailing window ending at
/// `i` (inclusive). Positions where fewer than `min_periods` observations are
/// available yield `0.0`.
pub fn rolling_mean_abs(values: &[f64], window: usize, min_periods: usize) -> Result<Vec<f64>> {
    if window == 0 {
        return Err(MathError::InvalidInput(
            "Window must be greater than zero".to_string(),
        ));
    }
    if min_periods == 0 || min_periods > window {
        return Err(MathError::InvalidInput(format!(
            "min_periods must be in 1..={}, got {}",
            window, min_periods
        )));
    }

    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0.0;
    for i in 0..values.len() {
        sum += values[i].abs();
        if i >= window {
            sum -= values[i - window].abs();
        }
        let count = (i + 1).min(window);
        out.push(if count >= min_periods {
            sum / count as f64
        } else {
            0.0
        });
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rolling_mean_abs() {
        let r = [0.0, -0.02, 0.04, -0.06];
        let vol = rolling_mean_abs(&r, 2, 2).unwrap();

        assert_eq!(vol.len(), 4);
        assert_eq!(vol[0], 0.0);
        assert_relative_eq!(vol[1], 0.01, epsilon = 1e-12);
        assert_relative_eq!(vol[2], 0.03, epsilon = 1e-12);
        assert_relative_eq!(vol[3], 0.05, epsilon = 1e-12);
    }

    #[test]
    fn test_min_periods_before_full_window() {
        let r = [0.01, 0.03, 0.05, 0.07];
        let vol = rolling_mean_abs(&r, 3, 2).unwrap();
        assert_eq!(vol[0], 0.0);
        assert_relative_eq!(vol[1], 0.02, epsilon = 1e-12);
        assert_relative_eq!(vol[2], 0.03, epsilon = 1e-12);
        assert_relative_eq!(vol[3], 0.05, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_window() {
        assert!(rolling_mean_abs(&[1.0], 0, 1).is_err());
        assert!(rolling_mean_abs(&[1.0], 2, 3).is_err());
    }
}
