//! Descriptive statistics and standardization

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Arithmetic mean, `0.0` for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by `n`)
pub fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Standardization constants captured at fit time.
///
/// The same constants must be reused for any future values of the series so
/// that training and prediction inputs share one distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Standardizer {
    pub mean: f64,
    pub std: f64,
}

impl Standardizer {
    /// Capture mean and deviation of `values`; a zero deviation is floored to 1.0
    pub fn fit(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(MathError::InsufficientData(
                "Cannot standardize an empty series".to_string(),
            ));
        }

        let std = population_std(values);
        let std = if std == 0.0 || !std.is_finite() { 1.0 } else { std };

        Ok(Self {
            mean: mean(values),
            std,
        })
    }

    pub fn transform(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|v| (v - self.mean) / self.std).collect()
    }

    pub fn inverse(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|v| v * self.std + self.mean).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean_and_std() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(mean(&data), 5.0);
        assert_relative_eq!(population_std(&data), 2.0);
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_standardizer_round_trip() {
        let data = [10.0, 20.0, 30.0, 40.0, 50.0];
        let z = Standardizer::fit(&data).unwrap();
        let scaled = z.transform(&data);

        assert_relative_eq!(mean(&scaled), 0.0, epsilon = 1e-12);
        assert_relative_eq!(population_std(&scaled), 1.0, epsilon = 1e-12);

        let restored = z.inverse(&scaled);
        for (a, b) in restored.iter().zip(data.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_constant_series_floors_deviation() {
        let z = Standardizer::fit(&[3.0, 3.0, 3.0]).unwrap();
        assert_eq!(z.std, 1.0);
        assert_eq!(z.transform(&[3.0, 4.0]), vec![0.0, 1.0]);
    }

    #[test]
    fn test_empty_series_rejected() {
        assert!(matches!(
            Standardizer::fit(&[]),
            Err(MathError::InsufficientData(_))
        ));
    }
}
