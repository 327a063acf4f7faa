//! Feature derivation on top of the `trade_math` transforms
//!
//! Strategies assemble their inputs into a [`FeatureTable`]: named, equally
//! long columns sampled on the candle grid.

use crate::error::{ForecastError, Result};
use nalgebra::DMatrix;

pub use trade_math::{lag, lag_many, smoothed_extrapolate, to_price_path, to_returns};

/// Column-oriented table of model inputs
#[derive(Debug, Clone, Default)]
pub struct FeatureTable {
    rows: usize,
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl FeatureTable {
    /// Empty table whose columns must all have `rows` entries
    pub fn new(rows: usize) -> Self {
        Self {
            rows,
            names: Vec::new(),
            columns: Vec::new(),
        }
    }

    /// Append a named column
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<()> {
        let name = name.into();
        if values.len() != self.rows {
            return Err(ForecastError::InvalidRequest(format!(
                "Column '{}' has {} rows, table has {}",
                name,
                values.len(),
                self.rows
            )));
        }
        if self.index_of(&name).is_some() {
            return Err(ForecastError::InvalidRequest(format!(
                "Duplicate feature column '{}'",
                name
            )));
        }

        self.names.push(name);
        self.columns.push(values);
        Ok(())
    }

    /// Replace infinite and NaN entries with `0.0`, returning how many were replaced
    pub fn sanitize(&mut self) -> usize {
        let mut replaced = 0;
        for value in self.columns.iter_mut().flatten() {
            if !value.is_finite() {
                *value = 0.0;
                replaced += 1;
            }
        }
        replaced
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.index_of(name).map(|i| self.columns[i].as_slice())
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn n_rows(&self) -> usize {
        self.rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// Observations as rows, features as columns
    pub fn to_matrix(&self) -> DMatrix<f64> {
        DMatrix::from_fn(self.rows, self.columns.len(), |i, j| self.columns[j][i])
    }
}
