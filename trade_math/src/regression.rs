//! Least squares on `nalgebra` matrices
//!
//! Two solvers are provided:
//! - [`penalized_least_squares`]: ridge-style normal equations with a
//!   per-coefficient penalty, solved by Cholesky. Used for MAP fits where every
//!   coefficient carries a Gaussian prior.
//! - [`least_squares`]: multi-output minimum-norm solution via SVD, tolerant to
//!   exactly collinear columns.

use crate::{MathError, Result};
use nalgebra::{DMatrix, DVector};

/// Singular values below this (relative to the largest) are treated as zero
const SVD_RELATIVE_TOLERANCE: f64 = 1e-12;

/// Solve `min ||y - X b||^2 + sum_j penalties[j] * b_j^2`.
///
/// Every penalty must be strictly positive so the system stays positive
/// definite.
pub fn penalized_least_squares(
    x: &DMatrix<f64>,
    y: &DVector<f64>,
    penalties: &[f64],
) -> Result<DVector<f64>> {
    if x.nrows() != y.len() {
        return Err(MathError::InvalidInput(format!(
            "Design has {} rows but target has {}",
            x.nrows(),
            y.len()
        )));
    }
    if x.ncols() != penalties.len() {
        return Err(MathError::InvalidInput(format!(
            "Design has {} columns but {} penalties were given",
            x.ncols(),
            penalties.len()
        )));
    }
    if penalties.iter().any(|p| !(*p > 0.0) || !p.is_finite()) {
        return Err(MathError::InvalidInput(
            "Penalties must be finite and strictly positive".to_string(),
        ));
    }

    let xt = x.transpose();
    let mut gram = &xt * x;
    for (j, p) in penalties.iter().enumerate() {
        gram[(j, j)] += p;
    }
    let rhs = &xt * y;

    let chol = gram.cholesky().ok_or_else(|| {
        MathError::CalculationError("Normal equations are not positive definite".to_string())
    })?;

    Ok(chol.solve(&rhs))
}

/// Multi-output least squares `min ||Y - X B||` via SVD.
///
/// Collinear columns are handled by truncating tiny singular values, which
/// yields the minimum-norm coefficients.
pub fn least_squares(x: &DMatrix<f64>, y: &DMatrix<f64>) -> Result<DMatrix<f64>> {
    if x.nrows() != y.nrows() {
        return Err(MathError::InvalidInput(format!(
            "Design has {} rows but target has {}",
            x.nrows(),
            y.nrows()
        )));
    }
    if x.nrows() == 0 || x.ncols() == 0 {
        return Err(MathError::InsufficientData(
            "Empty design matrix".to_string(),
        ));
    }

    let svd = x.clone().svd(true, true);
    let largest = svd.singular_values.max();
    if !(largest > 0.0) || !largest.is_finite() {
        return Err(MathError::CalculationError(
            "Design matrix has no usable singular values".to_string(),
        ));
    }

    svd.solve(y, largest * SVD_RELATIVE_TOLERANCE)
        .map_err(|e| MathError::CalculationError(e.to_string()))
}

/// Maximum-likelihood covariance `R'R / n` of a residual matrix (rows are observations)
pub fn residual_covariance(residuals: &DMatrix<f64>) -> Result<DMatrix<f64>> {
    let n = residuals.nrows();
    if n == 0 {
        return Err(MathError::InsufficientData(
            "No residuals to estimate covariance from".to_string(),
        ));
    }
    Ok(residuals.transpose() * residuals / n as f64)
}

/// Natural log of the determinant of a symmetric positive semi-definite matrix.
///
/// A small jitter proportional to the mean diagonal is added so that exactly
/// singular covariances (e.g. an equation with zero residuals) yield a large
/// negative but finite value.
pub fn log_det_psd(m: &DMatrix<f64>) -> Result<f64> {
    if !m.is_square() || m.nrows() == 0 {
        return Err(MathError::InvalidInput(
            "log-determinant needs a non-empty square matrix".to_string(),
        ));
    }

    let k = m.nrows();
    let scale = m.trace() / k as f64;
    let jitter = if scale > 0.0 && scale.is_finite() {
        scale * 1e-10
    } else {
        1e-12
    };

    let mut regularized = m.clone();
    for i in 0..k {
        regularized[(i, i)] += jitter;
    }

    let chol = regularized.cholesky().ok_or_else(|| {
        MathError::CalculationError("Matrix is not positive semi-definite".to_string())
    })?;

    Ok(2.0 * chol.l().diagonal().iter().map(|d| d.ln()).sum::<f64>())
}
