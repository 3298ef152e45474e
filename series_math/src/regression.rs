//! Ordinary least squares

use crate::{MathError, Result};
use nalgebra::{DMatrix, DVector};
use std::f64::consts::PI;

const RANK_TOLERANCE: f64 = 1e-12;

/// Result of an OLS regression
#[derive(Debug, Clone)]
pub struct OlsFit {
    /// Estimated coefficients, one per design column
    pub params: Vec<f64>,
    /// Standard errors of the coefficients
    pub std_errors: Vec<f64>,
    /// t statistics of the coefficients
    pub t_values: Vec<f64>,
    /// Sum of squared residuals
    pub ssr: f64,
    /// Number of observations
    pub nobs: usize,
    /// Gaussian log-likelihood
    pub log_likelihood: f64,
    /// Akaike information criterion
    pub aic: f64,
}

/// Fit `response = design * beta + e` by least squares.
///
/// `rows` holds one regressor vector per observation; every row must have the
/// same length. There must be more rows than columns.
pub fn ols(rows: &[Vec<f64>], response: &[f64]) -> Result<OlsFit> {
    let n = rows.len();
    if n != response.len() {
        return Err(MathError::InvalidInput(format!(
            "Design has {} rows but response has {} values",
            n,
            response.len()
        )));
    }

    let k = rows.first().map(Vec::len).unwrap_or(0);
    if k == 0 {
        return Err(MathError::InvalidInput(
            "Design matrix has no columns".to_string(),
        ));
    }
    if n <= k {
        return Err(MathError::InsufficientData {
            required: k + 1,
            actual: n,
        });
    }
    if rows.iter().any(|r| r.len() != k) {
        return Err(MathError::InvalidInput(
            "Design rows have different lengths".to_string(),
        ));
    }

    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    let x = DMatrix::from_row_slice(n, k, &flat);
    let y = DVector::from_column_slice(response);

    let xtx = x.transpose() * &x;
    let scale = xtx.diagonal().amax();
    let cholesky = xtx
        .cholesky()
        .ok_or_else(|| MathError::SingularMatrix("X'X is not positive definite".to_string()))?;

    // Rank deficiency can survive the factorisation as a tiny pivot
    let lower = cholesky.l();
    if (0..k).any(|i| lower[(i, i)].powi(2) <= RANK_TOLERANCE * scale) {
        return Err(MathError::SingularMatrix(
            "Design matrix is rank deficient".to_string(),
        ));
    }
    let xtx_inv = cholesky.inverse();

    let beta = &xtx_inv * (x.transpose() * &y);
    let residuals = &y - &x * &beta;
    let ssr = residuals.dot(&residuals);
    let sigma2 = ssr / (n - k) as f64;

    let params: Vec<f64> = beta.iter().copied().collect();
    let std_errors: Vec<f64> = (0..k).map(|i| (sigma2 * xtx_inv[(i, i)]).sqrt()).collect();
    let t_values = params
        .iter()
        .zip(std_errors.iter())
        .map(|(b, se)| b / se)
        .collect();

    let nf = n as f64;
    let log_likelihood = -nf / 2.0 * ((2.0 * PI).ln() + (ssr / nf).ln() + 1.0);
    let aic = -2.0 * log_likelihood + 2.0 * k as f64;

    Ok(OlsFit {
        params,
        std_errors,
        t_values,
        ssr,
        nobs: n,
        log_likelihood,
        aic,
    })
}
