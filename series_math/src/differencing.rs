//! Differencing and integration of series
//!
//! The integration operator of a SARIMA model is `(1 - L)^d (1 - L^s)^D`.
//! Differencing applies it to a series; integration inverts it given enough
//! trailing history.

use crate::polynomial::multiply;
use crate::{MathError, Result};

/// Apply lag-`lag` differencing `times` times
pub fn difference(data: &[f64], lag: usize, times: usize) -> Result<Vec<f64>> {
    if lag == 0 {
        return Err(MathError::InvalidInput(
            "Differencing lag must be greater than zero".to_string(),
        ));
    }

    let mut result = data.to_vec();
    for _ in 0..times {
        if result.len() <= lag {
            return Err(MathError::InsufficientData {
                required: lag * times + 1,
                actual: data.len(),
            });
        }
        result = (lag..result.len())
            .map(|i| result[i] - result[i - lag])
            .collect();
    }

    Ok(result)
}

/// Coefficients of `(1 - L)^d (1 - L^s)^D`, constant term first
pub fn integration_polynomial(d: usize, seasonal_d: usize, period: usize) -> Vec<f64> {
    let mut poly = vec![1.0];
    for _ in 0..d {
        poly = multiply(&poly, &[1.0, -1.0]);
    }

    if period > 0 {
        let mut seasonal = vec![0.0; period + 1];
        seasonal[0] = 1.0;
        seasonal[period] = -1.0;
        for _ in 0..seasonal_d {
            poly = multiply(&poly, &seasonal);
        }
    }

    poly
}

/// Filter a series through a lag polynomial: `w_t = sum_k poly[k] * y_{t-k}`.
///
/// The first `poly.len() - 1` observations are consumed.
pub fn apply_lag_polynomial(data: &[f64], poly: &[f64]) -> Result<Vec<f64>> {
    let degree = poly.len().saturating_sub(1);
    if data.len() <= degree {
        return Err(MathError::InsufficientData {
            required: degree + 1,
            actual: data.len(),
        });
    }

    Ok((degree..data.len())
        .map(|t| {
            poly.iter()
                .enumerate()
                .map(|(k, &c)| c * data[t - k])
                .sum()
        })
        .collect())
}

/// Undo differencing for values that continue `history`.
///
/// Each level is `y_t = w_t - sum_{k>=1} poly[k] * y_{t-k}`; `poly[0]` must be one.
pub fn integrate(history: &[f64], increments: &[f64], poly: &[f64]) -> Result<Vec<f64>> {
    let degree = poly.len().saturating_sub(1);
    if history.len() < degree {
        return Err(MathError::InsufficientData {
            required: degree,
            actual: history.len(),
        });
    }

    let mut extended = history.to_vec();
    extended.reserve(increments.len());

    for &increment in increments {
        let t = extended.len();
        let mut level = increment;
        for k in 1..=degree {
            level -= poly[k] * extended[t - k];
        }
        extended.push(level);
    }

    Ok(extended.split_off(history.len()))
}
