//! Parameter transforms that keep autoregressive polynomials stationary
//!
//! Unconstrained values are mapped to partial autocorrelations in (-1, 1)
//! and then to AR coefficients through the Durbin-Levinson recursion
//! (Monahan, 1984). The coefficients describe `1 - c1 L - c2 L^2 - ...`.

use crate::{MathError, Result};

/// Map unconstrained reals to the coefficients of a stationary AR polynomial
pub fn constrain_stationary(unconstrained: &[f64]) -> Vec<f64> {
    let n = unconstrained.len();
    if n == 0 {
        return Vec::new();
    }

    let partials: Vec<f64> = unconstrained
        .iter()
        .map(|x| x / (1.0 + x * x).sqrt())
        .collect();

    let mut y = vec![vec![0.0; n]; n];
    for k in 0..n {
        for i in 0..k {
            y[k][i] = y[k - 1][i] + partials[k] * y[k - 1][k - i - 1];
        }
        y[k][k] = partials[k];
    }

    y[n - 1].iter().map(|v| -v).collect()
}

/// Inverse of [`constrain_stationary`]
pub fn unconstrain_stationary(constrained: &[f64]) -> Result<Vec<f64>> {
    let n = constrained.len();
    if n == 0 {
        return Ok(Vec::new());
    }

    let mut y = vec![vec![0.0; n]; n];
    y[n - 1] = constrained.iter().map(|v| -v).collect();

    for k in (1..n).rev() {
        let denom = 1.0 - y[k][k] * y[k][k];
        if denom <= 0.0 {
            return Err(MathError::InvalidInput(
                "Coefficients do not describe a stationary polynomial".to_string(),
            ));
        }
        for i in 0..k {
            y[k - 1][i] = (y[k][i] - y[k][k] * y[k][k - i - 1]) / denom;
        }
    }

    (0..n)
        .map(|k| {
            let r = y[k][k];
            if r.abs() >= 1.0 || !r.is_finite() {
                Err(MathError::InvalidInput(
                    "Coefficients do not describe a stationary polynomial".to_string(),
                ))
            } else {
                Ok(r / (1.0 - r * r).sqrt())
            }
        })
        .collect()
}
