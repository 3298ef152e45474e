//! Exact Gaussian likelihood of ARMA processes via the Kalman filter
//!
//! The process `y_t = sum phi_i y_{t-i} + e_t + sum theta_j e_{t-j}` is cast in
//! Harvey's state-space form with state dimension `r = max(p, q + 1)`:
//!
//! - transition `T`: first column `phi`, ones on the superdiagonal
//! - selection `R = (1, theta_1, ..., theta_{r-1})'`
//! - observation `Z = (1, 0, ..., 0)`
//!
//! The filter runs with unit innovation variance so that the scale can be
//! concentrated out of the likelihood.

use crate::{MathError, Result};
use nalgebra::DMatrix;
use std::f64::consts::PI;

const MAX_DOUBLINGS: usize = 64;
const DOUBLING_TOLERANCE: f64 = 1e-14;
const STEADY_STATE_TOLERANCE: f64 = 1e-13;

/// ARMA model in state-space form
#[derive(Debug, Clone, PartialEq)]
pub struct ArmaStateSpace {
    phi: Vec<f64>,
    selection: Vec<f64>,
    dim: usize,
}

/// Output of a filtering pass
#[derive(Debug, Clone)]
pub struct FilterOutput {
    /// One-step prediction errors
    pub innovations: Vec<f64>,
    /// Prediction error variances (unit innovation scale)
    pub variances: Vec<f64>,
    /// Predicted state for the period after the last observation
    pub next_state: Vec<f64>,
}

impl FilterOutput {
    /// Number of filtered observations
    pub fn nobs(&self) -> usize {
        self.innovations.len()
    }

    /// Maximum likelihood estimate of the innovation variance
    pub fn sigma2(&self) -> f64 {
        let n = self.nobs().max(1) as f64;
        self.innovations
            .iter()
            .zip(self.variances.iter())
            .map(|(v, f)| v * v / f)
            .sum::<f64>()
            / n
    }

    /// Log-likelihood with the innovation variance concentrated out
    pub fn concentrated_log_likelihood(&self) -> f64 {
        let n = self.nobs() as f64;
        let sum_log_f: f64 = self.variances.iter().map(|f| f.ln()).sum();
        -0.5 * n * ((2.0 * PI).ln() + self.sigma2().ln() + 1.0) - 0.5 * sum_log_f
    }

    /// Log-likelihood at a given innovation variance
    pub fn log_likelihood(&self, sigma2: f64) -> f64 {
        let n = self.nobs() as f64;
        let weighted: f64 = self
            .innovations
            .iter()
            .zip(self.variances.iter())
            .map(|(v, f)| f.ln() + v * v / (sigma2 * f))
            .sum();
        -0.5 * n * ((2.0 * PI).ln() + sigma2.ln()) - 0.5 * weighted
    }

    /// Innovations scaled to unit variance at `sigma2`
    pub fn standardized_innovations(&self, sigma2: f64) -> Vec<f64> {
        self.innovations
            .iter()
            .zip(self.variances.iter())
            .map(|(v, f)| v / (sigma2 * f).sqrt())
            .collect()
    }
}

impl ArmaStateSpace {
    /// Build the state-space form from AR coefficients `phi` and MA coefficients `theta`
    pub fn new(phi: &[f64], theta: &[f64]) -> Self {
        let dim = phi.len().max(theta.len() + 1);

        let mut padded_phi = vec![0.0; dim];
        padded_phi[..phi.len()].copy_from_slice(phi);

        let mut selection = vec![0.0; dim];
        selection[0] = 1.0;
        selection[1..=theta.len()].copy_from_slice(theta);

        Self {
            phi: padded_phi,
            selection,
            dim,
        }
    }

    /// State dimension
    pub fn dim(&self) -> usize {
        self.dim
    }

    fn transition(&self) -> DMatrix<f64> {
        let r = self.dim;
        DMatrix::from_fn(r, r, |i, j| {
            if j == 0 {
                self.phi[i]
            } else if j == i + 1 {
                1.0
            } else {
                0.0
            }
        })
    }

    /// Unconditional state covariance `P = T P T' + R R'` (unit innovation variance).
    ///
    /// Solved with the doubling recursion; fails when the AR part is not
    /// stationary.
    pub fn stationary_covariance(&self) -> Result<DMatrix<f64>> {
        let r = self.dim;
        let mut p = DMatrix::from_fn(r, r, |i, j| self.selection[i] * self.selection[j]);
        let mut a = self.transition();

        for _ in 0..MAX_DOUBLINGS {
            let increment = &a * &p * a.transpose();
            p += &increment;
            a = &a * &a;

            if !p.iter().all(|v| v.is_finite()) {
                break;
            }
            if a.amax() < DOUBLING_TOLERANCE {
                return Ok(p);
            }
        }

        Err(MathError::CalculationError(
            "Autoregressive part is not stationary".to_string(),
        ))
    }

    /// Run the Kalman filter over `data` from the stationary initial state
    pub fn filter(&self, data: &[f64]) -> Result<FilterOutput> {
        let r = self.dim;
        let initial = self.stationary_covariance()?;

        // Row-major covariance of the predicted state
        let mut p: Vec<f64> = (0..r * r).map(|k| initial[(k / r, k % r)]).collect();
        let mut next_p = vec![0.0; r * r];
        let mut previous = vec![0.0; r * r];
        let mut tp = vec![0.0; r * r];
        let mut a = vec![0.0; r];
        let mut gain = vec![0.0; r];
        let mut steady = false;

        let mut innovations = Vec::with_capacity(data.len());
        let mut variances = Vec::with_capacity(data.len());

        for &y in data {
            let f = p[0];
            if !(f > 0.0 && f.is_finite()) {
                return Err(MathError::CalculationError(
                    "Prediction error variance is not positive".to_string(),
                ));
            }
            let v = y - a[0];
            innovations.push(v);
            variances.push(f);

            for i in 0..r {
                gain[i] = p[i * r] / f;
            }

            // Update then predict the state: a <- T (a + gain * v)
            for i in 0..r {
                a[i] += gain[i] * v;
            }
            let level = a[0];
            for i in 0..r {
                let next = if i + 1 < r { a[i + 1] } else { 0.0 };
                a[i] = self.phi[i] * level + next;
            }

            if steady {
                continue;
            }

            previous.copy_from_slice(&p);

            // Updated covariance: P - P Z' Z P / F
            let column: Vec<f64> = (0..r).map(|i| p[i * r]).collect();
            for i in 0..r {
                for j in 0..r {
                    p[i * r + j] -= column[i] * column[j] / f;
                }
            }

            // (T P)_{ij} = phi_i P_{0j} + P_{i+1,j}
            for i in 0..r {
                for j in 0..r {
                    let below = if i + 1 < r { p[(i + 1) * r + j] } else { 0.0 };
                    tp[i * r + j] = self.phi[i] * p[j] + below;
                }
            }

            // (T P T')_{ij} = (TP)_{i0} phi_j + (TP)_{i,j+1}, plus R R'
            let mut change: f64 = 0.0;
            for i in 0..r {
                for j in 0..r {
                    let right = if j + 1 < r { tp[i * r + j + 1] } else { 0.0 };
                    let value = tp[i * r] * self.phi[j] + right + self.selection[i] * self.selection[j];
                    next_p[i * r + j] = value;
                    change = change.max((value - previous[i * r + j]).abs());
                }
            }

            std::mem::swap(&mut p, &mut next_p);
            if change < STEADY_STATE_TOLERANCE {
                steady = true;
            }
        }

        Ok(FilterOutput {
            innovations,
            variances,
            next_state: a,
        })
    }

    /// Propagate a predicted state `horizon` steps without new innovations
    /// and return the implied observations
    pub fn forecast(&self, next_state: &[f64], horizon: usize) -> Vec<f64> {
        let r = self.dim;
        let mut a = next_state.to_vec();
        a.resize(r, 0.0);

        let mut values = Vec::with_capacity(horizon);
        for _ in 0..horizon {
            values.push(a[0]);
            let level = a[0];
            for i in 0..r {
                let next = if i + 1 < r { a[i + 1] } else { 0.0 };
                a[i] = self.phi[i] * level + next;
            }
        }
        values
    }
}
