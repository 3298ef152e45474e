//! Derivative-free minimisation with the Nelder-Mead simplex method
//!
//! Uses the dimension-adaptive coefficients of Gao and Han (2012) for two or
//! more parameters. Non-finite objective values are treated as `+inf`, so an
//! objective can reject a region by returning `NaN` or infinity.
//!
//! The search stops once both the objective values and the vertices of the
//! simplex have drawn together.

use crate::{MathError, Result};
use nalgebra::DMatrix;

/// Nelder-Mead configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NelderMead {
    max_iterations: usize,
    tolerance: f64,
    point_tolerance: f64,
    initial_step: f64,
}

/// Largest coordinate distance from the best vertex accepted at convergence
pub const DEFAULT_POINT_TOLERANCE: f64 = 1e-4;

/// Best point found by a minimisation
#[derive(Debug, Clone, PartialEq)]
pub struct Minimum {
    pub point: Vec<f64>,
    pub value: f64,
    pub iterations: usize,
    pub evaluations: usize,
    pub converged: bool,
}

impl Default for NelderMead {
    fn default() -> Self {
        Self {
            max_iterations: 2000,
            tolerance: 1e-8,
            point_tolerance: DEFAULT_POINT_TOLERANCE,
            initial_step: 0.1,
        }
    }
}

impl NelderMead {
    /// Create an optimizer with an iteration budget and a relative tolerance
    /// on the spread of objective values across the simplex
    pub fn new(max_iterations: usize, tolerance: f64) -> Result<Self> {
        if max_iterations == 0 {
            return Err(MathError::InvalidInput(
                "Iteration budget must be greater than zero".to_string(),
            ));
        }
        if !(tolerance > 0.0 && tolerance.is_finite()) {
            return Err(MathError::InvalidInput(format!(
                "Tolerance must be positive, got {}",
                tolerance
            )));
        }

        Ok(Self {
            max_iterations,
            tolerance,
            point_tolerance: DEFAULT_POINT_TOLERANCE,
            initial_step: 0.1,
        })
    }

    /// Simplex edge length used for coordinates that start at zero
    pub fn with_initial_step(mut self, step: f64) -> Self {
        self.initial_step = step;
        self
    }

    /// Largest coordinate distance between the best vertex and any other
    /// vertex at convergence
    pub fn with_point_tolerance(mut self, tolerance: f64) -> Self {
        self.point_tolerance = tolerance;
        self
    }

    /// Get the iteration budget
    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Get the tolerance on objective values
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Get the tolerance on vertex positions
    pub fn point_tolerance(&self) -> f64 {
        self.point_tolerance
    }

    /// Minimise `objective` starting from `start`
    pub fn minimize<F>(&self, mut objective: F, start: &[f64]) -> Result<Minimum>
    where
        F: FnMut(&[f64]) -> f64,
    {
        let n = start.len();
        let mut evaluations = 0usize;
        let mut eval = |x: &[f64]| {
            evaluations += 1;
            let value = objective(x);
            if value.is_finite() {
                value
            } else {
                f64::INFINITY
            }
        };

        if n == 0 {
            let value = eval(start);
            if !value.is_finite() {
                return Err(MathError::CalculationError(
                    "Objective is not finite at the starting point".to_string(),
                ));
            }
            return Ok(Minimum {
                point: Vec::new(),
                value,
                iterations: 0,
                evaluations: 1,
                converged: true,
            });
        }

        let dim = n as f64;
        let (reflect, expand, contract, shrink) = if n >= 2 {
            (1.0, 1.0 + 2.0 / dim, 0.75 - 1.0 / (2.0 * dim), 1.0 - 1.0 / dim)
        } else {
            (1.0, 2.0, 0.5, 0.5)
        };

        let mut simplex: Vec<(Vec<f64>, f64)> = Vec::with_capacity(n + 1);
        simplex.push((start.to_vec(), eval(start)));
        for i in 0..n {
            let mut vertex = start.to_vec();
            vertex[i] += if vertex[i].abs() > 1e-8 {
                0.05 * vertex[i]
            } else {
                self.initial_step
            };
            let value = eval(&vertex);
            simplex.push((vertex, value));
        }

        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.max_iterations {
            simplex.sort_by(|a, b| a.1.total_cmp(&b.1));

            let best = simplex[0].1;
            let worst = simplex[n].1;
            let spread = (worst - best).abs();
            let values_close = spread <= self.tolerance * (best.abs() + self.tolerance);
            let shrunk = self.diameter(&simplex) <= self.point_tolerance;
            if best.is_finite() && values_close && shrunk {
                converged = true;
                break;
            }
            iterations += 1;

            let mut centroid = vec![0.0; n];
            for (vertex, _) in &simplex[..n] {
                for (c, v) in centroid.iter_mut().zip(vertex.iter()) {
                    *c += v / dim;
                }
            }

            let along = |towards: &[f64], coefficient: f64| -> Vec<f64> {
                centroid
                    .iter()
                    .zip(towards.iter())
                    .map(|(c, t)| c + coefficient * (t - c))
                    .collect()
            };

            let reflected = along(&simplex[n].0, -reflect);
            let reflected_value = eval(&reflected);

            if reflected_value < simplex[0].1 {
                let expanded = along(&reflected, expand);
                let expanded_value = eval(&expanded);
                simplex[n] = if expanded_value < reflected_value {
                    (expanded, expanded_value)
                } else {
                    (reflected, reflected_value)
                };
                continue;
            }

            if reflected_value < simplex[n - 1].1 {
                simplex[n] = (reflected, reflected_value);
                continue;
            }

            let (contracted, contracted_value, accept) = if reflected_value < simplex[n].1 {
                let point = along(&reflected, contract);
                let value = eval(&point);
                let accept = value <= reflected_value;
                (point, value, accept)
            } else {
                let point = along(&simplex[n].0, contract);
                let value = eval(&point);
                let accept = value < simplex[n].1;
                (point, value, accept)
            };

            if accept {
                simplex[n] = (contracted, contracted_value);
                continue;
            }

            let anchor = simplex[0].0.clone();
            for (vertex, value) in simplex.iter_mut().skip(1) {
                for (v, a) in vertex.iter_mut().zip(anchor.iter()) {
                    *v = a + shrink * (*v - a);
                }
                *value = eval(vertex);
            }
        }

        simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
        let (point, value) = simplex.swap_remove(0);
        if !value.is_finite() {
            return Err(MathError::CalculationError(
                "Objective was never finite on the simplex".to_string(),
            ));
        }

        Ok(Minimum {
            point,
            value,
            iterations,
            evaluations,
            converged,
        })
    }
}

impl NelderMead {
    /// Largest coordinate distance from the best vertex to any other vertex
    fn diameter(&self, simplex: &[(Vec<f64>, f64)]) -> f64 {
        let best = &simplex[0].0;
        simplex[1..]
            .iter()
            .flat_map(|(vertex, _)| vertex.iter().zip(best.iter()).map(|(v, b)| (v - b).abs()))
            .fold(0.0, f64::max)
    }
}

/// Central-difference Hessian of `objective` at `point`.
///
/// `steps[i]` is the perturbation of coordinate `i`. Returns `None` if any
/// evaluation is not finite.
pub fn numerical_hessian<F>(
    mut objective: F,
    point: &[f64],
    steps: &[f64],
) -> Option<Vec<Vec<f64>>>
where
    F: FnMut(&[f64]) -> f64,
{
    let n = point.len();
    let mut at = |shifts: &[(usize, f64)]| -> Option<f64> {
        let mut x = point.to_vec();
        for &(i, delta) in shifts {
            x[i] += delta;
        }
        let value = objective(&x);
        value.is_finite().then_some(value)
    };

    let centre = at(&[])?;
    let mut hessian = vec![vec![0.0; n]; n];

    for i in 0..n {
        let hi = steps[i];
        let up = at(&[(i, hi)])?;
        let down = at(&[(i, -hi)])?;
        hessian[i][i] = (up - 2.0 * centre + down) / (hi * hi);

        for j in 0..i {
            let hj = steps[j];
            let pp = at(&[(i, hi), (j, hj)])?;
            let pm = at(&[(i, hi), (j, -hj)])?;
            let mp = at(&[(i, -hi), (j, hj)])?;
            let mm = at(&[(i, -hi), (j, -hj)])?;
            let value = (pp - pm - mp + mm) / (4.0 * hi * hj);
            hessian[i][j] = value;
            hessian[j][i] = value;
        }
    }

    Some(hessian)
}

/// Covariance of maximum likelihood estimates, the inverse of the negated
/// log-likelihood Hessian. Fails unless that matrix is positive definite.
pub fn covariance_from_hessian(hessian: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
    let n = hessian.len();
    if hessian.iter().any(|row| row.len() != n) {
        return Err(MathError::InvalidInput("Hessian must be square".to_string()));
    }

    let information = DMatrix::from_fn(n, n, |i, j| -hessian[i][j]);
    let inverse = information
        .cholesky()
        .ok_or_else(|| {
            MathError::SingularMatrix("Information matrix is not positive definite".to_string())
        })?
        .inverse();

    Ok((0..n)
        .map(|i| (0..n).map(|j| inverse[(i, j)]).collect())
        .collect())
}
