//! Probability helpers built on `statrs`

use crate::{MathError, Result};
use statrs::distribution::{ChiSquared, ContinuousCDF};
use statrs::function::erf::{erfc, erfc_inv};
use std::f64::consts::SQRT_2;

/// Standard normal cumulative distribution function
pub fn normal_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / SQRT_2)
}

/// Standard normal quantile function
pub fn normal_quantile(p: f64) -> f64 {
    -SQRT_2 * erfc_inv(2.0 * p)
}

/// Two-sided p-value of a z statistic
pub fn two_sided_p_value(z: f64) -> f64 {
    2.0 * (1.0 - normal_cdf(z.abs()))
}

/// Critical z for a two-sided interval at `confidence`
pub fn normal_critical_value(confidence: f64) -> Result<f64> {
    if !(confidence > 0.0 && confidence < 1.0) {
        return Err(MathError::InvalidInput(format!(
            "Confidence level must be between 0 and 1, got {}",
            confidence
        )));
    }
    Ok(normal_quantile(1.0 - (1.0 - confidence) / 2.0))
}

/// Upper tail probability of a chi-squared statistic
pub fn chi_squared_sf(statistic: f64, degrees_of_freedom: f64) -> Result<f64> {
    let dist = ChiSquared::new(degrees_of_freedom)
        .map_err(|e| MathError::InvalidInput(format!("Chi-squared distribution: {}", e)))?;
    Ok(1.0 - dist.cdf(statistic.max(0.0)))
}
