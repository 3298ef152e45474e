//! Additive seasonal decomposition

use crate::data::TimeSeries;
use crate::error::{ForecastError, Result, Stage};
use chrono::NaiveDate;
use serde::Serialize;
use series_math::moving_averages::centered_moving_average;
use series_math::stats;

/// Shortest season a decomposition accepts
pub const MIN_PERIOD: usize = 2;

/// Trend, seasonal and residual parts of a series.
///
/// Wherever the trend is defined, `observed = trend + seasonal + residual`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecompositionResult {
    pub dates: Vec<NaiveDate>,
    pub observed: Vec<f64>,
    /// Centred moving average, absent for the first and last `period / 2` positions
    pub trend: Vec<Option<f64>>,
    /// Repeating pattern with zero mean over each period
    pub seasonal: Vec<f64>,
    pub residual: Vec<Option<f64>>,
    pub period: usize,
}

impl DecompositionResult {
    /// Strength of trend, `1 - Var(R) / Var(T + R)` clamped at zero
    pub fn trend_strength(&self) -> Option<f64> {
        let (residual, combined): (Vec<f64>, Vec<f64>) = self
            .defined()
            .map(|(t, _, r)| (r, t + r))
            .unzip();
        strength(&residual, &combined)
    }

    /// Strength of seasonality, `1 - Var(R) / Var(S + R)` clamped at zero
    pub fn seasonal_strength(&self) -> Option<f64> {
        let (residual, combined): (Vec<f64>, Vec<f64>) = self
            .defined()
            .map(|(_, s, r)| (r, s + r))
            .unzip();
        strength(&residual, &combined)
    }

    fn defined(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.trend
            .iter()
            .zip(self.seasonal.iter())
            .zip(self.residual.iter())
            .filter_map(|((t, s), r)| Some(((*t)?, *s, (*r)?)))
    }
}

fn strength(residual: &[f64], combined: &[f64]) -> Option<f64> {
    let var_r = stats::variance(residual, 1)?;
    let var_c = stats::variance(combined, 1)?;
    if var_c == 0.0 {
        return None;
    }
    Some((1.0 - var_r / var_c).max(0.0))
}

/// Additive decomposition with a fixed period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decomposer {
    period: usize,
}

impl Decomposer {
    /// Create a decomposer for seasons of `period` observations
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    /// Get the seasonal period
    pub fn period(&self) -> usize {
        self.period
    }

    /// Split `series` into trend, seasonal and residual components
    pub fn decompose(&self, series: &TimeSeries) -> Result<DecompositionResult> {
        let period = self.period;
        let observed = series.values();
        let n = observed.len();

        // Two full seasons of at least two observations each
        let required = 2 * period.max(MIN_PERIOD);
        if period < MIN_PERIOD || n < required {
            return Err(ForecastError::insufficient(Stage::Decomposition, required, n));
        }

        let trend = centered_moving_average(observed, period)
            .map_err(|e| ForecastError::from_math(Stage::Decomposition, e))?;

        let detrended: Vec<Option<f64>> = observed
            .iter()
            .zip(trend.iter())
            .map(|(y, t)| t.map(|t| y - t))
            .collect();

        let mut phase_means: Vec<f64> = (0..period)
            .map(|phase| {
                let values: Vec<f64> = detrended
                    .iter()
                    .skip(phase)
                    .step_by(period)
                    .filter_map(|v| *v)
                    .collect();
                stats::mean(&values).unwrap_or(0.0)
            })
            .collect();

        let centre = stats::mean(&phase_means).unwrap_or(0.0);
        for value in &mut phase_means {
            *value -= centre;
        }

        let seasonal: Vec<f64> = (0..n).map(|i| phase_means[i % period]).collect();
        let residual = detrended
            .iter()
            .zip(seasonal.iter())
            .map(|(d, s)| d.map(|d| d - s))
            .collect();

        tracing::info!(period, observations = n, "decomposed series");

        Ok(DecompositionResult {
            dates: series.dates().to_vec(),
            observed: observed.to_vec(),
            trend,
            seasonal,
            residual,
            period,
        })
    }
}

/// Decompose `series` with the given period
pub fn decompose(series: &TimeSeries, period: usize) -> Result<DecompositionResult> {
    Decomposer::new(period).decompose(series)
}
