//! Augmented Dickey-Fuller stationarity check

use crate::data::TimeSeries;
use crate::error::{ForecastError, Result, Stage};
use serde::Serialize;
use series_math::mackinnon::{self, CriticalValues};
use series_math::regression::ols;
use series_math::MathError;
use std::fmt;

/// Default significance level of the test
pub const DEFAULT_SIGNIFICANCE: f64 = 0.05;

/// Outcome of an ADF test
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationarityReport {
    /// t statistic of the lagged level
    pub statistic: f64,
    /// MacKinnon approximate p-value
    pub p_value: f64,
    /// Number of lagged differences in the final regression
    pub used_lag: usize,
    /// Observations in the final regression
    pub nobs: usize,
    pub critical_values: CriticalValues,
    /// AIC of the selected lag during the search
    pub ic_best: f64,
    pub significance: f64,
    pub is_stationary: bool,
}

impl fmt::Display for StationarityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ADF Statistic: {:.6}", self.statistic)?;
        writeln!(f, "p-value: {:.6}", self.p_value)?;
        writeln!(f, "Lags used: {} (nobs {})", self.used_lag, self.nobs)?;
        writeln!(
            f,
            "Critical values: 1%: {:.4}, 5%: {:.4}, 10%: {:.4}",
            self.critical_values.one_percent,
            self.critical_values.five_percent,
            self.critical_values.ten_percent
        )?;
        let verdict = if self.is_stationary {
            "stationary"
        } else {
            "non-stationary"
        };
        write!(f, "Series is {} at the {} level", verdict, self.significance)
    }
}

/// ADF test with a constant and AIC lag selection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StationarityTester {
    significance: f64,
    max_lag: Option<usize>,
}

impl Default for StationarityTester {
    fn default() -> Self {
        Self {
            significance: DEFAULT_SIGNIFICANCE,
            max_lag: None,
        }
    }
}

impl StationarityTester {
    /// Create a tester; the significance level must lie in (0, 1)
    pub fn new(significance: f64) -> Result<Self> {
        if !(significance > 0.0 && significance < 1.0) {
            return Err(ForecastError::validation(
                Stage::Stationarity,
                format!("significance must be in (0, 1), got {}", significance),
            ));
        }

        Ok(Self {
            significance,
            max_lag: None,
        })
    }

    /// Cap the lag search instead of using the Schwert rule
    pub fn with_max_lag(mut self, max_lag: usize) -> Self {
        self.max_lag = Some(max_lag);
        self
    }

    /// Get the significance level
    pub fn significance(&self) -> f64 {
        self.significance
    }

    /// Verdict only: p-value below the significance level
    pub fn is_stationary(&self, series: &TimeSeries) -> Result<bool> {
        Ok(self.test(series)?.is_stationary)
    }

    /// Run the full test
    pub fn test(&self, series: &TimeSeries) -> Result<StationarityReport> {
        let x = series.values();
        let n = x.len();

        // At least one lagged level and a residual degree of freedom
        if n < 4 {
            return Err(ForecastError::insufficient(Stage::Stationarity, 4, n));
        }

        let (min, max) = x
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(*v), hi.max(*v))
            });
        if max == min {
            return Err(ForecastError::validation(
                Stage::Stationarity,
                "series is constant",
            ));
        }

        let schwert = (12.0 * (n as f64 / 100.0).powf(0.25)).ceil() as usize;
        let max_lag = self.max_lag.unwrap_or(schwert).min(n / 2 - 2);
        let diffs: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();

        let (used_lag, ic_best) = select_lag(x, &diffs, max_lag)?;
        // Refit the chosen lag on the widest available sample
        let (rows, response) = adf_design(x, &diffs, used_lag, used_lag);

        let fit = ols(&rows, &response)
            .map_err(|e| ForecastError::from_math(Stage::Stationarity, e))?;
        let statistic = fit.t_values[1];
        if !statistic.is_finite() {
            return Err(ForecastError::validation(
                Stage::Stationarity,
                "Dickey-Fuller regression is degenerate",
            ));
        }

        let p_value = mackinnon::p_value(statistic);
        let report = StationarityReport {
            statistic,
            p_value,
            used_lag,
            nobs: fit.nobs,
            critical_values: mackinnon::critical_values(fit.nobs),
            ic_best,
            significance: self.significance,
            is_stationary: p_value < self.significance,
        };

        tracing::debug!(used_lag, max_lag, statistic, "selected Dickey-Fuller lag");
        if report.is_stationary {
            tracing::info!(p_value, "series is stationary");
        } else {
            tracing::warn!(p_value, "series is not stationary");
        }

        Ok(report)
    }
}

/// Check stationarity of `series` at `significance`
pub fn is_stationary(series: &TimeSeries, significance: f64) -> Result<bool> {
    StationarityTester::new(significance)?.is_stationary(series)
}

/// Pick the number of lagged differences by AIC over a common sample
fn select_lag(x: &[f64], diffs: &[f64], max_lag: usize) -> Result<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;

    for lag in 0..=max_lag {
        let (rows, response) = adf_design(x, diffs, max_lag, lag);
        let fit = match ols(&rows, &response) {
            Ok(fit) => fit,
            Err(MathError::SingularMatrix(_)) => continue,
            Err(e) => return Err(ForecastError::from_math(Stage::Stationarity, e)),
        };

        if best.map_or(true, |(_, aic)| fit.aic < aic) {
            best = Some((lag, fit.aic));
        }
    }

    best.ok_or_else(|| {
        ForecastError::validation(
            Stage::Stationarity,
            "every Dickey-Fuller regression is singular",
        )
    })
}

/// Regression of `diff_t` on a constant, `x_t` and `lag` lagged differences.
///
/// The sample starts after `trim` differences so that regressions with
/// different lags can share observations.
fn adf_design(x: &[f64], diffs: &[f64], trim: usize, lag: usize) -> (Vec<Vec<f64>>, Vec<f64>) {
    let rows = (trim..diffs.len())
        .map(|t| {
            let mut row = Vec::with_capacity(lag + 2);
            row.push(1.0);
            row.push(x[t]);
            row.extend((1..=lag).map(|k| diffs[t - k]));
            row
        })
        .collect();
    let response = diffs[trim..].to_vec();
    (rows, response)
}
