//! Seasonal ARIMA estimated by exact maximum likelihood
//!
//! The model is `phi(L) Phi(L^s) (1 - L)^d (1 - L^s)^D y_t = theta(L) Theta(L^s) e_t`
//! without trend or exogenous terms. The series is differenced once up front
//! and the ARMA likelihood of the differenced values is evaluated exactly with
//! a Kalman filter. The innovation variance is concentrated out during the
//! search and the remaining coefficients are optimized in an unconstrained
//! space that maps onto stationary and invertible polynomials.

use super::{
    ForecastModel, ModelOrder, ModelSummary, ParameterEstimate, SeasonalOrder, TestStatistic,
    TrainedForecastModel,
};
use crate::data::TimeSeries;
use crate::error::{FitDiagnostics, ForecastError, Result, Stage};
use serde::{Deserialize, Serialize};
use series_math::differencing::{apply_lag_polynomial, integrate, integration_polynomial};
use series_math::distributions::{chi_squared_sf, normal_critical_value, two_sided_p_value};
use series_math::kalman::{ArmaStateSpace, FilterOutput};
use series_math::optimize::{covariance_from_hessian, numerical_hessian, NelderMead};
use series_math::polynomial::{ar_polynomial, ma_polynomial, multiply, psi_weights};
use series_math::regression::ols;
use series_math::stats;
use series_math::transforms::{constrain_stationary, unconstrain_stationary};

/// Two-sided 95% normal quantile for the parameter table
const Z_95: f64 = 1.959_963_984_540_054;

/// Estimation options
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitOptions {
    /// Simplex iteration budget
    pub max_iterations: usize,
    /// Relative tolerance on the negative log-likelihood across the simplex
    pub tolerance: f64,
    /// Fail instead of warning when the budget runs out
    pub require_convergence: bool,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            max_iterations: 5000,
            tolerance: 1e-6,
            require_convergence: false,
        }
    }
}

impl FitOptions {
    /// Check the budget and tolerance
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(ForecastError::validation(
                Stage::Configuration,
                "max_iterations must be greater than zero",
            ));
        }
        if !(self.tolerance > 0.0 && self.tolerance.is_finite()) {
            return Err(ForecastError::validation(
                Stage::Configuration,
                format!("tolerance must be positive, got {}", self.tolerance),
            ));
        }
        Ok(())
    }
}

/// Position of each coefficient block in the parameter vector:
/// AR, MA, seasonal AR, seasonal MA.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Layout {
    p: usize,
    q: usize,
    seasonal_p: usize,
    seasonal_q: usize,
    period: usize,
}

impl Layout {
    fn new(order: ModelOrder, seasonal: SeasonalOrder) -> Self {
        let period = seasonal.period();
        let (seasonal_p, seasonal_q) = if period > 0 {
            (seasonal.p, seasonal.q)
        } else {
            (0, 0)
        };
        Self {
            p: order.p,
            q: order.q,
            seasonal_p,
            seasonal_q,
            period,
        }
    }

    fn len(&self) -> usize {
        self.p + self.q + self.seasonal_p + self.seasonal_q
    }

    fn blocks<'a>(&self, params: &'a [f64]) -> [&'a [f64]; 4] {
        let (ar, rest) = params.split_at(self.p);
        let (ma, rest) = rest.split_at(self.q);
        let (sar, sma) = rest.split_at(self.seasonal_p);
        [ar, ma, sar, sma]
    }

    /// Unconstrained reals to stationary AR and invertible MA coefficients
    fn constrain(&self, unconstrained: &[f64]) -> Vec<f64> {
        let [ar, ma, sar, sma] = self.blocks(unconstrained);
        let mut params = Vec::with_capacity(self.len());
        params.extend(constrain_stationary(ar));
        params.extend(constrain_stationary(ma).into_iter().map(|c| -c));
        params.extend(constrain_stationary(sar));
        params.extend(constrain_stationary(sma).into_iter().map(|c| -c));
        params
    }

    fn unconstrain(&self, params: &[f64]) -> series_math::Result<Vec<f64>> {
        let [ar, ma, sar, sma] = self.blocks(params);
        let negate = |block: &[f64]| block.iter().map(|c| -c).collect::<Vec<f64>>();
        let mut unconstrained = Vec::with_capacity(self.len());
        unconstrained.extend(unconstrain_stationary(ar)?);
        unconstrained.extend(unconstrain_stationary(&negate(ma))?);
        unconstrained.extend(unconstrain_stationary(sar)?);
        unconstrained.extend(unconstrain_stationary(&negate(sma))?);
        Ok(unconstrained)
    }

    /// Full AR and MA lag polynomials, seasonal factors multiplied in
    fn polynomials(&self, params: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let [ar, ma, sar, sma] = self.blocks(params);
        let ar_poly = multiply(&ar_polynomial(ar, 1), &ar_polynomial(sar, self.period));
        let ma_poly = multiply(&ma_polynomial(ma, 1), &ma_polynomial(sma, self.period));
        (ar_poly, ma_poly)
    }

    fn state_space(&self, params: &[f64]) -> ArmaStateSpace {
        let (ar_poly, ma_poly) = self.polynomials(params);
        let phi: Vec<f64> = ar_poly[1..].iter().map(|c| -c).collect();
        ArmaStateSpace::new(&phi, &ma_poly[1..])
    }

    fn names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.len() + 1);
        names.extend((1..=self.p).map(|i| format!("ar.L{}", i)));
        names.extend((1..=self.q).map(|i| format!("ma.L{}", i)));
        names.extend((1..=self.seasonal_p).map(|i| format!("ar.S.L{}", i * self.period)));
        names.extend((1..=self.seasonal_q).map(|i| format!("ma.S.L{}", i * self.period)));
        names.push("sigma2".to_string());
        names
    }
}

/// SARIMA(p, d, q)x(P, D, Q, s) model specification
#[derive(Debug, Clone, PartialEq)]
pub struct SarimaxModel {
    name: String,
    order: ModelOrder,
    seasonal_order: SeasonalOrder,
    options: FitOptions,
}

impl SarimaxModel {
    /// Create a model; a seasonal period of 0 leaves a plain ARIMA
    pub fn new(order: ModelOrder, seasonal_order: SeasonalOrder) -> Result<Self> {
        let seasonal_order = SeasonalOrder::new(
            seasonal_order.p,
            seasonal_order.d,
            seasonal_order.q,
            seasonal_order.s,
        )?;

        let name = if seasonal_order.is_seasonal() {
            format!("SARIMAX{}x{}", order, seasonal_order)
        } else {
            format!("SARIMAX{}", order)
        };

        Ok(Self {
            name,
            order,
            seasonal_order,
            options: FitOptions::default(),
        })
    }

    /// Override the estimation options
    pub fn with_options(mut self, options: FitOptions) -> Self {
        self.options = options;
        self
    }

    /// Get the non-seasonal order
    pub fn order(&self) -> ModelOrder {
        self.order
    }

    /// Get the seasonal order
    pub fn seasonal_order(&self) -> SeasonalOrder {
        self.seasonal_order
    }

    /// Get the estimation options
    pub fn options(&self) -> FitOptions {
        self.options
    }

    /// Minimum number of observations the model can be fitted on
    pub fn min_observations(&self) -> usize {
        let layout = Layout::new(self.order, self.seasonal_order);
        self.integration().len() - 1 + layout.len() + 2
    }

    fn integration(&self) -> Vec<f64> {
        integration_polynomial(
            self.order.d,
            self.seasonal_order.d,
            self.seasonal_order.period(),
        )
    }

    /// Estimate the coefficients on `series`
    pub fn fit(&self, series: &TimeSeries) -> Result<FittedSarimax> {
        self.options.validate()?;

        let layout = Layout::new(self.order, self.seasonal_order);
        let y = series.values();
        let required = self.min_observations();
        if y.len() < required {
            return Err(ForecastError::insufficient(Stage::ModelFit, required, y.len()));
        }

        let integration = self.integration();
        let w = apply_lag_polynomial(y, &integration)
            .map_err(|e| ForecastError::from_math(Stage::ModelFit, e))?;

        let start = start_params(&layout, &w);
        let start_u = layout
            .unconstrain(&start)
            .unwrap_or_else(|_| vec![0.0; layout.len()]);
        tracing::debug!(model = %self.name, start = ?start, "starting parameters");

        let mut objective = |u: &[f64]| -> f64 {
            match layout.state_space(&layout.constrain(u)).filter(&w) {
                Ok(output) => -output.concentrated_log_likelihood(),
                Err(_) => f64::INFINITY,
            }
        };

        let budget = self.options.max_iterations;
        let tolerance = self.options.tolerance;
        let search_failed = |e: series_math::MathError| ForecastError::ModelFitError {
            message: e.to_string(),
            diagnostics: None,
        };

        let optimizer = NelderMead::new(budget, tolerance)
            .map_err(|e| ForecastError::from_math(Stage::Configuration, e))?;
        let mut minimum = optimizer
            .minimize(&mut objective, &start_u)
            .map_err(search_failed)?;

        // Restart once from the best vertex; a collapsed simplex can stall early
        if minimum.converged && !start_u.is_empty() && minimum.iterations < budget {
            let restart = NelderMead::new(budget - minimum.iterations, tolerance)
                .map_err(|e| ForecastError::from_math(Stage::Configuration, e))?
                .minimize(&mut objective, &minimum.point)
                .map_err(search_failed)?;
            let iterations = minimum.iterations + restart.iterations;
            if restart.value <= minimum.value {
                minimum = restart;
            }
            minimum.iterations = iterations;
        }

        let params = layout.constrain(&minimum.point);
        let diagnostics = FitDiagnostics {
            iterations: minimum.iterations,
            log_likelihood: Some(-minimum.value).filter(|v| v.is_finite()),
            parameters: params.clone(),
        };

        if !minimum.converged {
            if self.options.require_convergence {
                return Err(ForecastError::ModelFitError {
                    message: format!(
                        "likelihood search did not converge within {} iterations",
                        budget
                    ),
                    diagnostics: Some(diagnostics),
                });
            }
            tracing::warn!(
                model = %self.name,
                iterations = minimum.iterations,
                "likelihood search did not converge"
            );
        }

        let fit_error = |message: String| ForecastError::ModelFitError {
            message,
            diagnostics: Some(diagnostics.clone()),
        };

        let space = layout.state_space(&params);
        let output = space.filter(&w).map_err(|e| fit_error(e.to_string()))?;
        let sigma2 = output.sigma2();
        if !(sigma2 > 0.0 && sigma2.is_finite()) {
            return Err(fit_error(format!(
                "innovation variance is not positive ({})",
                sigma2
            )));
        }

        let log_likelihood = output.log_likelihood(sigma2);
        if !log_likelihood.is_finite() {
            return Err(fit_error("log-likelihood is not finite".to_string()));
        }

        let summary = summarize(
            &self.name,
            series.name(),
            &layout,
            &params,
            &w,
            &output,
            sigma2,
            minimum.converged,
            minimum.iterations,
        );

        tracing::info!(
            model = %self.name,
            log_likelihood,
            aic = summary.aic,
            iterations = minimum.iterations,
            "fitted model"
        );

        Ok(FittedSarimax {
            name: self.name.clone(),
            order: self.order,
            seasonal_order: self.seasonal_order,
            layout,
            params,
            sigma2,
            integration,
            history: y.to_vec(),
            space,
            next_state: output.next_state,
            innovations: output.innovations,
            summary,
        })
    }
}

impl ForecastModel for SarimaxModel {
    type Trained = FittedSarimax;

    fn train(&self, series: &TimeSeries) -> Result<FittedSarimax> {
        self.fit(series)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Conditional least-squares AR coefficients, or zeros when they are not stationary
fn conditional_ar(w: &[f64], order: usize, spacing: usize) -> Vec<f64> {
    if order == 0 {
        return Vec::new();
    }

    let max_lag = order * spacing;
    if w.len() <= max_lag + order + 1 {
        return vec![0.0; order];
    }

    let rows: Vec<Vec<f64>> = (max_lag..w.len())
        .map(|t| (1..=order).map(|k| w[t - k * spacing]).collect())
        .collect();

    match ols(&rows, &w[max_lag..]) {
        Ok(fit) if unconstrain_stationary(&fit.params).is_ok() => fit.params,
        _ => vec![0.0; order],
    }
}

fn start_params(layout: &Layout, w: &[f64]) -> Vec<f64> {
    let mut start = Vec::with_capacity(layout.len());
    start.extend(conditional_ar(w, layout.p, 1));
    start.extend(std::iter::repeat(0.0).take(layout.q));
    start.extend(conditional_ar(w, layout.seasonal_p, layout.period));
    start.extend(std::iter::repeat(0.0).take(layout.seasonal_q));
    start
}

#[allow(clippy::too_many_arguments)]
fn summarize(
    name: &str,
    dependent: &str,
    layout: &Layout,
    params: &[f64],
    w: &[f64],
    output: &FilterOutput,
    sigma2: f64,
    converged: bool,
    iterations: usize,
) -> ModelSummary {
    let k = params.len();
    let mut full = params.to_vec();
    full.push(sigma2);

    let steps: Vec<f64> = full
        .iter()
        .enumerate()
        .map(|(i, v)| {
            if i < k {
                1e-4 * v.abs().max(0.1)
            } else {
                1e-4 * v
            }
        })
        .collect();

    let loglike = |x: &[f64]| -> f64 {
        let (coefs, scale) = x.split_at(k);
        if scale[0] <= 0.0 {
            return f64::NAN;
        }
        layout
            .state_space(coefs)
            .filter(w)
            .map(|o| o.log_likelihood(scale[0]))
            .unwrap_or(f64::NAN)
    };

    let covariance = numerical_hessian(loglike, &full, &steps)
        .and_then(|h| covariance_from_hessian(&h).ok());
    if covariance.is_none() {
        tracing::warn!(model = %name, "information matrix is not positive definite");
    }

    let parameters = layout
        .names()
        .into_iter()
        .zip(full.iter())
        .enumerate()
        .map(|(i, (name, &coef))| {
            let std_err = covariance
                .as_ref()
                .map(|c| c[i][i].sqrt())
                .filter(|se| se.is_finite() && *se > 0.0);
            let z = std_err.map(|se| coef / se);
            ParameterEstimate {
                name,
                coef,
                std_err,
                z,
                p_value: z.map(two_sided_p_value),
                conf_int: std_err.map(|se| (coef - Z_95 * se, coef + Z_95 * se)),
            }
        })
        .collect();

    let log_likelihood = output.log_likelihood(sigma2);
    let nobs = output.nobs();
    let n = nobs as f64;
    let n_params = (k + 1) as f64;

    let standardized = output.standardized_innovations(sigma2);
    let ljung_box = stats::autocorrelation(&standardized, 1).and_then(|r| {
        let q = n * (n + 2.0) * r * r / (n - 1.0);
        chi_squared_sf(q, 1.0)
            .ok()
            .map(|p_value| TestStatistic {
                statistic: q,
                p_value,
            })
    });

    let moments = stats::skewness_kurtosis(&standardized);
    let jarque_bera = moments.and_then(|(skew, kurtosis)| {
        let jb = n / 6.0 * (skew * skew + (kurtosis - 3.0).powi(2) / 4.0);
        chi_squared_sf(jb, 2.0)
            .ok()
            .map(|p_value| TestStatistic {
                statistic: jb,
                p_value,
            })
    });

    ModelSummary {
        model: name.to_string(),
        dependent: dependent.to_string(),
        nobs,
        parameters,
        sigma2,
        log_likelihood,
        aic: -2.0 * log_likelihood + 2.0 * n_params,
        bic: -2.0 * log_likelihood + n_params * n.ln(),
        hqic: -2.0 * log_likelihood + 2.0 * n_params * n.ln().ln(),
        converged,
        iterations,
        ljung_box,
        jarque_bera,
        skew: moments.map(|m| m.0),
        kurtosis: moments.map(|m| m.1),
    }
}

/// Fitted SARIMA model, ready to forecast
#[derive(Debug, Clone)]
pub struct FittedSarimax {
    name: String,
    order: ModelOrder,
    seasonal_order: SeasonalOrder,
    layout: Layout,
    params: Vec<f64>,
    sigma2: f64,
    integration: Vec<f64>,
    history: Vec<f64>,
    space: ArmaStateSpace,
    next_state: Vec<f64>,
    innovations: Vec<f64>,
    summary: ModelSummary,
}

impl FittedSarimax {
    /// Get the non-seasonal order
    pub fn order(&self) -> ModelOrder {
        self.order
    }

    /// Get the seasonal order
    pub fn seasonal_order(&self) -> SeasonalOrder {
        self.seasonal_order
    }

    /// Coefficients in table order, without `sigma2`
    pub fn params(&self) -> &[f64] {
        &self.params
    }

    /// Innovation variance
    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }

    /// Get the estimation summary
    pub fn summary(&self) -> &ModelSummary {
        &self.summary
    }

    /// One-step prediction errors of the differenced series
    pub fn residuals(&self) -> &[f64] {
        &self.innovations
    }

    /// One-step-ahead predictions of the observed levels.
    ///
    /// The first `d + s*D` observations have no prediction.
    pub fn fitted_values(&self) -> Vec<f64> {
        let degree = self.integration.len() - 1;
        let w = apply_lag_polynomial(&self.history, &self.integration).unwrap_or_default();

        w.iter()
            .zip(self.innovations.iter())
            .enumerate()
            .map(|(i, (value, innovation))| {
                let t = degree + i;
                let lagged: f64 = (1..=degree)
                    .map(|k| self.integration[k] * self.history[t - k])
                    .sum();
                value - innovation - lagged
            })
            .collect()
    }

    /// Point forecasts for the `horizon` periods after the last observation
    pub fn forecast(&self, horizon: usize) -> Result<Vec<f64>> {
        if horizon == 0 {
            return Err(ForecastError::validation(
                Stage::Forecast,
                "horizon must be at least 1",
            ));
        }

        let increments = self.space.forecast(&self.next_state, horizon);
        integrate(&self.history, &increments, &self.integration)
            .map_err(|e| ForecastError::from_math(Stage::Forecast, e))
    }

    /// Point forecasts with symmetric normal prediction intervals
    pub fn forecast_with_intervals(
        &self,
        horizon: usize,
        confidence: f64,
    ) -> Result<(Vec<f64>, Vec<(f64, f64)>)> {
        let z = normal_critical_value(confidence)
            .map_err(|e| ForecastError::from_math(Stage::Forecast, e))?;
        let values = self.forecast(horizon)?;

        let (ar_poly, ma_poly) = self.layout.polynomials(&self.params);
        let integrated_ar = multiply(&ar_poly, &self.integration);
        let psi = psi_weights(&integrated_ar, &ma_poly, horizon);

        let mut variance = 0.0;
        let intervals = values
            .iter()
            .zip(psi.iter())
            .map(|(value, weight)| {
                variance += self.sigma2 * weight * weight;
                let margin = z * variance.sqrt();
                (value - margin, value + margin)
            })
            .collect();

        Ok((values, intervals))
    }
}

impl TrainedForecastModel for FittedSarimax {
    fn forecast(&self, horizons: usize) -> Result<Vec<f64>> {
        FittedSarimax::forecast(self, horizons)
    }

    fn predict(&self) -> Vec<f64> {
        self.fitted_values()
    }

    fn summary(&self) -> &ModelSummary {
        &self.summary
    }

    fn name(&self) -> &str {
        &self.name
    }
}
