//! Forecast configuration, validated once at construction

use crate::error::{ForecastError, Result, Stage};
use crate::models::{FitOptions, ModelOrder, SeasonalOrder};
use crate::stationarity::DEFAULT_SIGNIFICANCE;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Largest AR, MA or differencing order accepted
pub const MAX_ORDER: usize = 5;
/// Largest seasonal period accepted
pub const MAX_SEASONAL_PERIOD: usize = 24;
/// Largest forecast horizon accepted
pub const MAX_HORIZON: usize = 365;

/// Non-seasonal order when none is given
pub const DEFAULT_ORDER: ModelOrder = ModelOrder { p: 2, d: 1, q: 2 };
/// Days forecast when no horizon is given
pub const DEFAULT_HORIZON: usize = 10;
/// Seasonal and decomposition period when none is given
pub const DEFAULT_PERIOD: usize = 12;
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

/// Everything a forecast run needs to know
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawForecastConfig", into = "RawForecastConfig")]
pub struct ForecastConfig {
    ticker: Option<String>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    column: String,
    date_column: Option<String>,
    order: ModelOrder,
    seasonal_order: SeasonalOrder,
    horizon: usize,
    significance: f64,
    decomposition_period: usize,
    confidence_level: f64,
    fit: FitOptions,
}

/// Unchecked form used for (de)serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawForecastConfig {
    #[serde(default)]
    ticker: Option<String>,
    #[serde(default)]
    start_date: Option<NaiveDate>,
    #[serde(default)]
    end_date: Option<NaiveDate>,
    column: String,
    #[serde(default)]
    date_column: Option<String>,
    #[serde(default = "default_order")]
    order: ModelOrder,
    /// Mirrors `order` with period 12 when absent
    #[serde(default)]
    seasonal_order: Option<SeasonalOrder>,
    #[serde(default = "default_horizon")]
    horizon: usize,
    #[serde(default = "default_significance")]
    significance: f64,
    #[serde(default = "default_period")]
    decomposition_period: usize,
    #[serde(default = "default_confidence_level")]
    confidence_level: f64,
    #[serde(default)]
    fit: FitOptions,
}

fn default_order() -> ModelOrder {
    DEFAULT_ORDER
}

fn default_horizon() -> usize {
    DEFAULT_HORIZON
}

fn default_significance() -> f64 {
    DEFAULT_SIGNIFICANCE
}

fn default_period() -> usize {
    DEFAULT_PERIOD
}

fn default_confidence_level() -> f64 {
    DEFAULT_CONFIDENCE_LEVEL
}

impl TryFrom<RawForecastConfig> for ForecastConfig {
    type Error = ForecastError;

    fn try_from(raw: RawForecastConfig) -> Result<Self> {
        let seasonal_order = match raw.seasonal_order {
            Some(seasonal) => seasonal,
            None => SeasonalOrder::mirroring(raw.order, DEFAULT_PERIOD)?,
        };

        let config = Self {
            ticker: raw.ticker,
            start_date: raw.start_date,
            end_date: raw.end_date,
            column: raw.column,
            date_column: raw.date_column,
            order: raw.order,
            seasonal_order,
            horizon: raw.horizon,
            significance: raw.significance,
            decomposition_period: raw.decomposition_period,
            confidence_level: raw.confidence_level,
            fit: raw.fit,
        };
        config.validate()?;
        Ok(config)
    }
}

impl From<ForecastConfig> for RawForecastConfig {
    fn from(config: ForecastConfig) -> Self {
        Self {
            ticker: config.ticker,
            start_date: config.start_date,
            end_date: config.end_date,
            column: config.column,
            date_column: config.date_column,
            order: config.order,
            seasonal_order: Some(config.seasonal_order),
            horizon: config.horizon,
            significance: config.significance,
            decomposition_period: config.decomposition_period,
            confidence_level: config.confidence_level,
            fit: config.fit,
        }
    }
}

fn invalid(message: impl Into<String>) -> ForecastError {
    ForecastError::validation(Stage::Configuration, message)
}

fn check_order(label: &str, value: usize) -> Result<()> {
    if value > MAX_ORDER {
        return Err(invalid(format!(
            "{} must be between 0 and {}, got {}",
            label, MAX_ORDER, value
        )));
    }
    Ok(())
}

impl ForecastConfig {
    /// Defaults for forecasting `column`: (2,1,2)x(2,1,2,12), 10 days ahead
    pub fn new(column: impl Into<String>) -> Result<Self> {
        let order = DEFAULT_ORDER;
        let config = Self {
            ticker: None,
            start_date: None,
            end_date: None,
            column: column.into(),
            date_column: None,
            order,
            seasonal_order: SeasonalOrder::mirroring(order, DEFAULT_PERIOD)?,
            horizon: DEFAULT_HORIZON,
            significance: DEFAULT_SIGNIFICANCE,
            decomposition_period: DEFAULT_PERIOD,
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
            fit: FitOptions::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parse and validate a JSON configuration
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str::<RawForecastConfig>(text)?.try_into()
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every bound
    pub fn validate(&self) -> Result<()> {
        if self.column.trim().is_empty() {
            return Err(invalid("column name must not be empty"));
        }

        check_order("p", self.order.p)?;
        check_order("d", self.order.d)?;
        check_order("q", self.order.q)?;
        check_order("seasonal P", self.seasonal_order.p)?;
        check_order("seasonal D", self.seasonal_order.d)?;
        check_order("seasonal Q", self.seasonal_order.q)?;
        if self.seasonal_order.s > MAX_SEASONAL_PERIOD {
            return Err(invalid(format!(
                "seasonal period must be between 0 and {}, got {}",
                MAX_SEASONAL_PERIOD, self.seasonal_order.s
            )));
        }
        SeasonalOrder::new(
            self.seasonal_order.p,
            self.seasonal_order.d,
            self.seasonal_order.q,
            self.seasonal_order.s,
        )?;

        if !(1..=MAX_HORIZON).contains(&self.horizon) {
            return Err(invalid(format!(
                "horizon must be between 1 and {}, got {}",
                MAX_HORIZON, self.horizon
            )));
        }
        if !(self.significance > 0.0 && self.significance < 1.0) {
            return Err(invalid(format!(
                "significance must be in (0, 1), got {}",
                self.significance
            )));
        }
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(invalid(format!(
                "confidence level must be in (0, 1), got {}",
                self.confidence_level
            )));
        }
        if self.decomposition_period < 2 {
            return Err(invalid(format!(
                "decomposition period must be at least 2, got {}",
                self.decomposition_period
            )));
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(invalid(format!(
                    "start date {} is after end date {}",
                    start, end
                )));
            }
        }
        self.fit.validate()
    }

    fn revalidated(self) -> Result<Self> {
        self.validate()?;
        Ok(self)
    }

    /// Forecast a different value column
    pub fn with_column(mut self, column: impl Into<String>) -> Result<Self> {
        self.column = column.into();
        self.revalidated()
    }

    /// Label the run with a ticker symbol
    pub fn with_ticker(mut self, ticker: impl Into<String>) -> Self {
        self.ticker = Some(ticker.into());
        self
    }

    /// Restrict the series to an inclusive date range
    pub fn with_date_range(
        mut self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Self> {
        self.start_date = start;
        self.end_date = end;
        self.revalidated()
    }

    /// Use `name` as the date column instead of detecting one
    pub fn with_date_column(mut self, name: impl Into<String>) -> Self {
        self.date_column = Some(name.into());
        self
    }

    /// Set the non-seasonal and seasonal orders
    pub fn with_orders(mut self, order: ModelOrder, seasonal_order: SeasonalOrder) -> Result<Self> {
        self.order = order;
        self.seasonal_order = seasonal_order;
        self.revalidated()
    }

    /// Set the number of days to forecast
    pub fn with_horizon(mut self, horizon: usize) -> Result<Self> {
        self.horizon = horizon;
        self.revalidated()
    }

    /// Set the significance level of the stationarity test
    pub fn with_significance(mut self, significance: f64) -> Result<Self> {
        self.significance = significance;
        self.revalidated()
    }

    /// Set the period used by the seasonal decomposition
    pub fn with_decomposition_period(mut self, period: usize) -> Result<Self> {
        self.decomposition_period = period;
        self.revalidated()
    }

    /// Set the confidence level of the prediction intervals
    pub fn with_confidence_level(mut self, confidence_level: f64) -> Result<Self> {
        self.confidence_level = confidence_level;
        self.revalidated()
    }

    /// Set the estimation options
    pub fn with_fit_options(mut self, fit: FitOptions) -> Result<Self> {
        self.fit = fit;
        self.revalidated()
    }

    /// Get the ticker symbol
    pub fn ticker(&self) -> Option<&str> {
        self.ticker.as_deref()
    }

    /// Get the first date kept
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    /// Get the last date kept
    pub fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }

    /// Get the value column name
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Get the explicit date column name
    pub fn date_column(&self) -> Option<&str> {
        self.date_column.as_deref()
    }

    /// Get the non-seasonal order
    pub fn order(&self) -> ModelOrder {
        self.order
    }

    /// Get the seasonal order
    pub fn seasonal_order(&self) -> SeasonalOrder {
        self.seasonal_order
    }

    /// Get the forecast horizon in days
    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Get the stationarity significance level
    pub fn significance(&self) -> f64 {
        self.significance
    }

    /// Get the decomposition period
    pub fn decomposition_period(&self) -> usize {
        self.decomposition_period
    }

    /// Get the interval confidence level
    pub fn confidence_level(&self) -> f64 {
        self.confidence_level
    }

    /// Get the estimation options
    pub fn fit_options(&self) -> FitOptions {
        self.fit
    }
}
