//! Forecasting models for time series data

use crate::data::TimeSeries;
use crate::error::{ForecastError, Result, Stage};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};

pub mod sarimax;
pub mod summary;

pub use sarimax::{FitOptions, FittedSarimax, SarimaxModel};
pub use summary::{ModelSummary, ParameterEstimate, TestStatistic};

/// Non-seasonal order (p, d, q)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ModelOrder {
    /// Autoregressive lags
    pub p: usize,
    /// Differencing passes
    pub d: usize,
    /// Moving-average lags
    pub q: usize,
}

impl ModelOrder {
    /// Create a non-seasonal order
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }
}

impl fmt::Display for ModelOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.p, self.d, self.q)
    }
}

/// Seasonal order (P, D, Q, s); `s = 0` disables the seasonal part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SeasonalOrder {
    /// Seasonal autoregressive lags
    pub p: usize,
    /// Seasonal differencing passes
    pub d: usize,
    /// Seasonal moving-average lags
    pub q: usize,
    /// Observations per season
    pub s: usize,
}

impl SeasonalOrder {
    /// Create a seasonal order.
    ///
    /// With `s = 0` the seasonal terms are inactive whatever P, D and Q are.
    /// A period of 1 would duplicate the non-seasonal lags and is rejected.
    pub fn new(p: usize, d: usize, q: usize, s: usize) -> Result<Self> {
        let order = Self { p, d, q, s };
        if order.has_terms() && s == 1 {
            return Err(ForecastError::validation(
                Stage::Configuration,
                format!("seasonal order {} needs a period of 0 or at least 2", order),
            ));
        }
        Ok(order)
    }

    /// No seasonal terms
    pub fn none() -> Self {
        Self::default()
    }

    /// Seasonal order that repeats the non-seasonal one: P = p, D = d, Q = q
    pub fn mirroring(order: ModelOrder, s: usize) -> Result<Self> {
        Self::new(order.p, order.d, order.q, s)
    }

    fn has_terms(&self) -> bool {
        self.p + self.d + self.q > 0
    }

    /// Whether any seasonal lag enters the model
    pub fn is_seasonal(&self) -> bool {
        self.s >= 2 && self.has_terms()
    }

    /// Effective period, zero when the seasonal part is disabled
    pub fn period(&self) -> usize {
        if self.is_seasonal() {
            self.s
        } else {
            0
        }
    }
}

impl fmt::Display for SeasonalOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}, {})", self.p, self.d, self.q, self.s)
    }
}

/// Trained forecast model
pub trait TrainedForecastModel: Debug {
    /// Predictions for the `horizons` periods after the training data
    fn forecast(&self, horizons: usize) -> Result<Vec<f64>>;

    /// One-step-ahead in-sample predictions
    fn predict(&self) -> Vec<f64>;

    /// Estimation summary
    fn summary(&self) -> &ModelSummary;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecast model that can be trained on a time series
pub trait ForecastModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Train the model on a series
    fn train(&self, series: &TimeSeries) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}
