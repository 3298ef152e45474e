//! Error types for the price_forecast crate

use polars::prelude::PolarsError;
use serde::Serialize;
use series_math::MathError;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Pipeline stage that produced an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stage {
    Configuration,
    Preparation,
    Stationarity,
    Decomposition,
    ModelFit,
    Forecast,
    Alignment,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Configuration => "configuration",
            Stage::Preparation => "series preparation",
            Stage::Stationarity => "stationarity test",
            Stage::Decomposition => "decomposition",
            Stage::ModelFit => "model fit",
            Stage::Forecast => "forecast",
            Stage::Alignment => "date alignment",
        };
        f.write_str(name)
    }
}

/// Partial diagnostics from an estimation that did not produce a usable fit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitDiagnostics {
    /// Optimizer iterations performed
    pub iterations: usize,
    /// Best log-likelihood reached, if any was finite
    pub log_likelihood: Option<f64>,
    /// Constrained parameters at the best point
    pub parameters: Vec<f64>,
}

/// Custom error types for the price_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Malformed input or configuration
    #[error("Validation error in {stage}: {message}")]
    ValidationError { stage: Stage, message: String },

    /// Series too short for the requested operation
    #[error("Insufficient data for {stage}: need at least {required} observations, got {actual}")]
    InsufficientDataError {
        stage: Stage,
        required: usize,
        actual: usize,
    },

    /// Estimation failed numerically
    #[error("Model fit error: {message}")]
    ModelFitError {
        message: String,
        diagnostics: Option<FitDiagnostics>,
    },

    /// Fitting exceeded a caller-imposed deadline
    #[error("Model fitting did not finish within {0:?}")]
    TimeoutError(Duration),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),

    /// Error writing CSV output
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error (de)serialising JSON
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Numerical error not attributed to a stage
    #[error("Math error: {0}")]
    MathError(#[from] MathError),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}

impl ForecastError {
    pub(crate) fn validation(stage: Stage, message: impl Into<String>) -> Self {
        ForecastError::ValidationError {
            stage,
            message: message.into(),
        }
    }

    pub(crate) fn insufficient(stage: Stage, required: usize, actual: usize) -> Self {
        ForecastError::InsufficientDataError {
            stage,
            required,
            actual,
        }
    }

    /// Attach a stage to a numerical error from `series_math`
    pub(crate) fn from_math(stage: Stage, err: MathError) -> Self {
        match err {
            MathError::InsufficientData { required, actual } => {
                Self::insufficient(stage, required, actual)
            }
            MathError::InvalidInput(message) => Self::validation(stage, message),
            MathError::CalculationError(message) | MathError::SingularMatrix(message)
                if stage == Stage::ModelFit =>
            {
                ForecastError::ModelFitError {
                    message,
                    diagnostics: None,
                }
            }
            other => Self::validation(stage, format!("numerical failure: {}", other)),
        }
    }

    /// Stage that produced the error, when known
    pub fn stage(&self) -> Option<Stage> {
        match self {
            ForecastError::ValidationError { stage, .. }
            | ForecastError::InsufficientDataError { stage, .. } => Some(*stage),
            ForecastError::ModelFitError { .. } | ForecastError::TimeoutError(_) => {
                Some(Stage::ModelFit)
            }
            _ => None,
        }
    }
}
