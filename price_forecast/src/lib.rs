//! # Price Forecast
//!
//! Statistical forecasting of a single dated price column.
//!
//! ## Features
//!
//! - Series preparation from polars DataFrames or CSV files
//! - Augmented Dickey-Fuller stationarity check
//! - Additive seasonal decomposition
//! - SARIMA(p, d, q)x(P, D, Q, s) estimation by exact maximum likelihood
//! - Multi-step forecasts with prediction intervals, dated one calendar day apart
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use price_forecast::{DataLoader, ForecastConfig, ForecastPipeline};
//!
//! # fn main() -> price_forecast::error::Result<()> {
//! let frame = DataLoader::from_csv("prices.csv")?;
//! let config = ForecastConfig::new("Close")?.with_horizon(10)?;
//!
//! let report = ForecastPipeline::new(config).run(&frame)?;
//! println!("{}", report.summary);
//! for point in report.forecast.points() {
//!     println!("{} {:.2}", point.date, point.value);
//! }
//! # Ok(())
//! # }
//! ```

pub mod alignment;
pub mod config;
pub mod data;
pub mod decomposition;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod preparer;
pub mod stationarity;

// Re-export commonly used types
pub use crate::alignment::{ForecastDateAligner, ForecastPoint, ForecastResult};
pub use crate::config::ForecastConfig;
pub use crate::data::{DataLoader, TimeSeries};
pub use crate::decomposition::{DecompositionResult, Decomposer};
pub use crate::error::{ForecastError, Stage};
pub use crate::models::{
    FitOptions, FittedSarimax, ForecastModel, ModelOrder, ModelSummary, SarimaxModel,
    SeasonalOrder, TrainedForecastModel,
};
pub use crate::pipeline::{ForecastPipeline, PipelineReport};
pub use crate::preparer::SeriesPreparer;
pub use crate::stationarity::{StationarityReport, StationarityTester};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
