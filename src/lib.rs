//! # Price Forecast Workspace
//!
//! Umbrella crate over the workspace members:
//!
//! - [`series_math`]: numerical building blocks (differencing, regression, Kalman filter, optimisers)
//! - [`price_forecast`]: series preparation, diagnostics, SARIMA fitting and dated forecasts
//!
//! ## Example
//!
//! ```
//! use price_forecast_workspace::series_math::differencing::difference;
//!
//! let diffs = difference(&[1.0, 3.0, 6.0], 1, 1).unwrap();
//! assert_eq!(diffs, vec![2.0, 3.0]);
//! ```

pub use price_forecast;
pub use series_math;

/// Workspace version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_members_are_reachable() {
        let config = price_forecast::ForecastConfig::new("Close").unwrap();
        assert_eq!(config.column(), "Close");
        assert!(series_math::stats::mean(&[1.0, 2.0, 3.0]).is_some());
    }
}
