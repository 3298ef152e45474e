//! # Series Math
//!
//! Numerical building blocks for univariate time series analysis.
//! The forecasting crate treats everything in here as a trusted dependency:
//! moving averages, differencing, lag polynomials, ordinary least squares,
//! a Nelder-Mead optimizer, ARMA state-space filtering and the MacKinnon
//! response surfaces used by the Dickey-Fuller test.

use thiserror::Error;

pub mod differencing;
pub mod distributions;
pub mod kalman;
pub mod mackinnon;
pub mod moving_averages;
pub mod optimize;
pub mod polynomial;
pub mod regression;
pub mod stats;
pub mod transforms;

/// Errors that can occur in numerical calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: need at least {required} values, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),

    #[error("Singular matrix: {0}")]
    SingularMatrix(String),
}

/// Result type for numerical operations
pub type Result<T> = std::result::Result<T, MathError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_lengths() {
        let err = MathError::InsufficientData {
            required: 24,
            actual: 5,
        };
        let message = err.to_string();
        assert!(message.contains("24"));
        assert!(message.contains("5"));
    }
}
