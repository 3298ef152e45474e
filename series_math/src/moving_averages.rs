//! Moving average calculations used for trend extraction
//!
//! Contains:
//! - Simple Moving Average (SMA) over a sliding window
//! - Rolling means of every complete window
//! - Centred moving averages for classical decomposition

use crate::{MathError, Result};
use std::collections::VecDeque;

/// Simple Moving Average (SMA) implementation
#[derive(Debug, Clone)]
pub struct SimpleMovingAverage {
    period: usize,
    values: VecDeque<f64>,
    sum: f64,
}

impl SimpleMovingAverage {
    /// Create a new Simple Moving Average with the specified period
    pub fn new(period: usize) -> Result<Self> {
        if period == 0 {
            return Err(MathError::InvalidInput(
                "Period must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            period,
            values: VecDeque::with_capacity(period),
            sum: 0.0,
        })
    }

    /// Push a new value into the window
    pub fn update(&mut self, value: f64) {
        self.values.push_back(value);
        self.sum += value;

        if self.values.len() > self.period {
            if let Some(old_value) = self.values.pop_front() {
                self.sum -= old_value;
            }
        }
    }

    /// Whether the window holds `period` values
    pub fn is_ready(&self) -> bool {
        self.values.len() == self.period
    }

    /// Get the current SMA value
    pub fn value(&self) -> Result<f64> {
        if !self.is_ready() {
            return Err(MathError::InsufficientData {
                required: self.period,
                actual: self.values.len(),
            });
        }

        Ok(self.sum / self.period as f64)
    }
}

/// Means of every complete window of `period` values, in order.
///
/// The output has `data.len() - period + 1` entries.
pub fn rolling_means(data: &[f64], period: usize) -> Result<Vec<f64>> {
    let mut sma = SimpleMovingAverage::new(period)?;
    if data.len() < period {
        return Err(MathError::InsufficientData {
            required: period,
            actual: data.len(),
        });
    }

    let mut means = Vec::with_capacity(data.len() - period + 1);
    for &value in data {
        sma.update(value);
        if sma.is_ready() {
            means.push(sma.value()?);
        }
    }

    Ok(means)
}

/// Centred moving average aligned with the input.
///
/// Odd periods use equal weights over `period` points. Even periods use the
/// 2x`period` average (weights 1/2, 1, ..., 1, 1/2 over `period + 1` points).
/// The first and last `period / 2` positions have no value.
pub fn centered_moving_average(data: &[f64], period: usize) -> Result<Vec<Option<f64>>> {
    if period < 2 {
        return Err(MathError::InvalidInput(format!(
            "Centred moving average needs a period of at least 2, got {}",
            period
        )));
    }

    let required = period + (period + 1) % 2;
    if data.len() < required {
        return Err(MathError::InsufficientData {
            required,
            actual: data.len(),
        });
    }

    let means = rolling_means(data, period)?;
    let half = period / 2;
    let mut trend = vec![None; data.len()];

    if period % 2 == 1 {
        for (k, mean) in means.iter().enumerate() {
            trend[k + half] = Some(*mean);
        }
    } else {
        for (k, pair) in means.windows(2).enumerate() {
            trend[k + half] = Some((pair[0] + pair[1]) / 2.0);
        }
    }

    Ok(trend)
}
