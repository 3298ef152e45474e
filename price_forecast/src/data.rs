//! Time series data handling for forecasting

use crate::error::{ForecastError, Result, Stage};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::path::Path;

/// Dated univariate series with strictly increasing dates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    name: String,
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl TimeSeries {
    /// Create a new series, checking ordering and finiteness
    pub fn new(name: impl Into<String>, dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(ForecastError::validation(
                Stage::Preparation,
                format!(
                    "{} dates but {} values",
                    dates.len(),
                    values.len()
                ),
            ));
        }

        if let Some(i) = dates.windows(2).position(|w| w[1] <= w[0]) {
            let kind = if dates[i + 1] == dates[i] {
                "duplicate"
            } else {
                "out-of-order"
            };
            return Err(ForecastError::validation(
                Stage::Preparation,
                format!("{} date {} at row {}", kind, dates[i + 1], i + 1),
            ));
        }

        if let Some(i) = values.iter().position(|v| !v.is_finite()) {
            return Err(ForecastError::validation(
                Stage::Preparation,
                format!("non-finite value {} at row {}", values[i], i),
            ));
        }

        Ok(Self {
            name: name.into(),
            dates,
            values,
        })
    }

    /// Name of the source column
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the observation dates
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Get the observed values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Get the number of observations
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check whether the series has no observations
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get the first observation date
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    /// Get the last observation date
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Iterate over `(date, value)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }

    /// Observations whose date falls inside the inclusive range
    pub fn between(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        let (dates, values) = self
            .iter()
            .filter(|(date, _)| start.map_or(true, |s| *date >= s))
            .filter(|(date, _)| end.map_or(true, |e| *date <= e))
            .unzip();

        Self {
            name: self.name.clone(),
            dates,
            values,
        }
    }

    /// Mean of the values
    pub fn mean(&self) -> Option<f64> {
        series_math::stats::mean(&self.values)
    }

    /// Sample standard deviation
    pub fn std_dev(&self) -> Option<f64> {
        series_math::stats::std_dev(&self.values, 1)
    }
}

/// Data loader for market data tables
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load a table from a CSV file with a header row
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<DataFrame> {
        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .with_try_parse_dates(true)
            .finish()?;

        tracing::debug!(rows = df.height(), columns = df.width(), "loaded CSV");
        Ok(df)
    }

    /// Detect the date column in a DataFrame
    pub fn detect_date_column(df: &DataFrame) -> Result<String> {
        for name in df.get_column_names() {
            let lower_name = name.to_lowercase();
            if lower_name.contains("date")
                || lower_name.contains("time")
                || lower_name.contains("timestamp")
            {
                return Ok(name.to_string());
            }
        }

        // Fall back to the first temporal column
        if let Some(column) = df.get_columns().iter().find(|c| c.dtype().is_temporal()) {
            return Ok(column.name().to_string());
        }

        Err(ForecastError::validation(
            Stage::Preparation,
            "No date column found in data",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_rejects_duplicate_dates() {
        let err = TimeSeries::new("Close", vec![day(1), day(1)], vec![1.0, 2.0]).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_between_is_inclusive() {
        let series = TimeSeries::new(
            "Close",
            vec![day(1), day(2), day(3), day(4)],
            vec![1.0, 2.0, 3.0, 4.0],
        )
        .unwrap();

        let window = series.between(Some(day(2)), Some(day(3)));
        assert_eq!(window.values(), &[2.0, 3.0]);
        assert_eq!(window.name(), "Close");

        assert_eq!(series.between(None, None), series);
    }
}
