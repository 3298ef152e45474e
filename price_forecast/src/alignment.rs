//! Calendar alignment of forecasts

use crate::error::{ForecastError, Result, Stage};
use chrono::{Days, NaiveDate};
use serde::Serialize;
use std::fs::File;
use std::path::Path;

/// One dated prediction
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lower: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper: Option<f64>,
}

/// Forecast values with their calendar dates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
    intervals: Option<Vec<(f64, f64)>>,
    confidence_level: Option<f64>,
}

impl ForecastResult {
    /// Get the forecast dates
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Get the forecast values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Prediction intervals, if they were computed
    pub fn intervals(&self) -> Option<&[(f64, f64)]> {
        self.intervals.as_deref()
    }

    /// Get the confidence level of the intervals, if any
    pub fn confidence_level(&self) -> Option<f64> {
        self.confidence_level
    }

    /// Number of forecast periods
    pub fn horizon(&self) -> usize {
        self.values.len()
    }

    /// Iterate over dated predictions
    pub fn points(&self) -> impl Iterator<Item = ForecastPoint> + '_ {
        self.dates
            .iter()
            .zip(self.values.iter())
            .enumerate()
            .map(move |(i, (date, value))| {
                let interval = self.intervals.as_ref().map(|iv| iv[i]);
                ForecastPoint {
                    date: *date,
                    value: *value,
                    lower: interval.map(|iv| iv.0),
                    upper: interval.map(|iv| iv.1),
                }
            })
    }

    /// Serialize the forecast as a JSON array of points
    pub fn to_json(&self) -> Result<String> {
        let points: Vec<ForecastPoint> = self.points().collect();
        Ok(serde_json::to_string_pretty(&points)?)
    }

    /// Write the forecast as CSV with a `Date` column
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = csv::Writer::from_writer(File::create(path)?);

        if self.intervals.is_some() {
            writer.write_record(["Date", "Forecast", "Lower", "Upper"])?;
        } else {
            writer.write_record(["Date", "Forecast"])?;
        }

        for point in self.points() {
            let mut record = vec![point.date.to_string(), point.value.to_string()];
            if let (Some(lower), Some(upper)) = (point.lower, point.upper) {
                record.push(lower.to_string());
                record.push(upper.to_string());
            }
            writer.write_record(&record)?;
        }

        writer.flush()?;
        Ok(())
    }
}

/// Attaches consecutive calendar dates to forecast values
#[derive(Debug, Clone, Copy, Default)]
pub struct ForecastDateAligner;

impl ForecastDateAligner {
    /// Date the values starting the day after `last_observed`
    pub fn align(&self, predictions: &[f64], last_observed: NaiveDate) -> Result<ForecastResult> {
        if predictions.is_empty() {
            return Err(ForecastError::validation(
                Stage::Alignment,
                "no predictions to align",
            ));
        }

        Ok(ForecastResult {
            dates: future_dates(last_observed, predictions.len())?,
            values: predictions.to_vec(),
            intervals: None,
            confidence_level: None,
        })
    }

    /// Like [`align`](Self::align), keeping prediction intervals
    pub fn align_with_intervals(
        &self,
        predictions: &[f64],
        intervals: &[(f64, f64)],
        confidence_level: f64,
        last_observed: NaiveDate,
    ) -> Result<ForecastResult> {
        if intervals.len() != predictions.len() {
            return Err(ForecastError::validation(
                Stage::Alignment,
                format!(
                    "{} predictions but {} intervals",
                    predictions.len(),
                    intervals.len()
                ),
            ));
        }

        let mut result = self.align(predictions, last_observed)?;
        result.intervals = Some(intervals.to_vec());
        result.confidence_level = Some(confidence_level);
        Ok(result)
    }
}

/// `count` consecutive days after `last_observed`, weekends included
pub fn future_dates(last_observed: NaiveDate, count: usize) -> Result<Vec<NaiveDate>> {
    (1..=count as u64)
        .map(|offset| {
            last_observed.checked_add_days(Days::new(offset)).ok_or_else(|| {
                ForecastError::validation(
                    Stage::Alignment,
                    format!("date {} + {} days is out of range", last_observed, offset),
                )
            })
        })
        .collect()
}

/// Align `predictions` to the days after `last_observed`
pub fn align(predictions: &[f64], last_observed: NaiveDate) -> Result<ForecastResult> {
    ForecastDateAligner.align(predictions, last_observed)
}
