//! Conversion of raw market-data tables into validated series

use crate::data::{DataLoader, TimeSeries};
use crate::error::{ForecastError, Result, Stage};
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;

/// Day number of 1970-01-01 counted from 0001-01-01 (CE)
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Extracts one price column and its dates from a DataFrame
#[derive(Debug, Clone)]
pub struct SeriesPreparer {
    column: String,
    date_column: Option<String>,
}

impl SeriesPreparer {
    /// Prepare the named value column; the date column is detected
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            date_column: None,
        }
    }

    /// Use an explicit date column instead of detecting one
    pub fn with_date_column(mut self, name: impl Into<String>) -> Self {
        self.date_column = Some(name.into());
        self
    }

    /// Get the value column name
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Build a [`TimeSeries`] from `raw`.
    ///
    /// Dates must already be strictly ascending; nothing is sorted, filled or dropped.
    pub fn prepare(&self, raw: &DataFrame) -> Result<TimeSeries> {
        if raw.height() == 0 {
            return Err(ForecastError::insufficient(Stage::Preparation, 1, 0));
        }

        let date_name = match &self.date_column {
            Some(name) => name.clone(),
            None => DataLoader::detect_date_column(raw)?,
        };

        let dates = extract_dates(lookup(raw, &date_name)?)?;
        let values = extract_values(lookup(raw, &self.column)?)?;
        let series = TimeSeries::new(self.column.clone(), dates, values)?;

        tracing::info!(
            column = %self.column,
            date_column = %date_name,
            observations = series.len(),
            "prepared series"
        );
        Ok(series)
    }
}

/// Prepare `column` from `raw`, detecting the date column
pub fn prepare(raw: &DataFrame, column: &str) -> Result<TimeSeries> {
    SeriesPreparer::new(column).prepare(raw)
}

fn lookup<'a>(raw: &'a DataFrame, name: &str) -> Result<&'a Series> {
    if !raw.get_column_names().contains(&name) {
        return Err(ForecastError::validation(
            Stage::Preparation,
            format!(
                "column '{}' not found (available: {})",
                name,
                raw.get_column_names().join(", ")
            ),
        ));
    }
    Ok(raw.column(name)?)
}

fn extract_values(column: &Series) -> Result<Vec<f64>> {
    if !column.dtype().is_numeric() {
        return Err(ForecastError::validation(
            Stage::Preparation,
            format!(
                "column '{}' has non-numeric type {}",
                column.name(),
                column.dtype()
            ),
        ));
    }

    let cast = column.cast(&DataType::Float64)?;
    cast.f64()?
        .into_iter()
        .enumerate()
        .map(|(row, value)| match value {
            Some(v) if v.is_finite() => Ok(v),
            Some(v) => Err(ForecastError::validation(
                Stage::Preparation,
                format!("non-finite value {} at row {}", v, row),
            )),
            None => Err(missing(column.name(), row)),
        })
        .collect()
}

fn extract_dates(column: &Series) -> Result<Vec<NaiveDate>> {
    match column.dtype() {
        DataType::Date => {
            let days = column.cast(&DataType::Int32)?;
            days.i32()?
                .into_iter()
                .enumerate()
                .map(|(row, day)| {
                    let day = day.ok_or_else(|| missing(column.name(), row))?;
                    from_epoch_days(i64::from(day), row)
                })
                .collect()
        }
        DataType::Datetime(unit, _) => {
            let per_day: i64 = match unit {
                TimeUnit::Nanoseconds => 86_400_000_000_000,
                TimeUnit::Microseconds => 86_400_000_000,
                TimeUnit::Milliseconds => 86_400_000,
            };
            let stamps = column.cast(&DataType::Int64)?;
            stamps
                .i64()?
                .into_iter()
                .enumerate()
                .map(|(row, stamp)| {
                    let stamp = stamp.ok_or_else(|| missing(column.name(), row))?;
                    from_epoch_days(stamp.div_euclid(per_day), row)
                })
                .collect()
        }
        DataType::Utf8 => column
            .utf8()?
            .into_iter()
            .enumerate()
            .map(|(row, text)| {
                let text = text.ok_or_else(|| missing(column.name(), row))?;
                parse_date(text.trim()).ok_or_else(|| {
                    ForecastError::validation(
                        Stage::Preparation,
                        format!("unparseable date '{}' at row {}", text, row),
                    )
                })
            })
            .collect(),
        other => Err(ForecastError::validation(
            Stage::Preparation,
            format!("column '{}' of type {} is not a date", column.name(), other),
        )),
    }
}

fn from_epoch_days(days: i64, row: usize) -> Result<NaiveDate> {
    i32::try_from(days)
        .ok()
        .and_then(|d| d.checked_add(UNIX_EPOCH_DAYS_FROM_CE))
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .ok_or_else(|| {
            ForecastError::validation(
                Stage::Preparation,
                format!("date out of range at row {}", row),
            )
        })
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
        })
}

fn missing(column: &str, row: usize) -> ForecastError {
    ForecastError::validation(
        Stage::Preparation,
        format!("missing value in column '{}' at row {}", column, row),
    )
}
