//! End-to-end forecast run

use crate::alignment::{ForecastDateAligner, ForecastResult};
use crate::config::ForecastConfig;
use crate::data::TimeSeries;
use crate::decomposition::{DecompositionResult, Decomposer};
use crate::error::{ForecastError, Result, Stage};
use crate::models::{ModelSummary, SarimaxModel};
use crate::preparer::SeriesPreparer;
use crate::stationarity::{StationarityReport, StationarityTester};
use polars::prelude::DataFrame;
use serde::Serialize;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

/// Everything produced by one run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub series: TimeSeries,
    pub stationarity: StationarityReport,
    pub decomposition: DecompositionResult,
    pub summary: ModelSummary,
    pub forecast: ForecastResult,
}

/// Prepare, diagnose, fit, forecast and align, in that order
#[derive(Debug, Clone)]
pub struct ForecastPipeline {
    config: ForecastConfig,
}

impl ForecastPipeline {
    /// Create a pipeline for a validated configuration
    pub fn new(config: ForecastConfig) -> Self {
        Self { config }
    }

    /// Get the configuration
    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Run every stage on a raw market-data table
    pub fn run(&self, raw: &DataFrame) -> Result<PipelineReport> {
        let mut preparer = SeriesPreparer::new(self.config.column());
        if let Some(name) = self.config.date_column() {
            preparer = preparer.with_date_column(name);
        }

        let series = preparer
            .prepare(raw)?
            .between(self.config.start_date(), self.config.end_date());
        if series.is_empty() {
            return Err(ForecastError::insufficient(Stage::Preparation, 1, 0));
        }

        self.run_series(series)
    }

    /// Run every stage after preparation on an existing series
    pub fn run_series(&self, series: TimeSeries) -> Result<PipelineReport> {
        let started = Instant::now();
        let config = &self.config;

        let last_observed = series
            .last_date()
            .ok_or_else(|| ForecastError::insufficient(Stage::Preparation, 1, 0))?;

        let stationarity = StationarityTester::new(config.significance())?.test(&series)?;
        let decomposition = Decomposer::new(config.decomposition_period()).decompose(&series)?;

        let model = SarimaxModel::new(config.order(), config.seasonal_order())?
            .with_options(config.fit_options());
        let fitted = model.fit(&series)?;

        let (values, intervals) =
            fitted.forecast_with_intervals(config.horizon(), config.confidence_level())?;
        let forecast = ForecastDateAligner.align_with_intervals(
            &values,
            &intervals,
            config.confidence_level(),
            last_observed,
        )?;

        tracing::info!(
            ticker = config.ticker().unwrap_or("-"),
            observations = series.len(),
            horizon = forecast.horizon(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "forecast complete"
        );

        Ok(PipelineReport {
            series,
            stationarity,
            decomposition,
            summary: fitted.summary().clone(),
            forecast,
        })
    }

    /// Run on a worker thread, giving up after `timeout`.
    ///
    /// A worker that misses the deadline is detached and its result discarded.
    pub fn run_with_timeout(&self, raw: &DataFrame, timeout: Duration) -> Result<PipelineReport> {
        let (sender, receiver) = mpsc::channel();
        let pipeline = self.clone();
        let frame = raw.clone();

        thread::spawn(move || {
            // The receiver may already be gone after a timeout
            let _ = sender.send(pipeline.run(&frame));
        });

        match receiver.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!(?timeout, "forecast run timed out");
                Err(ForecastError::TimeoutError(timeout))
            }
            Err(RecvTimeoutError::Disconnected) => Err(ForecastError::ModelFitError {
                message: "forecast worker stopped without a result".to_string(),
                diagnostics: None,
            }),
        }
    }
}
