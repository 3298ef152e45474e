#![allow(dead_code)]

use chrono::{Datelike, Days, NaiveDate, Weekday};
use polars::prelude::*;
use price_forecast::data::TimeSeries;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Consecutive calendar days starting at `start`
pub fn daily_dates(start: NaiveDate, n: usize) -> Vec<NaiveDate> {
    (0..n as u64)
        .map(|i| start.checked_add_days(Days::new(i)).unwrap())
        .collect()
}

/// Weekdays starting at the first weekday on or after `start`
pub fn business_dates(start: NaiveDate, n: usize) -> Vec<NaiveDate> {
    start
        .iter_days()
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .take(n)
        .collect()
}

pub fn white_noise(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, 1.0).unwrap();
    (0..n).map(|_| normal.sample(&mut rng)).collect()
}

/// Price-like random walk starting at 100
pub fn random_walk(n: usize, seed: u64) -> Vec<f64> {
    let mut level = 100.0;
    white_noise(n, seed)
        .into_iter()
        .map(|shock| {
            level += shock;
            level
        })
        .collect()
}

/// AR(1) process with unit innovations
pub fn ar1(n: usize, phi: f64, seed: u64) -> Vec<f64> {
    let mut previous = 0.0;
    white_noise(n, seed)
        .into_iter()
        .map(|shock| {
            previous = phi * previous + shock;
            previous
        })
        .collect()
}

/// Random walk plus a period-12 cycle, like monthly-seasonal closing prices
pub fn seasonal_prices(n: usize, seed: u64) -> Vec<f64> {
    random_walk(n, seed)
        .into_iter()
        .enumerate()
        .map(|(i, v)| v + 3.0 * (2.0 * std::f64::consts::PI * i as f64 / 12.0).sin())
        .collect()
}

pub fn series(values: Vec<f64>) -> TimeSeries {
    let dates = daily_dates(date(2023, 1, 2), values.len());
    TimeSeries::new("Close", dates, values).unwrap()
}

/// Market-data table with a string `Date` column and OHLC-style prices
pub fn price_frame(dates: &[NaiveDate], closes: &[f64]) -> DataFrame {
    let date_strings: Vec<String> = dates.iter().map(|d| d.to_string()).collect();
    let opens: Vec<f64> = closes.iter().map(|c| c - 0.5).collect();
    df!(
        "Date" => date_strings,
        "Open" => opens,
        "Close" => closes.to_vec()
    )
    .unwrap()
}
