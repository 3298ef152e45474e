mod common;

use common::{random_walk, series, white_noise};
use price_forecast::error::{ForecastError, Stage};
use price_forecast::stationarity::{is_stationary, StationarityTester};
use rstest::rstest;

/// x_t = 1.05 x_{t-1} + e_t, a root outside the stationary region
fn explosive(n: usize) -> Vec<f64> {
    let mut level = 10.0;
    white_noise(n, 3)
        .into_iter()
        .map(|e| {
            level = 1.05 * level + e;
            level
        })
        .collect()
}

#[test]
fn test_white_noise_is_stationary() {
    let noise = series(white_noise(200, 42));
    let report = StationarityTester::default().test(&noise).unwrap();

    assert!(report.is_stationary);
    assert!(report.p_value < 0.01);
    assert!(report.statistic < report.critical_values.one_percent);
    assert!(is_stationary(&noise, 0.05).unwrap());
}

#[test]
fn test_growing_series_is_not_stationary() {
    let growth = series(explosive(120));
    let report = StationarityTester::default().test(&growth).unwrap();

    assert!(!report.is_stationary);
    assert!(report.p_value > 0.5);
    assert!(!is_stationary(&growth, 0.05).unwrap());
}

#[test]
fn test_report_fields_are_consistent() {
    let walk = series(random_walk(252, 7));
    let report = StationarityTester::default().test(&walk).unwrap();

    // Schwert rule for 252 observations gives at most 16 lags
    assert!(report.used_lag <= 16);
    assert_eq!(report.nobs, 252 - 1 - report.used_lag);
    assert!(report.critical_values.one_percent < report.critical_values.five_percent);
    assert!(report.critical_values.five_percent < report.critical_values.ten_percent);
    assert!((0.0..=1.0).contains(&report.p_value));
    assert!(report.ic_best.is_finite());
    assert_eq!(report.is_stationary, report.p_value < 0.05);

    let text = report.to_string();
    assert!(text.contains("ADF Statistic"));
    assert!(text.contains("p-value"));
}

#[test]
fn test_verdict_is_deterministic() {
    let walk = series(random_walk(300, 99));
    let tester = StationarityTester::default();

    let first = tester.test(&walk).unwrap();
    let second = tester.test(&walk).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_max_lag_override() {
    let noise = series(white_noise(120, 5));
    let report = StationarityTester::default()
        .with_max_lag(0)
        .test(&noise)
        .unwrap();

    assert_eq!(report.used_lag, 0);
    assert_eq!(report.nobs, 119);
}

#[rstest]
#[case(0.01)]
#[case(0.05)]
#[case(0.10)]
fn test_verdict_follows_significance(#[case] significance: f64) {
    let walk = series(random_walk(252, 11));
    let report = StationarityTester::new(significance)
        .unwrap()
        .test(&walk)
        .unwrap();
    assert_eq!(report.is_stationary, report.p_value < significance);
    assert_eq!(report.significance, significance);
}

#[test]
fn test_constant_series_is_rejected() {
    let flat = series(vec![42.0; 50]);
    match StationarityTester::default().test(&flat).unwrap_err() {
        ForecastError::ValidationError { stage, message } => {
            assert_eq!(stage, Stage::Stationarity);
            assert!(message.contains("constant"));
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_short_series_is_rejected() {
    let short = series(vec![1.0, 2.0, 1.5]);
    assert!(matches!(
        StationarityTester::default().test(&short),
        Err(ForecastError::InsufficientDataError {
            stage: Stage::Stationarity,
            required: 4,
            actual: 3,
        })
    ));
}

#[rstest]
#[case(0.0)]
#[case(1.0)]
#[case(-0.5)]
fn test_invalid_significance(#[case] significance: f64) {
    let noise = series(white_noise(50, 1));
    assert!(is_stationary(&noise, significance).is_err());
}
