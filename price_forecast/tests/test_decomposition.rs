mod common;

use approx::assert_relative_eq;
use common::{seasonal_prices, series};
use price_forecast::decomposition::{decompose, Decomposer};
use price_forecast::error::{ForecastError, Stage};
use rstest::rstest;

#[rstest]
#[case(12)]
#[case(7)]
#[case(5)]
#[case(2)]
fn test_additive_identity(#[case] period: usize) {
    let prices = series(seasonal_prices(120, 21));
    let result = decompose(&prices, period).unwrap();

    assert_eq!(result.period, period);
    assert_eq!(result.trend.len(), prices.len());
    assert_eq!(result.seasonal.len(), prices.len());
    assert_eq!(result.residual.len(), prices.len());

    for i in 0..prices.len() {
        match (result.trend[i], result.residual[i]) {
            (Some(trend), Some(residual)) => {
                assert_relative_eq!(
                    result.observed[i],
                    trend + result.seasonal[i] + residual,
                    epsilon = 1e-9
                );
            }
            (None, None) => {}
            other => panic!("trend and residual disagree at {}: {:?}", i, other),
        }
    }
}

#[rstest]
#[case(12, 6)]
#[case(7, 3)]
#[case(4, 2)]
fn test_trend_edges_are_absent(#[case] period: usize, #[case] edge: usize) {
    let prices = series(seasonal_prices(60, 4));
    let result = decompose(&prices, period).unwrap();
    let n = prices.len();

    assert!(result.trend[..edge].iter().all(Option::is_none));
    assert!(result.trend[n - edge..].iter().all(Option::is_none));
    assert!(result.trend[edge..n - edge].iter().all(Option::is_some));
}

#[test]
fn test_seasonal_windows_sum_to_zero() {
    let prices = series(seasonal_prices(96, 8));
    let result = decompose(&prices, 12).unwrap();

    for window in result.seasonal.windows(12) {
        assert_relative_eq!(window.iter().sum::<f64>(), 0.0, epsilon = 1e-9);
    }
    // The pattern repeats exactly
    for i in 12..result.seasonal.len() {
        assert_eq!(result.seasonal[i], result.seasonal[i - 12]);
    }
}

#[test]
fn test_recovers_exact_components() {
    let pattern = [2.0, -1.0, 0.5, -1.5];
    let values: Vec<f64> = (0..40)
        .map(|i| 10.0 + 0.5 * i as f64 + pattern[i % 4])
        .collect();
    let result = Decomposer::new(4).decompose(&series(values)).unwrap();

    for i in 0..4 {
        assert_relative_eq!(result.seasonal[i], pattern[i], epsilon = 1e-9);
    }
    for (i, trend) in result.trend.iter().enumerate() {
        if let Some(trend) = trend {
            assert_relative_eq!(*trend, 10.0 + 0.5 * i as f64, epsilon = 1e-9);
        }
    }
    for residual in result.residual.iter().flatten() {
        assert_relative_eq!(*residual, 0.0, epsilon = 1e-9);
    }

    assert_relative_eq!(result.seasonal_strength().unwrap(), 1.0, epsilon = 1e-9);
    assert_relative_eq!(result.trend_strength().unwrap(), 1.0, epsilon = 1e-9);
}

#[test]
fn test_strengths_are_bounded() {
    let prices = series(seasonal_prices(120, 13));
    let result = decompose(&prices, 12).unwrap();

    let seasonal = result.seasonal_strength().unwrap();
    let trend = result.trend_strength().unwrap();
    assert!((0.0..=1.0).contains(&seasonal));
    assert!((0.0..=1.0).contains(&trend));
}

#[test]
fn test_short_series_is_rejected() {
    let short = series(vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    match decompose(&short, 12).unwrap_err() {
        ForecastError::InsufficientDataError {
            stage,
            required,
            actual,
        } => {
            assert_eq!(stage, Stage::Decomposition);
            assert_eq!(required, 24);
            assert_eq!(actual, 5);
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_exactly_two_periods_is_enough() {
    let values: Vec<f64> = (0..24).map(|i| (i % 12) as f64).collect();
    assert!(decompose(&series(values), 12).is_ok());
}

#[rstest]
#[case(0)]
#[case(1)]
fn test_period_below_two_is_insufficient(#[case] period: usize) {
    let values: Vec<f64> = (0..30).map(|i| (i % 6) as f64).collect();
    let err = Decomposer::new(period).decompose(&series(values)).unwrap_err();
    assert!(matches!(
        err,
        ForecastError::InsufficientDataError {
            stage: Stage::Decomposition,
            required: 4,
            actual: 30,
        }
    ));
}
