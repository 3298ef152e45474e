mod common;

use common::date;
use pretty_assertions::assert_eq;
use price_forecast::config::{ForecastConfig, DEFAULT_HORIZON};
use price_forecast::error::{ForecastError, Stage};
use price_forecast::models::{FitOptions, ModelOrder, SeasonalOrder};
use rstest::rstest;
use std::io::Write;
use tempfile::NamedTempFile;

fn assert_configuration_error<T: std::fmt::Debug>(result: Result<T, ForecastError>) {
    match result {
        Err(ForecastError::ValidationError { stage, .. }) => {
            assert_eq!(stage, Stage::Configuration)
        }
        other => panic!("expected configuration error, got {:?}", other),
    }
}

#[test]
fn test_defaults() {
    let config = ForecastConfig::new("Close").unwrap();

    assert_eq!(config.column(), "Close");
    assert_eq!(config.order(), ModelOrder::new(2, 1, 2));
    assert_eq!(
        config.seasonal_order(),
        SeasonalOrder::new(2, 1, 2, 12).unwrap()
    );
    assert_eq!(config.horizon(), DEFAULT_HORIZON);
    assert_eq!(config.horizon(), 10);
    assert_eq!(config.significance(), 0.05);
    assert_eq!(config.confidence_level(), 0.95);
    assert_eq!(config.decomposition_period(), 12);
    assert_eq!(config.fit_options(), FitOptions::default());
    assert!(config.ticker().is_none());
}

#[test]
fn test_builders() {
    let order = ModelOrder::new(2, 1, 2);
    let config = ForecastConfig::new("Close")
        .unwrap()
        .with_ticker("AAPL")
        .with_date_column("Date")
        .with_orders(order, SeasonalOrder::mirroring(order, 12).unwrap())
        .unwrap()
        .with_horizon(10)
        .unwrap()
        .with_date_range(Some(date(2020, 1, 1)), Some(date(2020, 12, 31)))
        .unwrap();

    assert_eq!(config.ticker(), Some("AAPL"));
    assert_eq!(config.date_column(), Some("Date"));
    assert_eq!(config.seasonal_order().p, 2);
    assert_eq!(config.horizon(), 10);
    assert_eq!(config.end_date(), Some(date(2020, 12, 31)));
}

#[rstest]
#[case(ModelOrder::new(6, 1, 1))]
#[case(ModelOrder::new(1, 6, 1))]
#[case(ModelOrder::new(1, 1, 6))]
fn test_order_bounds(#[case] order: ModelOrder) {
    let config = ForecastConfig::new("Close").unwrap();
    assert_configuration_error(config.with_orders(order, SeasonalOrder::none()));
}

#[rstest]
#[case(0)]
#[case(366)]
fn test_horizon_bounds(#[case] horizon: usize) {
    let config = ForecastConfig::new("Close").unwrap();
    assert_configuration_error(config.with_horizon(horizon));
}

#[test]
fn test_other_bounds() {
    let config = ForecastConfig::new("Close").unwrap();

    assert_configuration_error(config.clone().with_significance(1.0));
    assert_configuration_error(config.clone().with_confidence_level(0.0));
    assert_configuration_error(config.clone().with_decomposition_period(1));
    assert_configuration_error(
        config
            .clone()
            .with_date_range(Some(date(2021, 1, 1)), Some(date(2020, 1, 1))),
    );
    assert_configuration_error(config.clone().with_fit_options(FitOptions {
        max_iterations: 0,
        ..FitOptions::default()
    }));
    assert_configuration_error(ForecastConfig::new("  "));

    let seasonal = SeasonalOrder {
        p: 1,
        d: 0,
        q: 0,
        s: 25,
    };
    assert_configuration_error(config.with_orders(ModelOrder::new(1, 0, 0), seasonal));
}

#[test]
fn test_zero_period_disables_seasonal_terms() {
    let order = ModelOrder::new(2, 1, 2);
    let config = ForecastConfig::new("Close")
        .unwrap()
        .with_orders(order, SeasonalOrder::mirroring(order, 0).unwrap())
        .unwrap();

    assert_eq!(config.seasonal_order().s, 0);
    assert!(!config.seasonal_order().is_seasonal());

    let from_json = ForecastConfig::from_json(
        r#"{ "column": "Close", "seasonal_order": { "p": 1, "d": 1, "q": 1, "s": 0 } }"#,
    );
    assert!(from_json.is_ok());
}

#[test]
fn test_json_round_trip() {
    let order = ModelOrder::new(2, 1, 0);
    let config = ForecastConfig::new("Adj Close")
        .unwrap()
        .with_orders(order, SeasonalOrder::new(1, 0, 1, 5).unwrap())
        .unwrap()
        .with_horizon(14)
        .unwrap();

    let json = config.to_json().unwrap();
    let parsed = ForecastConfig::from_json(&json).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn test_json_defaults_mirror_order() {
    let config = ForecastConfig::from_json(
        r#"{ "column": "Close", "order": { "p": 2, "d": 1, "q": 2 }, "horizon": 10 }"#,
    )
    .unwrap();

    assert_eq!(config.seasonal_order(), SeasonalOrder::new(2, 1, 2, 12).unwrap());
    assert_eq!(config.horizon(), 10);
    assert_eq!(config.significance(), 0.05);
}

#[test]
fn test_json_without_orders_uses_defaults() {
    let config = ForecastConfig::from_json(r#"{ "column": "Close" }"#).unwrap();
    assert_eq!(config, ForecastConfig::new("Close").unwrap());
}

#[test]
fn test_invalid_json_is_rejected_at_load() {
    assert_configuration_error(ForecastConfig::from_json(
        r#"{ "column": "Close", "horizon": 0 }"#,
    ));

    let unknown = ForecastConfig::from_json(r#"{ "column": "Close", "colour": "blue" }"#);
    assert!(matches!(unknown, Err(ForecastError::JsonError(_))));

    // Direct deserialization runs the same checks
    let direct = serde_json::from_str::<ForecastConfig>(r#"{ "column": "Close", "horizon": 500 }"#);
    assert!(direct.is_err());
}

#[test]
fn test_from_json_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"{{ "column": "Close", "ticker": "MSFT", "start_date": "2020-01-01", "fit": {{ "max_iterations": 800 }} }}"#
    )
    .unwrap();
    file.flush().unwrap();

    let config = ForecastConfig::from_json_file(file.path()).unwrap();
    assert_eq!(config.ticker(), Some("MSFT"));
    assert_eq!(config.start_date(), Some(date(2020, 1, 1)));
    assert_eq!(config.fit_options().max_iterations, 800);
    assert_eq!(config.fit_options().tolerance, FitOptions::default().tolerance);
}
