mod common;

use chrono::NaiveDate;
use common::date;
use pretty_assertions::assert_eq;
use price_forecast::alignment::{align, future_dates, ForecastDateAligner};
use price_forecast::error::{ForecastError, Stage};
use rstest::rstest;
use tempfile::tempdir;

#[rstest]
// Friday: the weekend is included
#[case(date(2024, 3, 8), vec![date(2024, 3, 9), date(2024, 3, 10), date(2024, 3, 11)])]
// Leap day
#[case(date(2024, 2, 28), vec![date(2024, 2, 29), date(2024, 3, 1), date(2024, 3, 2)])]
// Year end
#[case(date(2023, 12, 30), vec![date(2023, 12, 31), date(2024, 1, 1), date(2024, 1, 2)])]
fn test_dates_follow_last_observation(#[case] last: NaiveDate, #[case] expected: Vec<NaiveDate>) {
    let result = align(&[1.0, 2.0, 3.0], last).unwrap();
    assert_eq!(result.dates(), expected.as_slice());
    assert_eq!(result.values(), &[1.0, 2.0, 3.0]);
    assert_eq!(result.horizon(), 3);
    assert!(result.intervals().is_none());
}

#[test]
fn test_dates_are_strictly_daily() {
    let last = date(2023, 6, 15);
    let dates = future_dates(last, 365).unwrap();

    assert_eq!(dates.len(), 365);
    assert_eq!(dates[0], date(2023, 6, 16));
    for pair in dates.windows(2) {
        assert_eq!(pair[1] - pair[0], chrono::Duration::days(1));
    }
}

#[test]
fn test_empty_predictions_are_rejected() {
    let err = ForecastDateAligner.align(&[], date(2024, 1, 1)).unwrap_err();
    assert!(matches!(
        err,
        ForecastError::ValidationError {
            stage: Stage::Alignment,
            ..
        }
    ));
}

#[test]
fn test_date_overflow_is_rejected() {
    assert!(align(&[1.0], NaiveDate::MAX).is_err());
}

#[test]
fn test_align_with_intervals() {
    let aligner = ForecastDateAligner;
    let result = aligner
        .align_with_intervals(&[10.0, 11.0], &[(9.0, 11.0), (9.5, 12.5)], 0.9, date(2024, 5, 1))
        .unwrap();

    assert_eq!(result.confidence_level(), Some(0.9));
    let points: Vec<_> = result.points().collect();
    assert_eq!(points[1].date, date(2024, 5, 3));
    assert_eq!(points[1].lower, Some(9.5));
    assert_eq!(points[1].upper, Some(12.5));

    let mismatched = aligner.align_with_intervals(&[10.0, 11.0], &[(9.0, 11.0)], 0.9, date(2024, 5, 1));
    assert!(mismatched.is_err());
}

#[test]
fn test_json_output() {
    let result = align(&[101.5, 102.25], date(2024, 3, 8)).unwrap();
    let json = result.to_json().unwrap();

    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed[0]["date"], "2024-03-09");
    assert_eq!(parsed[1]["value"], 102.25);
    assert!(parsed[0].get("lower").is_none());
}

#[test]
fn test_csv_output() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("forecast.csv");

    let result = ForecastDateAligner
        .align_with_intervals(&[5.0, 6.0], &[(4.0, 6.0), (4.5, 7.5)], 0.95, date(2024, 1, 31))
        .unwrap();
    result.write_csv(&path).unwrap();

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(headers.iter().collect::<Vec<_>>(), vec!["Date", "Forecast", "Lower", "Upper"]);

    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][0], "2024-02-01");
    assert_eq!(&rows[1][0], "2024-02-02");
    assert_eq!(rows[1][3].parse::<f64>().unwrap(), 7.5);
}
