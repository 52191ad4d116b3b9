use chrono::NaiveDate;
use forecast_metrics::{Dataset, ForecastError};
use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::NamedTempFile;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn csv_with_date_column_is_detected() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "Date,Revenue").unwrap();
    for day in 1..=12 {
        writeln!(file, "2024-01-{:02},{}", day, day * 100).unwrap();
    }
    file.flush().unwrap();

    let dataset = Dataset::from_csv(file.path()).unwrap();
    assert_eq!(dataset.date_column(), Some("Date"));
    assert_eq!(dataset.len(), 12);

    let series = dataset.extract_series("Revenue").unwrap();
    assert_eq!(series.len(), 12);
    assert_eq!(series.values()[0], 100.0);
    assert_eq!(series.last_date(), Some(date(2024, 1, 12)));
}

#[test]
fn nulls_are_dropped_from_the_target() {
    let values = vec![Some(1.0), None, Some(3.0), None, Some(5.0)];
    let dataset = Dataset::from_nullable_values("metric", None, values).unwrap();

    let series = dataset.extract_series("metric").unwrap();
    assert_eq!(series.values(), &[1.0, 3.0, 5.0]);
    assert!(series.dates().is_none());
}

#[test]
fn rows_are_sorted_by_date_before_extraction() {
    let dates = vec![date(2024, 1, 3), date(2024, 1, 1), date(2024, 1, 2)];
    let values = vec![30.0, 10.0, 20.0];
    let dataset = Dataset::from_dated_values("metric", dates, values).unwrap();

    let series = dataset.extract_series("metric").unwrap();
    assert_eq!(series.values(), &[10.0, 20.0, 30.0]);
    assert_eq!(
        series.dates().unwrap(),
        &[date(2024, 1, 1), date(2024, 1, 2), date(2024, 1, 3)]
    );
}

#[test]
fn date_ties_keep_original_relative_order() {
    let dates = vec![
        date(2024, 1, 2),
        date(2024, 1, 1),
        date(2024, 1, 1),
        date(2024, 1, 1),
    ];
    let values = vec![4.0, 1.0, 2.0, 3.0];
    let dataset = Dataset::from_dated_values("metric", dates, values).unwrap();

    let series = dataset.extract_series("metric").unwrap();
    assert_eq!(series.values(), &[1.0, 2.0, 3.0, 4.0]);
}

#[test]
fn null_dated_rows_are_dropped_with_their_values() {
    let values = vec![Some(1.0), Some(2.0), None, Some(4.0)];
    let dates = vec![
        date(2024, 1, 1),
        date(2024, 1, 2),
        date(2024, 1, 3),
        date(2024, 1, 4),
    ];
    let dataset = Dataset::from_nullable_values("metric", Some(dates), values).unwrap();

    let series = dataset.extract_series("metric").unwrap();
    assert_eq!(series.values(), &[1.0, 2.0, 4.0]);
    assert_eq!(series.dates().unwrap().len(), 3);
}

#[test]
fn missing_column_is_an_error() {
    let dataset = Dataset::from_values("metric", vec![1.0, 2.0]).unwrap();
    assert!(matches!(
        dataset.extract_series("other"),
        Err(ForecastError::MissingColumn(_))
    ));
}

#[test]
fn empty_dataset_is_an_error() {
    let dataset = Dataset::from_values("metric", Vec::new()).unwrap();
    assert!(matches!(
        dataset.extract_series("metric"),
        Err(ForecastError::EmptyDataset)
    ));
}

#[test]
fn non_numeric_target_column_is_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "Date,Label").unwrap();
    writeln!(file, "2024-01-01,alpha").unwrap();
    writeln!(file, "2024-01-02,beta").unwrap();
    file.flush().unwrap();

    let dataset = Dataset::from_csv(file.path()).unwrap();
    assert!(matches!(
        dataset.extract_series("Label"),
        Err(ForecastError::InvalidParameter(_))
    ));
}

#[test]
fn tail_returns_trailing_window() {
    let values: Vec<f64> = (1..=100).map(|i| i as f64).collect();
    let dataset = Dataset::from_values("metric", values).unwrap();
    let series = dataset.extract_series("metric").unwrap();

    let tail = series.tail(90);
    assert_eq!(tail.len(), 90);
    assert_eq!(tail[0], 11.0);

    // Shorter series returns everything
    assert_eq!(series.tail(500).len(), 100);
}

#[test]
fn mismatched_dates_and_values_are_rejected() {
    let dates = vec![date(2024, 1, 1)];
    assert!(Dataset::from_dated_values("metric", dates, vec![1.0, 2.0]).is_err());
}
