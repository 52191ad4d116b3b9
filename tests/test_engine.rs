use assert_approx_eq::assert_approx_eq;
use chrono::{Duration, NaiveDate};
use forecast_metrics::{
    compare_forecasts, forecast_metric, Dataset, ForecastError, Method,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::str::FromStr;

fn daily_dates(n: usize) -> Vec<NaiveDate> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    (0..n as i64).map(|i| start + Duration::days(i)).collect()
}

fn linear_dataset(n: usize) -> Dataset {
    let values: Vec<f64> = (1..=n).map(|i| i as f64).collect();
    Dataset::from_dated_values("revenue", daily_dates(n), values).unwrap()
}

fn noisy_dataset(n: usize) -> Dataset {
    let values: Vec<f64> = (0..n)
        .map(|i| if i % 2 == 0 { 100.0 } else { 200.0 })
        .collect();
    Dataset::from_dated_values("revenue", daily_dates(n), values).unwrap()
}

#[test]
fn auto_selects_linear_on_linear_series() {
    let dataset = linear_dataset(30);
    let result = forecast_metric(&dataset, "revenue", 7, Method::Auto).unwrap();
    assert_eq!(result.method, "Linear Regression");
    assert!(result.r2_score.unwrap() > 0.6);
}

#[test]
fn auto_selects_moving_average_on_structureless_series() {
    let dataset = noisy_dataset(30);
    let result = forecast_metric(&dataset, "revenue", 7, Method::Auto).unwrap();
    assert_eq!(result.method, "7-day Moving Average");
}

#[rstest]
#[case(Method::Auto)]
#[case(Method::Linear)]
#[case(Method::Polynomial)]
#[case(Method::MovingAverage)]
#[case(Method::Exponential)]
#[case(Method::Prophet)]
#[case(Method::Arima)]
fn every_method_fails_below_ten_points(#[case] method: Method) {
    let dataset = linear_dataset(9);
    let err = forecast_metric(&dataset, "revenue", 7, method).unwrap_err();
    assert!(matches!(
        err,
        ForecastError::InsufficientData { needed: 10, got: 9 }
    ));
}

#[test]
fn arima_below_its_minimum_falls_back_to_moving_average() {
    // 15 points clear the orchestrator gate but not ARIMA's 20-point
    // minimum; the substitution is visible in the method label.
    let dataset = linear_dataset(15);
    let result = forecast_metric(&dataset, "revenue", 7, Method::Arima).unwrap();
    assert_eq!(result.method, "7-day Moving Average");
}

#[test]
fn prophet_without_dates_falls_back_to_moving_average() {
    let values: Vec<f64> = (1..=30).map(|i| i as f64).collect();
    let dataset = Dataset::from_values("revenue", values).unwrap();
    let result = forecast_metric(&dataset, "revenue", 7, Method::Prophet).unwrap();
    assert_eq!(result.method, "7-day Moving Average");
}

#[test]
fn moving_average_never_fails_at_ten_points() {
    let dataset = linear_dataset(10);
    let result = forecast_metric(&dataset, "revenue", 30, Method::MovingAverage).unwrap();
    assert_eq!(result.forecast.len(), 30);
}

#[test]
fn empty_dataset_and_missing_column_are_rejected() {
    let dataset = linear_dataset(30);
    assert!(matches!(
        forecast_metric(&dataset, "missing", 7, Method::Auto),
        Err(ForecastError::MissingColumn(_))
    ));

    let empty = Dataset::from_values("revenue", Vec::new()).unwrap();
    assert!(matches!(
        forecast_metric(&empty, "revenue", 7, Method::Auto),
        Err(ForecastError::EmptyDataset)
    ));
}

#[test]
fn forecast_dates_are_backfilled_for_undated_methods() {
    let dataset = linear_dataset(30);
    let result = forecast_metric(&dataset, "revenue", 5, Method::MovingAverage).unwrap();

    let dates = result.forecast_dates.unwrap();
    assert_eq!(dates.len(), 5);
    assert_eq!(dates[0], NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
    assert_eq!(dates[4], NaiveDate::from_ymd_opt(2024, 2, 4).unwrap());
}

#[test]
fn historical_data_is_capped_at_ninety_points() {
    let dataset = linear_dataset(120);
    let result = forecast_metric(&dataset, "revenue", 7, Method::Linear).unwrap();

    let history = result.historical_data.unwrap();
    assert_eq!(history.len(), 90);
    // Trailing window of 1..=120
    assert_approx_eq!(history[0], 31.0);
    assert_approx_eq!(history[89], 120.0);
}

#[test]
fn comparison_runs_all_four_methods() {
    let dataset = linear_dataset(40);
    let comparison = compare_forecasts(&dataset, "revenue", 7).unwrap();

    assert_eq!(comparison.len(), 4);
    let methods: Vec<Method> = comparison.iter().map(|(m, _)| m).collect();
    assert_eq!(
        methods,
        vec![
            Method::Linear,
            Method::Prophet,
            Method::Arima,
            Method::Exponential
        ]
    );
    for (_, result) in comparison.iter() {
        assert_eq!(result.forecast.len(), 7);
        assert!(!result.forecast.is_empty());
    }
}

#[test]
fn comparison_fails_only_when_every_method_fails() {
    let dataset = linear_dataset(8);
    assert!(compare_forecasts(&dataset, "revenue", 7).is_err());
}

#[test]
fn method_identifiers_round_trip() {
    for method in Method::ALL {
        let parsed = Method::from_str(method.identifier()).unwrap();
        assert_eq!(parsed, method);
    }
    assert!(matches!(
        Method::from_str("quantum"),
        Err(ForecastError::UnknownMethod(_))
    ));
}

#[test]
fn results_serialize_for_persistence() {
    let dataset = linear_dataset(30);
    let result = forecast_metric(&dataset, "revenue", 7, Method::Linear).unwrap();

    let json = serde_json::to_string(&result).unwrap();
    let restored: forecast_metrics::ForecastResult = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.forecast, result.forecast);
    assert_eq!(restored.method, result.method);
}

#[test]
fn forecasts_are_reproducible_across_invocations() {
    let dataset = noisy_dataset(60);
    for method in [Method::Auto, Method::Arima, Method::Prophet, Method::Exponential] {
        let first = forecast_metric(&dataset, "revenue", 14, method).unwrap();
        let second = forecast_metric(&dataset, "revenue", 14, method).unwrap();
        assert_eq!(first.forecast, second.forecast, "method {:?}", method);
    }
}
