//! Run the fixed comparison subset against one series and print the
//! results side by side.

use chrono::{Duration, NaiveDate};
use forecast_metrics::{compare_forecasts, Dataset};

fn main() -> forecast_metrics::Result<()> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let dates: Vec<NaiveDate> = (0..90).map(|i| start + Duration::days(i)).collect();
    let values: Vec<f64> = (0..90)
        .map(|i| 500.0 + i as f64 * 3.0 + ((i % 7) as f64 - 3.0) * 8.0)
        .collect();

    let dataset = Dataset::from_dated_values("orders", dates, values)?;
    let comparison = compare_forecasts(&dataset, "orders", 7)?;

    println!("{} of 4 methods produced a forecast\n", comparison.len());
    for (method, result) in comparison.iter() {
        let interval = if result.has_confidence_interval {
            "with interval"
        } else {
            "point only"
        };
        println!(
            "{:<16} {:<38} {:<8} {}  first={:.1} last={:.1}",
            method.identifier(),
            result.method,
            result.confidence.to_string(),
            interval,
            result.forecast.first().unwrap(),
            result.forecast.last().unwrap(),
        );
    }

    Ok(())
}
