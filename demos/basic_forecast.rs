//! Basic forecasting example: build a dated dataset in memory, let the
//! engine pick a method, and print the forecast.

use chrono::{Duration, NaiveDate};
use forecast_metrics::{forecast_metric, Dataset, Method};

fn main() -> forecast_metrics::Result<()> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let dates: Vec<NaiveDate> = (0..60).map(|i| start + Duration::days(i)).collect();
    // Revenue with a gentle upward drift and a weekly dip
    let values: Vec<f64> = (0..60)
        .map(|i| {
            let weekend_dip = if i % 7 >= 5 { -40.0 } else { 0.0 };
            1000.0 + i as f64 * 12.5 + weekend_dip
        })
        .collect();

    let dataset = Dataset::from_dated_values("revenue", dates, values)?;
    let result = forecast_metric(&dataset, "revenue", 14, Method::Auto)?;

    println!("Method:     {}", result.method);
    println!("Confidence: {}", result.confidence);
    if let Some(r2) = result.r2_score {
        println!("R-squared:  {:.4}", r2);
    }

    let dates = result.forecast_dates.as_deref().unwrap_or(&[]);
    for (date, value) in dates.iter().zip(result.forecast.iter()) {
        println!("{}  {:>10.2}", date, value);
    }

    Ok(())
}
