//! Trend classification and growth-rate analysis on a metric series.

use forecast_metrics::{calculate_growth_rate, detect_trends};

fn main() -> forecast_metrics::Result<()> {
    let revenue: Vec<f64> = (0..48)
        .map(|i| 2000.0 + i as f64 * 25.0 + ((i % 4) as f64 - 1.5) * 60.0)
        .collect();

    let analysis = detect_trends(&revenue)?;
    println!("Trend:            {}", analysis.trend);
    println!("Slope:            {:.3} per period", analysis.slope);
    println!("Volatility:       {:.2}%", analysis.volatility);
    println!("Recent average:   {:.2}", analysis.recent_average);
    println!("Overall average:  {:.2}", analysis.overall_average);

    // Whole-history growth vs the trailing quarter
    let full = calculate_growth_rate(&revenue)?;
    let recent = calculate_growth_rate(&revenue[revenue.len() - 12..])?;
    println!("\nGrowth (all):     {:.2}%", full.growth_rate);
    println!("Growth (recent):  {:.2}%", recent.growth_rate);

    Ok(())
}
