//! # Forecast Metrics
//!
//! A Rust library for forecasting business metric time series with
//! interchangeable statistical methods, automatic method selection, and
//! multi-method comparison.
//!
//! ## Features
//!
//! - Tabular dataset handling over polars DataFrames (CSV or in-memory)
//! - Seven forecasting methods: moving average, linear and polynomial
//!   regression, exponential smoothing, additive seasonal decomposition,
//!   ARIMA, and fit-quality based auto selection
//! - Forecast orchestration with a universal moving-average fallback
//! - Side-by-side comparison of a fixed method subset
//! - Trend classification and period-over-period growth analysis
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use forecast_metrics::{forecast_metric, Dataset, Method};
//!
//! fn main() -> forecast_metrics::Result<()> {
//!     // Load data with a date column and at least one numeric column
//!     let dataset = Dataset::from_csv("revenue.csv")?;
//!
//!     // Forecast 30 periods ahead, letting the engine pick the method
//!     let result = forecast_metric(&dataset, "revenue", 30, Method::Auto)?;
//!
//!     println!("{} ({} confidence)", result.method, result.confidence);
//!     println!("forecast: {:?}", result.forecast);
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod data;
pub mod engine;
pub mod error;
pub mod methods;
pub mod utils;

// Re-export commonly used types
pub use crate::analysis::{
    calculate_growth_rate, detect_trends, GrowthRate, TrendAnalysis, TrendLabel,
};
pub use crate::data::{Dataset, MetricSeries};
pub use crate::engine::{compare_forecasts, forecast_metric, ComparisonResult, Method};
pub use crate::error::{ForecastError, Result};
pub use crate::methods::{Confidence, ForecastResult, TrendDirection};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
