//! Forecast orchestration: method selection, dispatch, fallback, and
//! multi-method comparison

use crate::data::{Dataset, MetricSeries};
use crate::error::{ForecastError, Result};
use crate::methods::arima::Arima;
use crate::methods::exponential::ExponentialSmoothing;
use crate::methods::moving_average::MovingAverage;
use crate::methods::regression::{LinearRegression, PolynomialRegression};
use crate::methods::seasonal::SeasonalDecomposition;
use crate::methods::ForecastResult;
use crate::utils::future_dates;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Minimum cleaned observations before any forecast is attempted
pub const MIN_SERIES_LEN: usize = 10;

/// R-squared threshold above which auto-selection keeps the linear fit
const AUTO_R2_THRESHOLD: f64 = 0.6;

/// Trailing window of the input series attached to results for charting
const HISTORY_WINDOW: usize = 90;

/// Forecast method identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// Pick between linear regression and moving average by fit quality
    Auto,
    /// Ordinary least squares line
    Linear,
    /// Degree-2 polynomial fit
    Polynomial,
    /// Rolling mean flat extension
    MovingAverage,
    /// Simple exponential smoothing
    Exponential,
    /// Additive trend + weekly + yearly decomposition (requires dates)
    Prophet,
    /// ARIMA(1,1,1) (requires dates)
    Arima,
}

impl Method {
    /// All methods a caller can request
    pub const ALL: [Method; 7] = [
        Method::Auto,
        Method::Linear,
        Method::Polynomial,
        Method::MovingAverage,
        Method::Exponential,
        Method::Prophet,
        Method::Arima,
    ];

    /// The fixed subset the comparison driver runs, in invocation order.
    /// Moving average and polynomial are left out: they carry no
    /// differentiating confidence or interval behavior to compare.
    pub const COMPARISON_SET: [Method; 4] = [
        Method::Linear,
        Method::Prophet,
        Method::Arima,
        Method::Exponential,
    ];

    /// Stable string identifier, used as a persistence key
    pub fn identifier(&self) -> &'static str {
        match self {
            Method::Auto => "auto",
            Method::Linear => "linear",
            Method::Polynomial => "polynomial",
            Method::MovingAverage => "moving_average",
            Method::Exponential => "exponential",
            Method::Prophet => "prophet",
            Method::Arima => "arima",
        }
    }

    /// Display label for chart legends
    pub fn display_label(&self) -> &'static str {
        match self {
            Method::Auto => "Auto",
            Method::Linear => "Linear Regression",
            Method::Polynomial => "Polynomial Regression",
            Method::MovingAverage => "Moving Average",
            Method::Exponential => "Exponential Smoothing",
            Method::Prophet => "Seasonal Decomposition",
            Method::Arima => "ARIMA",
        }
    }

    /// Fixed chart color per method. Display-only, not semantic.
    pub fn display_color(&self) -> &'static str {
        match self {
            Method::Auto => "#636efa",
            Method::Linear => "#ef553b",
            Method::Polynomial => "#00cc96",
            Method::MovingAverage => "#ab63fa",
            Method::Exponential => "#ffa15a",
            Method::Prophet => "#19d3f3",
            Method::Arima => "#ff6692",
        }
    }

    /// Whether the method needs a date column
    pub fn requires_dates(&self) -> bool {
        matches!(self, Method::Prophet | Method::Arima)
    }
}

impl FromStr for Method {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(Method::Auto),
            "linear" => Ok(Method::Linear),
            "polynomial" => Ok(Method::Polynomial),
            "moving_average" => Ok(Method::MovingAverage),
            "exponential" => Ok(Method::Exponential),
            "prophet" => Ok(Method::Prophet),
            "arima" => Ok(Method::Arima),
            other => Err(ForecastError::UnknownMethod(other.to_string())),
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

/// Results of running the comparison subset, keyed by method in invocation
/// order. Only methods that produced a forecast appear.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonResult {
    entries: Vec<(Method, ForecastResult)>,
}

impl ComparisonResult {
    /// Number of methods that succeeded
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether no method succeeded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a method's result
    pub fn get(&self, method: Method) -> Option<&ForecastResult> {
        self.entries
            .iter()
            .find(|(m, _)| *m == method)
            .map(|(_, r)| r)
    }

    /// Iterate results in invocation order
    pub fn iter(&self) -> impl Iterator<Item = (Method, &ForecastResult)> {
        self.entries.iter().map(|(m, r)| (*m, r))
    }
}

/// Forecast a metric column of a dataset.
///
/// Rows are sorted by date when a date column exists, nulls are dropped,
/// and the chosen method is dispatched on the cleaned series. A failing
/// method is retried once with the moving-average fallback; substitution is
/// visible through the result's `method` label. Forecast dates are
/// back-filled for undated methods, and the trailing history window is
/// attached for charting.
pub fn forecast_metric(
    dataset: &Dataset,
    column: &str,
    horizon: usize,
    method: Method,
) -> Result<ForecastResult> {
    if horizon == 0 {
        return Err(ForecastError::InvalidParameter(
            "Horizon must be positive".to_string(),
        ));
    }
    if dataset.is_empty() {
        return Err(ForecastError::EmptyDataset);
    }
    if !dataset.has_column(column) {
        return Err(ForecastError::MissingColumn(column.to_string()));
    }

    let series = dataset.extract_series(column)?;
    if series.len() < MIN_SERIES_LEN {
        return Err(ForecastError::InsufficientData {
            needed: MIN_SERIES_LEN,
            got: series.len(),
        });
    }

    let resolved = match method {
        Method::Auto => select_auto(&series, horizon),
        other => other,
    };

    let mut result = match run_method(resolved, &series, horizon) {
        Ok(result) => result,
        // Universal fallback: the moving average needs only 7 points and the
        // series is known to have at least 10.
        Err(_) => MovingAverage::default().forecast(series.values(), horizon)?,
    };

    if result.forecast_dates.is_none() {
        if let Some(last_date) = series.last_date() {
            result = result.with_dates(future_dates(last_date, horizon))?;
        }
    }
    result.historical_data = Some(series.tail(HISTORY_WINDOW).to_vec());

    Ok(result)
}

/// Run the fixed comparison subset through the orchestrator with identical
/// inputs, keeping only the methods that succeed.
pub fn compare_forecasts(
    dataset: &Dataset,
    column: &str,
    horizon: usize,
) -> Result<ComparisonResult> {
    let mut entries = Vec::with_capacity(Method::COMPARISON_SET.len());
    let mut last_error = None;
    for method in Method::COMPARISON_SET {
        match forecast_metric(dataset, column, horizon, method) {
            Ok(result) => entries.push((method, result)),
            Err(err) => last_error = Some(err),
        }
    }

    if entries.is_empty() {
        // Partial success is normal; only a total wipeout propagates
        return Err(last_error.unwrap_or(ForecastError::EmptyDataset));
    }
    Ok(ComparisonResult { entries })
}

/// One-shot auto selection: keep the linear fit when its R-squared clears
/// the threshold, otherwise fall back to the moving average.
fn select_auto(series: &MetricSeries, horizon: usize) -> Method {
    match LinearRegression::new().forecast(series.values(), horizon) {
        Ok(result) if result.r2_score.unwrap_or(0.0) > AUTO_R2_THRESHOLD => Method::Linear,
        _ => Method::MovingAverage,
    }
}

fn run_method(method: Method, series: &MetricSeries, horizon: usize) -> Result<ForecastResult> {
    match method {
        Method::Auto => {
            let resolved = select_auto(series, horizon);
            run_method(resolved, series, horizon)
        }
        Method::Linear => LinearRegression::new().forecast(series.values(), horizon),
        Method::Polynomial => PolynomialRegression::default().forecast(series.values(), horizon),
        Method::MovingAverage => MovingAverage::default().forecast(series.values(), horizon),
        Method::Exponential => ExponentialSmoothing::default().forecast(series.values(), horizon),
        Method::Prophet => {
            let dates = series.dates().ok_or_else(|| {
                ForecastError::InvalidDateColumn(
                    "Seasonal decomposition requires a date column".to_string(),
                )
            })?;
            SeasonalDecomposition::new().forecast(series.values(), dates, horizon)
        }
        Method::Arima => {
            let dates = series.dates().ok_or_else(|| {
                ForecastError::InvalidDateColumn("ARIMA requires a date column".to_string())
            })?;
            Arima::default().forecast(series.values(), dates, horizon)
        }
    }
}
