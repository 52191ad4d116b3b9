//! Forecasting methods for business metric series
//!
//! Each method is a one-shot fit: it consumes a cleaned numeric series
//! (plus dates where the model needs a calendar) and produces a
//! [`ForecastResult`]. Methods never panic on short input; they return
//! [`ForecastError::InsufficientData`](crate::error::ForecastError) instead.

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Categorical confidence attached to every forecast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Confidence::Low => write!(f, "Low"),
            Confidence::Medium => write!(f, "Medium"),
            Confidence::High => write!(f, "High"),
        }
    }
}

/// Direction of the fitted trend line (linear regression only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendDirection {
    Increasing,
    Decreasing,
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendDirection::Increasing => write!(f, "Increasing"),
            TrendDirection::Decreasing => write!(f, "Decreasing"),
        }
    }
}

/// Forecast produced by a single method invocation.
///
/// Immutable once built; optional fields are populated only by the methods
/// that define them, so a caller never reads a field a method did not set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastResult {
    /// Forecasted values, one per requested period
    pub forecast: Vec<f64>,
    /// Human-readable method label, including parameters
    pub method: String,
    /// Categorical confidence in the forecast
    pub confidence: Confidence,
    /// Goodness of fit (regression-based methods only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r2_score: Option<f64>,
    /// Fitted trend direction (linear regression only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<TrendDirection>,
    /// Lower prediction bound per period, when the method estimates intervals
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lower_bound: Option<Vec<f64>>,
    /// Upper prediction bound per period, when the method estimates intervals
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<Vec<f64>>,
    /// Dates aligned 1:1 with the forecast values
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forecast_dates: Option<Vec<NaiveDate>>,
    /// Whether lower/upper bounds are populated
    pub has_confidence_interval: bool,
    /// Akaike information criterion (ARIMA only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aic: Option<f64>,
    /// Bayesian information criterion (ARIMA only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bic: Option<f64>,
    /// Trailing window of the cleaned input series, attached by the
    /// orchestrator for charting context
    #[serde(skip_serializing_if = "Option::is_none")]
    pub historical_data: Option<Vec<f64>>,
}

impl ForecastResult {
    /// Create a new forecast result
    pub fn new(forecast: Vec<f64>, horizon: usize, method: String, confidence: Confidence) -> Result<Self> {
        if forecast.len() != horizon {
            return Err(ForecastError::InvalidParameter(format!(
                "Forecast length ({}) doesn't match horizon ({})",
                forecast.len(),
                horizon
            )));
        }

        Ok(Self {
            forecast,
            method,
            confidence,
            r2_score: None,
            trend: None,
            lower_bound: None,
            upper_bound: None,
            forecast_dates: None,
            has_confidence_interval: false,
            aic: None,
            bic: None,
            historical_data: None,
        })
    }

    /// Attach prediction bounds. Sets `has_confidence_interval`.
    pub fn with_bounds(mut self, lower: Vec<f64>, upper: Vec<f64>) -> Result<Self> {
        if lower.len() != self.forecast.len() || upper.len() != self.forecast.len() {
            return Err(ForecastError::InvalidParameter(format!(
                "Bounds length ({}/{}) doesn't match forecast length ({})",
                lower.len(),
                upper.len(),
                self.forecast.len()
            )));
        }
        self.lower_bound = Some(lower);
        self.upper_bound = Some(upper);
        self.has_confidence_interval = true;
        Ok(self)
    }

    /// Attach forecast dates
    pub fn with_dates(mut self, dates: Vec<NaiveDate>) -> Result<Self> {
        if dates.len() != self.forecast.len() {
            return Err(ForecastError::InvalidParameter(format!(
                "Dates length ({}) doesn't match forecast length ({})",
                dates.len(),
                self.forecast.len()
            )));
        }
        self.forecast_dates = Some(dates);
        Ok(self)
    }

    /// Number of forecasted periods
    pub fn horizon(&self) -> usize {
        self.forecast.len()
    }

    /// Calculate mean absolute error against realized values
    pub fn mean_absolute_error(&self, actual: &[f64]) -> Result<f64> {
        self.check_actual_len(actual)?;
        let sum: f64 = self
            .forecast
            .iter()
            .zip(actual.iter())
            .map(|(f, a)| (f - a).abs())
            .sum();
        Ok(sum / self.forecast.len() as f64)
    }

    /// Calculate mean squared error against realized values
    pub fn mean_squared_error(&self, actual: &[f64]) -> Result<f64> {
        self.check_actual_len(actual)?;
        let sum: f64 = self
            .forecast
            .iter()
            .zip(actual.iter())
            .map(|(f, a)| (f - a).powi(2))
            .sum();
        Ok(sum / self.forecast.len() as f64)
    }

    /// Calculate root mean squared error against realized values
    pub fn root_mean_squared_error(&self, actual: &[f64]) -> Result<f64> {
        Ok(self.mean_squared_error(actual)?.sqrt())
    }

    /// Calculate mean absolute percentage error against realized values,
    /// skipping zero actuals.
    pub fn mean_absolute_percentage_error(&self, actual: &[f64]) -> Result<f64> {
        self.check_actual_len(actual)?;
        let sum: f64 = self
            .forecast
            .iter()
            .zip(actual.iter())
            .filter(|(_, a)| **a != 0.0)
            .map(|(f, a)| ((a - f).abs() / a.abs()) * 100.0)
            .sum();
        Ok(sum / self.forecast.len() as f64)
    }

    fn check_actual_len(&self, actual: &[f64]) -> Result<()> {
        if self.forecast.len() != actual.len() || actual.is_empty() {
            return Err(ForecastError::InvalidParameter(format!(
                "Forecast length ({}) doesn't match actual length ({})",
                self.forecast.len(),
                actual.len()
            )));
        }
        Ok(())
    }
}

/// Reject non-positive horizons at every method entry point.
pub(crate) fn check_horizon(horizon: usize) -> Result<()> {
    if horizon == 0 {
        return Err(ForecastError::InvalidParameter(
            "Horizon must be positive".to_string(),
        ));
    }
    Ok(())
}

/// Convert a non-finite intermediate into a fit failure.
pub(crate) fn ensure_finite(values: &[f64], context: &str) -> Result<()> {
    if values.iter().any(|v| !v.is_finite()) {
        return Err(ForecastError::FitFailure(format!(
            "non-finite value produced during {}",
            context
        )));
    }
    Ok(())
}

pub mod arima;
pub mod exponential;
pub mod moving_average;
pub mod regression;
pub mod seasonal;
