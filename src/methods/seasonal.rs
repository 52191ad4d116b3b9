//! Prophet-style additive seasonal decomposition forecasting
//!
//! Fits value = trend + weekly + yearly on (date, value) pairs: a linear
//! trend over the day offset, a per-weekday component on the detrended
//! residuals, and an order-2 Fourier yearly component on the day of year.
//! The prediction interval comes from the residual spread of the fitted
//! model.

use crate::error::{ForecastError, Result};
use crate::methods::{check_horizon, ensure_finite, Confidence, ForecastResult};
use crate::utils::{future_dates, least_squares, ols_xy, std_dev};
use chrono::{Datelike, NaiveDate};
use statrs::distribution::{ContinuousCDF, Normal};

/// Minimum observations for a seasonal fit
pub const SEASONAL_MIN_LEN: usize = 10;

/// Minimum span of observed dates before a yearly component is fitted.
/// Shorter series cannot identify a yearly cycle and the Fourier fit
/// degenerates.
const YEARLY_MIN_SPAN_DAYS: i64 = 365;

/// Days in the mean tropical year, used for the yearly Fourier period
const YEAR_LENGTH: f64 = 365.25;

/// Two-sided 95% interval
const INTERVAL_COVERAGE: f64 = 0.95;

/// Additive trend + weekly + yearly decomposition model
#[derive(Debug, Clone, Default)]
pub struct SeasonalDecomposition;

struct FittedDecomposition {
    /// Trend intercept at the first observed date
    intercept: f64,
    /// Trend slope per day
    slope: f64,
    /// Mean residual per weekday, Monday first
    weekly: [f64; 7],
    /// Fourier coefficients for the yearly cycle, when identifiable
    yearly: Option<Vec<f64>>,
    /// First observed date, origin of the trend axis
    origin: NaiveDate,
}

impl FittedDecomposition {
    fn predict(&self, date: NaiveDate) -> f64 {
        let t = (date - self.origin).num_days() as f64;
        let weekday = date.weekday().num_days_from_monday() as usize;
        let mut value = self.intercept + self.slope * t + self.weekly[weekday];
        if let Some(coefficients) = &self.yearly {
            let row = yearly_row(date);
            value += row
                .iter()
                .zip(coefficients.iter())
                .map(|(x, c)| x * c)
                .sum::<f64>();
        }
        value
    }
}

impl SeasonalDecomposition {
    /// Create a new seasonal decomposition model
    pub fn new() -> Self {
        Self
    }

    /// Forecast `horizon` daily periods past the last observed date
    pub fn forecast(
        &self,
        series: &[f64],
        dates: &[NaiveDate],
        horizon: usize,
    ) -> Result<ForecastResult> {
        check_horizon(horizon)?;
        if series.len() != dates.len() {
            return Err(ForecastError::InvalidParameter(format!(
                "Series length ({}) doesn't match dates length ({})",
                series.len(),
                dates.len()
            )));
        }
        if series.len() < SEASONAL_MIN_LEN {
            return Err(ForecastError::InsufficientData {
                needed: SEASONAL_MIN_LEN,
                got: series.len(),
            });
        }

        let fit = self.fit(series, dates)?;

        let fitted: Vec<f64> = dates.iter().map(|d| fit.predict(*d)).collect();
        ensure_finite(&fitted, "seasonal decomposition fit")?;
        let residuals: Vec<f64> = series
            .iter()
            .zip(fitted.iter())
            .map(|(y, f)| y - f)
            .collect();
        let sigma = std_dev(&residuals);

        let last_date = *dates.last().unwrap();
        let forecast_dates = future_dates(last_date, horizon);
        let forecast: Vec<f64> = forecast_dates.iter().map(|d| fit.predict(*d)).collect();
        ensure_finite(&forecast, "seasonal decomposition forecast")?;

        let z = normal_quantile(0.5 + INTERVAL_COVERAGE / 2.0)?;
        let margin = z * sigma;
        let lower: Vec<f64> = forecast.iter().map(|v| v - margin).collect();
        let upper: Vec<f64> = forecast.iter().map(|v| v + margin).collect();

        ForecastResult::new(
            forecast,
            horizon,
            "Additive Seasonal Decomposition".to_string(),
            Confidence::High,
        )?
        .with_bounds(lower, upper)?
        .with_dates(forecast_dates)
    }

    fn fit(&self, series: &[f64], dates: &[NaiveDate]) -> Result<FittedDecomposition> {
        let origin = dates[0];
        let t: Vec<f64> = dates.iter().map(|d| (*d - origin).num_days() as f64).collect();
        let (slope, intercept) = ols_xy(&t, series);

        let detrended: Vec<f64> = series
            .iter()
            .zip(t.iter())
            .map(|(y, ti)| y - (intercept + slope * ti))
            .collect();

        // Weekly component: mean residual per weekday, zero where a weekday
        // never occurs
        let mut sums = [0.0; 7];
        let mut counts = [0usize; 7];
        for (date, residual) in dates.iter().zip(detrended.iter()) {
            let weekday = date.weekday().num_days_from_monday() as usize;
            sums[weekday] += residual;
            counts[weekday] += 1;
        }
        let mut weekly = [0.0; 7];
        for weekday in 0..7 {
            if counts[weekday] > 0 {
                weekly[weekday] = sums[weekday] / counts[weekday] as f64;
            }
        }

        // Yearly component only when a full cycle is observable
        let span = (*dates.last().unwrap() - origin).num_days();
        let yearly = if span >= YEARLY_MIN_SPAN_DAYS {
            let deseasoned: Vec<f64> = dates
                .iter()
                .zip(detrended.iter())
                .map(|(date, residual)| {
                    residual - weekly[date.weekday().num_days_from_monday() as usize]
                })
                .collect();
            let design: Vec<Vec<f64>> = dates.iter().map(|d| yearly_row(*d)).collect();
            Some(least_squares(&design, &deseasoned)?)
        } else {
            None
        };

        Ok(FittedDecomposition {
            intercept,
            slope,
            weekly,
            yearly,
            origin,
        })
    }
}

/// Order-2 Fourier features on the day of year
fn yearly_row(date: NaiveDate) -> Vec<f64> {
    let day_of_year = date.ordinal() as f64;
    let mut row = Vec::with_capacity(4);
    for order in 1..=2 {
        let angle = 2.0 * std::f64::consts::PI * order as f64 * day_of_year / YEAR_LENGTH;
        row.push(angle.sin());
        row.push(angle.cos());
    }
    row
}

fn normal_quantile(p: f64) -> Result<f64> {
    let normal =
        Normal::new(0.0, 1.0).map_err(|e| ForecastError::FitFailure(e.to_string()))?;
    Ok(normal.inverse_cdf(p))
}
