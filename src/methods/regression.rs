//! Linear and polynomial regression forecasting

use crate::error::{ForecastError, Result};
use crate::methods::{check_horizon, Confidence, ForecastResult, TrendDirection};
use crate::utils::{least_squares, ols, r_squared};

/// Minimum observations for a linear fit
pub const LINEAR_MIN_LEN: usize = 10;

/// Minimum observations for a polynomial fit
pub const POLYNOMIAL_MIN_LEN: usize = 15;

/// Default polynomial degree
pub const DEFAULT_DEGREE: usize = 2;

/// Ordinary least squares regression of the series on its index, with
/// straight-line extrapolation.
#[derive(Debug, Clone, Default)]
pub struct LinearRegression;

/// Least squares fit of a degree-d polynomial on the index, with curved
/// extrapolation.
#[derive(Debug, Clone)]
pub struct PolynomialRegression {
    /// Name of the model
    name: String,
    /// Polynomial degree
    degree: usize,
}

impl LinearRegression {
    /// Create a new linear regression model
    pub fn new() -> Self {
        Self
    }

    /// Forecast `horizon` periods by extrapolating the fitted line
    pub fn forecast(&self, series: &[f64], horizon: usize) -> Result<ForecastResult> {
        check_horizon(horizon)?;
        if series.len() < LINEAR_MIN_LEN {
            return Err(ForecastError::InsufficientData {
                needed: LINEAR_MIN_LEN,
                got: series.len(),
            });
        }

        let n = series.len();
        let (slope, intercept) = ols(series);

        let fitted: Vec<f64> = (0..n).map(|i| intercept + slope * i as f64).collect();
        let r2 = r_squared(series, &fitted);

        let forecast: Vec<f64> = (n..n + horizon)
            .map(|i| intercept + slope * i as f64)
            .collect();

        let confidence = if r2 > 0.7 {
            Confidence::High
        } else {
            Confidence::Medium
        };
        let trend = if slope > 0.0 {
            TrendDirection::Increasing
        } else {
            TrendDirection::Decreasing
        };

        let mut result =
            ForecastResult::new(forecast, horizon, "Linear Regression".to_string(), confidence)?;
        result.r2_score = Some(r2);
        result.trend = Some(trend);
        Ok(result)
    }
}

impl Default for PolynomialRegression {
    fn default() -> Self {
        // Degree DEFAULT_DEGREE is always valid
        Self::new(DEFAULT_DEGREE).unwrap()
    }
}

impl PolynomialRegression {
    /// Create a new polynomial regression model
    pub fn new(degree: usize) -> Result<Self> {
        if degree == 0 {
            return Err(ForecastError::InvalidParameter(
                "Polynomial degree must be positive".to_string(),
            ));
        }
        if degree > 6 {
            return Err(ForecastError::InvalidParameter(format!(
                "Polynomial degree {} is too high for a stable fit",
                degree
            )));
        }

        Ok(Self {
            name: format!("Polynomial Regression (degree {})", degree),
            degree,
        })
    }

    /// Get the polynomial degree
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Forecast `horizon` periods by evaluating the fitted polynomial past
    /// the end of the series
    pub fn forecast(&self, series: &[f64], horizon: usize) -> Result<ForecastResult> {
        check_horizon(horizon)?;
        if series.len() < POLYNOMIAL_MIN_LEN {
            return Err(ForecastError::InsufficientData {
                needed: POLYNOMIAL_MIN_LEN,
                got: series.len(),
            });
        }

        let n = series.len();
        let design: Vec<Vec<f64>> = (0..n).map(|i| power_row(i as f64, self.degree)).collect();
        let coefficients = least_squares(&design, series)?;

        let fitted: Vec<f64> = (0..n)
            .map(|i| eval_poly(&coefficients, i as f64))
            .collect();
        let r2 = r_squared(series, &fitted);

        let forecast: Vec<f64> = (n..n + horizon)
            .map(|i| eval_poly(&coefficients, i as f64))
            .collect();

        let confidence = if r2 > 0.75 {
            Confidence::High
        } else {
            Confidence::Medium
        };

        let mut result = ForecastResult::new(forecast, horizon, self.name.clone(), confidence)?;
        result.r2_score = Some(r2);
        Ok(result)
    }
}

fn power_row(x: f64, degree: usize) -> Vec<f64> {
    (0..=degree).map(|power| x.powi(power as i32)).collect()
}

fn eval_poly(coefficients: &[f64], x: f64) -> f64 {
    coefficients
        .iter()
        .enumerate()
        .map(|(power, c)| c * x.powi(power as i32))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_fit_on_exact_line() {
        let series: Vec<f64> = (1..=20).map(|i| i as f64).collect();
        let result = LinearRegression::new().forecast(&series, 3).unwrap();

        assert_eq!(result.r2_score, Some(1.0));
        assert_eq!(result.confidence, Confidence::High);
        assert_eq!(result.trend, Some(TrendDirection::Increasing));
        for (value, expected) in result.forecast.iter().zip([21.0, 22.0, 23.0]) {
            assert!((value - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn linear_fit_detects_decreasing_trend() {
        let series: Vec<f64> = (0..15).map(|i| 100.0 - 2.0 * i as f64).collect();
        let result = LinearRegression::new().forecast(&series, 2).unwrap();
        assert_eq!(result.trend, Some(TrendDirection::Decreasing));
    }

    #[test]
    fn linear_fit_requires_ten_points() {
        let series = vec![1.0; 9];
        assert!(matches!(
            LinearRegression::new().forecast(&series, 3),
            Err(ForecastError::InsufficientData { needed: 10, got: 9 })
        ));
    }

    #[test]
    fn quadratic_fit_recovers_parabola() {
        let series: Vec<f64> = (0..20).map(|i| (i * i) as f64).collect();
        let result = PolynomialRegression::default().forecast(&series, 2).unwrap();

        assert!(result.r2_score.unwrap() > 0.999);
        assert_eq!(result.confidence, Confidence::High);
        assert!((result.forecast[0] - 400.0).abs() < 1e-4);
        assert!((result.forecast[1] - 441.0).abs() < 1e-4);
    }

    #[test]
    fn polynomial_fit_requires_fifteen_points() {
        let series = vec![1.0; 14];
        assert!(matches!(
            PolynomialRegression::default().forecast(&series, 3),
            Err(ForecastError::InsufficientData {
                needed: 15,
                got: 14
            })
        ));
    }
}
