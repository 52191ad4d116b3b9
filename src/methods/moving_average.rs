//! Moving average forecasting

use crate::error::{ForecastError, Result};
use crate::methods::{check_horizon, Confidence, ForecastResult};
use crate::utils::mean;

/// Default rolling window, in observations
pub const DEFAULT_WINDOW: usize = 7;

/// Simple moving average model.
///
/// Forecasts a flat extension at the last rolling mean. This is the
/// orchestrator's universal fallback: its minimum length requirement is the
/// window itself, lower than every other method's.
#[derive(Debug, Clone)]
pub struct MovingAverage {
    /// Name of the model
    name: String,
    /// Window size
    window: usize,
}

impl Default for MovingAverage {
    fn default() -> Self {
        // Window DEFAULT_WINDOW is always valid
        Self::new(DEFAULT_WINDOW).unwrap()
    }
}

impl MovingAverage {
    /// Create a new moving average model
    pub fn new(window: usize) -> Result<Self> {
        if window == 0 {
            return Err(ForecastError::InvalidParameter(
                "Window size must be positive".to_string(),
            ));
        }

        Ok(Self {
            name: format!("{}-day Moving Average", window),
            window,
        })
    }

    /// Get the window size
    pub fn window(&self) -> usize {
        self.window
    }

    /// Forecast `horizon` periods ahead as a constant at the last rolling mean
    pub fn forecast(&self, series: &[f64], horizon: usize) -> Result<ForecastResult> {
        check_horizon(horizon)?;
        if series.len() < self.window {
            return Err(ForecastError::InsufficientData {
                needed: self.window,
                got: series.len(),
            });
        }

        let last_ma = mean(&series[series.len() - self.window..]);
        let values = vec![last_ma; horizon];

        ForecastResult::new(values, horizon, self.name.clone(), Confidence::Medium)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_window() {
        assert!(MovingAverage::new(0).is_err());
    }

    #[test]
    fn flat_series_forecasts_flat() {
        let series = vec![10.0; 7];
        let result = MovingAverage::default().forecast(&series, 3).unwrap();
        assert_eq!(result.forecast, vec![10.0, 10.0, 10.0]);
        assert_eq!(result.confidence, Confidence::Medium);
        assert_eq!(result.method, "7-day Moving Average");
    }

    #[test]
    fn short_series_is_insufficient() {
        let series = vec![1.0; 6];
        let err = MovingAverage::default().forecast(&series, 3).unwrap_err();
        assert!(matches!(
            err,
            ForecastError::InsufficientData { needed: 7, got: 6 }
        ));
    }
}
