//! Simple exponential smoothing forecasting

use crate::error::{ForecastError, Result};
use crate::methods::{check_horizon, Confidence, ForecastResult};

/// Default smoothing factor
pub const DEFAULT_ALPHA: f64 = 0.3;

/// Minimum observations for a smoothing fit
pub const EXPONENTIAL_MIN_LEN: usize = 5;

/// Simple exponential smoothing model.
///
/// S(0) = x(0), S(t) = alpha * x(t) + (1 - alpha) * S(t-1); the forecast is
/// a flat extension at the last smoothed level.
#[derive(Debug, Clone)]
pub struct ExponentialSmoothing {
    /// Name of the model
    name: String,
    /// Smoothing parameter
    alpha: f64,
}

impl Default for ExponentialSmoothing {
    fn default() -> Self {
        // Alpha DEFAULT_ALPHA is always valid
        Self::new(DEFAULT_ALPHA).unwrap()
    }
}

impl ExponentialSmoothing {
    /// Create a new exponential smoothing model
    pub fn new(alpha: f64) -> Result<Self> {
        if alpha <= 0.0 || alpha >= 1.0 {
            return Err(ForecastError::InvalidParameter(
                "Alpha must be between 0 and 1".to_string(),
            ));
        }

        Ok(Self {
            name: format!("Exponential Smoothing (alpha={})", alpha),
            alpha,
        })
    }

    /// Get the smoothing parameter
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Forecast `horizon` periods as a constant at the last smoothed level
    pub fn forecast(&self, series: &[f64], horizon: usize) -> Result<ForecastResult> {
        check_horizon(horizon)?;
        if series.len() < EXPONENTIAL_MIN_LEN {
            return Err(ForecastError::InsufficientData {
                needed: EXPONENTIAL_MIN_LEN,
                got: series.len(),
            });
        }

        let mut level = series[0];
        for &value in &series[1..] {
            level = self.alpha * value + (1.0 - self.alpha) * level;
        }

        let values = vec![level; horizon];
        ForecastResult::new(values, horizon, self.name.clone(), Confidence::Medium)
    }
}
