//! Trend detection and growth rate analysis for metric series

use crate::error::{ForecastError, Result};
use crate::utils::{mean, ols, round2, std_dev};
use serde::{Deserialize, Serialize};

/// Minimum observations for trend detection
pub const TREND_MIN_LEN: usize = 10;

/// Five-way trend classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendLabel {
    StrongUpward,
    ModerateUpward,
    StrongDownward,
    ModerateDownward,
    Stable,
}

impl std::fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            TrendLabel::StrongUpward => "Strong Upward Trend",
            TrendLabel::ModerateUpward => "Moderate Upward Trend",
            TrendLabel::StrongDownward => "Strong Downward Trend",
            TrendLabel::ModerateDownward => "Moderate Downward Trend",
            TrendLabel::Stable => "Stable",
        };
        write!(f, "{}", label)
    }
}

/// Result of trend detection on a series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendAnalysis {
    /// Five-way trend classification
    pub trend: TrendLabel,
    /// Fitted OLS slope per observation
    pub slope: f64,
    /// Coefficient of variation, percent (0 when the mean is zero)
    pub volatility: f64,
    /// Mean of the trailing 10 observations
    pub recent_average: f64,
    /// Mean of the whole series
    pub overall_average: f64,
}

/// Period-over-period growth between the first and last points of a slice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthRate {
    /// Percent growth, rounded to two decimals
    pub growth_rate: f64,
    /// Last value of the slice
    pub recent_value: f64,
    /// First value of the slice
    pub previous_value: f64,
}

/// Classify the trend of a series.
///
/// Fits an OLS line over the index for the slope and compares the
/// trailing-10 mean against the leading-10 mean. "Strong" needs the slope
/// sign and the mean comparison to agree; slope sign alone is "Moderate".
/// The sign checks are strict, so an exactly zero slope is always Stable.
pub fn detect_trends(series: &[f64]) -> Result<TrendAnalysis> {
    if series.len() < TREND_MIN_LEN {
        return Err(ForecastError::InsufficientData {
            needed: TREND_MIN_LEN,
            got: series.len(),
        });
    }

    let (slope, _) = ols(series);
    let recent_mean = mean(&series[series.len() - TREND_MIN_LEN..]);
    let older_mean = mean(&series[..TREND_MIN_LEN]);

    let trend = if slope > 0.0 && recent_mean > older_mean {
        TrendLabel::StrongUpward
    } else if slope > 0.0 {
        TrendLabel::ModerateUpward
    } else if slope < 0.0 && recent_mean < older_mean {
        TrendLabel::StrongDownward
    } else if slope < 0.0 {
        TrendLabel::ModerateDownward
    } else {
        TrendLabel::Stable
    };

    let overall_mean = mean(series);
    let volatility = if overall_mean != 0.0 {
        round2(std_dev(series) / overall_mean * 100.0)
    } else {
        0.0
    };

    Ok(TrendAnalysis {
        trend,
        slope,
        volatility,
        recent_average: round2(recent_mean),
        overall_average: round2(overall_mean),
    })
}

/// Growth between the first and last points of `series`, in percent.
///
/// Callers control the comparison window by slicing before calling. A zero
/// first value cannot anchor a percentage and is rejected.
pub fn calculate_growth_rate(series: &[f64]) -> Result<GrowthRate> {
    if series.len() < 2 {
        return Err(ForecastError::InsufficientData {
            needed: 2,
            got: series.len(),
        });
    }

    let previous_value = series[0];
    let recent_value = series[series.len() - 1];
    if previous_value == 0.0 {
        return Err(ForecastError::InvalidParameter(
            "Cannot compute growth rate from a zero base value".to_string(),
        ));
    }

    let growth_rate = round2((recent_value - previous_value) / previous_value * 100.0);
    Ok(GrowthRate {
        growth_rate,
        recent_value,
        previous_value,
    })
}
