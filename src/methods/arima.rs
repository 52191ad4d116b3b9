//! ARIMA models for business metric forecasting
//!
//! Estimation is Hannan-Rissanen: a long autoregression via Yule-Walker
//! supplies innovation estimates, then AR and MA coefficients are fitted
//! jointly by least squares. Forecast standard errors come from the
//! psi-weight expansion, cumulated once per order of differencing.

use crate::error::{ForecastError, Result};
use crate::methods::{check_horizon, ensure_finite, Confidence, ForecastResult};
use crate::utils::{future_dates, least_squares, mean, solve_linear_system};
use chrono::NaiveDate;
use statrs::distribution::{ContinuousCDF, Normal};

/// Minimum observations for an ARIMA fit
pub const ARIMA_MIN_LEN: usize = 20;

/// Two-sided 95% interval
const INTERVAL_COVERAGE: f64 = 0.95;

/// ARIMA model (AutoRegressive Integrated Moving Average)
#[derive(Debug, Clone)]
pub struct Arima {
    /// Name of the model
    name: String,
    /// AR order (p)
    p: usize,
    /// Differencing order (d)
    d: usize,
    /// MA order (q)
    q: usize,
}

/// Estimated ARMA coefficients on the differenced, demeaned series
struct ArmaFit {
    phi: Vec<f64>,
    theta: Vec<f64>,
    sigma2: f64,
}

impl Default for Arima {
    fn default() -> Self {
        // Order (1,1,1) is always valid
        Self::new(1, 1, 1).unwrap()
    }
}

impl Arima {
    /// Create a new ARIMA model with order (p, d, q)
    pub fn new(p: usize, d: usize, q: usize) -> Result<Self> {
        if p + d + q == 0 {
            return Err(ForecastError::InvalidParameter(
                "ARIMA order must have at least one non-zero component".to_string(),
            ));
        }
        if p > 5 || q > 5 || d > 2 {
            return Err(ForecastError::InvalidParameter(format!(
                "ARIMA({},{},{}) order is too high for a stable fit",
                p, d, q
            )));
        }

        Ok(Self {
            name: format!("ARIMA({},{},{})", p, d, q),
            p,
            d,
            q,
        })
    }

    /// Get the model order
    pub fn order(&self) -> (usize, usize, usize) {
        (self.p, self.d, self.q)
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
        if series.len() < ARIMA_MIN_LEN {
            return Err(ForecastError::InsufficientData {
                needed: ARIMA_MIN_LEN,
                got: series.len(),
            });
        }

        // Difference d times, keeping each level's tail for re-integration
        let mut levels: Vec<Vec<f64>> = vec![series.to_vec()];
        for _ in 0..self.d {
            let previous = levels.last().unwrap();
            if previous.len() < 2 {
                return Err(ForecastError::FitFailure(
                    "series too short after differencing".to_string(),
                ));
            }
            let next: Vec<f64> = previous.windows(2).map(|w| w[1] - w[0]).collect();
            levels.push(next);
        }
        let w = levels.last().unwrap();

        let mu = mean(w);
        let z: Vec<f64> = w.iter().map(|v| v - mu).collect();

        let fit = fit_arma(&z, self.p, self.q)?;

        let n = z.len() as f64;
        let parameter_count = (self.p + self.q + 1) as f64;
        let log_likelihood = if fit.sigma2 > 0.0 {
            -0.5 * n * ((2.0 * std::f64::consts::PI * fit.sigma2).ln() + 1.0)
        } else {
            0.0
        };
        let aic = 2.0 * parameter_count - 2.0 * log_likelihood;
        let bic = parameter_count * n.ln() - 2.0 * log_likelihood;

        // Forecast the differenced series, then integrate back up
        let z_forecast = forecast_arma(&z, &fit, horizon);
        let mut level_forecast: Vec<f64> = z_forecast.iter().map(|v| v + mu).collect();
        for level in levels.iter().rev().skip(1) {
            let mut previous = *level.last().unwrap();
            for value in level_forecast.iter_mut() {
                previous += *value;
                *value = previous;
            }
        }
        ensure_finite(&level_forecast, "ARIMA forecast")?;

        // Prediction interval via psi weights
        let z95 = normal_quantile(0.5 + INTERVAL_COVERAGE / 2.0)?;
        let psi = psi_weights(&fit.phi, &fit.theta, self.d, horizon);
        let mut cumulative = 0.0;
        let mut lower = Vec::with_capacity(horizon);
        let mut upper = Vec::with_capacity(horizon);
        for (step, value) in level_forecast.iter().enumerate() {
            cumulative += psi[step].powi(2);
            let margin = z95 * (fit.sigma2 * cumulative).sqrt();
            lower.push(value - margin);
            upper.push(value + margin);
        }
        ensure_finite(&lower, "ARIMA interval")?;
        ensure_finite(&upper, "ARIMA interval")?;

        let last_date = *dates.last().unwrap();
        let mut result = ForecastResult::new(
            level_forecast,
            horizon,
            self.name.clone(),
            Confidence::High,
        )?
        .with_bounds(lower, upper)?
        .with_dates(future_dates(last_date, horizon))?;
        result.aic = Some(aic);
        result.bic = Some(bic);
        Ok(result)
    }
}

/// Hannan-Rissanen estimation of an ARMA(p, q) on a demeaned series.
fn fit_arma(z: &[f64], p: usize, q: usize) -> Result<ArmaFit> {
    let n = z.len();
    let c0: f64 = z.iter().map(|v| v * v).sum::<f64>() / n as f64;

    // A series that is constant after differencing has nothing left to
    // model; the mean carries the whole forecast.
    if c0 < 1e-12 || (p == 0 && q == 0) {
        return Ok(ArmaFit {
            phi: vec![0.0; p],
            theta: vec![0.0; q],
            sigma2: c0,
        });
    }

    // Stage 1: long AR via Yule-Walker to estimate innovations
    let long_order = ((n as f64).sqrt().floor() as usize)
        .max(p + q)
        .max(1)
        .min(n / 2);
    let long_coefficients = yule_walker(z, long_order)?;
    let mut innovations = vec![0.0; n];
    for t in long_order..n {
        let mut prediction = 0.0;
        for (i, coefficient) in long_coefficients.iter().enumerate() {
            prediction += coefficient * z[t - 1 - i];
        }
        innovations[t] = z[t] - prediction;
    }

    // Stage 2: joint least squares on lagged values and lagged innovations
    let start = (long_order + q).max(p);
    if start >= n {
        return Err(ForecastError::FitFailure(
            "not enough observations for ARMA regression".to_string(),
        ));
    }
    let mut design = Vec::with_capacity(n - start);
    let mut target = Vec::with_capacity(n - start);
    for t in start..n {
        let mut row = Vec::with_capacity(p + q);
        for i in 1..=p {
            row.push(z[t - i]);
        }
        for j in 1..=q {
            row.push(innovations[t - j]);
        }
        design.push(row);
        target.push(z[t]);
    }
    let coefficients = least_squares(&design, &target)?;
    let phi = coefficients[..p].to_vec();
    let theta = coefficients[p..].to_vec();

    // Final conditional residuals for the innovation variance
    let mut residuals = vec![0.0; n];
    for t in 0..n {
        let mut prediction = 0.0;
        for (i, coefficient) in phi.iter().enumerate() {
            if t > i {
                prediction += coefficient * z[t - 1 - i];
            }
        }
        for (j, coefficient) in theta.iter().enumerate() {
            if t > j {
                prediction += coefficient * residuals[t - 1 - j];
            }
        }
        residuals[t] = z[t] - prediction;
    }
    let denominator = n.saturating_sub(p + q).max(1) as f64;
    let sigma2 = residuals.iter().map(|e| e * e).sum::<f64>() / denominator;

    if !sigma2.is_finite() || phi.iter().chain(theta.iter()).any(|c| !c.is_finite()) {
        return Err(ForecastError::FitFailure(
            "non-finite ARMA coefficients".to_string(),
        ));
    }

    Ok(ArmaFit { phi, theta, sigma2 })
}

/// Yule-Walker AR coefficients of the given order
fn yule_walker(z: &[f64], order: usize) -> Result<Vec<f64>> {
    let n = z.len();
    let mut autocovariance = vec![0.0; order + 1];
    for (lag, slot) in autocovariance.iter_mut().enumerate() {
        let mut sum = 0.0;
        for t in lag..n {
            sum += z[t] * z[t - lag];
        }
        *slot = sum / n as f64;
    }

    let mut matrix = vec![vec![0.0; order]; order];
    for i in 0..order {
        for j in 0..order {
            matrix[i][j] = autocovariance[i.abs_diff(j)];
        }
    }
    let rhs = autocovariance[1..=order].to_vec();
    solve_linear_system(matrix, rhs)
}

/// Iterate the ARMA recursion forward with future innovations at zero
fn forecast_arma(z: &[f64], fit: &ArmaFit, horizon: usize) -> Vec<f64> {
    let n = z.len();
    let p = fit.phi.len();
    let q = fit.theta.len();

    // Rebuild in-sample innovations for the MA terms that reach back into
    // the observed window
    let mut innovations = vec![0.0; n];
    for t in 0..n {
        let mut prediction = 0.0;
        for (i, coefficient) in fit.phi.iter().enumerate() {
            if t > i {
                prediction += coefficient * z[t - 1 - i];
            }
        }
        for (j, coefficient) in fit.theta.iter().enumerate() {
            if t > j {
                prediction += coefficient * innovations[t - 1 - j];
            }
        }
        innovations[t] = z[t] - prediction;
    }

    let mut extended = z.to_vec();
    let mut forecasts = Vec::with_capacity(horizon);
    for step in 0..horizon {
        let t = n + step;
        let mut prediction = 0.0;
        for (i, coefficient) in fit.phi.iter().enumerate().take(p) {
            prediction += coefficient * extended[t - 1 - i];
        }
        for (j, coefficient) in fit.theta.iter().enumerate().take(q) {
            let index = t - 1 - j;
            if index < n {
                prediction += coefficient * innovations[index];
            }
        }
        extended.push(prediction);
        forecasts.push(prediction);
    }
    forecasts
}

/// Psi-weight expansion of the ARMA part, cumulated once per order of
/// differencing so the weights apply to the integrated series.
fn psi_weights(phi: &[f64], theta: &[f64], d: usize, horizon: usize) -> Vec<f64> {
    let mut psi = vec![0.0; horizon.max(1)];
    psi[0] = 1.0;
    for j in 1..psi.len() {
        let mut weight = if j <= theta.len() { theta[j - 1] } else { 0.0 };
        for (i, coefficient) in phi.iter().enumerate() {
            if j > i {
                weight += coefficient * psi[j - 1 - i];
            }
        }
        psi[j] = weight;
    }

    for _ in 0..d {
        let mut running = 0.0;
        for weight in psi.iter_mut() {
            running += *weight;
            *weight = running;
        }
    }
    psi
}

fn normal_quantile(p: f64) -> Result<f64> {
    let normal =
        Normal::new(0.0, 1.0).map_err(|e| ForecastError::FitFailure(e.to_string()))?;
    Ok(normal.inverse_cdf(p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn daily_dates(start: NaiveDate, n: usize) -> Vec<NaiveDate> {
        (0..n as i64).map(|i| start + Duration::days(i)).collect()
    }

    #[test]
    fn rejects_degenerate_order() {
        assert!(Arima::new(0, 0, 0).is_err());
        assert!(Arima::new(6, 1, 1).is_err());
    }

    #[test]
    fn requires_twenty_points() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let dates = daily_dates(start, 19);
        let series = vec![1.0; 19];
        assert!(matches!(
            Arima::default().forecast(&series, &dates, 5),
            Err(ForecastError::InsufficientData {
                needed: 20,
                got: 19
            })
        ));
    }

    #[test]
    fn linear_series_continues_linearly_after_differencing() {
        // First differences of a straight line are constant, so the mean of
        // the differenced series carries the whole forecast.
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let dates = daily_dates(start, 30);
        let series: Vec<f64> = (1..=30).map(|i| i as f64).collect();

        let result = Arima::default().forecast(&series, &dates, 3).unwrap();
        for (value, expected) in result.forecast.iter().zip([31.0, 32.0, 33.0]) {
            assert!((value - expected).abs() < 1e-8);
        }
        assert!(result.has_confidence_interval);
        assert!(result.aic.is_some());
        assert!(result.bic.is_some());

        let forecast_dates = result.forecast_dates.unwrap();
        assert_eq!(forecast_dates[0], start + Duration::days(30));
    }

    #[test]
    fn interval_widens_with_horizon() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let dates = daily_dates(start, 40);
        // Sawtooth keeps the differenced series non-degenerate
        let series: Vec<f64> = (0..40)
            .map(|i| 100.0 + (i % 5) as f64 * 3.0 + i as f64 * 0.5)
            .collect();

        let result = Arima::default().forecast(&series, &dates, 10).unwrap();
        let lower = result.lower_bound.unwrap();
        let upper = result.upper_bound.unwrap();
        let first_width = upper[0] - lower[0];
        let last_width = upper[9] - lower[9];
        assert!(first_width > 0.0);
        assert!(last_width >= first_width);
    }

    #[test]
    fn forecasts_are_deterministic() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let dates = daily_dates(start, 40);
        let series: Vec<f64> = (0..40)
            .map(|i| 50.0 + (i as f64 * 0.7).sin() * 4.0 + i as f64)
            .collect();

        let first = Arima::default().forecast(&series, &dates, 5).unwrap();
        let second = Arima::default().forecast(&series, &dates, 5).unwrap();
        assert_eq!(first.forecast, second.forecast);
    }
}
