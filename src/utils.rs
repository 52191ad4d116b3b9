//! Utility functions for the forecast_metrics crate

use crate::error::{ForecastError, Result};
use chrono::{Duration, NaiveDate};

/// Create future dates for forecasting: the `horizon` consecutive days
/// immediately following `last_date`.
pub fn future_dates(last_date: NaiveDate, horizon: usize) -> Vec<NaiveDate> {
    (1..=horizon as i64)
        .map(|offset| last_date + Duration::days(offset))
        .collect()
}

/// Arithmetic mean of a slice. Returns 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator).
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Coefficient of determination of `fitted` against `actual`.
///
/// Computed as `1 - SS_res / SS_tot`. A constant actual series has no
/// explainable variance, so 0.0 is returned rather than a NaN.
pub fn r_squared(actual: &[f64], fitted: &[f64]) -> f64 {
    let m = mean(actual);
    let ss_tot: f64 = actual.iter().map(|y| (y - m).powi(2)).sum();
    if ss_tot == 0.0 {
        return 0.0;
    }
    let ss_res: f64 = actual
        .iter()
        .zip(fitted.iter())
        .map(|(y, f)| (y - f).powi(2))
        .sum();
    1.0 - ss_res / ss_tot
}

/// Ordinary least squares of `values` against their index 0..n.
///
/// Returns `(slope, intercept)`.
pub fn ols(values: &[f64]) -> (f64, f64) {
    let x: Vec<f64> = (0..values.len()).map(|i| i as f64).collect();
    ols_xy(&x, values)
}

/// Ordinary least squares of `y` against `x`. Returns `(slope, intercept)`.
///
/// A degenerate `x` (all identical) yields a flat line at the mean.
pub fn ols_xy(x: &[f64], y: &[f64]) -> (f64, f64) {
    let n = x.len() as f64;
    let mean_x = mean(x);
    let mean_y = mean(y);
    let sxx: f64 = x.iter().map(|xi| (xi - mean_x).powi(2)).sum();
    if sxx == 0.0 || n < 2.0 {
        return (0.0, mean_y);
    }
    let sxy: f64 = x
        .iter()
        .zip(y.iter())
        .map(|(xi, yi)| (xi - mean_x) * (yi - mean_y))
        .sum();
    let slope = sxy / sxx;
    (slope, mean_y - slope * mean_x)
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Solve a dense linear system `a * x = b` in place using Gaussian
/// elimination with partial pivoting. `a` is row-major, n x n.
pub(crate) fn solve_linear_system(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>> {
    let n = b.len();
    for col in 0..n {
        // Pivot on the largest remaining entry in this column
        let pivot_row = (col..n)
            .max_by(|&r1, &r2| {
                a[r1][col]
                    .abs()
                    .partial_cmp(&a[r2][col].abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(col);

        if a[pivot_row][col].abs() < 1e-12 {
            return Err(ForecastError::FitFailure(
                "singular matrix in least squares solve".to_string(),
            ));
        }

        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        for row in (col + 1)..n {
            let factor = a[row][col] / a[col][col];
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let mut sum = b[row];
        for k in (row + 1)..n {
            sum -= a[row][k] * x[k];
        }
        x[row] = sum / a[row][row];
    }

    if x.iter().any(|v| !v.is_finite()) {
        return Err(ForecastError::FitFailure(
            "non-finite solution in least squares solve".to_string(),
        ));
    }

    Ok(x)
}

/// Solve the normal equations for `design * coef ~ target` by least squares.
///
/// `design` is row-major with one row per observation.
pub(crate) fn least_squares(design: &[Vec<f64>], target: &[f64]) -> Result<Vec<f64>> {
    let rows = design.len();
    if rows == 0 || rows != target.len() {
        return Err(ForecastError::FitFailure(
            "empty or mismatched design matrix".to_string(),
        ));
    }
    let cols = design[0].len();
    if rows < cols {
        return Err(ForecastError::FitFailure(format!(
            "under-determined system: {} rows for {} coefficients",
            rows, cols
        )));
    }

    let mut xtx = vec![vec![0.0; cols]; cols];
    let mut xty = vec![0.0; cols];
    for (row, &y) in design.iter().zip(target.iter()) {
        for i in 0..cols {
            xty[i] += row[i] * y;
            for j in 0..cols {
                xtx[i][j] += row[i] * row[j];
            }
        }
    }

    solve_linear_system(xtx, xty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ols_recovers_exact_line() {
        let values: Vec<f64> = (0..20).map(|i| 3.0 + 2.0 * i as f64).collect();
        let (slope, intercept) = ols(&values);
        assert!((slope - 2.0).abs() < 1e-10);
        assert!((intercept - 3.0).abs() < 1e-10);
    }

    #[test]
    fn r_squared_is_one_for_perfect_fit() {
        let actual = vec![1.0, 2.0, 3.0, 4.0];
        assert_eq!(r_squared(&actual, &actual), 1.0);
    }

    #[test]
    fn r_squared_zero_for_constant_series() {
        let actual = vec![5.0; 10];
        let fitted = vec![5.0; 10];
        assert_eq!(r_squared(&actual, &fitted), 0.0);
    }

    #[test]
    fn solves_small_system() {
        // 2x + y = 5, x - y = 1  =>  x = 2, y = 1
        let a = vec![vec![2.0, 1.0], vec![1.0, -1.0]];
        let b = vec![5.0, 1.0];
        let x = solve_linear_system(a, b).unwrap();
        assert!((x[0] - 2.0).abs() < 1e-10);
        assert!((x[1] - 1.0).abs() < 1e-10);
    }

    #[test]
    fn future_dates_are_consecutive() {
        let last = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let dates = future_dates(last, 3);
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 2, 2).unwrap(),
                NaiveDate::from_ymd_opt(2024, 2, 3).unwrap(),
            ]
        );
    }
}
