//! Tabular dataset handling and series extraction

use crate::error::{ForecastError, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// Date formats accepted when the date column is stored as text.
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"];

/// Tabular dataset wrapping a polars DataFrame with an optional date column.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Data frame containing the metric columns
    df: DataFrame,
    /// Name of the date column, if one was detected or declared
    date_column: Option<String>,
}

/// A cleaned numeric series extracted from a dataset column.
///
/// Values are sorted ascending by date (stable, ties keep original order),
/// with nulls and non-finite entries removed. When dates are present they
/// are paired 1:1 with the values.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSeries {
    values: Vec<f64>,
    dates: Option<Vec<NaiveDate>>,
}

impl Dataset {
    /// Create a dataset from an existing DataFrame, auto-detecting the date
    /// column by name (`date`/`time`/`timestamp`) or temporal dtype.
    pub fn from_dataframe(df: DataFrame) -> Self {
        let date_column = Self::detect_date_column(&df);
        Self { df, date_column }
    }

    /// Create a dataset with an explicitly named date column.
    pub fn with_date_column(df: DataFrame, date_column: &str) -> Result<Self> {
        if df.column(date_column).is_err() {
            return Err(ForecastError::MissingColumn(date_column.to_string()));
        }
        Ok(Self {
            df,
            date_column: Some(date_column.to_string()),
        })
    }

    /// Load a dataset from a CSV file.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;
        Ok(Self::from_dataframe(df))
    }

    /// Create a dataset from a single undated value column (for testing and
    /// simple callers).
    pub fn from_values(column: &str, values: Vec<f64>) -> Result<Self> {
        let df = DataFrame::new(vec![Series::new(column, values)])?;
        Ok(Self {
            df,
            date_column: None,
        })
    }

    /// Create a dataset from paired dates and values.
    pub fn from_dated_values(
        column: &str,
        dates: Vec<NaiveDate>,
        values: Vec<f64>,
    ) -> Result<Self> {
        Self::from_nullable_values(column, Some(dates), values.into_iter().map(Some).collect())
    }

    /// Create a dataset from values that may contain nulls, optionally dated.
    pub fn from_nullable_values(
        column: &str,
        dates: Option<Vec<NaiveDate>>,
        values: Vec<Option<f64>>,
    ) -> Result<Self> {
        let mut columns = Vec::with_capacity(2);
        let date_column = if let Some(dates) = &dates {
            if dates.len() != values.len() {
                return Err(ForecastError::InvalidParameter(format!(
                    "Dates length ({}) doesn't match values length ({})",
                    dates.len(),
                    values.len()
                )));
            }
            let days: Vec<i32> = dates.iter().map(|d| days_since_epoch(*d)).collect();
            columns.push(Series::new("date", days).cast(&DataType::Date)?);
            Some("date".to_string())
        } else {
            None
        };
        columns.push(Series::new(column, values));

        Ok(Self {
            df: DataFrame::new(columns)?,
            date_column,
        })
    }

    /// Detect the date column in a DataFrame
    fn detect_date_column(df: &DataFrame) -> Option<String> {
        for name in df.get_column_names() {
            let lower_name = name.to_lowercase();
            if lower_name.contains("date")
                || lower_name.contains("time")
                || lower_name.contains("timestamp")
            {
                return Some(name.to_string());
            }
        }

        df.get_columns()
            .iter()
            .find(|col| col.dtype().is_temporal())
            .map(|col| col.name().to_string())
    }

    /// Get the underlying DataFrame
    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    /// Get the date column name, if any
    pub fn date_column(&self) -> Option<&str> {
        self.date_column.as_deref()
    }

    /// Number of rows in the dataset
    pub fn len(&self) -> usize {
        self.df.height()
    }

    /// Check if the dataset has no rows
    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// Check whether a column exists
    pub fn has_column(&self, column: &str) -> bool {
        self.df.column(column).is_ok()
    }

    /// Extract the cleaned series for `column`.
    ///
    /// Rows are sorted by date when a date column exists (stable sort); rows
    /// with a null value, a non-finite value, or an unparseable date are
    /// dropped.
    pub fn extract_series(&self, column: &str) -> Result<MetricSeries> {
        if self.is_empty() {
            return Err(ForecastError::EmptyDataset);
        }
        let col = self
            .df
            .column(column)
            .map_err(|_| ForecastError::MissingColumn(column.to_string()))?;
        let raw_values = numeric_column(col)?;

        let Some(date_column) = &self.date_column else {
            let values: Vec<f64> = raw_values
                .into_iter()
                .flatten()
                .filter(|v| v.is_finite())
                .collect();
            return Ok(MetricSeries {
                values,
                dates: None,
            });
        };

        let date_col = self
            .df
            .column(date_column)
            .map_err(|_| ForecastError::MissingColumn(date_column.clone()))?;
        let raw_dates = date_column_values(date_col)?;

        // Pair up, keep only fully populated rows, then stable-sort by date.
        let mut rows: Vec<(NaiveDate, f64)> = raw_dates
            .into_iter()
            .zip(raw_values)
            .filter_map(|(date, value)| match (date, value) {
                (Some(d), Some(v)) if v.is_finite() => Some((d, v)),
                _ => None,
            })
            .collect();
        rows.sort_by_key(|(date, _)| *date);

        let (dates, values): (Vec<NaiveDate>, Vec<f64>) = rows.into_iter().unzip();
        Ok(MetricSeries {
            values,
            dates: Some(dates),
        })
    }
}

impl MetricSeries {
    /// Build a series directly from values (mostly for tests).
    pub fn from_values(values: Vec<f64>) -> Self {
        Self {
            values,
            dates: None,
        }
    }

    /// Build a dated series directly (mostly for tests).
    pub fn from_dated_values(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(ForecastError::InvalidParameter(format!(
                "Dates length ({}) doesn't match values length ({})",
                dates.len(),
                values.len()
            )));
        }
        Ok(Self {
            values,
            dates: Some(dates),
        })
    }

    /// The cleaned values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// The dates paired with the values, if the dataset had a date column
    pub fn dates(&self) -> Option<&[NaiveDate]> {
        self.dates.as_deref()
    }

    /// The last observed date, if dates are present
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.as_ref().and_then(|d| d.last().copied())
    }

    /// Number of observations
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the series has no observations
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The trailing `n` values (the whole series when shorter than `n`)
    pub fn tail(&self, n: usize) -> &[f64] {
        &self.values[self.values.len().saturating_sub(n)..]
    }
}

fn days_since_epoch(date: NaiveDate) -> i32 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
    (date - epoch).num_days() as i32
}

fn date_from_days(days: i32) -> NaiveDate {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
    epoch + Duration::days(days as i64)
}

/// Read a column as nullable f64 values, matching on the physical dtype.
fn numeric_column(col: &Series) -> Result<Vec<Option<f64>>> {
    match col.dtype() {
        DataType::Float64 => Ok(col.f64().unwrap().into_iter().collect()),
        DataType::Float32 => Ok(col
            .f32()
            .unwrap()
            .into_iter()
            .map(|v| v.map(|v| v as f64))
            .collect()),
        DataType::Int64 => Ok(col
            .i64()
            .unwrap()
            .into_iter()
            .map(|v| v.map(|v| v as f64))
            .collect()),
        DataType::Int32 => Ok(col
            .i32()
            .unwrap()
            .into_iter()
            .map(|v| v.map(|v| v as f64))
            .collect()),
        DataType::UInt64 => Ok(col
            .u64()
            .unwrap()
            .into_iter()
            .map(|v| v.map(|v| v as f64))
            .collect()),
        DataType::UInt32 => Ok(col
            .u32()
            .unwrap()
            .into_iter()
            .map(|v| v.map(|v| v as f64))
            .collect()),
        other => Err(ForecastError::InvalidParameter(format!(
            "Column '{}' has non-numeric type {}",
            col.name(),
            other
        ))),
    }
}

/// Read a column as nullable dates, matching on the physical dtype.
///
/// A column where no cell parses as a date at all is rejected rather than
/// silently dropping every row.
fn date_column_values(col: &Series) -> Result<Vec<Option<NaiveDate>>> {
    let parsed: Vec<Option<NaiveDate>> = match col.dtype() {
        DataType::Date => col
            .date()
            .unwrap()
            .into_iter()
            .map(|opt| opt.map(date_from_days))
            .collect(),
        DataType::Datetime(time_unit, _) => {
            let divisor = match time_unit {
                TimeUnit::Nanoseconds => 1_000_000_000,
                TimeUnit::Microseconds => 1_000_000,
                TimeUnit::Milliseconds => 1_000,
            };
            col.datetime()
                .unwrap()
                .into_iter()
                .map(|opt| {
                    opt.and_then(|ts| {
                        NaiveDateTime::from_timestamp_opt(ts.div_euclid(divisor), 0)
                            .map(|dt| dt.date())
                    })
                })
                .collect()
        }
        DataType::Utf8 => col
            .utf8()
            .unwrap()
            .into_iter()
            .map(|opt| opt.and_then(parse_date_str))
            .collect(),
        other => {
            return Err(ForecastError::InvalidDateColumn(format!(
                "Column '{}' has type {} which cannot be read as dates",
                col.name(),
                other
            )))
        }
    };

    if !parsed.is_empty() && parsed.iter().all(|d| d.is_none()) {
        return Err(ForecastError::InvalidDateColumn(format!(
            "No value in column '{}' parses as a date",
            col.name()
        )));
    }

    Ok(parsed)
}

fn parse_date_str(s: &str) -> Option<NaiveDate> {
    let trimmed = s.trim();
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    chrono::DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.date_naive())
}
