//! IQR outlier filtering.
//!
//! Produces a second table restricted to rows whose value lies inside
//! `[Q1 - k*IQR, Q3 + k*IQR]`. The input table is never modified.

use crate::error::{EdaError, Result};
use crate::schema;
use crate::types::{OutlierBounds, OutlierSummary};
use crate::utils::{quantile_sorted, series_to_f64, sorted_values, valid_f64_values};
use polars::prelude::*;
use tracing::{debug, info};

/// Default IQR multiplier.
pub const DEFAULT_IQR_MULTIPLIER: f64 = 1.5;

/// Result of splitting a table at the outlier bounds.
#[derive(Debug, Clone)]
pub struct OutlierPartition {
    pub bounds: OutlierBounds,
    /// Rows inside the bounds, in original order.
    pub kept: DataFrame,
    pub excluded_count: usize,
}

impl OutlierPartition {
    pub fn summary(&self, column: &str, multiplier: f64) -> OutlierSummary {
        OutlierSummary {
            column: column.to_string(),
            multiplier,
            bounds: Some(self.bounds),
            rows_kept: self.kept.height(),
            rows_excluded: self.excluded_count,
        }
    }
}

/// Interquartile-range filter over one numeric column.
#[derive(Debug, Clone)]
pub struct OutlierFilter {
    column: String,
    multiplier: f64,
}

impl Default for OutlierFilter {
    fn default() -> Self {
        Self::new(DEFAULT_IQR_MULTIPLIER)
    }
}

impl OutlierFilter {
    /// Filter on `Popularity` with the given IQR multiplier.
    pub fn new(multiplier: f64) -> Self {
        Self {
            column: schema::POPULARITY.to_string(),
            multiplier,
        }
    }

    /// Filter on a different column.
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }

    pub fn column_name(&self) -> &str {
        &self.column
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// Quartiles and acceptance interval of the configured column.
    pub fn bounds(&self, df: &DataFrame) -> Result<OutlierBounds> {
        let series = self.series(df)?;
        let values = sorted_values(valid_f64_values(series)?);

        let (Some(q1), Some(q3)) = (
            quantile_sorted(&values, 0.25),
            quantile_sorted(&values, 0.75),
        ) else {
            return Err(EdaError::NoValidValues(self.column.clone()));
        };

        let iqr = q3 - q1;
        let bounds = OutlierBounds {
            q1,
            q3,
            iqr,
            lower: q1 - self.multiplier * iqr,
            upper: q3 + self.multiplier * iqr,
        };
        debug!(
            "'{}' bounds: Q1={}, Q3={}, IQR={}, accepted [{}, {}]",
            self.column, bounds.q1, bounds.q3, bounds.iqr, bounds.lower, bounds.upper
        );
        Ok(bounds)
    }

    /// Split the table at the computed bounds.
    pub fn partition(&self, df: &DataFrame) -> Result<OutlierPartition> {
        info!(
            "Filtering outliers in '{}' (IQR multiplier {})...",
            self.column, self.multiplier
        );
        let bounds = self.bounds(df)?;
        let (kept, excluded_count) = self.filter_within(df, bounds.lower, bounds.upper)?;

        info!(
            "Kept {} rows, excluded {} outliers",
            kept.height(),
            excluded_count
        );
        Ok(OutlierPartition {
            bounds,
            kept,
            excluded_count,
        })
    }

    /// Keep rows whose value lies in `[lower, upper]`; nulls are excluded.
    ///
    /// Returns the kept rows and the number of rows dropped.
    pub fn filter_within(
        &self,
        df: &DataFrame,
        lower: f64,
        upper: f64,
    ) -> Result<(DataFrame, usize)> {
        let values = series_to_f64(self.series(df)?)?;
        let mask_values: Vec<bool> = values
            .into_iter()
            .map(|opt| opt.is_some_and(|v| v >= lower && v <= upper))
            .collect();

        let mask = BooleanChunked::from_slice("mask".into(), &mask_values);
        let kept = df.filter(&mask)?;
        let excluded = df.height() - kept.height();
        Ok((kept, excluded))
    }

    fn series<'a>(&self, df: &'a DataFrame) -> Result<&'a Series> {
        df.column(&self.column)
            .map(|col| col.as_materialized_series())
            .map_err(|_| EdaError::ColumnNotFound(self.column.clone()))
    }
}
