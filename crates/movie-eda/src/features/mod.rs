//! Feature derivation.
//!
//! Adds calendar parts, genre counts and normalized popularity to a cleaned
//! table. Each feature is an independent column computation; all of them
//! assume the cleaner has already produced a `Date` release column.

use crate::cleaner::dates::date_values;
use crate::error::{EdaError, Result};
use crate::schema;
use crate::types::FeatureReport;
use crate::utils::series_to_f64;
use chrono::Datelike;
use polars::prelude::*;
use tracing::{debug, info, warn};

/// Derives feature columns from a cleaned table.
pub struct FeatureDeriver;

impl FeatureDeriver {
    /// Add `Year`, `Month`, `Genre_Count` and `Popularity_Norm`.
    pub fn derive(mut df: DataFrame) -> Result<(DataFrame, FeatureReport)> {
        info!("Deriving feature columns...");
        let mut report = FeatureReport::default();

        let release = column_series(&df, schema::RELEASE_DATE)?;
        let (year, month) = Self::derive_year_month(release)?;
        df.with_column(year)?;
        df.with_column(month)?;

        let genre = column_series(&df, schema::GENRE)?;
        let genre_count = Self::genre_count_series(genre)?;
        df.with_column(genre_count)?;

        let popularity = column_series(&df, schema::POPULARITY)?;
        let (norm, min, max) = Self::min_max_normalize(popularity, schema::POPULARITY_NORM)?;
        report.popularity_min = min;
        report.popularity_max = max;
        report.degenerate_popularity = matches!((min, max), (Some(lo), Some(hi)) if lo == hi);
        if report.degenerate_popularity {
            warn!(
                "Popularity has a single distinct value; {} set to 0.0",
                schema::POPULARITY_NORM
            );
        }
        df.with_column(norm)?;

        report.added_columns = schema::DERIVED_COLUMNS
            .iter()
            .map(|s| s.to_string())
            .collect();
        info!(
            "Added columns {:?}; table is now {} x {}",
            report.added_columns,
            df.height(),
            df.width()
        );

        Ok((df, report))
    }

    /// Year and month columns from a `Date` series.
    pub fn derive_year_month(dates: &Series) -> Result<(Series, Series)> {
        let values = date_values(dates)?;
        let years: Vec<Option<i32>> = values.iter().map(|d| d.map(|d| d.year())).collect();
        let months: Vec<Option<i32>> = values
            .iter()
            .map(|d| d.map(|d| d.month() as i32))
            .collect();

        Ok((
            Series::new(schema::YEAR.into(), years),
            Series::new(schema::MONTH.into(), months),
        ))
    }

    /// Number of comma-separated tokens per genre value.
    ///
    /// An empty or missing genre counts as one token, matching what splitting
    /// an empty string on commas yields.
    pub fn genre_count_series(genres: &Series) -> Result<Series> {
        let text = genres.cast(&DataType::String)?;
        let counts: Vec<i32> = text
            .str()?
            .into_iter()
            .map(|opt| genre_token_count(opt.unwrap_or("")))
            .collect();

        Ok(Series::new(schema::GENRE_COUNT.into(), counts))
    }

    /// Min-max normalize a numeric series into `[0, 1]` under `name`.
    ///
    /// Returns the normalized series with the observed minimum and maximum.
    /// When every value is equal the result is all `0.0`. Nulls stay null,
    /// and a series without any value yields all nulls and no range.
    pub fn min_max_normalize(
        series: &Series,
        name: &str,
    ) -> Result<(Series, Option<f64>, Option<f64>)> {
        let values = series_to_f64(series)?;
        let valid = values.iter().flatten().filter(|v| !v.is_nan());

        let (min, max) = valid.fold((None, None), |(lo, hi): (Option<f64>, Option<f64>), &v| {
            (
                Some(lo.map_or(v, |lo| lo.min(v))),
                Some(hi.map_or(v, |hi| hi.max(v))),
            )
        });

        let (Some(lo), Some(hi)) = (min, max) else {
            warn!("'{}' has no values to normalize", series.name());
            let empty: Vec<Option<f64>> = vec![None; values.len()];
            return Ok((Series::new(name.into(), empty), None, None));
        };

        let range = hi - lo;
        debug!("min-max for '{}': min={}, max={}", series.name(), lo, hi);

        let normalized: Vec<Option<f64>> = values
            .into_iter()
            .map(|opt| {
                opt.map(|v| if range > 0.0 { (v - lo) / range } else { 0.0 })
            })
            .collect();

        Ok((Series::new(name.into(), normalized), min, max))
    }
}

/// Count comma-separated tokens, where `""` counts as one.
pub(crate) fn genre_token_count(value: &str) -> i32 {
    value.split(',').count() as i32
}

fn column_series<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map(|col| col.as_materialized_series())
        .map_err(|_| EdaError::ColumnNotFound(name.to_string()))
}
