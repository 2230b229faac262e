//! Data cleaning for the movie table.
//!
//! This module provides functionality for:
//! - Auditing missing values per column
//! - Filling optional text columns with a placeholder
//! - Parsing release dates and dropping rows without a valid date
//! - Removing duplicate rows (first occurrence kept, order preserved)
//! - Coercing numeric columns to their declared types

mod converters;
pub(crate) mod dates;

use crate::config::EdaConfig;
use crate::error::{EdaError, Result, ResultExt};
use crate::schema;
use crate::types::{CleaningReport, NullCount, PlaceholderFill};
use crate::utils::fill_string_nulls;
use polars::prelude::*;
use tracing::{debug, info};

/// Data cleaner for the movie table.
#[derive(Debug, Clone)]
pub struct DataCleaner {
    placeholder: String,
    optional_text_columns: Vec<String>,
}

impl Default for DataCleaner {
    fn default() -> Self {
        Self::from_config(&EdaConfig::default())
    }
}

impl DataCleaner {
    pub fn new(placeholder: impl Into<String>, optional_text_columns: Vec<String>) -> Self {
        Self {
            placeholder: placeholder.into(),
            optional_text_columns,
        }
    }

    pub fn from_config(config: &EdaConfig) -> Self {
        Self::new(
            config.placeholder.clone(),
            config.optional_text_columns.clone(),
        )
    }

    /// Run every cleaning step in order.
    ///
    /// 1. Null audit (before any mutation)
    /// 2. Placeholder fill for optional text columns
    /// 3. Release-date parsing and removal of rows without a valid date
    /// 4. Duplicate removal
    /// 5. Type coercion of the numeric columns
    pub fn clean(&self, df: DataFrame) -> Result<(DataFrame, CleaningReport)> {
        let mut report = CleaningReport {
            rows_before: df.height(),
            ..Default::default()
        };

        info!("Performing data cleaning...");

        // 1. Null audit
        report.null_audit = Self::null_audit(&df);
        let total_nulls = report.total_nulls();
        if total_nulls > 0 {
            report
                .actions
                .push(format!("Found {} missing values", total_nulls));
        } else {
            report.actions.push("No missing values found".to_string());
        }
        for entry in report.null_audit.iter().filter(|n| n.null_count > 0) {
            debug!("  {}: {} missing", entry.column, entry.null_count);
        }

        // 2. Placeholder fill
        let mut df = df;
        report.placeholders_filled = self.fill_optional_text(&mut df)?;
        for fill in report.placeholders_filled.iter().filter(|f| f.filled > 0) {
            report.actions.push(format!(
                "Filled {} missing '{}' values with \"{}\"",
                fill.filled, fill.column, self.placeholder
            ));
        }

        // 3. Release dates
        let (df, invalid_dates) =
            Self::normalize_release_dates(df).context("Normalizing release dates")?;
        report.invalid_dates = invalid_dates;
        report.rows_after_date_drop = df.height();
        if invalid_dates > 0 {
            report.actions.push(format!(
                "Dropped {} rows with missing or invalid release dates",
                invalid_dates
            ));
        }
        info!(
            "Dropped {} rows with invalid dates; {} rows remain",
            invalid_dates,
            df.height()
        );

        // 4. Duplicates
        let (mut df, duplicates_removed) = Self::remove_duplicates(df)?;
        report.duplicates_removed = duplicates_removed;
        if duplicates_removed > 0 {
            let pct = (duplicates_removed as f64 / report.rows_after_date_drop as f64) * 100.0;
            report.actions.push(format!(
                "Removed {} duplicate rows ({:.1}%)",
                duplicates_removed, pct
            ));
            info!(
                "Removed {} duplicate rows; {} rows remain",
                duplicates_removed,
                df.height()
            );
        } else {
            report.actions.push("No duplicate rows found".to_string());
            debug!("No duplicate rows found");
        }

        // 5. Coercion
        report.coercions = Self::coerce_types(&mut df)?;
        report
            .actions
            .push(format!("Coerced types: {}", report.coercions.join(", ")));

        report.rows_after = df.height();
        info!(
            "Cleaning complete: {} -> {} rows",
            report.rows_before, report.rows_after
        );

        Ok((df, report))
    }

    /// Count missing values in every column.
    pub fn null_audit(df: &DataFrame) -> Vec<NullCount> {
        df.get_columns()
            .iter()
            .map(|col| NullCount {
                column: col.name().to_string(),
                null_count: col.null_count(),
            })
            .collect()
    }

    /// Replace missing values in the optional text columns with the placeholder.
    ///
    /// Columns that are absent or have no missing values are left untouched.
    pub fn fill_optional_text(&self, df: &mut DataFrame) -> Result<Vec<PlaceholderFill>> {
        let mut fills = Vec::with_capacity(self.optional_text_columns.len());

        for col_name in &self.optional_text_columns {
            let Ok(col) = df.column(col_name) else {
                debug!("Optional text column '{}' not present, skipping", col_name);
                continue;
            };

            if col.null_count() == 0 {
                fills.push(PlaceholderFill {
                    column: col_name.clone(),
                    filled: 0,
                });
                continue;
            }

            let text = col.as_materialized_series().cast(&DataType::String)?;
            let (filled_series, filled) = fill_string_nulls(&text, &self.placeholder)?;
            df.replace(col_name, filled_series)?;

            debug!("Filled {} missing values in '{}'", filled, col_name);
            fills.push(PlaceholderFill {
                column: col_name.clone(),
                filled,
            });
        }

        Ok(fills)
    }

    /// Parse the release-date column into dates and drop rows without one.
    ///
    /// Returns the filtered table and the number of rows dropped.
    pub fn normalize_release_dates(mut df: DataFrame) -> Result<(DataFrame, usize)> {
        let col = df
            .column(schema::RELEASE_DATE)
            .map_err(|_| EdaError::ColumnNotFound(schema::RELEASE_DATE.to_string()))?;

        let dates = dates::to_date_series(col.as_materialized_series())?;
        let invalid = dates.null_count();
        let mask = dates.is_not_null();

        df.replace(schema::RELEASE_DATE, dates)?;

        if invalid == 0 {
            return Ok((df, 0));
        }

        let df = df.filter(&mask)?;
        Ok((df, invalid))
    }

    /// Number of rows that repeat an earlier row across all columns.
    pub fn duplicate_count(df: &DataFrame) -> Result<usize> {
        Ok(df.height() - Self::first_occurrences(df)?.height())
    }

    /// Remove full-row duplicates, keeping the first occurrence in order.
    pub fn remove_duplicates(df: DataFrame) -> Result<(DataFrame, usize)> {
        let duplicates = Self::duplicate_count(&df)?;
        if duplicates == 0 {
            return Ok((df, 0));
        }
        Ok((Self::first_occurrences(&df)?, duplicates))
    }

    fn first_occurrences(df: &DataFrame) -> Result<DataFrame> {
        Ok(df
            .clone()
            .lazy()
            .unique_stable(None, UniqueKeepStrategy::First)
            .collect()?)
    }

    /// Cast vote count, vote average and popularity to their declared types.
    ///
    /// Fails with [`EdaError::TypeConversionFailed`] on values that cannot be
    /// represented and on missing vote counts or averages. Vote counts must
    /// also be non-negative and vote averages finite. Popularity may hold
    /// nulls; the outlier filter drops those rows.
    pub fn coerce_types(df: &mut DataFrame) -> Result<Vec<String>> {
        let mut coercions = Vec::with_capacity(schema::COERCED_COLUMNS.len());

        for (col_name, target) in schema::COERCED_COLUMNS.iter() {
            let col = df
                .column(col_name)
                .map_err(|_| EdaError::ColumnNotFound(col_name.to_string()))?;
            let series = col.as_materialized_series();
            let from = format!("{:?}", series.dtype());

            let coerced = converters::coerce_series(series, target)?;
            match *col_name {
                schema::VOTE_COUNT => {
                    converters::ensure_no_nulls(&coerced, target)?;
                    converters::ensure_non_negative(&coerced)?;
                }
                schema::VOTE_AVERAGE => {
                    converters::ensure_no_nulls(&coerced, target)?;
                    converters::ensure_finite(&coerced)?;
                }
                _ => {}
            }

            df.replace(col_name, coerced)?;
            debug!("Coerced '{}' from {} to {:?}", col_name, from, target);
            coercions.push(format!("{} -> {:?}", col_name, target));
        }

        Ok(coercions)
    }
}
