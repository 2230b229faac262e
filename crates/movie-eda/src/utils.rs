//! Shared utilities for the analysis pipeline.
//!
//! Helpers used across the cleaner, feature, statistics and outlier modules.

use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Names of all numeric columns, in table order.
pub fn numeric_column_names(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| is_numeric_dtype(col.dtype()))
        .map(|col| col.name().to_string())
        .collect()
}

// =============================================================================
// Series Value Utilities
// =============================================================================

/// Values of a numeric Series as `Option<f64>`, one per row.
pub fn series_to_f64(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    let float_series = series.cast(&DataType::Float64)?;
    Ok(float_series.f64()?.into_iter().collect())
}

/// Non-null, non-NaN values of a numeric Series.
pub fn valid_f64_values(series: &Series) -> PolarsResult<Vec<f64>> {
    Ok(series_to_f64(series)?
        .into_iter()
        .flatten()
        .filter(|v| !v.is_nan())
        .collect())
}

/// Fill null values in a string Series with a specific value.
///
/// Returns the filled Series and the number of values replaced.
pub fn fill_string_nulls(series: &Series, fill_value: &str) -> PolarsResult<(Series, usize)> {
    let str_series = series.str()?;
    let mut filled = 0;
    let values: Vec<String> = str_series
        .into_iter()
        .map(|opt| match opt {
            Some(val) => val.to_string(),
            None => {
                filled += 1;
                fill_value.to_string()
            }
        })
        .collect();

    Ok((Series::new(series.name().clone(), values), filled))
}

// =============================================================================
// Quantiles
// =============================================================================

/// Linear-interpolation quantile of an ascending-sorted slice.
///
/// Uses position `(n - 1) * q`, interpolating between the neighbouring
/// order statistics. Returns `None` for an empty slice.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }

    let q = q.clamp(0.0, 1.0);
    let pos = (sorted.len() - 1) as f64 * q;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let fraction = pos - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Sort values ascending, treating incomparable values as equal.
pub fn sorted_values(mut values: Vec<f64>) -> Vec<f64> {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    values
}

// =============================================================================
// Tests
// =============================================================================
