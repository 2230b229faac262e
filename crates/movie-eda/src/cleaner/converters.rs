//! Explicit type coercion for declared numeric columns.

use crate::error::{EdaError, Result};
use crate::utils::series_to_f64;
use polars::prelude::*;
use tracing::debug;

/// Strictly cast `series` to `target`.
///
/// Fails when a non-null value has no representation in the target type
/// instead of silently turning it into null.
pub(crate) fn coerce_series(series: &Series, target: &DataType) -> Result<Series> {
    if series.dtype() == target {
        return Ok(series.clone());
    }

    series
        .strict_cast(target)
        .map_err(|e| EdaError::TypeConversionFailed {
            column: series.name().to_string(),
            target_type: format!("{:?}", target),
            reason: e.to_string(),
        })
}

/// Reject missing values in a column that must be fully populated.
pub(crate) fn ensure_no_nulls(series: &Series, target: &DataType) -> Result<()> {
    let missing = series.null_count();
    if missing > 0 {
        return Err(EdaError::TypeConversionFailed {
            column: series.name().to_string(),
            target_type: format!("{:?}", target),
            reason: format!("{} missing value(s)", missing),
        });
    }
    Ok(())
}

/// Reject negative values in a count column.
pub(crate) fn ensure_non_negative(series: &Series) -> Result<()> {
    let negatives = series_to_f64(series)?
        .into_iter()
        .flatten()
        .filter(|v| *v < 0.0)
        .count();

    if negatives > 0 {
        return Err(EdaError::TypeConversionFailed {
            column: series.name().to_string(),
            target_type: "non-negative integer".to_string(),
            reason: format!("{} negative value(s)", negatives),
        });
    }
    Ok(())
}

/// Reject NaN or infinite values in a float column.
pub(crate) fn ensure_finite(series: &Series) -> Result<()> {
    let non_finite = series_to_f64(series)?
        .into_iter()
        .flatten()
        .filter(|v| !v.is_finite())
        .count();

    if non_finite > 0 {
        return Err(EdaError::TypeConversionFailed {
            column: series.name().to_string(),
            target_type: "finite float".to_string(),
            reason: format!("{} NaN or infinite value(s)", non_finite),
        });
    }
    debug!("'{}' holds only finite values", series.name());
    Ok(())
}
