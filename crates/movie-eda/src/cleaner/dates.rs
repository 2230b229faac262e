//! Release-date parsing.
//!
//! Dates are stored as polars `Date` (days since the Unix epoch). A value that
//! cannot be parsed becomes null, which is the "not a date" marker the cleaner
//! later drops.

use crate::error::Result;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use polars::prelude::*;

/// `NaiveDate::num_days_from_ce` of 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y", "%m/%d/%Y"];

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parse a single date string, returning `None` when no known format matches.
pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
                .map(|dt| dt.date())
        })
}

pub(crate) fn days_since_epoch(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

pub(crate) fn date_from_days(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days + UNIX_EPOCH_DAYS_FROM_CE)
}

/// Convert a column into a polars `Date` column.
///
/// String values are parsed with [`parse_date`]; `Date` columns pass through
/// and `Datetime` columns are truncated to their date. Any other dtype is
/// rendered as text first. Unparseable values become null.
pub(crate) fn to_date_series(series: &Series) -> Result<Series> {
    match series.dtype() {
        DataType::Date => Ok(series.clone()),
        DataType::Datetime(_, _) => Ok(series.cast(&DataType::Date)?),
        DataType::String => parse_string_dates(series),
        _ => {
            let as_text = series.cast(&DataType::String)?;
            parse_string_dates(&as_text)
        }
    }
}

fn parse_string_dates(series: &Series) -> Result<Series> {
    let str_series = series.str()?;
    let days: Vec<Option<i32>> = str_series
        .into_iter()
        .map(|opt| opt.and_then(parse_date).map(days_since_epoch))
        .collect();

    Ok(Series::new(series.name().clone(), days).cast(&DataType::Date)?)
}

/// Calendar dates of a `Date` column, one per row.
pub(crate) fn date_values(series: &Series) -> Result<Vec<Option<NaiveDate>>> {
    let days = series.cast(&DataType::Int32)?;
    Ok(days
        .i32()?
        .into_iter()
        .map(|opt| opt.and_then(date_from_days))
        .collect())
}
