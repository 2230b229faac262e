//! Chart boundary.
//!
//! The pipeline does not draw charts itself. It prepares [`ChartInputs`] and
//! hands them to a [`ChartRenderer`]; the bundled [`ChartDataExporter`]
//! writes the aggregates each chart needs as JSON so any plotting tool can
//! render them.
//!
//! Charts and their sources:
//! - genre frequency bar chart (full table)
//! - popularity histogram (outlier-filtered table)
//! - vote average histogram (outlier-filtered table)
//! - releases by month and by year (full table)
//! - popularity vs. vote average scatter (outlier-filtered table)

mod exporter;

pub use exporter::{ChartData, ChartDataExporter, CHART_DATA_FILE, HistogramBin, PeriodCount};

use crate::error::{EdaError, Result};
use crate::schema;
use crate::types::GenreFrequency;
use polars::prelude::*;
use std::collections::HashMap;
use std::path::PathBuf;

/// Tables and precomputed aggregates handed to a renderer.
#[derive(Debug, Clone, Copy)]
pub struct ChartInputs<'a> {
    /// Cleaned table with derived features.
    pub full: &'a DataFrame,
    /// Full table restricted to popularity inliers.
    pub filtered: &'a DataFrame,
    pub genre_frequencies: &'a [GenreFrequency],
}

/// Something that turns chart inputs into artifacts.
///
/// Implementations return the paths of the files they produced.
pub trait ChartRenderer: Send + Sync {
    fn name(&self) -> &str;

    fn render(&self, inputs: &ChartInputs<'_>) -> Result<Vec<PathBuf>>;
}

/// Count genre tokens across the table.
///
/// Each `Genre` value is split on commas and trimmed; empty tokens are
/// skipped. The result is sorted by count descending, then genre name.
pub fn genre_frequencies(df: &DataFrame) -> Result<Vec<GenreFrequency>> {
    let genres = df
        .column(schema::GENRE)
        .map_err(|_| EdaError::ColumnNotFound(schema::GENRE.to_string()))?
        .as_materialized_series()
        .cast(&DataType::String)?;

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in genres.str()?.into_iter().flatten() {
        for token in value.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            *counts.entry(token).or_insert(0) += 1;
        }
    }

    let mut frequencies: Vec<GenreFrequency> = counts
        .into_iter()
        .map(|(genre, count)| GenreFrequency {
            genre: genre.to_string(),
            count,
        })
        .collect();
    frequencies.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.genre.cmp(&b.genre)));

    Ok(frequencies)
}
