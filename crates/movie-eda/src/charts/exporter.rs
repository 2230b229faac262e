use super::{ChartInputs, ChartRenderer};
use crate::error::{EdaError, Result, ResultExt};
use crate::reporting::prepare_parent_dir;
use crate::schema;
use crate::types::GenreFrequency;
use crate::utils::{series_to_f64, sorted_values, valid_f64_values};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File name written by [`ChartDataExporter`].
pub const CHART_DATA_FILE: &str = "chart_data.json";

/// One histogram bin, `[lower, upper)` except the last which includes `upper`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Number of releases in one month or year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodCount {
    pub period: i32,
    pub count: usize,
}

/// Aggregates behind the six EDA charts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChartData {
    pub genre_frequencies: Vec<GenreFrequency>,
    /// Months 1 through 12, zero counts included.
    pub releases_by_month: Vec<PeriodCount>,
    /// Years that have at least one release, ascending.
    pub releases_by_year: Vec<PeriodCount>,
    pub popularity_histogram: Vec<HistogramBin>,
    pub vote_average_histogram: Vec<HistogramBin>,
    /// `[popularity, vote_average]` pairs with both values present.
    pub popularity_vs_vote_average: Vec<[f64; 2]>,
}

impl ChartData {
    /// Compute every chart aggregate.
    ///
    /// Calendar counts come from the full table; distributions use the
    /// outlier-filtered one.
    pub fn from_inputs(inputs: &ChartInputs<'_>, bins: usize) -> Result<Self> {
        let months = int_values(inputs.full, schema::MONTH)?;
        let mut releases_by_month: Vec<PeriodCount> = (1..=12)
            .map(|period| PeriodCount { period, count: 0 })
            .collect();
        for month in months.into_iter().flatten() {
            if let Some(slot) = usize::try_from(month - 1)
                .ok()
                .and_then(|idx| releases_by_month.get_mut(idx))
            {
                slot.count += 1;
            }
        }

        let mut by_year: BTreeMap<i32, usize> = BTreeMap::new();
        for year in int_values(inputs.full, schema::YEAR)?.into_iter().flatten() {
            *by_year.entry(year).or_insert(0) += 1;
        }
        let releases_by_year = by_year
            .into_iter()
            .map(|(period, count)| PeriodCount { period, count })
            .collect();

        let popularity = column(inputs.filtered, schema::POPULARITY)?;
        let vote_average = column(inputs.filtered, schema::VOTE_AVERAGE)?;

        let popularity_vs_vote_average = series_to_f64(popularity)?
            .into_iter()
            .zip(series_to_f64(vote_average)?)
            .filter_map(|pair| match pair {
                (Some(p), Some(v)) => Some([p, v]),
                _ => None,
            })
            .collect();

        Ok(Self {
            genre_frequencies: inputs.genre_frequencies.to_vec(),
            releases_by_month,
            releases_by_year,
            popularity_histogram: histogram(&valid_f64_values(popularity)?, bins),
            vote_average_histogram: histogram(&valid_f64_values(vote_average)?, bins),
            popularity_vs_vote_average,
        })
    }
}

/// Equal-width histogram over the value range.
///
/// An empty input yields no bins; a constant input yields a single bin.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let sorted = sorted_values(values.to_vec());
    let (Some(&min), Some(&max)) = (sorted.first(), sorted.last()) else {
        return Vec::new();
    };
    if bins == 0 {
        return Vec::new();
    }
    if min == max {
        return vec![HistogramBin {
            lower: min,
            upper: max,
            count: sorted.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut result: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: min + width * i as f64,
            upper: if i + 1 == bins {
                max
            } else {
                min + width * (i + 1) as f64
            },
            count: 0,
        })
        .collect();

    for value in sorted {
        let idx = (((value - min) / width) as usize).min(bins - 1);
        result[idx].count += 1;
    }
    result
}

/// Writes [`ChartData`] as `chart_data.json` into an output directory.
#[derive(Debug, Clone)]
pub struct ChartDataExporter {
    output_dir: PathBuf,
    bins: usize,
    create_dirs: bool,
}

impl ChartDataExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            bins: 20,
            create_dirs: true,
        }
    }

    pub fn bins(mut self, bins: usize) -> Self {
        self.bins = bins;
        self
    }

    pub fn create_dirs(mut self, create: bool) -> Self {
        self.create_dirs = create;
        self
    }
}

impl ChartRenderer for ChartDataExporter {
    fn name(&self) -> &str {
        "chart-data-json"
    }

    fn render(&self, inputs: &ChartInputs<'_>) -> Result<Vec<PathBuf>> {
        let data = ChartData::from_inputs(inputs, self.bins)?;
        debug!(
            "Chart data: {} genres, {} years, {} scatter points",
            data.genre_frequencies.len(),
            data.releases_by_year.len(),
            data.popularity_vs_vote_average.len()
        );

        let path = self.output_dir.join(CHART_DATA_FILE);
        prepare_parent_dir(&path, self.create_dirs)?;
        write_json(&path, &data)?;

        info!("Chart data saved: {}", path.display());
        Ok(vec![path])
    }
}

/// Write `data` as pretty JSON, surfacing errors from the final flush.
fn write_json(path: &Path, data: &ChartData) -> Result<()> {
    let mut writer = BufWriter::new(
        File::create(path).context(format!("Failed to create {}", path.display()))?,
    );
    serde_json::to_writer_pretty(&mut writer, data)?;
    writer
        .flush()
        .context(format!("Failed to write {}", path.display()))
}

fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map(|col| col.as_materialized_series())
        .map_err(|_| EdaError::ColumnNotFound(name.to_string()))
}

fn int_values(df: &DataFrame, name: &str) -> Result<Vec<Option<i32>>> {
    let series = column(df, name)?.cast(&DataType::Int32)?;
    Ok(series.i32()?.into_iter().collect())
}
