//! Descriptive statistics and extremal-row queries.
//!
//! Everything here reads the table; nothing mutates it.

use crate::error::{EdaError, Result};
use crate::schema;
use crate::types::{ColumnStatistics, StatsReport, TopVotedMovie};
use crate::utils::{numeric_column_names, quantile_sorted, sorted_values, valid_f64_values};
use polars::prelude::*;
use tracing::{debug, info};

/// Computes read-only summaries of a table.
pub struct StatsReporter;

impl StatsReporter {
    /// Full statistics report for a table with derived features.
    ///
    /// `numeric` covers every numeric column except `Year`, `Month` and
    /// `Genre_Count`, which are summarized separately in `features`.
    pub fn report(df: &DataFrame) -> Result<StatsReport> {
        info!("Computing descriptive statistics...");

        let numeric_cols: Vec<String> = numeric_column_names(df)
            .into_iter()
            .filter(|name| !schema::FEATURE_STAT_COLUMNS.contains(&name.as_str()))
            .collect();
        let numeric = Self::describe(df, &numeric_cols)?;

        let feature_cols: Vec<String> = schema::FEATURE_STAT_COLUMNS
            .iter()
            .filter(|name| df.column(name).is_ok())
            .map(|name| name.to_string())
            .collect();
        let features = Self::describe(df, &feature_cols)?;

        let top_voted = Self::top_voted(df)?;
        for movie in &top_voted {
            info!(
                "Most voted: '{}' ({} votes, average {:?})",
                movie.title, movie.vote_count, movie.vote_average
            );
        }

        Ok(StatsReport {
            numeric,
            features,
            top_voted,
        })
    }

    /// Describe the given columns: count, mean, std, min, quartiles, max.
    pub fn describe<S: AsRef<str>>(df: &DataFrame, columns: &[S]) -> Result<Vec<ColumnStatistics>> {
        columns
            .iter()
            .map(|name| {
                let name = name.as_ref();
                let col = df
                    .column(name)
                    .map_err(|_| EdaError::ColumnNotFound(name.to_string()))?;
                Self::describe_series(col.as_materialized_series())
            })
            .collect()
    }

    /// Describe one numeric series, ignoring nulls.
    ///
    /// Standard deviation is the sample deviation (n - 1); quartiles use
    /// linear interpolation.
    pub fn describe_series(series: &Series) -> Result<ColumnStatistics> {
        let values = sorted_values(valid_f64_values(series)?);
        let count = values.len();
        debug!("Describing '{}' over {} values", series.name(), count);

        let mean = (count > 0).then(|| values.iter().sum::<f64>() / count as f64);
        let std = match (mean, count) {
            (Some(mean), n) if n > 1 => {
                let variance =
                    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
                Some(variance.sqrt())
            }
            _ => None,
        };

        Ok(ColumnStatistics {
            column: series.name().to_string(),
            count,
            mean,
            std,
            min: values.first().copied(),
            q25: quantile_sorted(&values, 0.25),
            median: quantile_sorted(&values, 0.5),
            q75: quantile_sorted(&values, 0.75),
            max: values.last().copied(),
        })
    }

    /// Rows sharing the maximum vote count, in table order.
    pub fn top_voted(df: &DataFrame) -> Result<Vec<TopVotedMovie>> {
        let column = |name: &str| {
            df.column(name)
                .map(|col| col.as_materialized_series())
                .map_err(|_| EdaError::ColumnNotFound(name.to_string()))
        };

        let votes = column(schema::VOTE_COUNT)?.cast(&DataType::Int64)?;
        let votes = votes.i64()?;
        let Some(max_votes) = votes.max() else {
            return Ok(Vec::new());
        };

        let titles = column(schema::TITLE)?.cast(&DataType::String)?;
        let titles = titles.str()?;
        let averages = column(schema::VOTE_AVERAGE)?.cast(&DataType::Float64)?;
        let averages = averages.f64()?;

        let movies = votes
            .into_iter()
            .enumerate()
            .filter(|(_, v)| *v == Some(max_votes))
            .map(|(idx, _)| TopVotedMovie {
                title: titles.get(idx).unwrap_or_default().to_string(),
                vote_count: max_votes,
                vote_average: averages.get(idx),
            })
            .collect();

        Ok(movies)
    }
}

/// Render statistics as a fixed-width text table, one row per column.
pub fn describe_table(stats: &[ColumnStatistics]) -> String {
    fn cell(value: Option<f64>) -> String {
        value.map_or_else(|| "-".to_string(), |v| format!("{:.3}", v))
    }

    let mut out = format!(
        "{:<18} {:>8} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12}\n",
        "column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
    );
    out.push_str(&"-".repeat(18 + 9 + 13 * 7));
    out.push('\n');

    for s in stats {
        out.push_str(&format!(
            "{:<18} {:>8} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12}\n",
            s.column,
            s.count,
            cell(s.mean),
            cell(s.std),
            cell(s.min),
            cell(s.q25),
            cell(s.median),
            cell(s.q75),
            cell(s.max)
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_series_basic() {
        let series = Series::new("v".into(), &[1.0, 2.0, 3.0, 4.0, 5.0]);
        let stats = StatsReporter::describe_series(&series).unwrap();

        assert_eq!(stats.count, 5);
        assert_eq!(stats.mean, Some(3.0));
        assert!((stats.std.unwrap() - 2.5f64.sqrt()).abs() < 1e-12);
        assert_eq!(stats.min, Some(1.0));
        assert_eq!(stats.q25, Some(2.0));
        assert_eq!(stats.median, Some(3.0));
        assert_eq!(stats.q75, Some(4.0));
        assert_eq!(stats.max, Some(5.0));
    }

    #[test]
    fn test_describe_series_ignores_nulls() {
        let series = Series::new("v".into(), &[Some(4.0), None, Some(2.0)]);
        let stats = StatsReporter::describe_series(&series).unwrap();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.mean, Some(3.0));
        assert_eq!(stats.median, Some(3.0));
    }

    #[test]
    fn test_describe_series_single_and_empty() {
        let single = Series::new("v".into(), &[7i64]);
        let stats = StatsReporter::describe_series(&single).unwrap();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.std, None);
        assert_eq!(stats.q25, Some(7.0));

        let empty = Series::new("v".into(), &[None::<f64>]);
        let stats = StatsReporter::describe_series(&empty).unwrap();
        assert_eq!(stats.count, 0);
        assert_eq!(stats.mean, None);
        assert_eq!(stats.max, None);
    }

    #[test]
    fn test_describe_unknown_column() {
        let df = df!["a" => [1.0]].unwrap();
        let result = StatsReporter::describe(&df, &["missing"]);
        assert!(matches!(result, Err(EdaError::ColumnNotFound(_))));
    }

    #[test]
    fn test_top_voted_unique() {
        let df = df![
            schema::TITLE => ["Spider-Man: No Way Home", "Inception", "Avatar"],
            schema::VOTE_COUNT => [8940i64, 31077, 27000],
            schema::VOTE_AVERAGE => [8.3, 8.4, 7.5],
        ]
        .unwrap();

        let top = StatsReporter::top_voted(&df).unwrap();
        assert_eq!(
            top,
            vec![TopVotedMovie {
                title: "Inception".to_string(),
                vote_count: 31077,
                vote_average: Some(8.4),
            }]
        );
    }

    #[test]
    fn test_top_voted_includes_ties() {
        let df = df![
            schema::TITLE => ["A", "B", "C"],
            schema::VOTE_COUNT => [10i64, 5, 10],
            schema::VOTE_AVERAGE => [6.0, 7.0, 8.0],
        ]
        .unwrap();

        let titles: Vec<String> = StatsReporter::top_voted(&df)
            .unwrap()
            .into_iter()
            .map(|m| m.title)
            .collect();
        assert_eq!(titles, vec!["A", "C"]);
    }

    #[test]
    fn test_report_splits_feature_columns() {
        let df = df![
            schema::TITLE => ["A", "B"],
            schema::POPULARITY => [1.0, 2.0],
            schema::VOTE_COUNT => [10i64, 20],
            schema::VOTE_AVERAGE => [6.0, 7.0],
            schema::YEAR => [2020, 2021],
            schema::MONTH => [1, 12],
            schema::GENRE_COUNT => [1, 3],
        ]
        .unwrap();

        let report = StatsReporter::report(&df).unwrap();
        let numeric: Vec<&str> = report.numeric.iter().map(|s| s.column.as_str()).collect();
        let features: Vec<&str> = report.features.iter().map(|s| s.column.as_str()).collect();

        assert_eq!(numeric, vec!["Popularity", "Vote_Count", "Vote_Average"]);
        assert_eq!(features, vec!["Year", "Month", "Genre_Count"]);
        assert_eq!(report.top_voted.len(), 1);
    }

    #[test]
    fn test_describe_table_renders_rows() {
        let series = Series::new("Popularity".into(), &[1.0, 2.0]);
        let stats = StatsReporter::describe_series(&series).unwrap();
        let table = describe_table(&[stats]);

        assert!(table.starts_with("column"));
        assert!(table.contains("Popularity"));
        assert!(table.contains("1.500"));
    }
}
