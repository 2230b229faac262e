//! Integration tests for the movie analysis pipeline.
//!
//! These tests run the full pipeline against a small movie export and check
//! the cleaned table, derived features, statistics and written files.

use movie_eda::charts::CHART_DATA_FILE;
use movie_eda::schema;
use movie_eda::{
    ChartData, ChartDataExporter, DataCleaner, EdaConfig, EdaError, EdaPipeline, EdaReport,
    EdaResult, EdaStage, OutlierFilter, ReportWriter, TableLoader,
};
use polars::prelude::*;
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

// ============================================================================
// Helper Functions
// ============================================================================

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/movies_sample.csv")
}

fn config_for(output_dir: &std::path::Path) -> EdaConfig {
    EdaConfig::builder()
        .input_path(fixture_path())
        .output_dir(output_dir)
        .build()
        .unwrap()
}

fn run_in_memory() -> EdaResult {
    let config = EdaConfig::builder()
        .input_path(fixture_path())
        .save_to_disk(false)
        .build()
        .unwrap();

    EdaPipeline::builder()
        .config(config)
        .build()
        .unwrap()
        .run()
        .unwrap()
}

fn row_index(df: &DataFrame, title: &str) -> Option<usize> {
    df.column(schema::TITLE)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .position(|t| t == Some(title))
}

fn titles(df: &DataFrame) -> Vec<String> {
    df.column(schema::TITLE)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .map(|t| t.unwrap_or_default().to_string())
        .collect()
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_loader_reads_fixture() {
    let df = TableLoader::default().load(fixture_path()).unwrap();

    assert_eq!(df.height(), 20);
    assert_eq!(df.width(), 9);
    assert_eq!(df.column(schema::RELEASE_DATE).unwrap().null_count(), 1);
}

#[test]
fn test_loader_missing_file() {
    let result = TableLoader::default().load("tests/fixtures/does_not_exist.csv");
    assert!(matches!(result, Err(EdaError::InputNotFound(_))));
}

// ============================================================================
// Cleaning
// ============================================================================

#[test]
fn test_cleaning_counts() {
    let result = run_in_memory();
    let cleaning = &result.cleaning;

    assert_eq!(cleaning.rows_before, 20);
    assert_eq!(cleaning.invalid_dates, 2);
    assert_eq!(cleaning.rows_after_date_drop, 18);
    assert_eq!(cleaning.duplicates_removed, 1);
    assert_eq!(cleaning.rows_after, 17);
    assert_eq!(cleaning.total_nulls(), 5);

    let overview_nulls = cleaning
        .null_audit
        .iter()
        .find(|n| n.column == schema::OVERVIEW)
        .map(|n| n.null_count);
    assert_eq!(overview_nulls, Some(2));
}

#[test]
fn test_missing_vote_count_fails_cleaning() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("gappy.csv");
    std::fs::write(
        &path,
        "Release_Date,Title,Overview,Popularity,Vote_Count,Vote_Average,Original_Language,Genre,Poster_Url\n\
         2010-07-15,Inception,Dreams,80.961,31077,8.4,en,Action,http://x/1.jpg\n\
         2009-12-15,Avatar,Pandora,79.019,,7.5,en,Action,http://x/2.jpg\n",
    )
    .unwrap();

    let config = EdaConfig::builder()
        .input_path(&path)
        .save_to_disk(false)
        .build()
        .unwrap();
    let error = EdaPipeline::builder()
        .config(config)
        .build()
        .unwrap()
        .run()
        .unwrap_err();

    assert_eq!(error.error_code(), "TYPE_CONVERSION_FAILED");
    assert!(error.to_string().contains(schema::VOTE_COUNT));
}

#[test]
fn test_all_invalid_dates_yield_empty_result() {
    let temp = TempDir::new().unwrap();
    let config = EdaConfig::builder()
        .input_path(
            PathBuf::from(env!("CARGO_MANIFEST_DIR"))
                .join("tests/fixtures/movies_invalid_dates.csv"),
        )
        .output_dir(temp.path())
        .build()
        .unwrap();

    let result = EdaPipeline::builder()
        .chart_renderer(Arc::new(ChartDataExporter::new(temp.path())))
        .config(config)
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(result.cleaning.rows_before, 3);
    assert_eq!(result.cleaning.invalid_dates, 3);
    assert_eq!(result.cleaned.height(), 0);
    assert_eq!(result.cleaned.width(), 13);
    assert_eq!(result.filtered.height(), 0);
    assert!(result.stats.top_voted.is_empty());
    assert!(result.genre_frequencies.is_empty());
    assert_eq!(result.outliers.bounds, None);
    assert_eq!(result.outliers.rows_kept, 0);
    assert!(
        result
            .summary
            .warnings
            .iter()
            .any(|w| w == "No rows remain after cleaning")
    );
    assert!(result.output_path.unwrap().is_file());
    assert!(temp.path().join(CHART_DATA_FILE).is_file());
}

#[test]
fn test_header_only_input_yields_empty_result() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("empty.csv");
    std::fs::write(
        &path,
        "Release_Date,Title,Overview,Popularity,Vote_Count,Vote_Average,Original_Language,Genre,Poster_Url\n",
    )
    .unwrap();

    let config = EdaConfig::builder()
        .input_path(&path)
        .save_to_disk(false)
        .build()
        .unwrap();
    let result = EdaPipeline::builder()
        .config(config)
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(result.cleaned.height(), 0);
    assert_eq!(result.outliers.rows_excluded, 0);
    assert_eq!(result.features.popularity_min, None);
}

#[test]
fn test_cleaned_table_invariants() {
    let result = run_in_memory();
    let df = &result.cleaned;

    let release = df.column(schema::RELEASE_DATE).unwrap();
    assert_eq!(release.dtype(), &DataType::Date);
    assert_eq!(release.null_count(), 0);

    assert_eq!(df.column(schema::VOTE_COUNT).unwrap().dtype(), &DataType::Int64);
    assert_eq!(
        df.column(schema::VOTE_AVERAGE).unwrap().dtype(),
        &DataType::Float64
    );
    assert_eq!(df.column(schema::OVERVIEW).unwrap().null_count(), 0);
    assert_eq!(df.column(schema::POSTER_URL).unwrap().null_count(), 0);

    let shawshank = row_index(df, "The Shawshank Redemption").unwrap();
    let overview = df.column(schema::OVERVIEW).unwrap().str().unwrap().get(shawshank);
    assert_eq!(overview, Some("Not Available"));

    assert!(row_index(df, "Lost Reel").is_none());
    assert!(row_index(df, "Broken Date").is_none());
}

#[test]
fn test_cleaning_preserves_order_and_is_idempotent() {
    let df = TableLoader::default().load(fixture_path()).unwrap();
    let cleaner = DataCleaner::default();

    let (once, _) = cleaner.clean(df).unwrap();
    let order = titles(&once);
    assert_eq!(order[0], "Spider-Man: No Way Home");
    assert_eq!(order[2], "Inception");
    assert_eq!(order.iter().filter(|t| *t == "Inception").count(), 1);

    let (twice, report) = cleaner.clean(once.clone()).unwrap();
    assert_eq!(report.duplicates_removed, 0);
    assert_eq!(report.invalid_dates, 0);
    assert_eq!(titles(&twice), order);
}

// ============================================================================
// Features
// ============================================================================

#[test]
fn test_spider_man_scenario() {
    let result = run_in_memory();
    let df = &result.cleaned;
    let idx = row_index(df, "Spider-Man: No Way Home").unwrap();

    let year = df.column(schema::YEAR).unwrap().i32().unwrap().get(idx);
    let month = df.column(schema::MONTH).unwrap().i32().unwrap().get(idx);
    let genres = df.column(schema::GENRE_COUNT).unwrap().i32().unwrap().get(idx);
    let norm = df
        .column(schema::POPULARITY_NORM)
        .unwrap()
        .f64()
        .unwrap()
        .get(idx);

    assert_eq!(year, Some(2021));
    assert_eq!(month, Some(12));
    assert_eq!(genres, Some(3));
    assert_eq!(norm, Some(1.0));

    assert!(row_index(&result.filtered, "Spider-Man: No Way Home").is_none());
}

#[test]
fn test_feature_properties() {
    let result = run_in_memory();
    let df = &result.cleaned;

    let genre_counts = df.column(schema::GENRE_COUNT).unwrap().i32().unwrap();
    assert!(genre_counts.into_iter().flatten().all(|c| c >= 1));

    let norm: Vec<f64> = df
        .column(schema::POPULARITY_NORM)
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .flatten()
        .collect();
    assert!(norm.iter().all(|v| (0.0..=1.0).contains(v)));
    assert!(norm.contains(&0.0));
    assert!(norm.contains(&1.0));

    let pilot = row_index(df, "Pilot Episode").unwrap();
    assert_eq!(norm[pilot], 0.0);

    let months = df.column(schema::MONTH).unwrap().i32().unwrap();
    assert!(months.into_iter().flatten().all(|m| (1..=12).contains(&m)));
}

// ============================================================================
// Statistics and Outliers
// ============================================================================

#[test]
fn test_inception_is_unique_most_voted() {
    let result = run_in_memory();
    let top = &result.stats.top_voted;

    assert_eq!(top.len(), 1);
    assert_eq!(top[0].title, "Inception");
    assert_eq!(top[0].vote_count, 31077);
    assert_eq!(top[0].vote_average, Some(8.4));
}

#[test]
fn test_statistics_columns() {
    let result = run_in_memory();

    let numeric: Vec<&str> = result
        .stats
        .numeric
        .iter()
        .map(|s| s.column.as_str())
        .collect();
    assert!(numeric.contains(&schema::POPULARITY));
    assert!(numeric.contains(&schema::VOTE_COUNT));
    assert!(!numeric.contains(&schema::YEAR));

    let features: Vec<&str> = result
        .stats
        .features
        .iter()
        .map(|s| s.column.as_str())
        .collect();
    assert_eq!(features, vec!["Year", "Month", "Genre_Count"]);

    let popularity = &result.stats.numeric[numeric
        .iter()
        .position(|c| *c == schema::POPULARITY)
        .unwrap()];
    assert_eq!(popularity.count, 17);
    assert_eq!(popularity.min, Some(12.5));
    assert_eq!(popularity.max, Some(5083.954));
}

#[test]
fn test_outlier_partition_counts() {
    let result = run_in_memory();
    let outliers = &result.outliers;

    assert_eq!(outliers.column, "Popularity");
    assert_eq!(outliers.multiplier, 1.5);
    assert_eq!(outliers.rows_kept + outliers.rows_excluded, result.cleaned.height());
    assert_eq!(outliers.rows_excluded, 3);
    assert_eq!(result.filtered.height(), 14);
    let bounds = outliers.bounds.expect("bounds computed");
    assert!((bounds.q1 - 68.224).abs() < 1e-9);
    assert!((bounds.q3 - 80.961).abs() < 1e-9);

    for title in ["The Batman", "Pilot Episode"] {
        assert!(row_index(&result.filtered, title).is_none(), "{}", title);
    }
    assert_eq!(result.cleaned.height(), 17);
}

#[test]
fn test_outlier_monotonicity_on_fixture() {
    let result = run_in_memory();
    let filter = OutlierFilter::default();

    let mut previous = usize::MAX;
    for multiplier in [3.0, 1.5, 1.0, 0.5, 0.0] {
        let bounds = OutlierFilter::new(multiplier).bounds(&result.cleaned).unwrap();
        let (kept, _) = filter
            .filter_within(&result.cleaned, bounds.lower, bounds.upper)
            .unwrap();
        assert!(kept.height() <= previous);
        previous = kept.height();
    }
}

#[test]
fn test_genre_frequencies() {
    let result = run_in_memory();
    let freq = &result.genre_frequencies;

    let top: Vec<(&str, usize)> = freq
        .iter()
        .take(2)
        .map(|f| (f.genre.as_str(), f.count))
        .collect();
    assert_eq!(top, vec![("Adventure", 8), ("Science Fiction", 8)]);

    for pair in freq.windows(2) {
        assert!(pair[0].count >= pair[1].count);
    }
}

// ============================================================================
// Output
// ============================================================================

#[test]
fn test_full_run_writes_outputs() {
    let temp = TempDir::new().unwrap();
    let output_dir = temp.path().join("out");
    let config = config_for(&output_dir);

    let result = EdaPipeline::builder()
        .chart_renderer(Arc::new(
            ChartDataExporter::new(&config.output_dir).bins(config.histogram_bins),
        ))
        .config(config.clone())
        .build()
        .unwrap()
        .run()
        .unwrap();

    let output_path = result.output_path.clone().unwrap();
    assert_eq!(output_path, output_dir.join("movies_cleaned.csv"));
    assert!(output_path.is_file());

    assert_eq!(result.chart_artifacts, vec![output_dir.join(CHART_DATA_FILE)]);
    let chart_json = std::fs::read_to_string(&result.chart_artifacts[0]).unwrap();
    let chart: ChartData = serde_json::from_str(&chart_json).unwrap();
    assert_eq!(chart.releases_by_month.len(), 12);
    assert_eq!(
        chart.releases_by_month.iter().map(|p| p.count).sum::<usize>(),
        17
    );
    assert_eq!(chart.popularity_histogram.len(), 20);
    assert_eq!(
        chart
            .popularity_histogram
            .iter()
            .map(|b| b.count)
            .sum::<usize>(),
        14
    );

    let report = EdaReport::from_result(&config, &result);
    let report_path = ReportWriter::new(&config.output_dir)
        .write_report(&report, &config.input_stem())
        .unwrap();
    assert_eq!(report_path, output_dir.join("movies_sample_report.json"));
}

#[test]
fn test_written_table_round_trip() {
    let temp = TempDir::new().unwrap();
    let config = config_for(temp.path());

    let result = EdaPipeline::builder()
        .config(config)
        .build()
        .unwrap()
        .run()
        .unwrap();

    let reread = TableLoader::default()
        .load_unchecked(result.output_path.unwrap())
        .unwrap();

    assert_eq!(reread.height(), result.cleaned.height());
    assert_eq!(reread.get_column_names(), result.cleaned.get_column_names());
    assert_eq!(titles(&reread), titles(&result.cleaned));

    let original: Vec<Option<f64>> = result
        .cleaned
        .column(schema::POPULARITY)
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .collect();
    let reread_popularity: Vec<Option<f64>> = reread
        .column(schema::POPULARITY)
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(reread_popularity, original);

    let dates = reread.column(schema::RELEASE_DATE).unwrap().cast(&DataType::String).unwrap();
    assert_eq!(dates.str().unwrap().get(0), Some("2021-12-15"));
}

#[test]
fn test_missing_output_dir_is_created() {
    let temp = TempDir::new().unwrap();
    let output_dir = temp.path().join("does").join("not").join("exist");

    let result = EdaPipeline::builder()
        .config(config_for(&output_dir))
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert!(output_dir.is_dir());
    assert!(result.output_path.unwrap().is_file());
}

#[test]
fn test_missing_output_dir_without_create_is_an_error() {
    let temp = TempDir::new().unwrap();
    let output_dir = temp.path().join("absent");
    let config = EdaConfig::builder()
        .input_path(fixture_path())
        .output_dir(&output_dir)
        .create_output_dir(false)
        .build()
        .unwrap();

    let stages = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&stages);
    let result = EdaPipeline::builder()
        .config(config)
        .on_progress(move |update| sink.lock().unwrap().push(update.stage))
        .build()
        .unwrap()
        .run();

    let error = result.unwrap_err();
    assert_eq!(error.error_code(), "DIRECTORY_NOT_FOUND");
    assert!(error.is_io());
    assert!(!output_dir.exists());
    assert_eq!(stages.lock().unwrap().last(), Some(&EdaStage::Failed));
}

#[test]
fn test_schema_mismatch_is_reported() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("partial.csv");
    std::fs::write(&path, "Title,Genre\nInception,Action\n").unwrap();

    let result = TableLoader::default().load(&path);
    match result {
        Err(EdaError::SchemaMismatch { missing }) => {
            assert_eq!(missing.len(), 7);
            assert!(missing.contains(&schema::RELEASE_DATE.to_string()));
        }
        other => panic!("Expected SchemaMismatch, got {:?}", other.map(|df| df.shape())),
    }
}
