//! Main analysis pipeline.
//!
//! This module provides the `EdaPipeline` struct and builder that run the
//! stages in order: load, clean, derive features, describe, filter outliers,
//! render charts, write.

use crate::charts::{genre_frequencies, ChartInputs, ChartRenderer};
use crate::cleaner::DataCleaner;
use crate::config::{ConfigValidationError, EdaConfig};
use crate::error::{EdaError, Result, ResultExt};
use crate::features::FeatureDeriver;
use crate::loader::TableLoader;
use crate::pipeline::outliers::OutlierFilter;
use crate::pipeline::progress::{
    ClosureProgressReporter, EdaStage, ProgressReporter, ProgressUpdate,
};
use crate::reporting::TableWriter;
use crate::schema;
use crate::stats::StatsReporter;
use crate::types::{
    CleaningReport, FeatureReport, GenreFrequency, OutlierSummary, RunSummary, StatsReport,
};
use polars::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// Share of rows removed by cleaning above which a warning is recorded.
const HIGH_ROW_LOSS_PERCENT: f64 = 50.0;

/// Everything a pipeline run produces.
#[derive(Debug, Clone)]
pub struct EdaResult {
    /// Cleaned table with derived feature columns.
    pub cleaned: DataFrame,
    /// `cleaned` restricted to popularity inliers.
    pub filtered: DataFrame,
    pub cleaning: CleaningReport,
    pub features: FeatureReport,
    pub stats: StatsReport,
    pub outliers: OutlierSummary,
    pub genre_frequencies: Vec<GenreFrequency>,
    /// Path of the exported table, when written.
    pub output_path: Option<PathBuf>,
    /// Files produced by the chart renderer.
    pub chart_artifacts: Vec<PathBuf>,
    pub summary: RunSummary,
}

/// The movie analysis pipeline.
///
/// # Example
///
/// ```rust,ignore
/// use movie_eda::{ChartDataExporter, EdaConfig, EdaPipeline};
/// use std::sync::Arc;
///
/// let config = EdaConfig::builder()
///     .input_path("mymoviedb.csv")
///     .output_dir("output")
///     .build()?;
///
/// let result = EdaPipeline::builder()
///     .chart_renderer(Arc::new(ChartDataExporter::new(&config.output_dir)))
///     .config(config)
///     .build()?
///     .run()?;
///
/// println!("{} rows after cleaning", result.cleaned.height());
/// ```
pub struct EdaPipeline {
    config: EdaConfig,
    loader: TableLoader,
    cleaner: DataCleaner,
    outlier_filter: OutlierFilter,
    chart_renderer: Option<Arc<dyn ChartRenderer>>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(EdaPipeline: Send);

impl EdaPipeline {
    pub fn builder() -> EdaPipelineBuilder {
        EdaPipelineBuilder::default()
    }

    pub fn config(&self) -> &EdaConfig {
        &self.config
    }

    /// Load the configured input file and process it.
    pub fn run(&self) -> Result<EdaResult> {
        let start = Instant::now();
        self.report_progress(ProgressUpdate::new(
            EdaStage::Loading,
            0.0,
            format!("Loading {}", self.config.input_path.display()),
        ));

        let df = match self.loader.load(&self.config.input_path) {
            Ok(df) => df,
            Err(e) => return Err(self.fail(e)),
        };
        self.report_progress(
            ProgressUpdate::new(EdaStage::Loading, 1.0, "Input loaded").with_rows(df.height()),
        );

        let mut result = self.finish(self.process_internal(df))?;
        result.summary.duration_ms = start.elapsed().as_millis() as u64;
        Ok(result)
    }

    /// Process an in-memory table.
    pub fn process(&self, df: DataFrame) -> Result<EdaResult> {
        let start = Instant::now();
        let mut result = self.finish(self.process_internal(df))?;
        result.summary.duration_ms = start.elapsed().as_millis() as u64;
        Ok(result)
    }

    fn finish(&self, outcome: Result<EdaResult>) -> Result<EdaResult> {
        match outcome {
            Ok(result) => {
                self.report_progress(ProgressUpdate::complete("Analysis completed successfully"));
                Ok(result)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    fn fail(&self, e: EdaError) -> EdaError {
        error!("Pipeline error: {}", e);
        self.report_progress(ProgressUpdate::failed(e.to_string()));
        e
    }

    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn process_internal(&self, df: DataFrame) -> Result<EdaResult> {
        info!("Starting analysis pipeline...");

        let missing = schema::missing_columns(&df);
        if !missing.is_empty() {
            return Err(EdaError::SchemaMismatch { missing });
        }

        let mut summary = RunSummary {
            rows_loaded: df.height(),
            columns_loaded: df.width(),
            ..Default::default()
        };
        info!("Loaded {} rows x {} columns", df.height(), df.width());

        // Step 1: Cleaning
        self.report_progress(ProgressUpdate::new(
            EdaStage::Cleaning,
            0.0,
            "Cleaning data...",
        ));
        let (df, cleaning) = self.cleaner.clean(df).context("Cleaning failed")?;
        summary.rows_cleaned = df.height();
        if df.height() == 0 {
            let message = "No rows remain after cleaning".to_string();
            warn!("{}", message);
            summary.add_warning(message);
        }
        if summary.rows_removed_percentage() > HIGH_ROW_LOSS_PERCENT {
            let message = format!(
                "Cleaning removed {:.1}% of rows",
                summary.rows_removed_percentage()
            );
            warn!("{}", message);
            summary.add_warning(message);
        }
        self.report_progress(
            ProgressUpdate::new(EdaStage::Cleaning, 1.0, "Cleaning complete")
                .with_rows(df.height()),
        );

        // Step 2: Feature derivation
        self.report_progress(ProgressUpdate::new(
            EdaStage::FeatureDerivation,
            0.0,
            "Deriving features...",
        ));
        let (mut df, features) = FeatureDeriver::derive(df).context("Feature derivation failed")?;
        if features.degenerate_popularity {
            summary.add_warning(format!(
                "Popularity has no spread; {} is constant",
                schema::POPULARITY_NORM
            ));
        }
        self.report_progress(ProgressUpdate::new(
            EdaStage::FeatureDerivation,
            1.0,
            format!("Added {} feature columns", features.added_columns.len()),
        ));

        // Step 3: Statistics
        self.report_progress(ProgressUpdate::new(
            EdaStage::Statistics,
            0.0,
            "Computing statistics...",
        ));
        let stats = StatsReporter::report(&df)?;
        self.report_progress(ProgressUpdate::new(
            EdaStage::Statistics,
            1.0,
            format!("Described {} columns", stats.numeric.len() + stats.features.len()),
        ));

        // Step 4: Outlier filtering
        self.report_progress(ProgressUpdate::new(
            EdaStage::OutlierFiltering,
            0.0,
            "Filtering outliers...",
        ));
        let (filtered, outliers) = match self.outlier_filter.partition(&df) {
            Ok(partition) => {
                let outliers = partition.summary(
                    self.outlier_filter.column_name(),
                    self.outlier_filter.multiplier(),
                );
                (partition.kept, outliers)
            }
            Err(EdaError::NoValidValues(column)) => {
                // Null values never pass the filter, so every row is excluded
                let message = format!("No valid '{}' values; outlier bounds not computed", column);
                warn!("{}", message);
                summary.add_warning(message);
                let outliers = OutlierSummary {
                    column,
                    multiplier: self.outlier_filter.multiplier(),
                    bounds: None,
                    rows_kept: 0,
                    rows_excluded: df.height(),
                };
                (df.clear(), outliers)
            }
            Err(e) => return Err(e),
        };
        summary.rows_without_outliers = filtered.height();
        self.report_progress(
            ProgressUpdate::new(
                EdaStage::OutlierFiltering,
                1.0,
                format!("Excluded {} outliers", outliers.rows_excluded),
            )
            .with_rows(filtered.height()),
        );

        // Step 5: Charts
        let genre_frequencies = genre_frequencies(&df)?;
        let chart_artifacts = match &self.chart_renderer {
            Some(renderer) => {
                self.report_progress(ProgressUpdate::new(
                    EdaStage::ChartRendering,
                    0.0,
                    format!("Rendering charts with {}", renderer.name()),
                ));
                let inputs = ChartInputs {
                    full: &df,
                    filtered: &filtered,
                    genre_frequencies: &genre_frequencies,
                };
                let artifacts = renderer
                    .render(&inputs)
                    .context(format!("Chart renderer '{}' failed", renderer.name()))?;
                self.report_progress(ProgressUpdate::new(
                    EdaStage::ChartRendering,
                    1.0,
                    format!("Produced {} chart artifacts", artifacts.len()),
                ));
                artifacts
            }
            None => {
                info!("No chart renderer configured; skipping charts");
                Vec::new()
            }
        };

        // Step 6: Writing
        let output_path = if self.config.save_to_disk {
            self.report_progress(ProgressUpdate::new(
                EdaStage::Writing,
                0.0,
                "Writing cleaned table...",
            ));
            let writer = TableWriter::new(self.config.output_path(), self.config.create_output_dir);
            let path = writer.write(&mut df).context("Writing cleaned table failed")?;
            self.report_progress(ProgressUpdate::new(
                EdaStage::Writing,
                1.0,
                format!("Saved {}", path.display()),
            ));
            Some(path)
        } else {
            info!("Skipping file output (save_to_disk = false)");
            None
        };

        summary.columns_final = df.width();
        info!(
            "Analysis complete: {} rows loaded, {} after cleaning, {} without outliers",
            summary.rows_loaded, summary.rows_cleaned, summary.rows_without_outliers
        );

        Ok(EdaResult {
            cleaned: df,
            filtered,
            cleaning,
            features,
            stats,
            outliers,
            genre_frequencies,
            output_path,
            chart_artifacts,
            summary,
        })
    }
}

/// Builder for [`EdaPipeline`].
#[derive(Default)]
pub struct EdaPipelineBuilder {
    config: Option<EdaConfig>,
    chart_renderer: Option<Arc<dyn ChartRenderer>>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(EdaPipelineBuilder: Send);

impl EdaPipelineBuilder {
    pub fn config(mut self, config: EdaConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the renderer that receives the chart inputs.
    ///
    /// Without one, the chart stage is skipped.
    pub fn chart_renderer(mut self, renderer: Arc<dyn ChartRenderer>) -> Self {
        self.chart_renderer = Some(renderer);
        self
    }

    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<EdaPipeline, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(EdaPipeline {
            loader: TableLoader::from_config(&config),
            cleaner: DataCleaner::from_config(&config),
            outlier_filter: OutlierFilter::new(config.iqr_multiplier)
                .column(config.outlier_column.clone()),
            chart_renderer: self.chart_renderer,
            progress_reporter: self.progress_reporter,
            config,
        })
    }
}
