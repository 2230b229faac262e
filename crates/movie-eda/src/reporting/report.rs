use super::writer::prepare_parent_dir;
use crate::config::EdaConfig;
use crate::error::{Result, ResultExt};
use crate::pipeline::EdaResult;
use crate::types::{
    ColumnStatistics, GenreFrequency, NullCount, OutlierSummary, RunSummary, TopVotedMovie,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

// ============================================================================
// Report Types
// ============================================================================

/// Serializable record of one analysis run.
///
/// Used for `--json` output, `--emit-report` files and library callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdaReport {
    /// Timestamp when the report was generated
    pub generated_at: String,
    pub input_file: String,
    /// Path of the cleaned table, if written
    pub output_file: Option<String>,
    pub rows: RowCounts,
    pub columns_loaded: usize,
    pub columns_final: usize,
    pub duration_ms: u64,
    /// Null counts measured before cleaning
    pub null_audit: Vec<NullCount>,
    pub cleaning_actions: Vec<String>,
    pub numeric_statistics: Vec<ColumnStatistics>,
    pub feature_statistics: Vec<ColumnStatistics>,
    pub top_voted: Vec<TopVotedMovie>,
    pub outliers: OutlierSummary,
    pub genre_frequencies: Vec<GenreFrequency>,
    pub chart_artifacts: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Row count after each stage that removes rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowCounts {
    pub loaded: usize,
    pub after_date_drop: usize,
    pub after_dedup: usize,
    pub without_outliers: usize,
}

impl EdaReport {
    /// Build a report from a finished run.
    pub fn from_result(config: &EdaConfig, result: &EdaResult) -> Self {
        let RunSummary {
            duration_ms,
            columns_loaded,
            columns_final,
            warnings,
            ..
        } = result.summary.clone();

        Self {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            input_file: config.input_path.display().to_string(),
            output_file: result
                .output_path
                .as_ref()
                .map(|p| p.display().to_string()),
            rows: RowCounts {
                loaded: result.summary.rows_loaded,
                after_date_drop: result.cleaning.rows_after_date_drop,
                after_dedup: result.cleaning.rows_after,
                without_outliers: result.summary.rows_without_outliers,
            },
            columns_loaded,
            columns_final,
            duration_ms,
            null_audit: result.cleaning.null_audit.clone(),
            cleaning_actions: result.cleaning.actions.clone(),
            numeric_statistics: result.stats.numeric.clone(),
            feature_statistics: result.stats.features.clone(),
            top_voted: result.stats.top_voted.clone(),
            outliers: result.outliers.clone(),
            genre_frequencies: result.genre_frequencies.clone(),
            chart_artifacts: result
                .chart_artifacts
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            warnings,
        }
    }
}

// ============================================================================
// Report Writer
// ============================================================================

/// Writes [`EdaReport`]s as pretty JSON into an output directory.
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Write `<output_dir>/<stem>_report.json`, creating the directory.
    pub fn write_report(&self, report: &EdaReport, stem: &str) -> Result<PathBuf> {
        let report_path = self.output_dir.join(format!("{}_report.json", stem));
        prepare_parent_dir(&report_path, true)?;

        let mut file = File::create(&report_path)
            .context(format!("Failed to create {}", report_path.display()))?;
        file.write_all(serde_json::to_string_pretty(report)?.as_bytes())?;

        info!("Report saved: {}", report_path.display());
        Ok(report_path)
    }
}
