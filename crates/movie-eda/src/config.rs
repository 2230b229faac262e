//! Configuration types for the analysis pipeline.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic pipeline setup.

use crate::schema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Placeholder written into missing optional text fields.
pub const DEFAULT_PLACEHOLDER: &str = "Not Available";

/// Configuration for the analysis pipeline.
///
/// Use [`EdaConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use movie_eda::config::EdaConfig;
///
/// let config = EdaConfig::builder()
///     .input_path("data/mymoviedb.csv")
///     .output_dir("output")
///     .iqr_multiplier(1.5)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdaConfig {
    /// Path to the delimited input file.
    /// Default: "mymoviedb.csv"
    pub input_path: PathBuf,

    /// Field separator byte.
    /// Default: b','
    pub separator: u8,

    /// Line terminator byte. The movie export terminates records with `\n`
    /// while overview text may contain stray `\r`, so this is configurable.
    /// Default: b'\n'
    pub eol_char: u8,

    /// Number of rows used for schema inference when loading.
    /// Default: 10000
    pub infer_schema_length: usize,

    /// Directory for the cleaned table, reports and chart data.
    /// Default: "output"
    pub output_dir: PathBuf,

    /// File name (without extension) of the cleaned table.
    /// Default: "movies_cleaned"
    pub output_name: String,

    /// Value written into missing optional text fields.
    /// Default: "Not Available"
    pub placeholder: String,

    /// Text columns whose missing values are replaced by the placeholder.
    /// Default: Overview, Poster_Url
    pub optional_text_columns: Vec<String>,

    /// Column the interquartile-range filter is computed on.
    /// Default: "Popularity"
    pub outlier_column: String,

    /// IQR multiplier for the acceptance interval.
    /// Default: 1.5
    pub iqr_multiplier: f64,

    /// Number of bins for exported histograms.
    /// Default: 20
    pub histogram_bins: usize,

    /// Whether a missing output directory is created before writing.
    /// When false, writing into a missing directory returns
    /// `EdaError::DirectoryNotFound`.
    /// Default: true
    pub create_output_dir: bool,

    /// Whether to write the cleaned table to disk.
    /// When false, results are kept in memory only.
    /// Default: true
    pub save_to_disk: bool,
}

impl Default for EdaConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("mymoviedb.csv"),
            separator: b',',
            eol_char: b'\n',
            infer_schema_length: 10_000,
            output_dir: PathBuf::from("output"),
            output_name: "movies_cleaned".to_string(),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            optional_text_columns: default_optional_text_columns(),
            outlier_column: schema::POPULARITY.to_string(),
            iqr_multiplier: 1.5,
            histogram_bins: 20,
            create_output_dir: true,
            save_to_disk: true,
        }
    }
}

fn default_optional_text_columns() -> Vec<String> {
    schema::OPTIONAL_TEXT_COLUMNS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl EdaConfig {
    /// Create a new configuration builder.
    pub fn builder() -> EdaConfigBuilder {
        EdaConfigBuilder::default()
    }

    /// Full path of the cleaned CSV export.
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.csv", self.output_name))
    }

    /// Stem of the input file, used to name reports.
    pub fn input_stem(&self) -> String {
        file_stem(&self.input_path)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !self.iqr_multiplier.is_finite() || self.iqr_multiplier <= 0.0 {
            return Err(ConfigValidationError::InvalidIqrMultiplier(
                self.iqr_multiplier,
            ));
        }

        if self.separator == self.eol_char {
            return Err(ConfigValidationError::SeparatorEqualsEol(
                self.separator as char,
            ));
        }

        if self.infer_schema_length == 0 {
            return Err(ConfigValidationError::EmptyField(
                "infer_schema_length".to_string(),
            ));
        }

        if self.output_name.trim().is_empty() {
            return Err(ConfigValidationError::EmptyField("output_name".to_string()));
        }

        if self.placeholder.is_empty() {
            return Err(ConfigValidationError::EmptyField("placeholder".to_string()));
        }

        if self.outlier_column.trim().is_empty() {
            return Err(ConfigValidationError::EmptyField(
                "outlier_column".to_string(),
            ));
        }

        if self.histogram_bins == 0 {
            return Err(ConfigValidationError::InvalidHistogramBins(
                self.histogram_bins,
            ));
        }

        Ok(())
    }
}

/// File stem of a path, falling back to "output".
pub(crate) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output")
        .to_string()
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid IQR multiplier: {0} (must be a positive finite number)")]
    InvalidIqrMultiplier(f64),

    #[error("Separator and line terminator must differ (both are {0:?})")]
    SeparatorEqualsEol(char),

    #[error("Invalid histogram bins: {0} (must be at least 1)")]
    InvalidHistogramBins(usize),

    #[error("Configuration field '{0}' must not be empty")]
    EmptyField(String),
}

/// Builder for [`EdaConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct EdaConfigBuilder {
    input_path: Option<PathBuf>,
    separator: Option<u8>,
    eol_char: Option<u8>,
    infer_schema_length: Option<usize>,
    output_dir: Option<PathBuf>,
    output_name: Option<String>,
    placeholder: Option<String>,
    optional_text_columns: Option<Vec<String>>,
    outlier_column: Option<String>,
    iqr_multiplier: Option<f64>,
    histogram_bins: Option<usize>,
    create_output_dir: Option<bool>,
    save_to_disk: Option<bool>,
}

impl EdaConfigBuilder {
    /// Set the input file path.
    pub fn input_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_path = Some(path.into());
        self
    }

    /// Set the field separator.
    pub fn separator(mut self, separator: u8) -> Self {
        self.separator = Some(separator);
        self
    }

    /// Set the line terminator.
    pub fn eol_char(mut self, eol: u8) -> Self {
        self.eol_char = Some(eol);
        self
    }

    /// Set the number of rows used for schema inference.
    pub fn infer_schema_length(mut self, rows: usize) -> Self {
        self.infer_schema_length = Some(rows);
        self
    }

    /// Set the output directory.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Set the cleaned table file name (without extension).
    pub fn output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = Some(name.into());
        self
    }

    /// Set the placeholder for missing optional text.
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Replace the list of optional text columns.
    pub fn optional_text_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.optional_text_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the column used for outlier filtering.
    pub fn outlier_column(mut self, column: impl Into<String>) -> Self {
        self.outlier_column = Some(column.into());
        self
    }

    /// Set the IQR multiplier.
    pub fn iqr_multiplier(mut self, multiplier: f64) -> Self {
        self.iqr_multiplier = Some(multiplier);
        self
    }

    /// Set the histogram bin count for chart data.
    pub fn histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = Some(bins);
        self
    }

    /// Create the output directory when it is missing.
    pub fn create_output_dir(mut self, create: bool) -> Self {
        self.create_output_dir = Some(create);
        self
    }

    /// Enable or disable writing the cleaned table.
    pub fn save_to_disk(mut self, save: bool) -> Self {
        self.save_to_disk = Some(save);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `EdaConfig` or an error if validation fails.
    pub fn build(self) -> Result<EdaConfig, ConfigValidationError> {
        let defaults = EdaConfig::default();
        let config = EdaConfig {
            input_path: self.input_path.unwrap_or(defaults.input_path),
            separator: self.separator.unwrap_or(defaults.separator),
            eol_char: self.eol_char.unwrap_or(defaults.eol_char),
            infer_schema_length: self
                .infer_schema_length
                .unwrap_or(defaults.infer_schema_length),
            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
            output_name: self.output_name.unwrap_or(defaults.output_name),
            placeholder: self.placeholder.unwrap_or(defaults.placeholder),
            optional_text_columns: self
                .optional_text_columns
                .unwrap_or(defaults.optional_text_columns),
            outlier_column: self.outlier_column.unwrap_or(defaults.outlier_column),
            iqr_multiplier: self.iqr_multiplier.unwrap_or(defaults.iqr_multiplier),
            histogram_bins: self.histogram_bins.unwrap_or(defaults.histogram_bins),
            create_output_dir: self.create_output_dir.unwrap_or(defaults.create_output_dir),
            save_to_disk: self.save_to_disk.unwrap_or(defaults.save_to_disk),
        };

        config.validate()?;
        Ok(config)
    }
}
