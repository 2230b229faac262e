//! Error types for the exploratory analysis pipeline.
//!
//! Structural failures (missing files or directories, schema gaps, values that
//! cannot be coerced) abort a run with one of these variants. Recoverable
//! conditions such as unparseable dates never reach this type; the cleaner
//! counts and drops them instead.
//!
//! Errors serialize as `{ "code", "message" }` so they can be embedded in JSON
//! reports.

use serde::Serialize;
use serde::ser::SerializeStruct;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the analysis pipeline.
#[derive(Error, Debug)]
pub enum EdaError {
    /// Input file does not exist or is not a regular file.
    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// Target directory for an output file does not exist.
    #[error("Output directory does not exist: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    /// Loaded table lacks columns the pipeline requires.
    #[error("Input is missing required columns: {}", missing.join(", "))]
    SchemaMismatch { missing: Vec<String> },

    /// Column was not found in the table.
    #[error("Column '{0}' not found in table")]
    ColumnNotFound(String),

    /// A value could not be coerced to the column's declared type.
    #[error("Failed to convert column '{column}' to {target_type}: {reason}")]
    TypeConversionFailed {
        column: String,
        target_type: String,
        reason: String,
    },

    /// No non-null values available for a computation.
    #[error("No valid values found in column '{0}'")]
    NoValidValues(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error with additional context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<EdaError>,
    },
}

impl EdaError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        EdaError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable error code, preserved through context wrapping.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InputNotFound(_) => "INPUT_NOT_FOUND",
            Self::DirectoryNotFound(_) => "DIRECTORY_NOT_FOUND",
            Self::SchemaMismatch { .. } => "SCHEMA_MISMATCH",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::TypeConversionFailed { .. } => "TYPE_CONVERSION_FAILED",
            Self::NoValidValues(_) => "NO_VALID_VALUES",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Whether the error stems from the filesystem rather than the data.
    pub fn is_io(&self) -> bool {
        match self {
            Self::InputNotFound(_) | Self::DirectoryNotFound(_) | Self::Io(_) => true,
            Self::WithContext { source, .. } => source.is_io(),
            _ => false,
        }
    }
}

impl Serialize for EdaError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("EdaError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, EdaError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| EdaError::Polars(e).with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| EdaError::Io(e).with_context(context))
    }
}
