//! Progress reporting for the analysis pipeline.
//!
//! # Example
//!
//! ```rust,ignore
//! use movie_eda::EdaPipeline;
//!
//! let result = EdaPipeline::builder()
//!     .config(config)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run()?;
//! ```

use serde::{Deserialize, Serialize};

/// Stages of the analysis pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdaStage {
    /// Reading the delimited input file
    Loading,
    /// Null audit, placeholders, date parsing, dedup and coercion
    Cleaning,
    /// Year, Month, Genre_Count and Popularity_Norm
    FeatureDerivation,
    /// Descriptive statistics and the most-voted query
    Statistics,
    /// IQR filtering of popularity
    OutlierFiltering,
    /// Handing tables to the chart renderer
    ChartRendering,
    /// Exporting the final table
    Writing,
    Complete,
    Failed,
}

impl EdaStage {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Loading => "Loading Data",
            Self::Cleaning => "Cleaning Data",
            Self::FeatureDerivation => "Deriving Features",
            Self::Statistics => "Computing Statistics",
            Self::OutlierFiltering => "Filtering Outliers",
            Self::ChartRendering => "Rendering Charts",
            Self::Writing => "Writing Output",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Share of the overall run this stage accounts for (0.0 - 1.0).
    pub fn weight(&self) -> f32 {
        match self {
            Self::Loading => 0.10,
            Self::Cleaning => 0.25,
            Self::FeatureDerivation => 0.20,
            Self::Statistics => 0.10,
            Self::OutlierFiltering => 0.10,
            Self::ChartRendering => 0.10,
            Self::Writing => 0.15,
            Self::Complete | Self::Failed => 0.0,
        }
    }

    /// Cumulative progress at the start of this stage.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Loading => 0.0,
            Self::Cleaning => 0.10,
            Self::FeatureDerivation => 0.35,
            Self::Statistics => 0.55,
            Self::OutlierFiltering => 0.65,
            Self::ChartRendering => 0.75,
            Self::Writing => 0.85,
            Self::Complete => 1.0,
            Self::Failed => 0.0,
        }
    }
}

/// A single progress notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub stage: EdaStage,

    /// Overall progress (0.0 - 1.0)
    pub progress: f32,

    /// Progress within the current stage (0.0 - 1.0)
    pub stage_progress: f32,

    pub message: String,

    /// Row count at this point, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,
}

impl ProgressUpdate {
    pub fn new(stage: EdaStage, stage_progress: f32, message: impl Into<String>) -> Self {
        let progress = stage.base_progress() + (stage.weight() * stage_progress);
        Self {
            stage,
            progress: progress.clamp(0.0, 1.0),
            stage_progress: stage_progress.clamp(0.0, 1.0),
            message: message.into(),
            rows: None,
        }
    }

    /// Attach the current row count.
    pub fn with_rows(mut self, rows: usize) -> Self {
        self.rows = Some(rows);
        self
    }

    pub fn complete(message: impl Into<String>) -> Self {
        Self {
            stage: EdaStage::Complete,
            progress: 1.0,
            stage_progress: 1.0,
            message: message.into(),
            rows: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            stage: EdaStage::Failed,
            progress: 0.0,
            stage_progress: 0.0,
            message: message.into(),
            rows: None,
        }
    }
}

/// Receives progress updates from a running pipeline.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, update: ProgressUpdate);
}

/// [`ProgressReporter`] backed by a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);
