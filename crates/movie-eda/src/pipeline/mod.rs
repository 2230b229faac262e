//! Pipeline module.
//!
//! This module provides the analysis pipeline and related components.

mod builder;
pub mod outliers;
pub mod progress;

pub use builder::{EdaPipeline, EdaPipelineBuilder, EdaResult};
pub use outliers::{OutlierFilter, OutlierPartition};
pub use progress::{ClosureProgressReporter, EdaStage, ProgressReporter, ProgressUpdate};
