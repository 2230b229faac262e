//! Movie Dataset Exploratory Analysis Library
//!
//! Loads a delimited movie table, cleans it, derives features, computes
//! descriptive statistics and IQR outlier bounds, hands chart inputs to a
//! renderer and exports the cleaned table. Built on Polars.
//!
//! # Overview
//!
//! - **Loading**: [`TableLoader`] reads the file with a configurable separator
//!   and line terminator, then checks the required columns
//! - **Cleaning**: [`DataCleaner`] audits nulls, fills optional text, parses
//!   release dates, removes duplicates and coerces numeric types
//! - **Features**: [`FeatureDeriver`] adds `Year`, `Month`, `Genre_Count` and
//!   `Popularity_Norm`
//! - **Statistics**: [`StatsReporter`] describes numeric columns and finds the
//!   most-voted titles
//! - **Outliers**: [`OutlierFilter`] keeps rows inside the IQR interval
//! - **Charts**: any [`ChartRenderer`]; [`ChartDataExporter`] writes the chart
//!   aggregates as JSON
//! - **Output**: [`TableWriter`] and [`ReportWriter`]
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use movie_eda::{ChartDataExporter, EdaConfig, EdaPipeline};
//! use std::sync::Arc;
//!
//! let config = EdaConfig::builder()
//!     .input_path("mymoviedb.csv")
//!     .output_dir("output")
//!     .build()?;
//!
//! let result = EdaPipeline::builder()
//!     .chart_renderer(Arc::new(ChartDataExporter::new(&config.output_dir)))
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .config(config)
//!     .build()?
//!     .run()?;
//!
//! for movie in &result.stats.top_voted {
//!     println!("{} ({} votes)", movie.title, movie.vote_count);
//! }
//! ```
//!
//! Individual stages can also be used on their own:
//!
//! ```rust,ignore
//! use movie_eda::{DataCleaner, FeatureDeriver, OutlierFilter, TableLoader};
//!
//! let df = TableLoader::default().load("mymoviedb.csv")?;
//! let (df, cleaning) = DataCleaner::default().clean(df)?;
//! let (df, _) = FeatureDeriver::derive(df)?;
//! let partition = OutlierFilter::new(1.5).partition(&df)?;
//! println!("{} outliers", partition.excluded_count);
//! ```

pub mod charts;
pub mod cleaner;
pub mod config;
pub mod error;
pub mod features;
pub mod loader;
pub mod pipeline;
pub mod reporting;
pub mod schema;
pub mod stats;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use charts::{ChartData, ChartDataExporter, ChartInputs, ChartRenderer, genre_frequencies};
pub use cleaner::DataCleaner;
pub use config::{ConfigValidationError, EdaConfig, EdaConfigBuilder};
pub use error::{EdaError, ResultExt};
pub use features::FeatureDeriver;
pub use loader::TableLoader;
pub use pipeline::{
    ClosureProgressReporter, EdaPipeline, EdaPipelineBuilder, EdaResult, EdaStage,
    OutlierFilter, OutlierPartition, ProgressReporter, ProgressUpdate,
};
pub use reporting::{EdaReport, ReportWriter, RowCounts, TableWriter};
pub use stats::{StatsReporter, describe_table};
pub use types::{
    CleaningReport, ColumnStatistics, FeatureReport, GenreFrequency, NullCount, OutlierBounds,
    OutlierSummary, PlaceholderFill, RunSummary, StatsReport, TopVotedMovie,
};
