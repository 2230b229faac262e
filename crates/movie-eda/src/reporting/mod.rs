//! Output of the analysis: the cleaned table and the run report.
//!
//! # Example
//!
//! ```rust,ignore
//! use movie_eda::reporting::{EdaReport, ReportWriter};
//!
//! let report = EdaReport::from_result(&config, &result);
//!
//! // Print as JSON
//! println!("{}", serde_json::to_string_pretty(&report)?);
//!
//! // Or write to <output_dir>/mymoviedb_report.json
//! ReportWriter::new(&config.output_dir).write_report(&report, "mymoviedb")?;
//! ```

mod report;
mod writer;

pub use report::{EdaReport, ReportWriter, RowCounts};
pub use writer::TableWriter;
pub(crate) use writer::prepare_parent_dir;
