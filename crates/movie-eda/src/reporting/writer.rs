//! CSV export of the final table.

use crate::error::{EdaError, Result, ResultExt};
use polars::prelude::*;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Make sure the directory that will hold `path` exists.
///
/// With `create` set, missing directories are created; otherwise a missing
/// directory is reported as [`EdaError::DirectoryNotFound`].
pub(crate) fn prepare_parent_dir(path: &Path, create: bool) -> Result<()> {
    let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };
    if parent.is_dir() {
        return Ok(());
    }

    if create {
        fs::create_dir_all(parent)
            .context(format!("Failed to create directory {}", parent.display()))?;
        info!("Created output directory: {}", parent.display());
        Ok(())
    } else {
        Err(EdaError::DirectoryNotFound(parent.to_path_buf()))
    }
}

/// Writes a table to a CSV file with a header row.
#[derive(Debug, Clone)]
pub struct TableWriter {
    path: PathBuf,
    create_dirs: bool,
}

impl TableWriter {
    pub fn new(path: impl Into<PathBuf>, create_dirs: bool) -> Self {
        Self {
            path: path.into(),
            create_dirs,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `df` and return the path written.
    pub fn write(&self, df: &mut DataFrame) -> Result<PathBuf> {
        prepare_parent_dir(&self.path, self.create_dirs)?;

        {
            let mut file = File::create(&self.path)
                .context(format!("Failed to create {}", self.path.display()))?;
            CsvWriter::new(&mut file)
                .include_header(true)
                .with_separator(b',')
                .with_quote_char(b'"')
                .finish(df)
                .context(format!("Failed to write {}", self.path.display()))?;
        }
        debug!("Wrote {} rows x {} columns", df.height(), df.width());

        info!("Dataset saved: {}", self.path.display());
        Ok(self.path.clone())
    }
}
