//! Delimited-file loading.
//!
//! Reads a header-prefixed file into a [`DataFrame`] with best-guess column
//! types, then checks the declared movie schema.

use crate::config::EdaConfig;
use crate::error::{EdaError, Result, ResultExt};
use crate::schema;
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Loads delimited text files into tables.
#[derive(Debug, Clone)]
pub struct TableLoader {
    separator: u8,
    eol_char: u8,
    infer_schema_length: usize,
}

impl Default for TableLoader {
    fn default() -> Self {
        let config = EdaConfig::default();
        Self::from_config(&config)
    }
}

impl TableLoader {
    /// Loader using the separator, line terminator and inference depth of `config`.
    pub fn from_config(config: &EdaConfig) -> Self {
        Self {
            separator: config.separator,
            eol_char: config.eol_char,
            infer_schema_length: config.infer_schema_length,
        }
    }

    /// Override the line terminator.
    pub fn with_eol_char(mut self, eol: u8) -> Self {
        self.eol_char = eol;
        self
    }

    /// Override the field separator.
    pub fn with_separator(mut self, separator: u8) -> Self {
        self.separator = separator;
        self
    }

    /// Load a file and verify every required movie column is present.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let path = path.as_ref();
        let df = self.load_unchecked(path)?;

        let missing = schema::missing_columns(&df);
        if !missing.is_empty() {
            return Err(EdaError::SchemaMismatch { missing });
        }

        Ok(df)
    }

    /// Load a file without schema validation.
    pub fn load_unchecked(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(EdaError::InputNotFound(path.to_path_buf()));
        }

        info!("Loading table from: {}", path.display());
        debug!(
            "separator={:?}, eol={:?}, infer_schema_length={}",
            self.separator as char, self.eol_char as char, self.infer_schema_length
        );

        let parse_options = CsvParseOptions::default()
            .with_separator(self.separator)
            .with_eol_char(self.eol_char)
            .with_quote_char(Some(b'"'));

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(self.infer_schema_length))
            .with_parse_options(parse_options)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .context(format!("Opening {}", path.display()))?
            .finish()
            .context(format!("Parsing {}", path.display()))?;

        info!("Table loaded: {} rows x {} columns", df.height(), df.width());
        Ok(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "Release_Date,Title,Overview,Popularity,Vote_Count,Vote_Average,Original_Language,Genre,Poster_Url";

    fn write_temp(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let content = format!(
            "{HEADER}\n2010-07-15,Inception,Dreams,86.0,31077,8.4,en,\"Action, Science Fiction\",http://x/1.jpg\n"
        );
        let path = write_temp(&dir, "movies.csv", &content);

        let df = TableLoader::default().load(&path).unwrap();
        assert_eq!(df.height(), 1);
        assert_eq!(df.width(), 9);
        assert!(crate::utils::is_numeric_dtype(
            df.column(schema::VOTE_COUNT).unwrap().dtype()
        ));
        assert_eq!(
            df.column(schema::GENRE).unwrap().dtype(),
            &DataType::String
        );
    }

    #[test]
    fn test_load_missing_file() {
        let result = TableLoader::default().load("does/not/exist.csv");
        assert!(matches!(result, Err(EdaError::InputNotFound(_))));
    }

    #[test]
    fn test_load_missing_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "partial.csv", "Title,Genre\nInception,Action\n");

        match TableLoader::default().load(&path) {
            Err(EdaError::SchemaMismatch { missing }) => {
                assert!(missing.contains(&"Release_Date".to_string()));
                assert!(!missing.contains(&"Title".to_string()));
            }
            other => panic!("Expected schema mismatch, got {:?}", other.map(|df| df.shape())),
        }

        // Unchecked loading accepts arbitrary headers
        let df = TableLoader::default().load_unchecked(&path).unwrap();
        assert_eq!(df.shape(), (1, 2));
    }

    #[test]
    fn test_load_custom_separator_and_eol() {
        let dir = tempfile::tempdir().unwrap();
        let content = "Title;Vote_Count\rInception;31077\rAvatar;27000\r";
        let path = write_temp(&dir, "semi.csv", content);

        let df = TableLoader::default()
            .with_separator(b';')
            .with_eol_char(b'\r')
            .load_unchecked(&path)
            .unwrap();

        assert_eq!(df.shape(), (2, 2));
    }
}
