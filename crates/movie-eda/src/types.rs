use serde::{Deserialize, Serialize};

// ============================================================================
// Cleaning
// ============================================================================

/// Missing values in one column, measured before cleaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NullCount {
    pub column: String,
    pub null_count: usize,
}

/// Placeholder substitutions applied to one optional text column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderFill {
    pub column: String,
    pub filled: usize,
}

/// What the cleaner did to the table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleaningReport {
    pub rows_before: usize,
    /// Per-column null counts from the audit.
    pub null_audit: Vec<NullCount>,
    pub placeholders_filled: Vec<PlaceholderFill>,
    /// Rows whose release date was missing or unparseable.
    pub invalid_dates: usize,
    pub rows_after_date_drop: usize,
    pub duplicates_removed: usize,
    pub rows_after: usize,
    /// Columns cast to their declared type, as "column -> type".
    pub coercions: Vec<String>,
    /// Human-readable log of cleaning actions.
    pub actions: Vec<String>,
}

impl CleaningReport {
    /// Total null values found by the audit.
    pub fn total_nulls(&self) -> usize {
        self.null_audit.iter().map(|n| n.null_count).sum()
    }

    pub fn rows_removed(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }
}

// ============================================================================
// Features
// ============================================================================

/// Parameters observed while deriving feature columns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureReport {
    pub added_columns: Vec<String>,
    pub popularity_min: Option<f64>,
    pub popularity_max: Option<f64>,
    /// True when every popularity value was equal and the normalized column
    /// was filled with zeros.
    pub degenerate_popularity: bool,
}

// ============================================================================
// Statistics
// ============================================================================

/// Descriptive statistics for one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStatistics {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

/// A row holding the maximum vote count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopVotedMovie {
    pub title: String,
    pub vote_count: i64,
    pub vote_average: Option<f64>,
}

/// Read-only summary produced by the statistics stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsReport {
    /// Numeric measures (everything numeric except the calendar/genre features).
    pub numeric: Vec<ColumnStatistics>,
    /// Year, Month and Genre_Count.
    pub features: Vec<ColumnStatistics>,
    /// All rows sharing the maximum vote count.
    pub top_voted: Vec<TopVotedMovie>,
}

// ============================================================================
// Outliers
// ============================================================================

/// Interquartile-range acceptance interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutlierBounds {
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower: f64,
    pub upper: f64,
}

impl OutlierBounds {
    /// Whether `value` lies inside the interval (inclusive).
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

/// Serializable description of an outlier partition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlierSummary {
    pub column: String,
    pub multiplier: f64,
    /// Absent when the column had no values to compute quartiles from.
    pub bounds: Option<OutlierBounds>,
    pub rows_kept: usize,
    pub rows_excluded: usize,
}

// ============================================================================
// Charts
// ============================================================================

/// Occurrences of one genre token across the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreFrequency {
    pub genre: String,
    pub count: usize,
}

// ============================================================================
// Run summary
// ============================================================================

/// Row counts and timing for one pipeline run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub duration_ms: u64,
    pub rows_loaded: usize,
    pub rows_cleaned: usize,
    pub rows_without_outliers: usize,
    pub columns_loaded: usize,
    pub columns_final: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl RunSummary {
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Percentage of loaded rows removed by cleaning.
    pub fn rows_removed_percentage(&self) -> f64 {
        if self.rows_loaded == 0 {
            0.0
        } else {
            (self.rows_loaded.saturating_sub(self.rows_cleaned)) as f64
                / self.rows_loaded as f64
                * 100.0
        }
    }
}
