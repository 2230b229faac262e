//! Column names of the movie table.

use polars::prelude::*;

pub const RELEASE_DATE: &str = "Release_Date";
pub const TITLE: &str = "Title";
pub const OVERVIEW: &str = "Overview";
pub const POPULARITY: &str = "Popularity";
pub const VOTE_COUNT: &str = "Vote_Count";
pub const VOTE_AVERAGE: &str = "Vote_Average";
pub const ORIGINAL_LANGUAGE: &str = "Original_Language";
pub const GENRE: &str = "Genre";
pub const POSTER_URL: &str = "Poster_Url";

// Derived by the feature stage
pub const YEAR: &str = "Year";
pub const MONTH: &str = "Month";
pub const GENRE_COUNT: &str = "Genre_Count";
pub const POPULARITY_NORM: &str = "Popularity_Norm";

/// Columns every input file must provide, in source order.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    RELEASE_DATE,
    TITLE,
    OVERVIEW,
    POPULARITY,
    VOTE_COUNT,
    VOTE_AVERAGE,
    ORIGINAL_LANGUAGE,
    GENRE,
    POSTER_URL,
];

/// Columns added by feature derivation, in output order.
pub const DERIVED_COLUMNS: [&str; 4] = [YEAR, MONTH, GENRE_COUNT, POPULARITY_NORM];

/// Text columns that may be missing and get a placeholder instead.
pub const OPTIONAL_TEXT_COLUMNS: [&str; 2] = [OVERVIEW, POSTER_URL];

/// Integer-valued features summarized separately from the raw measures.
pub const FEATURE_STAT_COLUMNS: [&str; 3] = [YEAR, MONTH, GENRE_COUNT];

/// Declared type for each coerced source column.
pub const COERCED_COLUMNS: [(&str, DataType); 3] = [
    (VOTE_COUNT, DataType::Int64),
    (VOTE_AVERAGE, DataType::Float64),
    (POPULARITY, DataType::Float64),
];

/// Names from [`REQUIRED_COLUMNS`] that `df` does not have.
pub fn missing_columns(df: &DataFrame) -> Vec<String> {
    let present: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    REQUIRED_COLUMNS
        .iter()
        .filter(|name| !present.iter().any(|p| p == *name))
        .map(|name| name.to_string())
        .collect()
}
