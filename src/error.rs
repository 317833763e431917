use std::path::PathBuf;

/// Failure to read the fuel price dataset. Fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("dataset file not found: {}", .0.display())]
    Missing(PathBuf),

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("dataset is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("row {row}, column {column}: {reason}")]
    Malformed {
        row: usize,
        column: &'static str,
        reason: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

impl DataLoadError {
    pub(crate) fn malformed(row: usize, column: &'static str, reason: impl Into<String>) -> Self {
        DataLoadError::Malformed {
            row,
            column,
            reason: reason.into(),
        }
    }
}

/// Failure to resolve a postcode. Never fatal: the caller shows a warning and
/// skips the item.
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("Could not find location for postcode {0}")]
    NotFound(String),

    #[error("geocoding request for postcode {postcode} failed: {source}")]
    Http {
        postcode: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("geocoder returned an unreadable coordinate for postcode {0}")]
    BadCoordinate(String),
}
