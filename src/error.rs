use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A usage row is missing a field or carries a value of the wrong type.
    #[error("Malformed record in {}:{line}: {message}", .path.display())]
    MalformedRecord {
        path: PathBuf,
        line: u64,
        message: String,
    },

    #[error("Invalid date range: {start} is after {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Unsupported input: {} (expected .jsonl, .csv or a directory)", .0.display())]
    UnsupportedInput(PathBuf),

    #[error("Render error: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, ReportError>;
