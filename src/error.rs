//! Error types for the rollup pipeline.

use chrono::NaiveDate;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, RollupError>;

/// Errors that can occur while loading, filtering, or publishing rollups.
#[derive(Debug, thiserror::Error)]
pub enum RollupError {
    /// A required column is missing or a value failed type coercion.
    #[error("Malformed {dataset} input at row {row}: {message}")]
    MalformedInput {
        dataset: &'static str,
        row: u64,
        message: String,
    },

    /// The requested date range starts after it ends.
    #[error("Invalid range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    /// CSV reader or writer error outside of row coercion.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An aggregator worker panicked or was cancelled.
    #[error("Aggregator task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl RollupError {
    pub(crate) fn malformed(dataset: &'static str, row: u64, message: impl Into<String>) -> Self {
        RollupError::MalformedInput {
            dataset,
            row,
            message: message.into(),
        }
    }
}
