use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Whole-input failures. Per-record anomalies never surface here.
#[derive(Debug, Error)]
pub enum InspectError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("malformed input {}: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },
    #[error("failed reading parquet {}: {source}", path.display())]
    Parquet {
        path: PathBuf,
        #[source]
        source: parquet::errors::ParquetError,
    },
    #[error("Row {row} is out of range (1..{total})")]
    RowOutOfRange { row: usize, total: usize },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("cannot initialise logger: {0}")]
    Logger(#[from] log::SetLoggerError),
}

impl InspectError {
    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = InspectError> = std::result::Result<T, E>;
