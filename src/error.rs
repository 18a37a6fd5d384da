use std::path::PathBuf;
use thiserror::Error;

/// Central error type for mingle operations.
#[derive(Error, Debug)]
pub enum MingleError {
    #[error("Input file not found: {}", .0.display())]
    MissingInputFile(PathBuf),

    #[error("Dataset is empty: {}", .0.display())]
    EmptyDataset(PathBuf),

    #[error("Person not found in dataset: {0}")]
    PersonNotFound(String),

    #[error("Malformed record at line {line}: {reason}")]
    MalformedRecord { line: u64, reason: String },

    #[error("Invalid timestamp '{value}': {reason}")]
    InvalidTimestamp { value: String, reason: String },

    #[error("Invalid cutoff: {0}")]
    InvalidCutoff(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience type alias for mingle results.
pub type MingleResult<T> = Result<T, MingleError>;
