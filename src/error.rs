use itertools::Itertools;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal problems with one of the two input sources.
///
/// Raised by the loader only. The pipeline cannot run without both tables,
/// so these are surfaced to the caller as-is and never retried.
#[derive(Error, Debug)]
pub enum DataSourceError {
    #[error("{source_name} source not found: {}", path.display())]
    NotFound { source_name: String, path: PathBuf },

    #[error("{source_name} source is unreadable: {reason}")]
    Unreadable { source_name: String, reason: String },

    #[error("{source_name} source is malformed{}: {reason}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    Malformed {
        source_name: String,
        line: Option<u64>,
        reason: String,
    },

    #[error("{source_name} source is missing required columns: {}", missing.iter().join(", "))]
    MissingColumns {
        source_name: String,
        missing: Vec<String>,
    },
}

#[derive(Error, Debug)]
pub enum NexusError {
    #[error("Data source error: {0}")]
    DataSource(#[from] DataSourceError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Join error: {0}")]
    Join(String),

    #[error("Polars error: {0}")]
    Polars(String),
}

impl From<polars::error::PolarsError> for NexusError {
    fn from(err: polars::error::PolarsError) -> Self {
        NexusError::Polars(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, NexusError>;
