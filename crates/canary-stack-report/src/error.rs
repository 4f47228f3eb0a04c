//! Error types for the report module.

use thiserror::Error;

/// Errors that can occur while emitting a snapshot.
#[derive(Debug, Error)]
pub enum ReportError {
    /// I/O error writing to a file sink.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// One or more sinks of a fan-out failed.
    #[error("{failed} of {total} sinks failed, first: {first}")]
    Fanout {
        failed: usize,
        total: usize,
        first: Box<ReportError>,
    },
}

impl From<serde_json::Error> for ReportError {
    fn from(e: serde_json::Error) -> Self {
        ReportError::Serialization(e.to_string())
    }
}

/// Result type for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;
