//! Error types for segkv
//!
//! Provides a unified error type for all operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using SegkvError
pub type Result<T> = std::result::Result<T, SegkvError>;

/// Unified error type for segkv operations
#[derive(Debug, Error)]
pub enum SegkvError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Argument Errors
    // -------------------------------------------------------------------------
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // -------------------------------------------------------------------------
    // Lookup Errors
    // -------------------------------------------------------------------------
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Database not found: {0}")]
    DatabaseNotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    // -------------------------------------------------------------------------
    // Segment Errors
    // -------------------------------------------------------------------------
    #[error("Segment corruption detected: {0}")]
    Corruption(String),

    #[error("Segment {0} is read-only")]
    ReadOnlySegment(String),

    // -------------------------------------------------------------------------
    // Startup Errors
    // -------------------------------------------------------------------------
    #[error("Recovery failed at {}: {source}", .path.display())]
    Recovery {
        path: PathBuf,
        #[source]
        source: Box<SegkvError>,
    },

    // -------------------------------------------------------------------------
    // Server Errors
    // -------------------------------------------------------------------------
    #[error("Database server is shut down")]
    ServerShutdown,
}

impl SegkvError {
    /// Wrap an error raised while recovering `path`.
    ///
    /// Already-wrapped errors pass through, so the innermost path wins.
    pub fn recovery(path: impl Into<PathBuf>, source: SegkvError) -> Self {
        match source {
            err @ SegkvError::Recovery { .. } => err,
            other => SegkvError::Recovery {
                path: path.into(),
                source: Box::new(other),
            },
        }
    }
}
