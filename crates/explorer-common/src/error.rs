//! Error types for the floodsar explorer.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using ExplorerError.
pub type ExplorerResult<T> = Result<T, ExplorerError>;

/// Primary error type for explorer operations.
#[derive(Debug, Error)]
pub enum ExplorerError {
    #[error("Invalid date id '{0}' (expected YYYYMMDD)")]
    InvalidDateId(String),

    #[error("Invalid plot image name: {0}")]
    InvalidPlotName(String),

    #[error("Not a k-means output directory: {0}")]
    InvalidOutputDir(String),

    #[error("Unsafe file name: {0}")]
    UnsafeFileName(String),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Plot command failed: {0}")]
    CommandFailed(String),
}

impl ExplorerError {
    /// Wrap an I/O error together with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error means the requested file simply does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }

    /// HTTP status code this error maps to when it reaches a handler.
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidDateId(_)
            | Self::InvalidPlotName(_)
            | Self::InvalidOutputDir(_)
            | Self::UnsafeFileName(_) => 400,
            Self::Io { .. } if self.is_not_found() => 404,
            Self::Io { .. } | Self::CommandFailed(_) => 500,
        }
    }
}

/// Reject file names that could escape the directory they are joined onto.
///
/// The name must be a single path component other than `.` or `..`.
pub fn ensure_plain_file_name(name: &str) -> ExplorerResult<&str> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0')
    {
        return Err(ExplorerError::UnsafeFileName(name.to_string()));
    }
    Ok(name)
}
