use std::path::{Path, PathBuf};
use thiserror::Error;

/// Custom error types for the photo-tidy library
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O failure on a specific file
    #[error("Failed to {operation} {path}: {source}")]
    FileOperation {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A required path is not an existing directory
    #[error("{0} is not a directory")]
    InvalidDirectory(PathBuf),

    /// A single file could not be decoded as an image
    #[error("Failed to decode image {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    /// Decoded pixels could not be written out
    #[error("Failed to encode image {path}: {reason}")]
    Encode { path: PathBuf, reason: String },

    /// No free `name(n)` candidate was found below the configured bound
    #[error("No free name for {name} after {limit} attempts")]
    NameCollisionExhausted { name: String, limit: u32 },

    /// Conversion output directory is already present
    #[error("{0} already exists as a path. Either remove it or provide a name for a new folder")]
    DestinationAlreadyExists(PathBuf),

    /// Applying a rename would overwrite an existing file
    #[error("Refusing to overwrite existing file: {0}")]
    RenameTargetExists(PathBuf),

    /// Unsupported image format
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// Invalid configuration error
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Operation interrupted")]
    Interrupted,
}

impl Error {
    pub(crate) fn decode(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Error::Decode {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Wrap an I/O error with the operation and path it happened on
    pub(crate) fn at(operation: &'static str, path: &Path) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.to_path_buf();
        move |source| Error::FileOperation {
            operation,
            path,
            source,
        }
    }
}

/// Result type for photo-tidy operations
pub type Result<T> = std::result::Result<T, Error>;
