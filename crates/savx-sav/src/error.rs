//! Error types for SAV file operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when reading or writing SAV files.
#[derive(Debug, Error)]
pub enum SavError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Invalid SAV file format.
    #[error("invalid SAV file: {message}")]
    InvalidFormat { message: String },

    /// The file uses a compression scheme this reader does not decode.
    #[error("unsupported compression: {scheme}")]
    UnsupportedCompression { scheme: String },

    /// Invalid variable record.
    #[error("invalid variable record at index {index}: {message}")]
    InvalidVariable { index: usize, message: String },

    /// The file ended before a record was complete.
    #[error("unexpected end of file at offset {offset} (needed {needed} more bytes)")]
    Truncated { offset: usize, needed: usize },

    /// Duplicate variable name.
    #[error("duplicate variable name: {name}")]
    DuplicateVariable { name: String },

    /// Row length mismatch.
    #[error("row length mismatch: expected {expected}, got {actual}")]
    RowLengthMismatch { expected: usize, actual: usize },

    /// A value does not fit the declared variable width or type.
    #[error("value for {name} does not fit: {message}")]
    InvalidValue { name: String, message: String },

    /// DataFrame construction failed.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for SAV operations.
pub type Result<T> = std::result::Result<T, SavError>;

impl SavError {
    /// Create an InvalidFormat error.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// Create an InvalidVariable error.
    pub fn invalid_variable(index: usize, message: impl Into<String>) -> Self {
        Self::InvalidVariable {
            index,
            message: message.into(),
        }
    }

    /// Create an InvalidValue error.
    pub fn invalid_value(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            name: name.into(),
            message: message.into(),
        }
    }
}

#[cfg(feature = "polars")]
impl From<polars::prelude::PolarsError> for SavError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}
