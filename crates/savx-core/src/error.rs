//! Error types for conversion operations.

use std::path::PathBuf;

use savx_sav::SavError;
use thiserror::Error;

/// Errors that can occur while converting files.
#[derive(Debug, Error)]
pub enum ConvertError {
    // === File System Errors ===
    /// Input file does not exist.
    #[error("input file not found: {path}")]
    InputNotFound { path: PathBuf },

    /// Input file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    InputRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Output directory could not be created.
    #[error("failed to create output directory {path}: {source}")]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Format Errors ===
    /// The input could not be interpreted as a SAV file.
    #[error("failed to parse {path}: {message}")]
    Format { path: PathBuf, message: String },

    /// DataFrame assembly or transformation failed.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },

    // === Output Errors ===
    /// The workbook could not be written.
    #[error("failed to write {path}: {message}")]
    Write { path: PathBuf, message: String },

    /// The ZIP archive could not be written.
    #[error("failed to write archive {path}: {message}")]
    Archive { path: PathBuf, message: String },
}

impl ConvertError {
    /// Map a reader error for `path` onto the conversion taxonomy.
    pub fn from_sav(path: impl Into<PathBuf>, err: SavError) -> Self {
        let path = path.into();
        match err {
            SavError::FileNotFound { .. } => Self::InputNotFound { path },
            SavError::Io(source) => Self::InputRead { path, source },
            SavError::DataFrame { message } => Self::DataFrame { message },
            other => Self::Format {
                path,
                message: other.to_string(),
            },
        }
    }
}

impl From<polars::prelude::PolarsError> for ConvertError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for conversion operations.
pub type Result<T> = std::result::Result<T, ConvertError>;
