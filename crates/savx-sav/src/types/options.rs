//! Reader and writer options.

use chrono::NaiveDateTime;

use super::Compression;

/// Options for reading SAV files.
#[derive(Debug, Clone)]
pub struct SavReaderOptions {
    /// Trim trailing spaces from string values (default: true).
    pub trim_strings: bool,
    /// Report user-missing values as missing (default: true).
    pub user_missing_as_null: bool,
    /// Resolve labeled codes to their value labels when building a
    /// DataFrame (default: true). Only string codes are replaced in the
    /// frame; numeric labels are resolved by the consumer.
    pub apply_value_labels: bool,
}

impl Default for SavReaderOptions {
    fn default() -> Self {
        Self {
            trim_strings: true,
            user_missing_as_null: true,
            apply_value_labels: true,
        }
    }
}

impl SavReaderOptions {
    /// Create reader options with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep raw codes instead of value labels.
    #[must_use]
    pub fn raw_codes(mut self) -> Self {
        self.apply_value_labels = false;
        self
    }

    /// Keep user-missing values as ordinary values.
    #[must_use]
    pub fn keep_user_missing(mut self) -> Self {
        self.user_missing_as_null = false;
        self
    }
}

/// Options for writing SAV files.
#[derive(Debug, Clone)]
pub struct SavWriterOptions {
    /// Case data compression (default: bytecode).
    pub compression: Compression,
    /// Compression bias (default: 100).
    pub bias: f64,
    /// File label (max 64 bytes).
    pub file_label: Option<String>,
    /// Creation timestamp (default: current time).
    pub created: Option<NaiveDateTime>,
}

impl Default for SavWriterOptions {
    fn default() -> Self {
        Self {
            compression: Compression::Bytecode,
            bias: 100.0,
            file_label: None,
            created: None,
        }
    }
}

impl SavWriterOptions {
    /// Set the compression scheme.
    #[must_use]
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Set the file label.
    #[must_use]
    pub fn with_file_label(mut self, label: impl Into<String>) -> Self {
        self.file_label = Some(label.into());
        self
    }

    /// Set a fixed creation timestamp.
    #[must_use]
    pub fn with_created(mut self, created: NaiveDateTime) -> Self {
        self.created = Some(created);
        self
    }
}
