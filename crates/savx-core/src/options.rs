//! Conversion options.

use savx_sav::SavReaderOptions;

/// Variables that hold SPSS date values by default.
///
/// Matched on the original variable name, before headers are relabeled.
pub const DEFAULT_DATE_COLUMNS: &[&str] = &["Date_Discussed_MTB", "Date_NGS_Perfomed"];

/// Options controlling a conversion.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Variables to decode as dates.
    pub date_columns: Vec<String>,
    /// Whether date decoding runs at all (default: true).
    pub normalize_dates: bool,
    /// Options passed to the SAV reader.
    pub reader: SavReaderOptions,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            date_columns: DEFAULT_DATE_COLUMNS
                .iter()
                .map(|name| (*name).to_string())
                .collect(),
            normalize_dates: true,
            reader: SavReaderOptions::default(),
        }
    }
}

impl ConvertOptions {
    /// Create options with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the date column allow-list.
    #[must_use]
    pub fn with_date_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.date_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Turn date decoding off.
    #[must_use]
    pub fn without_dates(mut self) -> Self {
        self.normalize_dates = false;
        self
    }

    /// Set the reader options.
    #[must_use]
    pub fn with_reader_options(mut self, reader: SavReaderOptions) -> Self {
        self.reader = reader;
        self
    }

    /// Whether `name` should be decoded as a date.
    #[must_use]
    pub fn is_date_column(&self, name: &str) -> bool {
        self.normalize_dates && self.date_columns.iter().any(|column| column == name)
    }
}
