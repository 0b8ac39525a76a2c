//! Variable (column) definitions.

use super::{MissingValues, SavFormat};

/// Variable data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavType {
    /// 8-byte floating point.
    Numeric,
    /// Fixed-width string of `width` bytes.
    String { width: usize },
}

impl SavType {
    /// Number of 8-byte case slots the variable occupies, ignoring
    /// very long string segmentation.
    #[must_use]
    pub const fn slot_count(self) -> usize {
        match self {
            Self::Numeric => 1,
            Self::String { width } => {
                if width == 0 {
                    1
                } else {
                    width.div_ceil(8)
                }
            }
        }
    }

    /// Whether the variable holds strings.
    #[must_use]
    pub const fn is_string(self) -> bool {
        matches!(self, Self::String { .. })
    }
}

/// Value labels attached to a variable.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueLabels {
    /// Labels for numeric codes.
    Numeric(Vec<(f64, String)>),
    /// Labels for string codes (codes are stored without trailing spaces).
    Text(Vec<(String, String)>),
}

impl ValueLabels {
    /// Label for a numeric code.
    #[must_use]
    pub fn label_for_number(&self, value: f64) -> Option<&str> {
        match self {
            Self::Numeric(entries) => entries
                .iter()
                .find(|(code, _)| *code == value)
                .map(|(_, label)| label.as_str()),
            Self::Text(_) => None,
        }
    }

    /// Label for a string code.
    #[must_use]
    pub fn label_for_text(&self, value: &str) -> Option<&str> {
        match self {
            Self::Text(entries) => {
                let needle = value.trim_end();
                entries
                    .iter()
                    .find(|(code, _)| code == needle)
                    .map(|(_, label)| label.as_str())
            }
            Self::Numeric(_) => None,
        }
    }

    /// Number of labeled codes.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Numeric(entries) => entries.len(),
            Self::Text(entries) => entries.len(),
        }
    }

    /// Whether there are no labeled codes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A variable in a SAV dictionary.
#[derive(Debug, Clone, PartialEq)]
pub struct SavVariable {
    /// Variable name (long name when the file provides one).
    pub name: String,
    /// Variable label.
    pub label: Option<String>,
    /// Data type.
    pub var_type: SavType,
    /// Print format.
    pub print_format: SavFormat,
    /// Write format.
    pub write_format: SavFormat,
    /// User-missing declarations.
    pub missing: MissingValues,
    /// Value labels.
    pub value_labels: Option<ValueLabels>,
}

impl SavVariable {
    /// Create a numeric variable with the default `F8.2` format.
    #[must_use]
    pub fn numeric(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            var_type: SavType::Numeric,
            print_format: SavFormat::NUMERIC,
            write_format: SavFormat::NUMERIC,
            missing: MissingValues::None,
            value_labels: None,
        }
    }

    /// Create a string variable of the given byte width.
    #[must_use]
    pub fn string(name: impl Into<String>, width: usize) -> Self {
        Self {
            name: name.into(),
            label: None,
            var_type: SavType::String { width },
            print_format: SavFormat::string(width),
            write_format: SavFormat::string(width),
            missing: MissingValues::None,
            value_labels: None,
        }
    }

    /// Set the variable label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set print and write formats.
    #[must_use]
    pub fn with_format(mut self, format: SavFormat) -> Self {
        self.print_format = format;
        self.write_format = format;
        self
    }

    /// Set user-missing declarations.
    #[must_use]
    pub fn with_missing(mut self, missing: MissingValues) -> Self {
        self.missing = missing;
        self
    }

    /// Attach value labels.
    #[must_use]
    pub fn with_value_labels(mut self, labels: ValueLabels) -> Self {
        self.value_labels = Some(labels);
        self
    }

    /// Label if present and not blank.
    #[must_use]
    pub fn display_label(&self) -> Option<&str> {
        self.label
            .as_deref()
            .map(str::trim)
            .filter(|label| !label.is_empty())
    }
}
