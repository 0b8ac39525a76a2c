//! User-missing value declarations.
//!
//! A variable record carries a missing-value count:
//!
//! | Count | Meaning                                   |
//! |-------|-------------------------------------------|
//! | 0     | no user-missing values                    |
//! | 1..=3 | that many discrete values                 |
//! | -2    | a range `low..=high`                      |
//! | -3    | a range plus one discrete value           |
//!
//! The system-missing value is separate and always missing.

/// System-missing numeric value (`-DBL_MAX`).
pub const SYSMIS: f64 = -f64::MAX;

/// User-missing values declared for a variable.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum MissingValues {
    /// No user-missing values.
    #[default]
    None,
    /// Numeric discrete values and an optional inclusive range.
    Numeric {
        values: Vec<f64>,
        range: Option<(f64, f64)>,
    },
    /// String discrete values (compared after trimming trailing spaces).
    Text(Vec<String>),
}

impl MissingValues {
    /// Whether a numeric value is declared missing.
    #[must_use]
    pub fn is_missing_number(&self, value: f64) -> bool {
        match self {
            Self::Numeric { values, range } => {
                values.iter().any(|candidate| *candidate == value)
                    || range.is_some_and(|(low, high)| value >= low && value <= high)
            }
            Self::None | Self::Text(_) => false,
        }
    }

    /// Whether a string value is declared missing.
    #[must_use]
    pub fn is_missing_text(&self, value: &str) -> bool {
        match self {
            Self::Text(values) => values
                .iter()
                .any(|candidate| candidate.trim_end() == value.trim_end()),
            Self::None | Self::Numeric { .. } => false,
        }
    }

    /// Whether any value is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::None => true,
            Self::Numeric { values, range } => values.is_empty() && range.is_none(),
            Self::Text(values) => values.is_empty(),
        }
    }
}
