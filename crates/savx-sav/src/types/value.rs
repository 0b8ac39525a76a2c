//! Case values.

/// A single cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum SavValue {
    /// Numeric value; `None` for system-missing or user-missing.
    Num(Option<f64>),
    /// String value; `None` for user-missing.
    Str(Option<String>),
}

impl SavValue {
    /// Create a present numeric value.
    #[must_use]
    pub fn numeric(value: f64) -> Self {
        Self::Num(Some(value))
    }

    /// Create a missing numeric value.
    #[must_use]
    pub fn numeric_missing() -> Self {
        Self::Num(None)
    }

    /// Create a present string value.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Str(Some(value.into()))
    }

    /// Whether the value is missing.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Num(None) | Self::Str(None))
    }

    /// Numeric content, if any.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Num(value) => *value,
            Self::Str(_) => None,
        }
    }

    /// String content, if any.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) => value.as_deref(),
            Self::Num(_) => None,
        }
    }
}
