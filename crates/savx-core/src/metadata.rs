//! Column metadata and output headers.

use savx_sav::{SavType, SavVariable, ValueLabels};
use serde::{Deserialize, Serialize};

/// How a column's values are represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    String,
    /// Coded values resolved to their value labels.
    Labeled,
}

/// Labels for numeric codes.
///
/// A labeled numeric column keeps its codes as numbers; the sink writes the
/// label for a labeled code and the number for any other value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeLabels {
    entries: Vec<(f64, String)>,
}

impl CodeLabels {
    #[must_use]
    pub fn new(entries: impl IntoIterator<Item = (f64, String)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Label for a code, if it has one.
    #[must_use]
    pub fn label_for(&self, code: f64) -> Option<&str> {
        self.entries
            .iter()
            .find(|(value, _)| *value == code)
            .map(|(_, label)| label.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Metadata for one dataset column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    /// Variable name, unique within the dataset.
    pub name: String,
    /// Variable label.
    pub label: Option<String>,
    /// Print format such as `DATE11` or `F8.2`.
    pub format: Option<String>,
    pub kind: ColumnKind,
    /// Labels for numeric codes, resolved per cell when writing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_labels: Option<CodeLabels>,
}

impl ColumnMetadata {
    /// Create metadata for an unlabeled column.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            label: None,
            format: None,
            kind,
            code_labels: None,
        }
    }

    /// Set the variable label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Attach numeric code labels, marking the column as labeled.
    #[must_use]
    pub fn with_code_labels(mut self, labels: CodeLabels) -> Self {
        self.kind = ColumnKind::Labeled;
        self.code_labels = Some(labels);
        self
    }

    /// Describe a SAV variable as it appears in the DataFrame.
    #[must_use]
    pub fn from_variable(variable: &SavVariable, labels_applied: bool) -> Self {
        let labeled = labels_applied
            && variable
                .value_labels
                .as_ref()
                .is_some_and(|labels| !labels.is_empty());
        let kind = match variable.var_type {
            _ if labeled => ColumnKind::Labeled,
            SavType::Numeric => ColumnKind::Numeric,
            SavType::String { .. } => ColumnKind::String,
        };
        let code_labels = match (&variable.value_labels, variable.var_type) {
            (Some(ValueLabels::Numeric(entries)), SavType::Numeric) if labeled => {
                Some(CodeLabels::new(entries.iter().cloned()))
            }
            _ => None,
        };
        Self {
            name: variable.name.clone(),
            label: variable.label.clone(),
            format: Some(variable.print_format.to_string()),
            kind,
            code_labels,
        }
    }

    /// Output header: the label as written, or the name when the label is
    /// missing or blank.
    #[must_use]
    pub fn header(&self) -> &str {
        self.label
            .as_deref()
            .filter(|label| !label.trim().is_empty())
            .unwrap_or(&self.name)
    }
}

/// Variable name to output header, in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    entries: Vec<(String, String)>,
}

impl HeaderMap {
    /// Build the headers for a set of columns.
    #[must_use]
    pub fn from_columns(columns: &[ColumnMetadata]) -> Self {
        Self {
            entries: columns
                .iter()
                .map(|column| (column.name.clone(), column.header().to_string()))
                .collect(),
        }
    }

    /// Header for a variable name.
    #[must_use]
    pub fn header_for(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, header)| header.as_str())
    }

    /// Headers in column order.
    #[must_use]
    pub fn headers(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|(_, header)| header.clone())
            .collect()
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use savx_sav::ValueLabels;

    use super::*;

    #[test]
    fn test_header_prefers_label() {
        let columns = vec![
            ColumnMetadata::new("Age", ColumnKind::Numeric).with_label("Age in years"),
            ColumnMetadata::new("Site", ColumnKind::String).with_label("   "),
            ColumnMetadata::new("Id", ColumnKind::String),
            ColumnMetadata::new("Dup", ColumnKind::Numeric).with_label("Age in years"),
            ColumnMetadata::new("Weight", ColumnKind::Numeric).with_label(" Weight (kg) "),
        ];
        let headers = HeaderMap::from_columns(&columns);
        assert_eq!(
            headers.headers(),
            vec!["Age in years", "Site", "Id", "Age in years", " Weight (kg) "]
        );
        assert_eq!(headers.header_for("Site"), Some("Site"));
        assert_eq!(headers.header_for("Nope"), None);
        assert_eq!(headers.len(), 5);
    }

    #[test]
    fn test_from_variable_kind() {
        let variable = SavVariable::numeric("sex")
            .with_value_labels(ValueLabels::Numeric(vec![(1.0, "Male".to_string())]));
        let labeled = ColumnMetadata::from_variable(&variable, true);
        assert_eq!(labeled.kind, ColumnKind::Labeled);
        let codes = labeled.code_labels.unwrap();
        assert_eq!(codes.label_for(1.0), Some("Male"));
        assert_eq!(codes.label_for(2.0), None);

        let raw = ColumnMetadata::from_variable(&variable, false);
        assert_eq!(raw.kind, ColumnKind::Numeric);
        assert!(raw.code_labels.is_none());
        let text = SavVariable::string("site", 8).with_label("Site");
        let meta = ColumnMetadata::from_variable(&text, true);
        assert_eq!(meta.kind, ColumnKind::String);
        assert!(meta.code_labels.is_none());
        assert_eq!(meta.format.as_deref(), Some("A8"));
        assert_eq!(meta.header(), "Site");
    }
}
