//! Dataset sources: where parsed tables come from.

use std::path::Path;

use polars::prelude::DataFrame;
use savx_sav::{SavReaderOptions, read_sav_to_dataframe};
use tracing::debug;

use crate::error::{ConvertError, Result};
use crate::metadata::ColumnMetadata;

/// A parsed dataset: values plus per-column metadata in frame order.
#[derive(Debug, Clone)]
pub struct ParsedDataset {
    pub frame: DataFrame,
    pub columns: Vec<ColumnMetadata>,
}

impl ParsedDataset {
    /// Create a parsed dataset.
    #[must_use]
    pub fn new(frame: DataFrame, columns: Vec<ColumnMetadata>) -> Self {
        Self { frame, columns }
    }

    /// Metadata for a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnMetadata> {
        self.columns.iter().find(|column| column.name == name)
    }
}

/// Capability to parse an input file into a dataset.
pub trait DatasetSource {
    /// Parse `input`. Date values are returned as raw numbers.
    fn parse_dataset(&self, input: &Path) -> Result<ParsedDataset>;
}

/// Reads SPSS `.sav` files.
#[derive(Debug, Clone, Default)]
pub struct SavSource {
    options: SavReaderOptions,
}

impl SavSource {
    /// Create a source with reader options.
    #[must_use]
    pub fn new(options: SavReaderOptions) -> Self {
        Self { options }
    }
}

impl DatasetSource for SavSource {
    fn parse_dataset(&self, input: &Path) -> Result<ParsedDataset> {
        let (frame, variables) = read_sav_to_dataframe(input, &self.options)
            .map_err(|err| ConvertError::from_sav(input, err))?;
        let columns = variables
            .iter()
            .map(|variable| ColumnMetadata::from_variable(variable, self.options.apply_value_labels))
            .collect();
        debug!(
            input = %input.display(),
            rows = frame.height(),
            columns = frame.width(),
            "parsed dataset"
        );
        Ok(ParsedDataset { frame, columns })
    }
}
