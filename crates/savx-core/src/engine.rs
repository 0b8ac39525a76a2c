//! The conversion engine: parse, relabel, decode dates, write.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, info_span};

use crate::dates::normalize_date_column;
use crate::error::Result;
use crate::metadata::{CodeLabels, ColumnMetadata, HeaderMap};
use crate::options::ConvertOptions;
use crate::sink::{OutputTable, TableSink, XlsxSink};
use crate::source::{DatasetSource, ParsedDataset, SavSource};

/// What a successful conversion produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputSummary {
    pub output: PathBuf,
    pub rows: usize,
    pub columns: usize,
    /// Variables whose values were decoded as dates.
    pub date_columns: Vec<String>,
}

/// Converts one dataset at a time from a source to a sink.
///
/// The default engine reads `.sav` files and writes `.xlsx` workbooks; tests
/// plug in other sources and sinks through [`ConversionEngine::with_parts`].
#[derive(Debug, Clone)]
pub struct ConversionEngine<S = SavSource, K = XlsxSink> {
    source: S,
    sink: K,
    options: ConvertOptions,
}

impl ConversionEngine {
    /// Create the `.sav` to `.xlsx` engine.
    #[must_use]
    pub fn new(options: ConvertOptions) -> Self {
        Self {
            source: SavSource::new(options.reader.clone()),
            sink: XlsxSink::new(),
            options,
        }
    }
}

impl Default for ConversionEngine {
    fn default() -> Self {
        Self::new(ConvertOptions::default())
    }
}

impl<S: DatasetSource, K: TableSink> ConversionEngine<S, K> {
    /// Create an engine from explicit parts.
    pub fn with_parts(source: S, sink: K, options: ConvertOptions) -> Self {
        Self {
            source,
            sink,
            options,
        }
    }

    /// Options in effect.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Apply headers and date decoding to a parsed dataset.
    ///
    /// Column set and order are preserved. Allow-listed variables that are
    /// absent from the dataset are ignored. Numeric code labels travel with
    /// the table, except on decoded date columns.
    pub fn transform(&self, dataset: ParsedDataset) -> Result<OutputTable> {
        self.transform_with_dates(dataset).map(|(table, _)| table)
    }

    /// Like [`Self::transform`], also naming the decoded date columns.
    fn transform_with_dates(&self, dataset: ParsedDataset) -> Result<(OutputTable, Vec<String>)> {
        let ParsedDataset { mut frame, columns } = dataset;
        let headers = HeaderMap::from_columns(&columns);

        let mut decoded: Vec<String> = Vec::new();
        if self.options.normalize_dates {
            for name in &self.options.date_columns {
                if decoded.contains(name) {
                    continue;
                }
                let Ok(column) = frame.column(name) else {
                    continue;
                };
                let labels = code_labels_of(&columns, name);
                let normalized = normalize_date_column(column, labels)?;
                frame.with_column(normalized)?;
                decoded.push(name.clone());
            }
        }
        if !decoded.is_empty() {
            debug!(columns = ?decoded, "decoded date columns");
        }

        let (header_row, code_labels): (Vec<String>, Vec<Option<CodeLabels>>) = frame
            .get_column_names()
            .iter()
            .map(|name| {
                let name = name.as_str();
                let header = headers.header_for(name).unwrap_or(name).to_string();
                let labels = if decoded.iter().any(|date| date == name) {
                    None
                } else {
                    code_labels_of(&columns, name).cloned()
                };
                (header, labels)
            })
            .unzip();
        let table = OutputTable::new(frame, header_row).with_code_labels(code_labels);
        Ok((table, decoded))
    }

    /// Convert `input` and write the result to `output`.
    pub fn convert(&self, input: &Path, output: &Path) -> Result<OutputSummary> {
        let span = info_span!("convert", input = %input.display());
        let _guard = span.enter();

        let dataset = self.source.parse_dataset(input)?;
        let (table, date_columns) = self.transform_with_dates(dataset)?;
        self.sink.write_table(&table, output)?;

        info!(
            output = %output.display(),
            rows = table.height(),
            columns = table.width(),
            "converted"
        );
        Ok(OutputSummary {
            output: output.to_path_buf(),
            rows: table.height(),
            columns: table.width(),
            date_columns,
        })
    }
}

fn code_labels_of<'a>(columns: &'a [ColumnMetadata], name: &str) -> Option<&'a CodeLabels> {
    columns
        .iter()
        .find(|column| column.name == name)
        .and_then(|column| column.code_labels.as_ref())
}
