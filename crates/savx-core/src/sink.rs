//! Table sinks: where converted tables go.

use std::path::Path;

use polars::prelude::{Column, DataFrame, DataType, PolarsError};
use rust_xlsxwriter::{ColNum, Format, RowNum, Workbook, Worksheet, XlsxError};
use tempfile::Builder;
use thiserror::Error;
use tracing::debug;

use crate::error::{ConvertError, Result};
use crate::metadata::CodeLabels;

/// Default worksheet name.
pub const SHEET_NAME: &str = "Sheet1";

/// A table ready to be written: values plus the header row.
#[derive(Debug, Clone)]
pub struct OutputTable {
    pub frame: DataFrame,
    /// One header per frame column, in frame order.
    pub headers: Vec<String>,
    /// Numeric code labels per frame column, in frame order.
    pub code_labels: Vec<Option<CodeLabels>>,
}

impl OutputTable {
    /// Create an output table without code labels.
    #[must_use]
    pub fn new(frame: DataFrame, headers: Vec<String>) -> Self {
        let code_labels = vec![None; frame.width()];
        Self {
            frame,
            headers,
            code_labels,
        }
    }

    /// Set the code labels, one entry per frame column.
    #[must_use]
    pub fn with_code_labels(mut self, code_labels: Vec<Option<CodeLabels>>) -> Self {
        self.code_labels = code_labels;
        self
    }

    /// Code labels of the column at `index`.
    #[must_use]
    pub fn code_labels_at(&self, index: usize) -> Option<&CodeLabels> {
        self.code_labels.get(index).and_then(Option::as_ref)
    }

    /// Number of data rows.
    #[must_use]
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Number of columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.frame.width()
    }
}

/// Capability to persist an output table.
pub trait TableSink {
    /// Write `table` to `output`. No partial file is left on failure.
    fn write_table(&self, table: &OutputTable, output: &Path) -> Result<()>;
}

/// Writes `.xlsx` workbooks with a single worksheet.
#[derive(Debug, Clone, Default)]
pub struct XlsxSink;

impl XlsxSink {
    /// Create an xlsx sink.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl TableSink for XlsxSink {
    fn write_table(&self, table: &OutputTable, output: &Path) -> Result<()> {
        let write_err = |message: String| ConvertError::Write {
            path: output.to_path_buf(),
            message,
        };

        let mut workbook = Workbook::new();
        fill_worksheet(workbook.add_worksheet(), table)
            .map_err(|err| write_err(err.to_string()))?;

        // Write next to the target, then rename over it.
        let parent = output
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let temp = Builder::new()
            .prefix(".savx-")
            .suffix(".xlsx.tmp")
            .tempfile_in(parent)
            .map_err(|err| write_err(err.to_string()))?;
        workbook
            .save(temp.path())
            .map_err(|err| write_err(err.to_string()))?;
        temp.persist(output)
            .map_err(|err| write_err(err.error.to_string()))?;

        debug!(
            output = %output.display(),
            rows = table.height(),
            columns = table.width(),
            "wrote workbook"
        );
        Ok(())
    }
}

fn fill_worksheet(
    sheet: &mut Worksheet,
    table: &OutputTable,
) -> std::result::Result<(), CellError> {
    sheet.set_name(SHEET_NAME)?;
    let header_format = Format::new().set_bold();
    for (index, header) in table.headers.iter().enumerate() {
        sheet.write_string_with_format(0, col_num(index)?, header, &header_format)?;
    }
    for (index, column) in table.frame.get_columns().iter().enumerate() {
        write_column(sheet, col_num(index)?, column, table.code_labels_at(index))?;
    }
    Ok(())
}

/// Worksheet fill failure.
#[derive(Debug, Error)]
enum CellError {
    #[error(transparent)]
    Xlsx(#[from] XlsxError),
    #[error(transparent)]
    Frame(#[from] PolarsError),
    #[error("{0}")]
    Limit(String),
}

fn col_num(index: usize) -> std::result::Result<ColNum, CellError> {
    ColNum::try_from(index)
        .map_err(|_| CellError::Limit(format!("column {index} exceeds the worksheet limit")))
}

fn row_num(index: usize) -> std::result::Result<RowNum, CellError> {
    // Row 0 holds the headers.
    RowNum::try_from(index + 1)
        .map_err(|_| CellError::Limit(format!("row {index} exceeds the worksheet limit")))
}

/// Labeled numeric codes become text cells; other numbers stay numeric.
fn write_column(
    sheet: &mut Worksheet,
    col: ColNum,
    column: &Column,
    labels: Option<&CodeLabels>,
) -> std::result::Result<(), CellError> {
    let dtype = column.dtype();
    if dtype.is_primitive_numeric() {
        let numbers = column.cast(&DataType::Float64)?;
        for (index, value) in numbers.f64()?.into_iter().enumerate() {
            // Excel has no NaN or infinity; leave those cells empty.
            let Some(value) = value.filter(|value| value.is_finite()) else {
                continue;
            };
            let row = row_num(index)?;
            match labels.and_then(|labels| labels.label_for(value)) {
                Some(label) => sheet.write_string(row, col, label)?,
                None => sheet.write_number(row, col, value)?,
            };
        }
    } else if dtype == &DataType::Boolean {
        for (index, value) in column.bool()?.into_iter().enumerate() {
            if let Some(value) = value {
                sheet.write_boolean(row_num(index)?, col, value)?;
            }
        }
    } else {
        let text = column.cast(&DataType::String)?;
        for (index, value) in text.str()?.into_iter().enumerate() {
            if let Some(value) = value {
                sheet.write_string(row_num(index)?, col, value)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use polars::prelude::{NamedFrom, Series};

    use super::*;

    fn sample_table() -> OutputTable {
        let frame = DataFrame::new(vec![
            Series::new("age".into(), vec![Some(41.0), None, Some(f64::NAN)]).into(),
            Series::new("site".into(), vec![Some("AMS"), Some("BER"), None]).into(),
        ])
        .unwrap();
        OutputTable::new(frame, vec!["Age".to_string(), "Age".to_string()])
    }

    #[test]
    fn test_writes_workbook_and_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("survey.xlsx");
        XlsxSink::new().write_table(&sample_table(), &output).unwrap();

        let bytes = std::fs::read(&output).unwrap();
        assert!(bytes.starts_with(b"PK"));
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("survey.xlsx")]);
    }

    #[test]
    fn test_code_labels_resolved_per_cell() {
        let frame = DataFrame::new(vec![
            Series::new("site".into(), vec![Some(1.0), Some(3.0), None]).into(),
        ])
        .unwrap();
        let table = OutputTable::new(frame, vec!["Site".to_string()]).with_code_labels(vec![
            Some(CodeLabels::new([(1.0, "Amsterdam".to_string())])),
        ]);
        assert_eq!(table.code_labels_at(0).map(CodeLabels::len), Some(1));
        assert!(table.code_labels_at(1).is_none());

        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("sites.xlsx");
        XlsxSink::new().write_table(&table, &output).unwrap();

        let mut archive = zip::ZipArchive::new(std::fs::File::open(&output).unwrap()).unwrap();
        let mut sheet = String::new();
        archive
            .by_name("xl/worksheets/sheet1.xml")
            .unwrap()
            .read_to_string(&mut sheet)
            .unwrap();
        // A2 is the "Amsterdam" label, A3 the unlabeled code 3 as a number.
        assert!(sheet.contains(r#"<c r="A2" t="s">"#));
        assert!(sheet.contains(r#"<c r="A3"><v>3</v></c>"#));
        assert!(!sheet.contains(r#"r="A4""#));
    }

    #[test]
    fn test_missing_directory_is_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("absent").join("survey.xlsx");
        let err = XlsxSink::new()
            .write_table(&sample_table(), &output)
            .unwrap_err();
        assert!(matches!(err, ConvertError::Write { .. }));
        assert!(!output.exists());
    }
}
