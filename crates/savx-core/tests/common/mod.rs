//! Shared fixtures for conversion tests.

#![allow(dead_code)]

use std::io::Read;
use std::path::{Path, PathBuf};

use savx_sav::{
    FormatKind, SavDataset, SavFormat, SavValue, SavVariable, ValueLabels, write_sav,
};

/// SPSS seconds for 1970-01-01.
pub const UNIX_EPOCH_SECONDS: f64 = 12_219_379_200.0;

/// A small survey with labels, value labels and a date variable.
pub fn survey_dataset() -> SavDataset {
    let mut dataset = SavDataset::with_variables(vec![
        SavVariable::string("Patient", 8).with_label("Patient ID"),
        SavVariable::numeric("Date_Discussed_MTB")
            .with_label("Date discussed at MTB")
            .with_format(SavFormat {
                kind: FormatKind::Date,
                width: 11,
                decimals: 0,
            }),
        SavVariable::numeric("Site")
            .with_label("Study site")
            .with_value_labels(ValueLabels::Numeric(vec![
                (1.0, "Amsterdam".to_string()),
                (2.0, "Berlin".to_string()),
            ])),
        SavVariable::numeric("Score"),
    ]);
    dataset.add_row(vec![
        SavValue::text("P001"),
        SavValue::numeric(UNIX_EPOCH_SECONDS),
        SavValue::numeric(1.0),
        SavValue::numeric(7.5),
    ]);
    dataset.add_row(vec![
        SavValue::text("P002"),
        SavValue::numeric_missing(),
        SavValue::numeric(2.0),
        SavValue::numeric(3.0),
    ]);
    dataset
}

/// A date variable with a labeled "not done" code next to a site code
/// without a label.
pub fn coded_dataset() -> SavDataset {
    let mut dataset = SavDataset::with_variables(vec![
        SavVariable::numeric("Date_Discussed_MTB")
            .with_format(SavFormat {
                kind: FormatKind::Date,
                width: 11,
                decimals: 0,
            })
            .with_value_labels(ValueLabels::Numeric(vec![(999.0, "Not done".to_string())])),
        SavVariable::numeric("Site").with_value_labels(ValueLabels::Numeric(vec![(
            1.0,
            "Amsterdam".to_string(),
        )])),
    ]);
    dataset.add_row(vec![
        SavValue::numeric(UNIX_EPOCH_SECONDS),
        SavValue::numeric(1.0),
    ]);
    dataset.add_row(vec![SavValue::numeric(999.0), SavValue::numeric(3.0)]);
    dataset
}

/// Write `dataset` to `path`, creating parent directories.
pub fn write_dataset(path: &Path, dataset: &SavDataset) -> PathBuf {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    write_sav(path, dataset).unwrap();
    path.to_path_buf()
}

/// Write the survey fixture to `path`, creating parent directories.
pub fn write_survey(path: &Path) -> PathBuf {
    write_dataset(path, &survey_dataset())
}

/// Write bytes that are not a SAV file.
pub fn write_corrupt(path: &Path) -> PathBuf {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, b"this is not an SPSS file").unwrap();
    path.to_path_buf()
}

/// Read one part of an xlsx package as text.
pub fn xlsx_part(workbook: &Path, part: &str) -> String {
    let file = std::fs::File::open(workbook).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let mut text = String::new();
    archive
        .by_name(part)
        .unwrap()
        .read_to_string(&mut text)
        .unwrap();
    text
}

/// The XML of one cell of the first worksheet, if the cell was written.
pub fn sheet_cell(workbook: &Path, reference: &str) -> Option<String> {
    let sheet = xlsx_part(workbook, "xl/worksheets/sheet1.xml");
    let start = sheet.find(&format!(r#"<c r="{reference}""#))?;
    let end = sheet[start..].find("</c>")? + start;
    Some(sheet[start..end].to_string())
}

/// The shared strings of a workbook, where all text cells live.
pub fn shared_strings(workbook: &Path) -> String {
    xlsx_part(workbook, "xl/sharedStrings.xml")
}
