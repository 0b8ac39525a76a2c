//! SAV to Excel conversion engine.
//!
//! This crate turns SPSS save files into single-sheet `.xlsx` workbooks
//! whose header row carries the variable labels, and runs such conversions
//! over many files with per-file failure isolation.
//!
//! # Features
//!
//! - **Engine**: parse, relabel headers, decode allow-listed date columns, write
//! - **Batch**: convert many files, collect a structured report
//! - **Discovery**: expand directories into sorted `.sav` inputs
//! - **Archive**: package converted files into a ZIP
//! - **Submission**: upload-style operations returning a file and a status line
//!
//! # Example
//!
//! ```no_run
//! use std::path::{Path, PathBuf};
//! use savx_core::{ConversionEngine, ConvertOptions, convert_batch, resolve_inputs};
//!
//! let engine = ConversionEngine::new(ConvertOptions::default());
//! let inputs: Vec<PathBuf> = resolve_inputs(&[Path::new("data")]);
//! let report = convert_batch(&engine, &inputs, Path::new("Converted")).unwrap();
//! println!("{} of {} converted", report.success_count(), report.total);
//! ```

mod archive;
mod batch;
mod dates;
mod discovery;
mod engine;
mod error;
mod metadata;
mod options;
mod sink;
mod source;
mod submission;

// === Error Types ===
pub use error::{ConvertError, Result};

// === Configuration ===
pub use options::{ConvertOptions, DEFAULT_DATE_COLUMNS};

// === Metadata ===
pub use metadata::{CodeLabels, ColumnKind, ColumnMetadata, HeaderMap};

// === Dates ===
pub use dates::{
    DATE_FORMAT, format_spss_date, normalize_date_column, spss_epoch, spss_seconds_to_date,
};

// === Sources and Sinks ===
pub use sink::{OutputTable, SHEET_NAME, TableSink, XlsxSink};
pub use source::{DatasetSource, ParsedDataset, SavSource};

// === Engine ===
pub use engine::{ConversionEngine, OutputSummary};

// === Batch ===
pub use batch::{
    BatchReport, ConversionResult, OUTPUT_EXTENSION, convert_batch, convert_one, output_file_name,
};

// === Discovery ===
pub use discovery::{SAV_EXTENSION, is_sav_file, resolve_inputs};

// === Archive ===
pub use archive::{archive_file_name, write_archive};

// === Submission ===
pub use submission::{
    INVALID_UPLOAD, MISSING_UPLOAD, batch_status, single_status, submit_batch, submit_single,
};
