//! Front-end operations: convert uploads and describe the outcome.
//!
//! Every operation returns the produced file, if any, plus a status message
//! for display. Nothing here fails; errors end up in the message.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::archive::write_archive;
use crate::batch::{BatchReport, ConversionResult, convert_batch, convert_one};
use crate::discovery::is_sav_file;
use crate::engine::ConversionEngine;
use crate::sink::TableSink;
use crate::source::DatasetSource;

/// Message when no file was provided.
pub const MISSING_UPLOAD: &str = "Please upload a .sav file first.";

/// Message when the upload is not a `.sav` file.
pub const INVALID_UPLOAD: &str = "Please upload a valid .sav file.";

fn error_status(message: impl std::fmt::Display) -> String {
    format!("An error occurred: {message}")
}

/// Status line for one conversion.
pub fn single_status(result: &ConversionResult) -> String {
    match result {
        ConversionResult::Success { file_name, .. } => format!(
            "Successfully converted '{}' to '{file_name}'",
            result.input_name()
        ),
        ConversionResult::Failure { error, .. } => error_status(error),
    }
}

/// Multi-line summary of a batch.
pub fn batch_status(report: &BatchReport) -> String {
    let mut status = format!(
        "Total files: {}\nSuccessful: {}\nFailed: {}",
        report.total,
        report.success_count(),
        report.failure_count()
    );
    if !report.failures.is_empty() {
        status.push_str("\n\nFailed files:");
        for failure in &report.failures {
            let _ = write!(
                status,
                "\n  - {}: {}",
                failure.input_name(),
                failure.error().unwrap_or_default()
            );
        }
    }
    status
}

/// Convert a single upload into `output_dir`.
pub fn submit_single<S: DatasetSource, K: TableSink>(
    engine: &ConversionEngine<S, K>,
    upload: Option<&Path>,
    output_dir: &Path,
) -> (Option<PathBuf>, String) {
    let Some(input) = upload else {
        return (None, MISSING_UPLOAD.to_string());
    };
    if !is_sav_file(input) {
        return (None, INVALID_UPLOAD.to_string());
    }
    if let Err(err) = std::fs::create_dir_all(output_dir) {
        return (None, error_status(err));
    }

    let result = convert_one(engine, input, output_dir);
    let status = single_status(&result);
    (result.output().map(Path::to_path_buf), status)
}

/// Convert several uploads and package the successes into a ZIP.
///
/// No archive is produced when nothing converted.
pub fn submit_batch<S: DatasetSource, K: TableSink>(
    engine: &ConversionEngine<S, K>,
    uploads: &[PathBuf],
    output_dir: &Path,
) -> (Option<PathBuf>, String) {
    if uploads.is_empty() {
        return (None, MISSING_UPLOAD.to_string());
    }
    let report = match convert_batch(engine, uploads, output_dir) {
        Ok(report) => report,
        Err(err) => return (None, error_status(err)),
    };

    let status = batch_status(&report);
    if report.successes.is_empty() {
        return (None, status);
    }
    match write_archive(&report.successes, output_dir) {
        Ok(archive) => (Some(archive), status),
        Err(err) => (None, format!("{status}\n\n{}", error_status(err))),
    }
}
