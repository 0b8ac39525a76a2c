//! Batch orchestration with per-item failure isolation.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, info_span, warn};

use crate::engine::ConversionEngine;
use crate::error::{ConvertError, Result};
use crate::sink::TableSink;
use crate::source::DatasetSource;

/// Extension of converted files.
pub const OUTPUT_EXTENSION: &str = "xlsx";

/// Outcome of converting one input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ConversionResult {
    Success {
        input: PathBuf,
        output: PathBuf,
        file_name: String,
    },
    Failure {
        input: PathBuf,
        error: String,
    },
}

impl ConversionResult {
    /// Input this result belongs to.
    pub fn input(&self) -> &Path {
        match self {
            Self::Success { input, .. } | Self::Failure { input, .. } => input,
        }
    }

    /// Whether the conversion succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Output path on success.
    pub fn output(&self) -> Option<&Path> {
        match self {
            Self::Success { output, .. } => Some(output),
            Self::Failure { .. } => None,
        }
    }

    /// Error message on failure.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error, .. } => Some(error),
        }
    }

    /// File name of the input, for display.
    pub fn input_name(&self) -> String {
        display_name(self.input())
    }
}

/// Results of a batch, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub total: usize,
    pub successes: Vec<ConversionResult>,
    pub failures: Vec<ConversionResult>,
    /// Whether each pushed result succeeded, in push order.
    #[serde(skip)]
    outcomes: Vec<bool>,
}

impl BatchReport {
    /// Record one result.
    pub fn push(&mut self, result: ConversionResult) {
        self.total += 1;
        self.outcomes.push(result.is_success());
        if result.is_success() {
            self.successes.push(result);
        } else {
            self.failures.push(result);
        }
    }

    /// All results in the order they were pushed.
    ///
    /// A deserialized report has no push order; it lists successes, then
    /// failures.
    pub fn results(&self) -> Vec<&ConversionResult> {
        if self.outcomes.len() != self.successes.len() + self.failures.len() {
            return self.successes.iter().chain(&self.failures).collect();
        }
        let mut successes = self.successes.iter();
        let mut failures = self.failures.iter();
        self.outcomes
            .iter()
            .filter_map(|ok| if *ok { successes.next() } else { failures.next() })
            .collect()
    }

    pub fn success_count(&self) -> usize {
        self.successes.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Whether every input converted.
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Output files written, in input order.
    pub fn output_paths(&self) -> Vec<&Path> {
        self.successes
            .iter()
            .filter_map(ConversionResult::output)
            .collect()
    }
}

/// Output file name for an input: its stem plus `.xlsx`.
///
/// ```
/// use std::path::Path;
/// use savx_core::output_file_name;
///
/// assert_eq!(output_file_name(Path::new("data/2024/survey.sav")), "survey.xlsx");
/// ```
pub fn output_file_name(input: &Path) -> String {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "output".to_string());
    format!("{stem}.{OUTPUT_EXTENSION}")
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned())
}

/// Convert one input into `output_dir`. Errors become a failure result.
pub fn convert_one<S: DatasetSource, K: TableSink>(
    engine: &ConversionEngine<S, K>,
    input: &Path,
    output_dir: &Path,
) -> ConversionResult {
    let file_name = output_file_name(input);
    let output = output_dir.join(&file_name);
    match engine.convert(input, &output) {
        Ok(_) => ConversionResult::Success {
            input: input.to_path_buf(),
            output,
            file_name,
        },
        Err(err) => ConversionResult::Failure {
            input: input.to_path_buf(),
            error: err.to_string(),
        },
    }
}

/// Convert every input into `output_dir`.
///
/// The directory is created first; if that fails nothing is converted. A
/// failing item never stops the items after it.
pub fn convert_batch<S: DatasetSource, K: TableSink>(
    engine: &ConversionEngine<S, K>,
    inputs: &[PathBuf],
    output_dir: &Path,
) -> Result<BatchReport> {
    let span = info_span!("batch", total = inputs.len(), output_dir = %output_dir.display());
    let _guard = span.enter();

    std::fs::create_dir_all(output_dir).map_err(|source| ConvertError::OutputDirectory {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let total = inputs.len();
    let mut report = BatchReport::default();
    let mut written: HashSet<String> = HashSet::new();

    for (index, input) in inputs.iter().enumerate() {
        let name = display_name(input);
        info!(item = index + 1, total, file = %name, "converting");

        let file_name = output_file_name(input);
        if !written.insert(file_name.clone()) {
            warn!(
                file = %name,
                output = %file_name,
                "output name already used in this batch; overwriting"
            );
        }

        let result = convert_one(engine, input, output_dir);
        if let Some(error) = result.error() {
            warn!(file = %name, error, "conversion failed");
        }
        report.push(result);
    }

    info!(
        total = report.total,
        successful = report.success_count(),
        failed = report.failure_count(),
        "batch complete"
    );
    Ok(report)
}
