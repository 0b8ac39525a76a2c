//! Command execution.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use savx_core::{
    BatchReport, ConversionEngine, ConversionResult, ConvertOptions, convert_batch, convert_one,
    resolve_inputs, write_archive,
};
use tracing::{info, info_span};

use crate::cli::ConvertArgs;

/// What a run did.
#[derive(Debug)]
pub enum RunOutcome {
    /// The inputs resolved to no files.
    NoInputs,
    /// One file converted without batch mode.
    Single {
        result: ConversionResult,
        report_path: Option<PathBuf>,
    },
    Batch {
        report: BatchReport,
        output_dir: PathBuf,
        archive: Option<PathBuf>,
        report_path: Option<PathBuf>,
    },
}

impl RunOutcome {
    /// Process exit code: 0 only when every file converted.
    pub fn exit_code(&self) -> i32 {
        let ok = match self {
            Self::NoInputs => false,
            Self::Single { result, .. } => result.is_success(),
            Self::Batch { report, .. } => report.all_succeeded(),
        };
        i32::from(!ok)
    }
}

/// Conversion options from CLI flags.
pub fn convert_options(args: &ConvertArgs) -> ConvertOptions {
    let options = ConvertOptions::new();
    if args.no_dates {
        options.without_dates()
    } else if args.date_columns.is_empty() {
        options
    } else {
        options.with_date_columns(args.date_columns.iter().cloned())
    }
}

/// Resolve inputs and convert them.
///
/// Per-file failures are part of the outcome. Errors are reserved for
/// problems that stop the whole run.
pub fn run_convert(args: &ConvertArgs) -> Result<RunOutcome> {
    let inputs = resolve_inputs(&args.inputs);
    if inputs.is_empty() {
        return Ok(RunOutcome::NoInputs);
    }

    let engine = ConversionEngine::new(convert_options(args));
    if args.batch || inputs.len() > 1 {
        run_batch(&engine, &inputs, args)
    } else {
        run_single(&engine, &inputs[0], args)
    }
}

fn run_single(engine: &ConversionEngine, input: &Path, args: &ConvertArgs) -> Result<RunOutcome> {
    std::fs::create_dir_all(&args.output_dir).with_context(|| {
        format!(
            "failed to create output directory {}",
            args.output_dir.display()
        )
    })?;
    let result = convert_one(engine, input, &args.output_dir);

    let report_path = match &args.report {
        Some(path) => {
            let mut report = BatchReport::default();
            report.push(result.clone());
            write_report(&report, path)?;
            Some(path.clone())
        }
        None => None,
    };
    Ok(RunOutcome::Single {
        result,
        report_path,
    })
}

fn run_batch(engine: &ConversionEngine, inputs: &[PathBuf], args: &ConvertArgs) -> Result<RunOutcome> {
    let span = info_span!("run", inputs = inputs.len());
    let _guard = span.enter();

    let report = convert_batch(engine, inputs, &args.output_dir)?;

    let archive = if args.zip && !report.successes.is_empty() {
        Some(write_archive(&report.successes, &args.output_dir)?)
    } else {
        None
    };
    let report_path = match &args.report {
        Some(path) => {
            write_report(&report, path)?;
            Some(path.clone())
        }
        None => None,
    };

    Ok(RunOutcome::Batch {
        report,
        output_dir: args.output_dir.clone(),
        archive,
        report_path,
    })
}

/// Write a report as pretty JSON.
pub fn write_report(report: &BatchReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("serialize report")?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write report {}", path.display()))?;
    info!(path = %path.display(), "wrote report");
    Ok(())
}
