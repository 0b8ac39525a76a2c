//! CLI argument definitions for the SAV converter.

use std::path::PathBuf;

use clap::{Args, Parser, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

/// Default output directory.
pub const DEFAULT_OUTPUT_DIR: &str = "Converted";

#[derive(Parser)]
#[command(
    name = "savx",
    version,
    about = "Convert SPSS .sav files to Excel workbooks",
    long_about = "Convert SPSS .sav files to Excel workbooks.\n\n\
                  Column headers use the variable labels. Known date variables\n\
                  are written as YYYY-MM-DD. Directories are searched recursively."
)]
pub struct Cli {
    #[command(flatten)]
    pub convert: ConvertArgs,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(long = "log-format", value_enum, default_value = "pretty")]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    /// Input .sav files or directories to search.
    #[arg(value_name = "INPUTS", required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,

    /// Directory for the converted workbooks.
    #[arg(
        short = 'o',
        long = "output-dir",
        value_name = "DIR",
        default_value = DEFAULT_OUTPUT_DIR
    )]
    pub output_dir: PathBuf,

    /// Use batch mode even for a single file.
    #[arg(long = "batch")]
    pub batch: bool,

    /// Variable to decode as a date (repeatable; replaces the defaults).
    #[arg(long = "date-column", value_name = "NAME")]
    pub date_columns: Vec<String>,

    /// Leave date variables as raw SPSS seconds.
    #[arg(long = "no-dates", conflicts_with = "date_columns")]
    pub no_dates: bool,

    /// Package converted files into a ZIP in the output directory.
    #[arg(long = "zip")]
    pub zip: bool,

    /// Write the batch report as JSON.
    #[arg(long = "report", value_name = "PATH")]
    pub report: Option<PathBuf>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
