//! Core types for SAV file handling.
//!
//! This module provides the data structures for representing SPSS system
//! files: variables and their formats, value labels, missing-value
//! declarations, case values, and reader/writer options.

mod dataset;
mod format;
mod missing;
mod options;
mod value;
mod variable;

pub use dataset::{Compression, SavDataset, SavHeader};
pub use format::{FormatKind, SavFormat};
pub use missing::{MissingValues, SYSMIS};
pub use options::{SavReaderOptions, SavWriterOptions};
pub use value::SavValue;
pub use variable::{SavType, SavVariable, ValueLabels};
