//! SPSS system file (`.sav`) reader and writer.
//!
//! This crate reads the binary save files produced by SPSS and compatible
//! tools into a typed, in-memory dataset, and writes such datasets back.
//!
//! # Features
//!
//! - Little- and big-endian files, detected from the header layout code
//! - Uncompressed and bytecode-compressed case data
//! - Variable labels, value labels, user-missing values and ranges
//! - Long variable names and very long strings (over 255 bytes)
//! - Character encoding from the encoding record or the file codepage
//! - Optional Polars DataFrame integration (with `polars` feature)
//!
//! Zlib-compressed files (`.zsav`) are rejected with
//! [`SavError::UnsupportedCompression`].
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use savx_sav::{SavDataset, SavValue, SavVariable, read_sav, write_sav};
//!
//! // Read a SAV file
//! let dataset = read_sav(Path::new("survey.sav")).unwrap();
//! println!("{} variables, {} cases", dataset.num_variables(), dataset.num_rows());
//!
//! // Create a new dataset
//! let mut ds = SavDataset::with_variables(vec![
//!     SavVariable::string("site", 8).with_label("Study site"),
//!     SavVariable::numeric("age").with_label("Age in years"),
//! ]);
//! ds.add_row(vec![SavValue::text("AMS"), SavValue::numeric(41.0)]);
//!
//! write_sav(Path::new("out.sav"), &ds).unwrap();
//! ```
//!
//! # Missing Values
//!
//! The system-missing value and declared user-missing values both read as
//! missing:
//!
//! ```
//! use savx_sav::{MissingValues, SavValue};
//!
//! let declared = MissingValues::Numeric { values: vec![99.0], range: None };
//! assert!(declared.is_missing_number(99.0));
//! assert!(SavValue::numeric_missing().is_missing());
//! ```

mod data;
mod encoding;
mod error;
pub mod header;
mod reader;
mod types;
mod writer;

#[cfg(feature = "polars")]
mod polars_ext;

// Re-export error types
pub use error::{Result, SavError};

// Re-export core types
pub use types::{
    Compression, FormatKind, MissingValues, SYSMIS, SavDataset, SavFormat, SavHeader,
    SavReaderOptions, SavType, SavValue, SavVariable, SavWriterOptions, ValueLabels,
};

// Re-export encoding helpers
pub use encoding::{encoding_for_codepage, resolve_encoding};

// Re-export reader functionality
pub use reader::{SavReader, read_sav, read_sav_with_options};

// Re-export writer functionality
pub use writer::{MAX_STRING_WIDTH, SavWriter, write_sav, write_sav_with_options};

// Re-export Polars integration
#[cfg(feature = "polars")]
pub use polars_ext::{dataset_to_dataframe, read_sav_to_dataframe};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
