//! SAV record parsing.
//!
//! This module handles the records preceding the case data:
//! - File header (byte order, compression, case count)
//! - Dictionary records (variables, value labels, documents)
//! - Extension records (long names, very long strings, encoding)

pub mod cursor;
pub mod dictionary;
pub mod file;

// Re-export commonly used items
pub use cursor::{ByteCursor, Endian, decode_f64, decode_i32};
pub use dictionary::{
    Dictionary, EXT_ENCODING, EXT_FLOAT_INFO, EXT_INTEGER_INFO, EXT_LONG_NAMES,
    EXT_VERY_LONG_STRINGS, REC_DOCUMENT, REC_EXTENSION, REC_TERMINATOR, REC_VALUE_LABEL_VARS,
    REC_VALUE_LABELS, REC_VARIABLE, RawValueLabels, RawVariable, SEGMENT_DATA_LEN,
    parse_dictionary, parse_key_values,
};
pub use file::{FileHeader, HEADER_LEN, MAGIC_SAV, MAGIC_ZSAV, detect_endian, parse_file_header};
