//! File header record.
//!
//! # Structure (176 bytes)
//!
//! | Offset  | Field             | Type      | Description                      |
//! |---------|-------------------|-----------|----------------------------------|
//! | 0-3     | rec_type          | char[4]   | `$FL2` (or `$FL3` for zsav)      |
//! | 4-63    | prod_name         | char[60]  | Product identification           |
//! | 64-67   | layout_code       | int32     | 2 or 3; reveals byte order       |
//! | 68-71   | nominal_case_size | int32     | 8-byte slots per case, or -1     |
//! | 72-75   | compression       | int32     | 0 none, 1 bytecode, 2 zlib       |
//! | 76-79   | weight_index      | int32     | 1-based slot of weight, or 0     |
//! | 80-83   | ncases            | int32     | Number of cases, or -1           |
//! | 84-91   | bias              | float64   | Compression bias (usually 100)   |
//! | 92-100  | creation_date     | char[9]   | `dd mmm yy`                      |
//! | 101-108 | creation_time     | char[8]   | `hh:mm:ss`                       |
//! | 109-172 | file_label        | char[64]  | File label                       |
//! | 173-175 | padding           | char[3]   |                                  |

use crate::error::{Result, SavError};
use crate::types::Compression;

use super::cursor::{ByteCursor, Endian, decode_i32};

/// Header record length.
pub const HEADER_LEN: usize = 176;

/// Magic for uncompressed and bytecode files.
pub const MAGIC_SAV: &[u8; 4] = b"$FL2";

/// Magic for zlib-compressed files.
pub const MAGIC_ZSAV: &[u8; 4] = b"$FL3";

/// Parsed file header.
#[derive(Debug, Clone, PartialEq)]
pub struct FileHeader {
    pub product: Vec<u8>,
    pub endian: Endian,
    pub layout_code: i32,
    pub nominal_case_size: Option<usize>,
    pub compression: Compression,
    pub weight_index: usize,
    pub case_count: Option<usize>,
    pub bias: f64,
    pub creation_date: Vec<u8>,
    pub creation_time: Vec<u8>,
    pub file_label: Vec<u8>,
}

/// Detect byte order from the layout code at offset 64.
pub fn detect_endian(data: &[u8]) -> Result<Endian> {
    let bytes: [u8; 4] = data
        .get(64..68)
        .and_then(|slice| slice.try_into().ok())
        .ok_or(SavError::Truncated {
            offset: data.len(),
            needed: 68usize.saturating_sub(data.len()),
        })?;
    for endian in [Endian::Little, Endian::Big] {
        if matches!(decode_i32(bytes, endian), 2 | 3) {
            return Ok(endian);
        }
    }
    Err(SavError::invalid_format("unrecognized layout code"))
}

/// Parse the header record at the start of `data`.
pub fn parse_file_header(data: &[u8]) -> Result<FileHeader> {
    if data.len() < HEADER_LEN {
        return Err(SavError::invalid_format("file too small"));
    }
    let magic = &data[0..4];
    if magic == MAGIC_ZSAV {
        return Err(SavError::UnsupportedCompression {
            scheme: "zlib (.zsav)".to_string(),
        });
    }
    if magic != MAGIC_SAV {
        return Err(SavError::invalid_format("missing $FL2 signature"));
    }

    let endian = detect_endian(data)?;
    let mut cursor = ByteCursor::new(data, 4, endian);
    let product = cursor.take(60)?.to_vec();
    let layout_code = cursor.i32()?;
    let nominal_case_size = usize::try_from(cursor.i32()?).ok();
    let compression_code = cursor.i32()?;
    let compression = Compression::from_code(compression_code).ok_or_else(|| {
        SavError::invalid_format(format!("unknown compression code {compression_code}"))
    })?;
    if compression == Compression::Zlib {
        return Err(SavError::UnsupportedCompression {
            scheme: "zlib".to_string(),
        });
    }
    let weight_index = usize::try_from(cursor.i32()?).unwrap_or(0);
    let case_count = usize::try_from(cursor.i32()?).ok();
    let bias = cursor.f64()?;
    let creation_date = cursor.take(9)?.to_vec();
    let creation_time = cursor.take(8)?.to_vec();
    let file_label = cursor.take(64)?.to_vec();

    Ok(FileHeader {
        product,
        endian,
        layout_code,
        nominal_case_size,
        compression,
        weight_index,
        case_count,
        bias,
        creation_date,
        creation_time,
        file_label,
    })
}
