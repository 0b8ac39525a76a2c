//! Dictionary records between the file header and the case data.
//!
//! | Record | Content                                            |
//! |--------|----------------------------------------------------|
//! | 2      | Variable (one per 8-byte slot, continuations = -1) |
//! | 3      | Value labels, always followed by a type 4 record   |
//! | 4      | Slot indices the preceding labels apply to         |
//! | 6      | Document lines (80 bytes each)                     |
//! | 7      | Extension record (subtype, size, count, payload)   |
//! | 999    | Dictionary terminator                              |
//!
//! Text is kept as raw bytes here; it is decoded once the character
//! encoding (itself an extension record) is known.

use tracing::debug;

use crate::error::{Result, SavError};

use super::cursor::{ByteCursor, decode_i32};

/// Variable record type.
pub const REC_VARIABLE: i32 = 2;
/// Value label record type.
pub const REC_VALUE_LABELS: i32 = 3;
/// Value label variable index record type.
pub const REC_VALUE_LABEL_VARS: i32 = 4;
/// Document record type.
pub const REC_DOCUMENT: i32 = 6;
/// Extension record type.
pub const REC_EXTENSION: i32 = 7;
/// Dictionary terminator record type.
pub const REC_TERMINATOR: i32 = 999;

/// Machine integer info extension subtype.
pub const EXT_INTEGER_INFO: i32 = 3;
/// Machine float info extension subtype.
pub const EXT_FLOAT_INFO: i32 = 4;
/// Long variable names extension subtype.
pub const EXT_LONG_NAMES: i32 = 13;
/// Very long string extension subtype.
pub const EXT_VERY_LONG_STRINGS: i32 = 14;
/// Character encoding extension subtype.
pub const EXT_ENCODING: i32 = 20;

/// Maximum bytes per very long string segment that carry data.
pub const SEGMENT_DATA_LEN: usize = 252;

/// Raw variable record.
#[derive(Debug, Clone, PartialEq)]
pub struct RawVariable {
    /// 0 numeric, 1..=255 string width, -1 continuation.
    pub type_code: i32,
    pub name: Vec<u8>,
    pub label: Option<Vec<u8>>,
    /// Raw missing-value count (see `MissingValues`).
    pub missing_count: i32,
    pub missing: Vec<[u8; 8]>,
    pub print_format: i32,
    pub write_format: i32,
}

impl RawVariable {
    /// Whether this record continues the previous string variable.
    pub fn is_continuation(&self) -> bool {
        self.type_code < 0
    }
}

/// Raw value label set and the slots it applies to.
#[derive(Debug, Clone, PartialEq)]
pub struct RawValueLabels {
    pub entries: Vec<([u8; 8], Vec<u8>)>,
    /// 1-based slot indices.
    pub slots: Vec<usize>,
}

/// All dictionary records of a file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dictionary {
    pub variables: Vec<RawVariable>,
    pub value_labels: Vec<RawValueLabels>,
    pub documents: Vec<Vec<u8>>,
    pub long_names: Option<Vec<u8>>,
    pub very_long_strings: Option<Vec<u8>>,
    pub encoding: Option<String>,
    pub codepage: Option<i32>,
    /// Offset of the first byte of case data.
    pub data_offset: usize,
}

/// Parse dictionary records up to and including the terminator.
pub fn parse_dictionary(cursor: &mut ByteCursor<'_>) -> Result<Dictionary> {
    let mut dictionary = Dictionary::default();

    loop {
        let offset = cursor.position();
        let record_type = cursor.i32()?;
        match record_type {
            REC_VARIABLE => {
                let index = dictionary.variables.len();
                dictionary.variables.push(parse_variable(cursor, index)?);
            }
            REC_VALUE_LABELS => {
                dictionary.value_labels.push(parse_value_labels(cursor)?);
            }
            REC_VALUE_LABEL_VARS => {
                return Err(SavError::invalid_format(format!(
                    "value label variable record without labels at offset {offset}"
                )));
            }
            REC_DOCUMENT => {
                let lines = cursor.len_field("document line count")?;
                let len = lines
                    .checked_mul(80)
                    .ok_or_else(|| SavError::invalid_format("document record too large"))?;
                let text = cursor.take(len)?;
                dictionary
                    .documents
                    .extend(text.chunks(80).map(<[u8]>::to_vec));
            }
            REC_EXTENSION => parse_extension(cursor, &mut dictionary)?,
            REC_TERMINATOR => {
                cursor.skip(4)?;
                dictionary.data_offset = cursor.position();
                return Ok(dictionary);
            }
            other => {
                return Err(SavError::invalid_format(format!(
                    "unknown record type {other} at offset {offset}"
                )));
            }
        }
    }
}

fn parse_variable(cursor: &mut ByteCursor<'_>, index: usize) -> Result<RawVariable> {
    let type_code = cursor.i32()?;
    if type_code > 255 || type_code < -1 {
        return Err(SavError::invalid_variable(
            index,
            format!("invalid type code {type_code}"),
        ));
    }
    let has_label = cursor.i32()?;
    let missing_count = cursor.i32()?;
    let print_format = cursor.i32()?;
    let write_format = cursor.i32()?;
    let name = cursor.take(8)?.to_vec();

    let label = match has_label {
        0 => None,
        1 => {
            let len = cursor.len_field("label length")?;
            let text = cursor.take(len)?.to_vec();
            cursor.skip(len.next_multiple_of(4) - len)?;
            Some(text)
        }
        other => {
            return Err(SavError::invalid_variable(
                index,
                format!("invalid label flag {other}"),
            ));
        }
    };

    let missing_slots = match missing_count {
        0..=3 => missing_count.unsigned_abs() as usize,
        -2 => 2,
        -3 => 3,
        other => {
            return Err(SavError::invalid_variable(
                index,
                format!("invalid missing value count {other}"),
            ));
        }
    };
    let mut missing = Vec::with_capacity(missing_slots);
    for _ in 0..missing_slots {
        missing.push(cursor.array::<8>()?);
    }

    Ok(RawVariable {
        type_code,
        name,
        label,
        missing_count,
        missing,
        print_format,
        write_format,
    })
}

fn parse_value_labels(cursor: &mut ByteCursor<'_>) -> Result<RawValueLabels> {
    let count = cursor.len_field("value label count")?;
    let mut entries = Vec::with_capacity(count.min(4096));
    for _ in 0..count {
        let value = cursor.array::<8>()?;
        let len = usize::from(cursor.u8()?);
        let label = cursor.take(len)?.to_vec();
        // Length byte plus label is padded to a multiple of 8.
        cursor.skip((len + 1).next_multiple_of(8) - (len + 1))?;
        entries.push((value, label));
    }

    let offset = cursor.position();
    if cursor.i32()? != REC_VALUE_LABEL_VARS {
        return Err(SavError::invalid_format(format!(
            "value labels not followed by variable index record at offset {offset}"
        )));
    }
    let var_count = cursor.len_field("value label variable count")?;
    let mut slots = Vec::with_capacity(var_count.min(4096));
    for _ in 0..var_count {
        slots.push(cursor.len_field("value label variable index")?);
    }

    Ok(RawValueLabels { entries, slots })
}

fn parse_extension(cursor: &mut ByteCursor<'_>, dictionary: &mut Dictionary) -> Result<()> {
    let subtype = cursor.i32()?;
    let size = cursor.len_field("extension element size")?;
    let count = cursor.len_field("extension element count")?;
    let len = size
        .checked_mul(count)
        .ok_or_else(|| SavError::invalid_format("extension record too large"))?;
    let payload = cursor.take(len)?;

    match subtype {
        EXT_INTEGER_INFO if size == 4 && count >= 8 => {
            let mut code = [0u8; 4];
            code.copy_from_slice(&payload[28..32]);
            dictionary.codepage = Some(decode_i32(code, cursor.endian()));
        }
        EXT_LONG_NAMES => dictionary.long_names = Some(payload.to_vec()),
        EXT_VERY_LONG_STRINGS => dictionary.very_long_strings = Some(payload.to_vec()),
        EXT_ENCODING => {
            let name = String::from_utf8_lossy(payload)
                .trim_matches(|c: char| c == '\0' || c.is_whitespace())
                .to_string();
            if !name.is_empty() {
                dictionary.encoding = Some(name);
            }
        }
        other => debug!(subtype = other, bytes = len, "skipping extension record"),
    }
    Ok(())
}

/// Parse `KEY=value` pairs separated by tabs (long names, very long strings).
///
/// Keys are upper-cased; NUL padding is ignored.
pub fn parse_key_values(text: &str) -> Vec<(String, String)> {
    text.split(['\t', '\0'])
        .filter_map(|entry| {
            let (key, value) = entry.split_once('=')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some((key.to_uppercase(), value.trim_end().to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::cursor::Endian;

    fn push_i32(buf: &mut Vec<u8>, value: i32) {
        buf.extend_from_slice(&value.to_le_bytes());
    }

    #[test]
    fn test_parse_variable_with_label_and_missing() {
        let mut data = Vec::new();
        push_i32(&mut data, REC_VARIABLE);
        push_i32(&mut data, 0);
        push_i32(&mut data, 1);
        push_i32(&mut data, -2);
        push_i32(&mut data, 0x0005_0802);
        push_i32(&mut data, 0x0005_0802);
        data.extend_from_slice(b"AGE     ");
        push_i32(&mut data, 5);
        data.extend_from_slice(b"Age!!\0\0\0");
        data.extend_from_slice(&1.0f64.to_le_bytes());
        data.extend_from_slice(&9.0f64.to_le_bytes());
        push_i32(&mut data, REC_TERMINATOR);
        push_i32(&mut data, 0);

        let mut cursor = ByteCursor::new(&data, 0, Endian::Little);
        let dictionary = parse_dictionary(&mut cursor).unwrap();
        assert_eq!(dictionary.variables.len(), 1);
        let var = &dictionary.variables[0];
        assert_eq!(var.name, b"AGE     ");
        assert_eq!(var.label.as_deref(), Some(&b"Age!!"[..]));
        assert_eq!(var.missing.len(), 2);
        assert_eq!(dictionary.data_offset, data.len());
    }

    #[test]
    fn test_value_labels_require_index_record() {
        let mut data = Vec::new();
        push_i32(&mut data, REC_VALUE_LABELS);
        push_i32(&mut data, 1);
        data.extend_from_slice(&1.0f64.to_le_bytes());
        data.push(3);
        data.extend_from_slice(b"Yes\0\0\0\0");
        push_i32(&mut data, REC_TERMINATOR);
        push_i32(&mut data, 0);

        let mut cursor = ByteCursor::new(&data, 0, Endian::Little);
        assert!(parse_dictionary(&mut cursor).is_err());
    }

    #[test]
    fn test_unknown_record_type() {
        let mut data = Vec::new();
        push_i32(&mut data, 42);
        let mut cursor = ByteCursor::new(&data, 0, Endian::Little);
        let err = parse_dictionary(&mut cursor).unwrap_err();
        assert!(err.to_string().contains("unknown record type 42"));
    }

    #[test]
    fn test_parse_key_values() {
        let pairs = parse_key_values("AGE=AgeInYears\tQ1=Question_One");
        assert_eq!(
            pairs,
            vec![
                ("AGE".to_string(), "AgeInYears".to_string()),
                ("Q1".to_string(), "Question_One".to_string()),
            ]
        );

        let pairs = parse_key_values("NOTES=00300\0\tCOMMENT=01000\0\t");
        assert_eq!(
            pairs,
            vec![
                ("NOTES".to_string(), "00300".to_string()),
                ("COMMENT".to_string(), "01000".to_string()),
            ]
        );
    }
}
