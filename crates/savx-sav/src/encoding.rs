//! Character encoding resolution for dictionary text and string values.
//!
//! Newer files name their encoding in extension record 20. Older files
//! only carry a Windows codepage in the machine integer info record.

use encoding_rs::{
    BIG5, EUC_KR, Encoding, GBK, SHIFT_JIS, UTF_8, WINDOWS_874, WINDOWS_1250, WINDOWS_1251,
    WINDOWS_1252, WINDOWS_1253, WINDOWS_1254, WINDOWS_1255, WINDOWS_1256, WINDOWS_1257,
    WINDOWS_1258,
};
use tracing::warn;

/// Pick the encoding for a file.
///
/// The encoding name wins over the codepage; UTF-8 is the fallback.
pub fn resolve_encoding(name: Option<&str>, codepage: Option<i32>) -> &'static Encoding {
    if let Some(name) = name {
        if let Some(encoding) = Encoding::for_label(name.trim().as_bytes()) {
            return encoding;
        }
        warn!(encoding = name, "unknown character encoding, trying codepage");
    }
    codepage.and_then(encoding_for_codepage).unwrap_or(UTF_8)
}

/// Map a Windows codepage number.
pub fn encoding_for_codepage(codepage: i32) -> Option<&'static Encoding> {
    let encoding = match codepage {
        65001 => UTF_8,
        1250 => WINDOWS_1250,
        1251 => WINDOWS_1251,
        // 2 and 3 are the legacy "ASCII" and "local 8-bit" markers.
        2 | 3 | 1252 | 20127 | 28591 => WINDOWS_1252,
        1253 => WINDOWS_1253,
        1254 => WINDOWS_1254,
        1255 => WINDOWS_1255,
        1256 => WINDOWS_1256,
        1257 => WINDOWS_1257,
        1258 => WINDOWS_1258,
        874 => WINDOWS_874,
        932 => SHIFT_JIS,
        936 => GBK,
        949 => EUC_KR,
        950 => BIG5,
        _ => return None,
    };
    Some(encoding)
}

/// Decode bytes, dropping trailing NUL padding.
///
/// Malformed sequences become U+FFFD rather than failing the file.
pub fn decode_text(bytes: &[u8], encoding: &'static Encoding) -> String {
    let end = bytes
        .iter()
        .rposition(|&b| b != 0)
        .map_or(0, |pos| pos + 1);
    let (text, _) = encoding.decode_without_bom_handling(&bytes[..end]);
    text.into_owned()
}

/// Decode a space-padded identifier such as an 8-byte short name.
pub fn decode_name(bytes: &[u8], encoding: &'static Encoding) -> String {
    decode_text(bytes, encoding).trim_end().to_string()
}
