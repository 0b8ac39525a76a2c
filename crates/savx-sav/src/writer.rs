//! SAV file writer.
//!
//! Writes little-endian, UTF-8 system files, uncompressed or bytecode
//! compressed. Long names, very long strings, variable labels, value labels
//! and user-missing declarations are preserved.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{Local, NaiveDateTime};

use crate::data::{BytecodeEncoder, Slot, SlotKind, encode_f64};
use crate::error::{Result, SavError};
use crate::header::{
    EXT_ENCODING, EXT_FLOAT_INFO, EXT_INTEGER_INFO, EXT_LONG_NAMES, EXT_VERY_LONG_STRINGS,
    Endian, MAGIC_SAV, REC_DOCUMENT, REC_EXTENSION, REC_TERMINATOR, REC_VALUE_LABEL_VARS,
    REC_VALUE_LABELS, REC_VARIABLE, SEGMENT_DATA_LEN,
};
use crate::types::{
    Compression, MissingValues, SYSMIS, SavDataset, SavFormat, SavType, SavValue, SavVariable,
    SavWriterOptions, ValueLabels,
};

/// Longest string a variable can hold.
pub const MAX_STRING_WIDTH: usize = 32767;

/// Codepage number for UTF-8.
const CODEPAGE_UTF8: i32 = 65001;

/// SAV file writer.
pub struct SavWriter<W: Write> {
    writer: BufWriter<W>,
    options: SavWriterOptions,
}

impl<W: Write> SavWriter<W> {
    /// Create a new SAV writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
            options: SavWriterOptions::default(),
        }
    }

    /// Create a new SAV writer with options.
    pub fn with_options(writer: W, options: SavWriterOptions) -> Self {
        Self {
            writer: BufWriter::new(writer),
            options,
        }
    }

    /// Write a dataset.
    pub fn write_dataset(mut self, dataset: &SavDataset) -> Result<()> {
        if self.options.compression == Compression::Zlib {
            return Err(SavError::UnsupportedCompression {
                scheme: Compression::Zlib.to_string(),
            });
        }
        validate_dataset(dataset)?;
        let layouts = plan_layout(&dataset.variables);
        let slots_per_case = layouts
            .iter()
            .flat_map(|layout| &layout.segments)
            .map(|segment| segment.slot_count())
            .sum();

        let mut buf = RecordBuf::default();
        write_file_header(&mut buf, dataset, &self.options, slots_per_case)?;
        for (variable, layout) in dataset.variables.iter().zip(&layouts) {
            write_variable_records(&mut buf, variable, layout)?;
        }
        for (variable, layout) in dataset.variables.iter().zip(&layouts) {
            if let Some(labels) = variable.value_labels.as_ref().filter(|l| !l.is_empty()) {
                write_value_labels(&mut buf, variable, labels, layout.first_slot)?;
            }
        }
        if !dataset.documents.is_empty() {
            buf.i32(REC_DOCUMENT);
            buf.len(dataset.documents.len())?;
            for line in &dataset.documents {
                buf.padded(line.as_bytes(), 80, b' ');
            }
        }
        write_extensions(
            &mut buf,
            &dataset.variables,
            &layouts,
            self.options.compression,
        )?;
        buf.i32(REC_TERMINATOR);
        buf.i32(0);
        self.writer.write_all(&buf.bytes)?;

        let data = encode_cases(dataset, &layouts, &self.options)?;
        self.writer.write_all(&data)?;
        self.writer.flush()?;
        Ok(())
    }
}

impl SavWriter<File> {
    /// Create a SAV file for writing.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(file))
    }

    /// Create a SAV file with options.
    pub fn create_with_options(path: &Path, options: SavWriterOptions) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::with_options(file, options))
    }
}

/// Write a dataset to a SAV file.
pub fn write_sav(path: &Path, dataset: &SavDataset) -> Result<()> {
    SavWriter::create(path)?.write_dataset(dataset)
}

/// Write a dataset to a SAV file with options.
pub fn write_sav_with_options(
    path: &Path,
    dataset: &SavDataset,
    options: SavWriterOptions,
) -> Result<()> {
    SavWriter::create_with_options(path, options)?.write_dataset(dataset)
}

/// Byte buffer with little-endian record helpers.
#[derive(Default)]
struct RecordBuf {
    bytes: Vec<u8>,
}

impl RecordBuf {
    fn i32(&mut self, value: i32) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    fn f64(&mut self, value: f64) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    fn len(&mut self, value: usize) -> Result<()> {
        let value = i32::try_from(value)
            .map_err(|_| SavError::invalid_format(format!("length {value} exceeds i32")))?;
        self.i32(value);
        Ok(())
    }

    /// Write `data` cut or padded to exactly `len` bytes.
    fn padded(&mut self, data: &[u8], len: usize, pad: u8) {
        let take = data.len().min(len);
        self.bytes.extend_from_slice(&data[..take]);
        self.bytes.resize(self.bytes.len() + (len - take), pad);
    }
}

/// One stored piece of a variable.
#[derive(Debug, Clone)]
struct SegmentLayout {
    short_name: String,
    /// Type code: 0 numeric, else string width of this segment.
    width: usize,
    /// Bytes of the value stored in this segment.
    data_len: usize,
}

impl SegmentLayout {
    fn slot_count(&self) -> usize {
        if self.width == 0 {
            1
        } else {
            self.width.div_ceil(8)
        }
    }
}

#[derive(Debug, Clone)]
struct VariableLayout {
    /// 1-based index of the first slot.
    first_slot: usize,
    segments: Vec<SegmentLayout>,
}

fn validate_dataset(dataset: &SavDataset) -> Result<()> {
    let mut seen = HashSet::new();
    for (index, variable) in dataset.variables.iter().enumerate() {
        let name = variable.name.trim();
        if name.is_empty() {
            return Err(SavError::invalid_variable(index, "variable name is empty"));
        }
        if name.contains(['=', '\t', '\0']) {
            return Err(SavError::invalid_variable(
                index,
                format!("variable name {name:?} contains a reserved character"),
            ));
        }
        if !seen.insert(name.to_uppercase()) {
            return Err(SavError::DuplicateVariable {
                name: name.to_string(),
            });
        }
        if let SavType::String { width } = variable.var_type
            && !(1..=MAX_STRING_WIDTH).contains(&width)
        {
            return Err(SavError::invalid_variable(
                index,
                format!("string width {width} outside 1..={MAX_STRING_WIDTH}"),
            ));
        }
    }
    for row in &dataset.rows {
        if row.len() != dataset.variables.len() {
            return Err(SavError::RowLengthMismatch {
                expected: dataset.variables.len(),
                actual: row.len(),
            });
        }
    }
    Ok(())
}

/// Derive an 8-byte uppercase short name stem from a variable name.
fn short_name_stem(name: &str) -> String {
    let mut stem: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '@' | '#' | '$' | '.'))
        .map(|c| c.to_ascii_uppercase())
        .take(8)
        .collect();
    if !stem.starts_with(|c: char| c.is_ascii_alphabetic() || matches!(c, '@' | '#' | '$')) {
        stem.insert(0, 'V');
        stem.truncate(8);
    }
    stem
}

/// Hands out unique short names.
#[derive(Default)]
struct ShortNames {
    used: HashSet<String>,
}

impl ShortNames {
    fn allocate(&mut self, stem: &str) -> String {
        if self.used.insert(stem.to_string()) {
            return stem.to_string();
        }
        let mut counter = 1usize;
        loop {
            let suffix = counter.to_string();
            let keep = 8usize.saturating_sub(suffix.len());
            let candidate: String = stem.chars().take(keep).chain(suffix.chars()).collect();
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            counter += 1;
        }
    }
}

fn plan_layout(variables: &[SavVariable]) -> Vec<VariableLayout> {
    let mut names = ShortNames::default();
    let mut next_slot = 1;
    variables
        .iter()
        .map(|variable| {
            let stem = short_name_stem(&variable.name);
            let segments = match variable.var_type {
                SavType::Numeric => vec![SegmentLayout {
                    short_name: names.allocate(&stem),
                    width: 0,
                    data_len: 8,
                }],
                SavType::String { width } if width <= 255 => vec![SegmentLayout {
                    short_name: names.allocate(&stem),
                    width,
                    data_len: width,
                }],
                SavType::String { width } => {
                    let count = width.div_ceil(SEGMENT_DATA_LEN);
                    (0..count)
                        .map(|k| {
                            let last = k + 1 == count;
                            let data_len = if last {
                                width - SEGMENT_DATA_LEN * (count - 1)
                            } else {
                                SEGMENT_DATA_LEN
                            };
                            SegmentLayout {
                                short_name: names.allocate(&stem),
                                width: if last { data_len } else { 255 },
                                data_len,
                            }
                        })
                        .collect()
                }
            };
            let layout = VariableLayout {
                first_slot: next_slot,
                segments,
            };
            next_slot += layout
                .segments
                .iter()
                .map(SegmentLayout::slot_count)
                .sum::<usize>();
            layout
        })
        .collect()
}

fn write_file_header(
    buf: &mut RecordBuf,
    dataset: &SavDataset,
    options: &SavWriterOptions,
    slots_per_case: usize,
) -> Result<()> {
    let created: NaiveDateTime = options.created.unwrap_or_else(|| Local::now().naive_local());
    let product = format!(
        "@(#) SPSS DATA FILE savx {}",
        env!("CARGO_PKG_VERSION")
    );

    buf.bytes.extend_from_slice(MAGIC_SAV);
    buf.padded(product.as_bytes(), 60, b' ');
    buf.i32(2);
    buf.len(slots_per_case)?;
    buf.i32(options.compression.code());
    buf.i32(0);
    buf.len(dataset.rows.len())?;
    buf.f64(options.bias);
    buf.padded(created.format("%d %b %y").to_string().as_bytes(), 9, b' ');
    buf.padded(created.format("%H:%M:%S").to_string().as_bytes(), 8, b' ');
    let label = options
        .file_label
        .as_deref()
        .or(dataset.header.file_label.as_deref())
        .unwrap_or("");
    buf.padded(label.as_bytes(), 64, b' ');
    buf.padded(&[], 3, 0);
    Ok(())
}

fn write_variable_records(
    buf: &mut RecordBuf,
    variable: &SavVariable,
    layout: &VariableLayout,
) -> Result<()> {
    for (k, segment) in layout.segments.iter().enumerate() {
        let first = k == 0;
        let format = if layout.segments.len() > 1 {
            SavFormat::string(segment.width)
        } else {
            variable.print_format
        };
        let label = variable.label.as_deref().filter(|_| first);
        let missing = if first {
            encode_missing(variable)?
        } else {
            (0, Vec::new())
        };

        buf.i32(REC_VARIABLE);
        buf.len(segment.width)?;
        buf.i32(i32::from(label.is_some()));
        buf.i32(missing.0);
        buf.i32(format.to_packed());
        buf.i32(if layout.segments.len() > 1 {
            format.to_packed()
        } else {
            variable.write_format.to_packed()
        });
        buf.padded(segment.short_name.as_bytes(), 8, b' ');
        if let Some(label) = label {
            let bytes = label.as_bytes();
            buf.len(bytes.len())?;
            buf.padded(bytes, bytes.len().next_multiple_of(4), b' ');
        }
        for value in &missing.1 {
            buf.bytes.extend_from_slice(value);
        }

        for _ in 1..segment.slot_count() {
            buf.i32(REC_VARIABLE);
            buf.i32(-1);
            buf.i32(0);
            buf.i32(0);
            buf.i32(0);
            buf.i32(0);
            buf.padded(&[], 8, b' ');
        }
    }
    Ok(())
}

/// Missing-value count code and 8-byte values.
fn encode_missing(variable: &SavVariable) -> Result<(i32, Vec<Slot>)> {
    let too_many = || SavError::invalid_value(&variable.name, "more than three missing values");
    match &variable.missing {
        MissingValues::None => Ok((0, Vec::new())),
        MissingValues::Numeric { values, range } => {
            let mut slots = Vec::new();
            let code = match (range, values.as_slice()) {
                (None, values) if values.len() <= 3 => {
                    slots.extend(values.iter().map(|v| encode_f64(*v, Endian::Little)));
                    i32::try_from(values.len()).map_err(|_| too_many())?
                }
                (Some((low, high)), []) => {
                    slots.push(encode_f64(*low, Endian::Little));
                    slots.push(encode_f64(*high, Endian::Little));
                    -2
                }
                (Some((low, high)), [discrete]) => {
                    slots.push(encode_f64(*low, Endian::Little));
                    slots.push(encode_f64(*high, Endian::Little));
                    slots.push(encode_f64(*discrete, Endian::Little));
                    -3
                }
                _ => return Err(too_many()),
            };
            Ok((code, slots))
        }
        MissingValues::Text(values) => {
            if values.len() > 3 {
                return Err(too_many());
            }
            let slots = values
                .iter()
                .map(|value| short_text(&variable.name, value))
                .collect::<Result<Vec<_>>>()?;
            let code = i32::try_from(slots.len()).map_err(|_| too_many())?;
            Ok((code, slots))
        }
    }
}

/// Space-pad a string code into one slot.
fn short_text(name: &str, value: &str) -> Result<Slot> {
    let bytes = value.as_bytes();
    if bytes.len() > 8 {
        return Err(SavError::invalid_value(
            name,
            format!("code {value:?} is longer than 8 bytes"),
        ));
    }
    let mut slot = [b' '; 8];
    slot[..bytes.len()].copy_from_slice(bytes);
    Ok(slot)
}

fn write_value_labels(
    buf: &mut RecordBuf,
    variable: &SavVariable,
    labels: &ValueLabels,
    first_slot: usize,
) -> Result<()> {
    let entries: Vec<(Slot, &str)> = match (labels, variable.var_type) {
        (ValueLabels::Numeric(entries), SavType::Numeric) => entries
            .iter()
            .map(|(code, label)| (encode_f64(*code, Endian::Little), label.as_str()))
            .collect(),
        (ValueLabels::Text(entries), SavType::String { .. }) => entries
            .iter()
            .map(|(code, label)| Ok((short_text(&variable.name, code)?, label.as_str())))
            .collect::<Result<_>>()?,
        _ => {
            return Err(SavError::invalid_value(
                &variable.name,
                "value labels do not match the variable type",
            ));
        }
    };

    buf.i32(REC_VALUE_LABELS);
    buf.len(entries.len())?;
    for (code, label) in entries {
        buf.bytes.extend_from_slice(&code);
        let bytes = label.as_bytes();
        let len = bytes.len().min(255);
        // Bounded by the min above.
        #[allow(clippy::cast_possible_truncation)]
        buf.bytes.push(len as u8);
        buf.padded(bytes, (len + 1).next_multiple_of(8) - 1, b' ');
    }
    buf.i32(REC_VALUE_LABEL_VARS);
    buf.i32(1);
    buf.len(first_slot)?;
    Ok(())
}

fn write_extension(buf: &mut RecordBuf, subtype: i32, size: usize, payload: &[u8]) -> Result<()> {
    buf.i32(REC_EXTENSION);
    buf.i32(subtype);
    buf.len(size)?;
    buf.len(payload.len() / size)?;
    buf.bytes.extend_from_slice(payload);
    Ok(())
}

fn write_extensions(
    buf: &mut RecordBuf,
    variables: &[SavVariable],
    layouts: &[VariableLayout],
    compression: Compression,
) -> Result<()> {
    let integer_info: Vec<u8> = [1, 0, 0, -1, 1, compression.code(), 2, CODEPAGE_UTF8]
        .iter()
        .flat_map(|value: &i32| value.to_le_bytes())
        .collect();
    write_extension(buf, EXT_INTEGER_INFO, 4, &integer_info)?;

    let lowest = f64::from_bits(SYSMIS.to_bits() - 1);
    let float_info: Vec<u8> = [SYSMIS, f64::MAX, lowest]
        .iter()
        .flat_map(|value| value.to_le_bytes())
        .collect();
    write_extension(buf, EXT_FLOAT_INFO, 8, &float_info)?;

    let long_names = variables
        .iter()
        .zip(layouts)
        .filter_map(|(variable, layout)| {
            let short = &layout.segments.first()?.short_name;
            Some(format!("{short}={}", variable.name.trim()))
        })
        .collect::<Vec<_>>()
        .join("\t");
    if !long_names.is_empty() {
        write_extension(buf, EXT_LONG_NAMES, 1, long_names.as_bytes())?;
    }

    let very_long: String = variables
        .iter()
        .zip(layouts)
        .filter(|(_, layout)| layout.segments.len() > 1)
        .filter_map(|(variable, layout)| {
            let SavType::String { width } = variable.var_type else {
                return None;
            };
            let short = &layout.segments.first()?.short_name;
            Some(format!("{short}={width:05}\0\t"))
        })
        .collect();
    if !very_long.is_empty() {
        write_extension(buf, EXT_VERY_LONG_STRINGS, 1, very_long.as_bytes())?;
    }

    write_extension(buf, EXT_ENCODING, 1, b"UTF-8")
}

fn encode_cases(
    dataset: &SavDataset,
    layouts: &[VariableLayout],
    options: &SavWriterOptions,
) -> Result<Vec<u8>> {
    let mut raw = Vec::new();
    let mut encoder = BytecodeEncoder::new(options.bias, Endian::Little);
    let mut emit = |slot: Slot, kind: SlotKind| match options.compression {
        Compression::Bytecode => encoder.push(slot, kind),
        Compression::None | Compression::Zlib => raw.extend_from_slice(&slot),
    };

    for row in &dataset.rows {
        for ((value, variable), layout) in row.iter().zip(&dataset.variables).zip(layouts) {
            match (variable.var_type, value) {
                (SavType::Numeric, SavValue::Num(number)) => {
                    emit(
                        encode_f64(number.unwrap_or(SYSMIS), Endian::Little),
                        SlotKind::Numeric,
                    );
                }
                (SavType::String { width }, SavValue::Str(text)) => {
                    let bytes = text.as_deref().unwrap_or("").as_bytes();
                    if bytes.len() > width {
                        return Err(SavError::invalid_value(
                            &variable.name,
                            format!("{} bytes exceed width {width}", bytes.len()),
                        ));
                    }
                    let mut rest = bytes;
                    for segment in &layout.segments {
                        let take = rest.len().min(segment.data_len);
                        let mut stored = rest[..take].to_vec();
                        rest = &rest[take..];
                        stored.resize(segment.slot_count() * 8, b' ');
                        for chunk in stored.chunks_exact(8) {
                            let mut slot = [0u8; 8];
                            slot.copy_from_slice(chunk);
                            emit(slot, SlotKind::Text);
                        }
                    }
                }
                (SavType::Numeric, SavValue::Str(_)) => {
                    return Err(SavError::invalid_value(&variable.name, "expected a number"));
                }
                (SavType::String { .. }, SavValue::Num(_)) => {
                    return Err(SavError::invalid_value(&variable.name, "expected text"));
                }
            }
        }
    }

    Ok(match options.compression {
        Compression::Bytecode => encoder.finish(),
        Compression::None | Compression::Zlib => raw,
    })
}
