//! SAV file reader.
//!
//! Provides functionality to read SPSS system files (`.sav`).

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use encoding_rs::Encoding;
use tracing::{debug, warn};

use crate::data::{CaseLayout, Slot, read_cases};
use crate::encoding::{decode_name, decode_text, resolve_encoding};
use crate::error::{Result, SavError};
use crate::header::{
    ByteCursor, Dictionary, Endian, FileHeader, HEADER_LEN, RawValueLabels, RawVariable,
    SEGMENT_DATA_LEN, decode_f64, parse_dictionary, parse_file_header, parse_key_values,
};
use crate::types::{
    MissingValues, SYSMIS, SavDataset, SavFormat, SavHeader, SavReaderOptions, SavType, SavValue,
    SavVariable, ValueLabels,
};

/// SAV file reader.
///
/// Reads uncompressed and bytecode-compressed system files of either byte
/// order.
pub struct SavReader<R: Read> {
    reader: BufReader<R>,
    options: SavReaderOptions,
}

impl<R: Read> SavReader<R> {
    /// Create a new SAV reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            options: SavReaderOptions::default(),
        }
    }

    /// Create a new SAV reader with options.
    pub fn with_options(reader: R, options: SavReaderOptions) -> Self {
        Self {
            reader: BufReader::new(reader),
            options,
        }
    }

    /// Read the entire file into memory and parse it.
    pub fn read_dataset(mut self) -> Result<SavDataset> {
        let mut data = Vec::new();
        self.reader.read_to_end(&mut data)?;
        parse_sav_data(&data, &self.options)
    }
}

impl SavReader<File> {
    /// Open a SAV file for reading.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_options(path, SavReaderOptions::default())
    }

    /// Open a SAV file for reading with options.
    pub fn open_with_options(path: &Path, options: SavReaderOptions) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SavError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                SavError::Io(e)
            }
        })?;
        Ok(Self::with_options(file, options))
    }
}

/// Read a SAV file.
pub fn read_sav(path: &Path) -> Result<SavDataset> {
    SavReader::open(path)?.read_dataset()
}

/// Read a SAV file with options.
pub fn read_sav_with_options(path: &Path, options: SavReaderOptions) -> Result<SavDataset> {
    SavReader::open_with_options(path, options)?.read_dataset()
}

/// Parse a complete SAV file held in memory.
fn parse_sav_data(data: &[u8], options: &SavReaderOptions) -> Result<SavDataset> {
    let file_header = parse_file_header(data)?;
    let endian = file_header.endian;
    let mut cursor = ByteCursor::new(data, HEADER_LEN, endian);
    let dictionary = parse_dictionary(&mut cursor)?;
    let encoding = resolve_encoding(dictionary.encoding.as_deref(), dictionary.codepage);

    let columns = build_columns(&dictionary, endian, encoding)?;
    let slots_per_case = dictionary.variables.len();
    if let Some(nominal) = file_header.nominal_case_size
        && nominal != slots_per_case
    {
        debug!(
            nominal,
            actual = slots_per_case,
            "header case size differs from dictionary"
        );
    }

    let cases = read_cases(
        cursor,
        CaseLayout {
            compression: file_header.compression,
            bias: file_header.bias,
            slots_per_case,
            case_count: file_header.case_count,
        },
    )?;

    let rows = cases
        .iter()
        .map(|case| {
            columns
                .iter()
                .map(|column| column.decode(case, endian, encoding, options))
                .collect()
        })
        .collect();

    let header = build_header(&file_header, &columns, encoding);
    let documents = dictionary
        .documents
        .iter()
        .map(|line| decode_text(line, encoding).trim_end().to_string())
        .collect();

    debug!(
        variables = columns.len(),
        cases = cases.len(),
        encoding = encoding.name(),
        compression = %file_header.compression,
        "parsed SAV file"
    );

    Ok(SavDataset {
        header,
        variables: columns.into_iter().map(|column| column.variable).collect(),
        rows,
        documents,
    })
}

fn build_header(file_header: &FileHeader, columns: &[Column], encoding: &'static Encoding) -> SavHeader {
    let file_label = decode_text(&file_header.file_label, encoding)
        .trim()
        .to_string();
    let weight_variable = (file_header.weight_index > 0)
        .then(|| {
            columns
                .iter()
                .find(|column| column.first_slot() + 1 == file_header.weight_index)
        })
        .flatten()
        .map(|column| column.variable.name.clone());

    SavHeader {
        product: decode_text(&file_header.product, encoding)
            .trim()
            .to_string(),
        compression: file_header.compression,
        creation_date: decode_text(&file_header.creation_date, encoding),
        creation_time: decode_text(&file_header.creation_time, encoding),
        file_label: (!file_label.is_empty()).then_some(file_label),
        encoding: encoding.name().to_string(),
        weight_variable,
    }
}

/// Contiguous run of slots holding (part of) one variable.
#[derive(Debug, Clone, Copy)]
struct Segment {
    first_slot: usize,
    slot_count: usize,
    /// Bytes of the run that carry data.
    width: usize,
}

/// A variable with the slots its values live in.
#[derive(Debug)]
struct Column {
    variable: SavVariable,
    segments: Vec<Segment>,
}

impl Column {
    fn first_slot(&self) -> usize {
        self.segments.first().map_or(0, |segment| segment.first_slot)
    }

    fn decode(
        &self,
        case: &[Slot],
        endian: Endian,
        encoding: &'static Encoding,
        options: &SavReaderOptions,
    ) -> SavValue {
        let variable = &self.variable;
        match variable.var_type {
            SavType::Numeric => {
                let value = case
                    .get(self.first_slot())
                    .map(|slot| decode_f64(*slot, endian))
                    .filter(|value| *value != SYSMIS && !value.is_nan())
                    .filter(|value| {
                        !(options.user_missing_as_null && variable.missing.is_missing_number(*value))
                    });
                SavValue::Num(value)
            }
            SavType::String { .. } => {
                let mut bytes = Vec::new();
                for segment in &self.segments {
                    let end = segment.first_slot + segment.slot_count;
                    let slots = case.get(segment.first_slot..end).unwrap_or(&[]);
                    let flat = slots.as_flattened();
                    bytes.extend_from_slice(&flat[..segment.width.min(flat.len())]);
                }
                let mut text = decode_text(&bytes, encoding);
                if options.trim_strings {
                    text.truncate(text.trim_end().len());
                }
                if options.user_missing_as_null && variable.missing.is_missing_text(&text) {
                    SavValue::Str(None)
                } else {
                    SavValue::Str(Some(text))
                }
            }
        }
    }
}

/// A non-continuation variable record and the slots it spans.
struct BaseRecord<'a> {
    raw: &'a RawVariable,
    first_slot: usize,
    slot_count: usize,
}

impl BaseRecord<'_> {
    fn segment(&self, width: usize) -> Segment {
        Segment {
            first_slot: self.first_slot,
            slot_count: self.slot_count,
            width: width.min(self.slot_count * 8),
        }
    }
}

fn build_columns(
    dictionary: &Dictionary,
    endian: Endian,
    encoding: &'static Encoding,
) -> Result<Vec<Column>> {
    let mut bases: Vec<BaseRecord<'_>> = Vec::new();
    for (slot, raw) in dictionary.variables.iter().enumerate() {
        if raw.is_continuation() {
            let Some(base) = bases.last_mut() else {
                return Err(SavError::invalid_variable(
                    slot,
                    "continuation record without a preceding variable",
                ));
            };
            base.slot_count += 1;
        } else {
            bases.push(BaseRecord {
                raw,
                first_slot: slot,
                slot_count: 1,
            });
        }
    }

    let long_names: HashMap<String, String> = dictionary
        .long_names
        .as_deref()
        .map(|bytes| parse_key_values(&decode_text(bytes, encoding)))
        .unwrap_or_default()
        .into_iter()
        .collect();
    let very_long: HashMap<String, usize> = dictionary
        .very_long_strings
        .as_deref()
        .map(|bytes| parse_key_values(&decode_text(bytes, encoding)))
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(name, width)| Some((name, width.trim().parse().ok()?)))
        .collect();

    let mut columns: Vec<Column> = Vec::with_capacity(bases.len());
    let mut bases = bases.into_iter();
    while let Some(base) = bases.next() {
        let index = columns.len();
        let raw = base.raw;
        let short_name = decode_name(&raw.name, encoding);
        let key = short_name.to_uppercase();

        let (var_type, segments) = match (raw.type_code, very_long.get(&key)) {
            (0, _) => (SavType::Numeric, vec![base.segment(8)]),
            (_, Some(&total)) if total > 255 => {
                let count = total.div_ceil(SEGMENT_DATA_LEN);
                let mut segments = vec![base.segment(SEGMENT_DATA_LEN)];
                for k in 1..count {
                    let next = bases.next().ok_or_else(|| {
                        SavError::invalid_variable(
                            index,
                            format!("very long string {short_name} is missing segment {k}"),
                        )
                    })?;
                    let width = if k + 1 == count {
                        total - SEGMENT_DATA_LEN * (count - 1)
                    } else {
                        SEGMENT_DATA_LEN
                    };
                    segments.push(next.segment(width));
                }
                (SavType::String { width: total }, segments)
            }
            (width, _) => {
                let width = width.unsigned_abs() as usize;
                (SavType::String { width }, vec![base.segment(width)])
            }
        };

        let name = long_names.get(&key).cloned().unwrap_or(short_name);
        let label = raw
            .label
            .as_deref()
            .map(|bytes| decode_text(bytes, encoding));

        columns.push(Column {
            variable: SavVariable {
                name,
                label,
                var_type,
                print_format: SavFormat::from_packed(raw.print_format),
                write_format: SavFormat::from_packed(raw.write_format),
                missing: decode_missing(raw, var_type, endian, encoding),
                value_labels: None,
            },
            segments,
        });
    }

    for labels in &dictionary.value_labels {
        attach_value_labels(&mut columns, labels, endian, encoding);
    }

    Ok(columns)
}

fn decode_missing(
    raw: &RawVariable,
    var_type: SavType,
    endian: Endian,
    encoding: &'static Encoding,
) -> MissingValues {
    if raw.missing.is_empty() {
        return MissingValues::None;
    }
    if var_type.is_string() {
        return MissingValues::Text(
            raw.missing
                .iter()
                .map(|value| decode_text(value, encoding).trim_end().to_string())
                .collect(),
        );
    }

    let numbers: Vec<f64> = raw
        .missing
        .iter()
        .map(|value| decode_f64(*value, endian))
        .collect();
    match (raw.missing_count, numbers.as_slice()) {
        (-2, [low, high]) => MissingValues::Numeric {
            values: Vec::new(),
            range: Some((*low, *high)),
        },
        (-3, [low, high, discrete]) => MissingValues::Numeric {
            values: vec![*discrete],
            range: Some((*low, *high)),
        },
        _ => MissingValues::Numeric {
            values: numbers,
            range: None,
        },
    }
}

fn attach_value_labels(
    columns: &mut [Column],
    labels: &RawValueLabels,
    endian: Endian,
    encoding: &'static Encoding,
) {
    for &slot in &labels.slots {
        let Some(column) = columns
            .iter_mut()
            .find(|column| column.first_slot() + 1 == slot)
        else {
            warn!(slot, "value labels refer to an unknown variable");
            continue;
        };

        let entries = labels
            .entries
            .iter()
            .map(|(value, label)| (value, decode_text(label, encoding)));
        let parsed = if column.variable.var_type.is_string() {
            ValueLabels::Text(
                entries
                    .map(|(value, label)| {
                        (decode_text(value, encoding).trim_end().to_string(), label)
                    })
                    .collect(),
            )
        } else {
            ValueLabels::Numeric(
                entries
                    .map(|(value, label)| (decode_f64(*value, endian), label))
                    .collect(),
            )
        };

        column.variable.value_labels = match (column.variable.value_labels.take(), parsed) {
            (Some(ValueLabels::Numeric(mut existing)), ValueLabels::Numeric(more)) => {
                existing.extend(more);
                Some(ValueLabels::Numeric(existing))
            }
            (Some(ValueLabels::Text(mut existing)), ValueLabels::Text(more)) => {
                existing.extend(more);
                Some(ValueLabels::Text(existing))
            }
            (_, parsed) => Some(parsed),
        };
    }
}
