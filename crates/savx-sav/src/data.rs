//! Case data decoding and encoding.
//!
//! Cases are sequences of 8-byte slots. Uncompressed files store the slots
//! verbatim. Bytecode-compressed files interleave blocks of 8 command bytes
//! with the raw slots some of those commands refer to:
//!
//! | Code     | Meaning                                           |
//! |----------|---------------------------------------------------|
//! | 0        | padding, ignored                                  |
//! | 1..=251  | numeric value `code - bias`                       |
//! | 252      | end of data                                       |
//! | 253      | raw slot follows the command block                |
//! | 254      | eight spaces (string slot)                        |
//! | 255      | system-missing                                    |

use tracing::{debug, warn};

use crate::error::{Result, SavError};
use crate::header::{ByteCursor, Endian};
use crate::types::{Compression, SYSMIS};

/// Raw 8-byte case slot.
pub type Slot = [u8; 8];

const CODE_PADDING: u8 = 0;
const CODE_END: u8 = 252;
const CODE_RAW: u8 = 253;
const CODE_SPACES: u8 = 254;
const CODE_SYSMIS: u8 = 255;

/// Largest integer a single command byte can encode for the given bias.
const MAX_CODE: u8 = 251;

/// Encode a float in the given byte order.
pub fn encode_f64(value: f64, endian: Endian) -> Slot {
    match endian {
        Endian::Little => value.to_le_bytes(),
        Endian::Big => value.to_be_bytes(),
    }
}

/// Layout of the case data section.
#[derive(Debug, Clone, Copy)]
pub struct CaseLayout {
    pub compression: Compression,
    pub bias: f64,
    pub slots_per_case: usize,
    pub case_count: Option<usize>,
}

/// Decode all cases into raw slots.
pub fn read_cases(cursor: ByteCursor<'_>, layout: CaseLayout) -> Result<Vec<Vec<Slot>>> {
    if layout.slots_per_case == 0 {
        return Ok(Vec::new());
    }
    match layout.compression {
        Compression::None => read_uncompressed(cursor, layout),
        Compression::Bytecode => read_bytecode(cursor, layout),
        Compression::Zlib => Err(SavError::UnsupportedCompression {
            scheme: Compression::Zlib.to_string(),
        }),
    }
}

fn read_uncompressed(mut cursor: ByteCursor<'_>, layout: CaseLayout) -> Result<Vec<Vec<Slot>>> {
    let case_len = layout.slots_per_case * 8;
    let available = cursor.remaining() / case_len;
    let count = match layout.case_count {
        Some(expected) if expected > available => {
            return Err(SavError::Truncated {
                offset: cursor.position() + available * case_len,
                needed: (expected - available) * case_len,
            });
        }
        Some(expected) => expected,
        None => {
            if cursor.remaining() % case_len != 0 {
                warn!(
                    trailing = cursor.remaining() % case_len,
                    "ignoring partial case at end of file"
                );
            }
            available
        }
    };

    let mut cases = Vec::with_capacity(count);
    for _ in 0..count {
        let mut case = Vec::with_capacity(layout.slots_per_case);
        for _ in 0..layout.slots_per_case {
            case.push(cursor.array::<8>()?);
        }
        cases.push(case);
    }
    Ok(cases)
}

/// Streaming bytecode decoder yielding one slot at a time.
struct BytecodeDecoder<'a> {
    cursor: ByteCursor<'a>,
    bias: f64,
    commands: [u8; 8],
    next: usize,
    finished: bool,
}

impl<'a> BytecodeDecoder<'a> {
    fn new(cursor: ByteCursor<'a>, bias: f64) -> Self {
        Self {
            cursor,
            bias,
            commands: [0; 8],
            next: 8,
            finished: false,
        }
    }

    fn next_slot(&mut self) -> Result<Option<Slot>> {
        loop {
            if self.finished {
                return Ok(None);
            }
            if self.next == self.commands.len() {
                if self.cursor.is_empty() {
                    self.finished = true;
                    return Ok(None);
                }
                self.commands = self.cursor.array()?;
                self.next = 0;
            }
            let code = self.commands[self.next];
            self.next += 1;
            let endian = self.cursor.endian();
            match code {
                CODE_PADDING => {}
                CODE_END => {
                    self.finished = true;
                    return Ok(None);
                }
                CODE_RAW => return self.cursor.array().map(Some),
                CODE_SPACES => return Ok(Some([b' '; 8])),
                CODE_SYSMIS => return Ok(Some(encode_f64(SYSMIS, endian))),
                value => {
                    return Ok(Some(encode_f64(f64::from(value) - self.bias, endian)));
                }
            }
        }
    }
}

fn read_bytecode(cursor: ByteCursor<'_>, layout: CaseLayout) -> Result<Vec<Vec<Slot>>> {
    let start = cursor.position();
    let mut decoder = BytecodeDecoder::new(cursor, layout.bias);
    let mut cases = Vec::with_capacity(layout.case_count.unwrap_or(0).min(1 << 16));

    while layout.case_count.is_none_or(|count| cases.len() < count) {
        let Some(first) = decoder.next_slot()? else {
            break;
        };
        let mut case = Vec::with_capacity(layout.slots_per_case);
        case.push(first);
        while case.len() < layout.slots_per_case {
            match decoder.next_slot()? {
                Some(slot) => case.push(slot),
                None => {
                    return Err(SavError::invalid_format(format!(
                        "compressed data ends inside case {}",
                        cases.len() + 1
                    )));
                }
            }
        }
        cases.push(case);
    }

    if let Some(expected) = layout.case_count
        && cases.len() < expected
    {
        return Err(SavError::invalid_format(format!(
            "header declares {expected} cases but data holds {}",
            cases.len()
        )));
    }
    debug!(cases = cases.len(), offset = start, "decoded bytecode case data");
    Ok(cases)
}

/// How a slot should be compressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Numeric,
    Text,
}

/// Bytecode encoder mirroring [`BytecodeDecoder`].
pub struct BytecodeEncoder {
    bias: f64,
    endian: Endian,
    commands: Vec<u8>,
    raw: Vec<Slot>,
    out: Vec<u8>,
}

impl BytecodeEncoder {
    pub fn new(bias: f64, endian: Endian) -> Self {
        Self {
            bias,
            endian,
            commands: Vec::with_capacity(8),
            raw: Vec::with_capacity(8),
            out: Vec::new(),
        }
    }

    /// Append one slot.
    pub fn push(&mut self, slot: Slot, kind: SlotKind) {
        let code = match kind {
            SlotKind::Text if slot == [b' '; 8] => CODE_SPACES,
            SlotKind::Text => CODE_RAW,
            SlotKind::Numeric => self.numeric_code(slot),
        };
        if code == CODE_RAW {
            self.raw.push(slot);
        }
        self.commands.push(code);
        if self.commands.len() == 8 {
            self.flush_block();
        }
    }

    fn numeric_code(&self, slot: Slot) -> u8 {
        let value = match self.endian {
            Endian::Little => f64::from_le_bytes(slot),
            Endian::Big => f64::from_be_bytes(slot),
        };
        if value == SYSMIS {
            return CODE_SYSMIS;
        }
        let shifted = value + self.bias;
        if value.fract() == 0.0 && shifted >= 1.0 && shifted <= f64::from(MAX_CODE) {
            // Range checked above.
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            return shifted as u8;
        }
        CODE_RAW
    }

    fn flush_block(&mut self) {
        if self.commands.is_empty() {
            return;
        }
        self.commands.resize(8, CODE_PADDING);
        self.out.extend_from_slice(&self.commands);
        for slot in self.raw.drain(..) {
            self.out.extend_from_slice(&slot);
        }
        self.commands.clear();
    }

    /// Flush the final partial block and return the encoded bytes.
    pub fn finish(mut self) -> Vec<u8> {
        self.flush_block();
        self.out
    }
}
