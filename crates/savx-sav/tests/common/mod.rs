//! Shared helpers for SAV integration tests.

#![allow(dead_code)]

use std::io::Cursor;

use savx_sav::{
    Compression, SavDataset, SavReader, SavReaderOptions, SavWriter, SavWriterOptions,
};

/// Write a dataset to memory.
pub fn write_bytes(dataset: &SavDataset, compression: Compression) -> Vec<u8> {
    let mut buffer = Vec::new();
    {
        let options = SavWriterOptions::default().with_compression(compression);
        let writer = SavWriter::with_options(Cursor::new(&mut buffer), options);
        writer.write_dataset(dataset).unwrap();
    }
    buffer
}

/// Write a dataset and read it back.
pub fn roundtrip(dataset: &SavDataset, compression: Compression) -> SavDataset {
    roundtrip_with(dataset, compression, SavReaderOptions::default())
}

/// Write a dataset and read it back with reader options.
pub fn roundtrip_with(
    dataset: &SavDataset,
    compression: Compression,
    options: SavReaderOptions,
) -> SavDataset {
    let buffer = write_bytes(dataset, compression);
    SavReader::with_options(Cursor::new(&buffer), options)
        .read_dataset()
        .unwrap()
}

/// Hand-assembled file builder for layouts the writer never produces
/// (big-endian, codepage-only encoding).
pub struct RawSavBuilder {
    big_endian: bool,
    bytes: Vec<u8>,
}

impl RawSavBuilder {
    pub fn new(big_endian: bool) -> Self {
        Self {
            big_endian,
            bytes: Vec::new(),
        }
    }

    pub fn i32(&mut self, value: i32) -> &mut Self {
        let bytes = if self.big_endian {
            value.to_be_bytes()
        } else {
            value.to_le_bytes()
        };
        self.bytes.extend_from_slice(&bytes);
        self
    }

    pub fn f64(&mut self, value: f64) -> &mut Self {
        let bytes = if self.big_endian {
            value.to_be_bytes()
        } else {
            value.to_le_bytes()
        };
        self.bytes.extend_from_slice(&bytes);
        self
    }

    pub fn text(&mut self, value: &[u8], len: usize) -> &mut Self {
        let mut padded = value.to_vec();
        padded.resize(len, b' ');
        self.bytes.extend_from_slice(&padded);
        self
    }

    /// File header for an uncompressed file.
    pub fn header(&mut self, slots: i32, cases: i32) -> &mut Self {
        self.text(b"$FL2", 4)
            .text(b"@(#) SPSS DATA FILE test", 60)
            .i32(2)
            .i32(slots)
            .i32(0)
            .i32(0)
            .i32(cases)
            .f64(100.0)
            .text(b"01 Jan 24", 9)
            .text(b"10:00:00", 8)
            .text(b"Legacy file", 64)
            .text(b"", 3)
    }

    /// Variable record without label or missing values.
    pub fn variable(&mut self, type_code: i32, name: &[u8]) -> &mut Self {
        self.i32(2)
            .i32(type_code)
            .i32(0)
            .i32(0)
            .i32(0x0005_0802)
            .i32(0x0005_0802)
            .text(name, 8)
    }

    /// Machine integer info with the given codepage.
    pub fn codepage(&mut self, codepage: i32) -> &mut Self {
        self.i32(7).i32(3).i32(4).i32(8);
        for value in [1, 0, 0, -1, 1, 0, 1, codepage] {
            self.i32(value);
        }
        self
    }

    pub fn terminator(&mut self) -> &mut Self {
        self.i32(999).i32(0)
    }

    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        self.bytes.clone()
    }
}
