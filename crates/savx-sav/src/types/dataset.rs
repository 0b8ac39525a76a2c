//! Dataset structure.

use std::fmt;

use super::{SavValue, SavVariable};

/// Case data compression scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// Raw 8-byte slots.
    None,
    /// Bytecode compression (the SPSS default).
    #[default]
    Bytecode,
    /// Zlib-compressed blocks (`.zsav`).
    Zlib,
}

impl Compression {
    /// Map the header compression code.
    #[must_use]
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::None),
            1 => Some(Self::Bytecode),
            2 => Some(Self::Zlib),
            _ => None,
        }
    }

    /// Header compression code.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::None => 0,
            Self::Bytecode => 1,
            Self::Zlib => 2,
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Bytecode => write!(f, "bytecode"),
            Self::Zlib => write!(f, "zlib"),
        }
    }
}

/// File-level metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SavHeader {
    /// Product identification string.
    pub product: String,
    /// Case data compression.
    pub compression: Compression,
    /// Creation date as written (`dd mmm yy`).
    pub creation_date: String,
    /// Creation time as written (`hh:mm:ss`).
    pub creation_time: String,
    /// File label.
    pub file_label: Option<String>,
    /// Character encoding name used to decode text.
    pub encoding: String,
    /// Weight variable name, if any.
    pub weight_variable: Option<String>,
}

/// A complete SAV dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SavDataset {
    /// File-level metadata.
    pub header: SavHeader,
    /// Variables in dictionary order.
    pub variables: Vec<SavVariable>,
    /// Case data, one vector per case in variable order.
    pub rows: Vec<Vec<SavValue>>,
    /// Document lines.
    pub documents: Vec<String>,
}

impl SavDataset {
    /// Create an empty dataset with the given variables.
    #[must_use]
    pub fn with_variables(variables: Vec<SavVariable>) -> Self {
        Self {
            variables,
            ..Self::default()
        }
    }

    /// Append a case.
    pub fn add_row(&mut self, row: Vec<SavValue>) {
        self.rows.push(row);
    }

    /// Number of cases.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of variables.
    #[must_use]
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    /// Position of a variable by name (case-insensitive, as in SPSS).
    #[must_use]
    pub fn variable_index(&self, name: &str) -> Option<usize> {
        self.variables
            .iter()
            .position(|variable| variable.name.eq_ignore_ascii_case(name))
    }

    /// Values of one variable across all cases.
    pub fn column(&self, index: usize) -> impl Iterator<Item = &SavValue> + '_ {
        self.rows.iter().filter_map(move |row| row.get(index))
    }
}
