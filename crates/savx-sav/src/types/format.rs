//! Print and write formats.
//!
//! A format is stored as a packed 32-bit integer:
//!
//! | Bits  | Field    |
//! |-------|----------|
//! | 16-23 | type     |
//! | 8-15  | width    |
//! | 0-7   | decimals |

use std::fmt;

/// Format type codes used in variable records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    A,
    AHex,
    Comma,
    Dollar,
    F,
    Ib,
    PibHex,
    P,
    Pib,
    Pk,
    Rb,
    RbHex,
    Z,
    N,
    E,
    Date,
    Time,
    DateTime,
    ADate,
    JDate,
    DTime,
    WkDay,
    Month,
    MoYr,
    QYr,
    WkYr,
    Pct,
    Dot,
    Cca,
    Ccb,
    Ccc,
    Ccd,
    Cce,
    EDate,
    SDate,
    MTime,
    YmdHms,
    /// A code this crate does not name.
    Other(u8),
}

impl FormatKind {
    /// Map a raw type code to a format kind.
    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        match code {
            1 => Self::A,
            2 => Self::AHex,
            3 => Self::Comma,
            4 => Self::Dollar,
            5 => Self::F,
            6 => Self::Ib,
            7 => Self::PibHex,
            8 => Self::P,
            9 => Self::Pib,
            10 => Self::Pk,
            11 => Self::Rb,
            12 => Self::RbHex,
            15 => Self::Z,
            16 => Self::N,
            17 => Self::E,
            20 => Self::Date,
            21 => Self::Time,
            22 => Self::DateTime,
            23 => Self::ADate,
            24 => Self::JDate,
            25 => Self::DTime,
            26 => Self::WkDay,
            27 => Self::Month,
            28 => Self::MoYr,
            29 => Self::QYr,
            30 => Self::WkYr,
            31 => Self::Pct,
            32 => Self::Dot,
            33 => Self::Cca,
            34 => Self::Ccb,
            35 => Self::Ccc,
            36 => Self::Ccd,
            37 => Self::Cce,
            38 => Self::EDate,
            39 => Self::SDate,
            40 => Self::MTime,
            41 => Self::YmdHms,
            other => Self::Other(other),
        }
    }

    /// Raw type code.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::A => 1,
            Self::AHex => 2,
            Self::Comma => 3,
            Self::Dollar => 4,
            Self::F => 5,
            Self::Ib => 6,
            Self::PibHex => 7,
            Self::P => 8,
            Self::Pib => 9,
            Self::Pk => 10,
            Self::Rb => 11,
            Self::RbHex => 12,
            Self::Z => 15,
            Self::N => 16,
            Self::E => 17,
            Self::Date => 20,
            Self::Time => 21,
            Self::DateTime => 22,
            Self::ADate => 23,
            Self::JDate => 24,
            Self::DTime => 25,
            Self::WkDay => 26,
            Self::Month => 27,
            Self::MoYr => 28,
            Self::QYr => 29,
            Self::WkYr => 30,
            Self::Pct => 31,
            Self::Dot => 32,
            Self::Cca => 33,
            Self::Ccb => 34,
            Self::Ccc => 35,
            Self::Ccd => 36,
            Self::Cce => 37,
            Self::EDate => 38,
            Self::SDate => 39,
            Self::MTime => 40,
            Self::YmdHms => 41,
            Self::Other(code) => code,
        }
    }

    /// Name as SPSS displays it.
    #[must_use]
    pub fn name(self) -> String {
        let name = match self {
            Self::A => "A",
            Self::AHex => "AHEX",
            Self::Comma => "COMMA",
            Self::Dollar => "DOLLAR",
            Self::F => "F",
            Self::Ib => "IB",
            Self::PibHex => "PIBHEX",
            Self::P => "P",
            Self::Pib => "PIB",
            Self::Pk => "PK",
            Self::Rb => "RB",
            Self::RbHex => "RBHEX",
            Self::Z => "Z",
            Self::N => "N",
            Self::E => "E",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::DateTime => "DATETIME",
            Self::ADate => "ADATE",
            Self::JDate => "JDATE",
            Self::DTime => "DTIME",
            Self::WkDay => "WKDAY",
            Self::Month => "MONTH",
            Self::MoYr => "MOYR",
            Self::QYr => "QYR",
            Self::WkYr => "WKYR",
            Self::Pct => "PCT",
            Self::Dot => "DOT",
            Self::Cca => "CCA",
            Self::Ccb => "CCB",
            Self::Ccc => "CCC",
            Self::Ccd => "CCD",
            Self::Cce => "CCE",
            Self::EDate => "EDATE",
            Self::SDate => "SDATE",
            Self::MTime => "MTIME",
            Self::YmdHms => "YMDHMS",
            Self::Other(code) => return format!("FMT{code}"),
        };
        name.to_string()
    }

    /// Whether values with this format hold seconds since the SPSS epoch.
    #[must_use]
    pub const fn is_date(self) -> bool {
        matches!(
            self,
            Self::Date
                | Self::DateTime
                | Self::ADate
                | Self::JDate
                | Self::MoYr
                | Self::QYr
                | Self::WkYr
                | Self::EDate
                | Self::SDate
                | Self::YmdHms
        )
    }
}

/// A print or write format (for example `F8.2`, `A20`, `DATE11`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavFormat {
    pub kind: FormatKind,
    pub width: u8,
    pub decimals: u8,
}

impl SavFormat {
    /// Default numeric format (`F8.2`).
    pub const NUMERIC: Self = Self {
        kind: FormatKind::F,
        width: 8,
        decimals: 2,
    };

    /// String format of the given width.
    #[must_use]
    pub fn string(width: usize) -> Self {
        Self {
            kind: FormatKind::A,
            width: u8::try_from(width).unwrap_or(u8::MAX),
            decimals: 0,
        }
    }

    /// Unpack a format from its 32-bit record representation.
    #[must_use]
    pub fn from_packed(raw: i32) -> Self {
        let bytes = raw.to_be_bytes();
        Self {
            kind: FormatKind::from_code(bytes[1]),
            width: bytes[2],
            decimals: bytes[3],
        }
    }

    /// Pack the format into its 32-bit record representation.
    #[must_use]
    pub fn to_packed(self) -> i32 {
        i32::from_be_bytes([0, self.kind.code(), self.width, self.decimals])
    }
}

impl fmt::Display for SavFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.decimals > 0 {
            write!(f, "{}{}.{}", self.kind.name(), self.width, self.decimals)
        } else {
            write!(f, "{}{}", self.kind.name(), self.width)
        }
    }
}
