//! Typed column values.
//!
//! [`DataType`] enumerates the column types a table may declare, together
//! with their on-disk codes as stored in `_columns.data_type`. [`Datum`] is
//! a single typed value; a null is represented as `None` in the
//! `Option<Datum>` slots carried by row vectors, not as a `Datum` variant.

use std::fmt;

use serde::Serialize;

use crate::RowdbError;

/// Column data types and their catalog codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DataType {
    /// 1 byte, unsigned.
    TinyInt,
    /// 2 bytes, signed.
    SmallInt,
    /// 4 bytes, signed.
    Int,
    /// 8 bytes, signed.
    BigInt,
    /// 1 byte, always 0 or 1.
    Bool,
    /// Fixed width, zero-padded to the declared length.
    Char,
    /// Variable width with a 2-byte total-length prefix.
    VarChar,
}

impl DataType {
    /// Map a catalog type code to a `DataType`.
    pub fn from_code(code: u8) -> Result<Self, RowdbError> {
        match code {
            0 => Ok(DataType::TinyInt),
            1 => Ok(DataType::SmallInt),
            2 => Ok(DataType::Int),
            3 => Ok(DataType::BigInt),
            4 => Ok(DataType::Bool),
            5 => Ok(DataType::Char),
            6 => Ok(DataType::VarChar),
            other => Err(RowdbError::UnknownDataType(other)),
        }
    }

    /// The catalog type code stored in `_columns.data_type`.
    pub fn code(self) -> u8 {
        match self {
            DataType::TinyInt => 0,
            DataType::SmallInt => 1,
            DataType::Int => 2,
            DataType::BigInt => 3,
            DataType::Bool => 4,
            DataType::Char => 5,
            DataType::VarChar => 6,
        }
    }

    /// Whether values of this type serialize at a fixed width.
    /// Everything except `VARCHAR` is fixed-width (`CHAR` pads to its
    /// declared length).
    pub fn is_fixed(self) -> bool {
        !matches!(self, DataType::VarChar)
    }

    /// Lowercase SQL-ish name, e.g. `"varchar"`.
    pub fn name(self) -> &'static str {
        match self {
            DataType::TinyInt => "tinyint",
            DataType::SmallInt => "smallint",
            DataType::Int => "int",
            DataType::BigInt => "bigint",
            DataType::Bool => "bool",
            DataType::Char => "char",
            DataType::VarChar => "varchar",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One typed column value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Datum {
    TinyInt(u8),
    SmallInt(i16),
    Int(i32),
    BigInt(i64),
    Bool(bool),
    Char(String),
    VarChar(String),
}

impl Datum {
    /// The value's data type.
    pub fn data_type(&self) -> DataType {
        match self {
            Datum::TinyInt(_) => DataType::TinyInt,
            Datum::SmallInt(_) => DataType::SmallInt,
            Datum::Int(_) => DataType::Int,
            Datum::BigInt(_) => DataType::BigInt,
            Datum::Bool(_) => DataType::Bool,
            Datum::Char(_) => DataType::Char,
            Datum::VarChar(_) => DataType::VarChar,
        }
    }

    /// Widen any integer variant to `i64`. `None` for strings and bools.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Datum::TinyInt(v) => Some(i64::from(*v)),
            Datum::SmallInt(v) => Some(i64::from(*v)),
            Datum::Int(v) => Some(i64::from(*v)),
            Datum::BigInt(v) => Some(*v),
            _ => None,
        }
    }

    /// Borrow the payload of a `Char` or `VarChar` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Datum::Char(s) | Datum::VarChar(s) => Some(s),
            _ => None,
        }
    }

    /// The payload of a `Bool` value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Datum::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datum::TinyInt(v) => write!(f, "{}", v),
            Datum::SmallInt(v) => write!(f, "{}", v),
            Datum::Int(v) => write!(f, "{}", v),
            Datum::BigInt(v) => write!(f, "{}", v),
            Datum::Bool(v) => write!(f, "{}", v),
            Datum::Char(s) | Datum::VarChar(s) => f.write_str(s),
        }
    }
}
