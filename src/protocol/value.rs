//! Value definitions
//!
//! The closed set of typed values a message entry can carry.

use std::fmt;

use crate::error::FormatError;

/// Wire type codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ValueType {
    Int64 = 0x01,
    UInt64 = 0x02,
    Float64 = 0x03,
    String = 0x04,
    Binary = 0x05,
}

impl ValueType {
    /// The single-byte code written on the wire
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for ValueType {
    type Error = FormatError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0x01 => Ok(ValueType::Int64),
            0x02 => Ok(ValueType::UInt64),
            0x03 => Ok(ValueType::Float64),
            0x04 => Ok(ValueType::String),
            0x05 => Ok(ValueType::Binary),
            other => Err(FormatError::UnknownType(other)),
        }
    }
}

/// A typed value stored under a message key
///
/// Equality on `Float64` is numeric, so `NaN != NaN`; compare
/// `f64::to_bits` when bit-exactness matters.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Signed 64-bit integer
    Int64(i64),

    /// Unsigned 64-bit integer
    UInt64(u64),

    /// IEEE-754 double
    Float64(f64),

    /// UTF-8 text
    String(String),

    /// Opaque bytes
    Binary(Vec<u8>),
}

impl Value {
    /// Get the wire type of this value
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Int64(_) => ValueType::Int64,
            Value::UInt64(_) => ValueType::UInt64,
            Value::Float64(_) => ValueType::Float64,
            Value::String(_) => ValueType::String,
            Value::Binary(_) => ValueType::Binary,
        }
    }

    /// Encoded size of the value body (excluding the type code)
    pub fn wire_len(&self) -> usize {
        match self {
            Value::Int64(_) | Value::UInt64(_) | Value::Float64(_) => 8,
            Value::String(s) => 4 + s.len(),
            Value::Binary(b) => 4 + b.len(),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::UInt64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Binary(b) => Some(b),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UInt64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Binary(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Binary(v.to_vec())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int64(v) => write!(f, "int64({})", v),
            Value::UInt64(v) => write!(f, "uint64({})", v),
            Value::Float64(v) => write!(f, "float64({})", v),
            Value::String(s) => write!(f, "string({:?})", s),
            Value::Binary(b) => {
                f.write_str("binary(")?;
                for byte in b {
                    write!(f, "{:02x}", byte)?;
                }
                f.write_str(")")
            }
        }
    }
}
