//! Error types for SBDP
//!
//! Provides a unified error type for all operations, plus the codec's
//! own `FormatError` taxonomy.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Result type alias using SbdpError
pub type Result<T> = std::result::Result<T, SbdpError>;

/// Unified error type for SBDP operations
#[derive(Debug, Error)]
pub enum SbdpError {
    // -------------------------------------------------------------------------
    // Codec Errors
    // -------------------------------------------------------------------------
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Connection closed by peer after {received} of {expected} bytes")]
    Closed { received: usize, expected: usize },

    #[error("Timed out after {0:?} waiting for data")]
    Timeout(Duration),

    #[error("Operation cancelled: socket shutdown")]
    Cancelled,

    // -------------------------------------------------------------------------
    // Framing Errors
    // -------------------------------------------------------------------------
    #[error("Header read failed: {0}")]
    HeaderReadFailed(#[source] Box<SbdpError>),

    #[error("Payload read failed: {0}")]
    PayloadReadFailed(#[source] Box<SbdpError>),

    #[error("Payload too large: {declared} bytes (max {max})")]
    PayloadTooLarge { declared: u32, max: u32 },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SbdpError {
    /// Strip the framing wrappers and return the underlying cause
    pub fn root(&self) -> &SbdpError {
        match self {
            SbdpError::HeaderReadFailed(inner) | SbdpError::PayloadReadFailed(inner) => {
                inner.root()
            }
            other => other,
        }
    }

    /// True if a bounded receive gave up waiting for data
    pub fn is_timeout(&self) -> bool {
        matches!(self.root(), SbdpError::Timeout(_))
    }

    /// True if the operation observed a shutdown in progress
    pub fn is_cancelled(&self) -> bool {
        matches!(self.root(), SbdpError::Cancelled)
    }

    /// True if the peer closed its side of the connection
    pub fn is_peer_closed(&self) -> bool {
        match self.root() {
            SbdpError::Closed { .. } => true,
            SbdpError::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::BrokenPipe
            ),
            _ => false,
        }
    }
}

/// Violations of the wire format
///
/// Decode failures are fatal to that single decode attempt; no partial
/// message is ever produced. The `*TooLong` variants are raised by
/// `check_limits` before encoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("message too short: {len} bytes, header needs 4")]
    TooShort { len: usize },

    #[error("incomplete message: header declares {declared} payload bytes, {available} available")]
    Incomplete { declared: u32, available: usize },

    #[error("oversized message: header declares {declared} payload bytes, {actual} present")]
    Oversized { declared: u32, actual: usize },

    #[error("truncated {0}")]
    TruncatedField(Field),

    #[error("unknown type code: 0x{0:02x}")]
    UnknownType(u8),

    #[error("{0} is not valid UTF-8")]
    InvalidUtf8(Field),

    #[error("key of {len} bytes exceeds the 16-bit key length field")]
    KeyTooLong { len: usize },

    #[error("value for key {key:?} is {len} bytes, exceeds the 32-bit length field")]
    ValueTooLong { key: String, len: usize },

    #[error("payload of {len} bytes exceeds the 32-bit header field")]
    PayloadTooLong { len: usize },
}

/// A wire field named by a truncation or encoding error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    KeyLength,
    Key,
    TypeCode,
    Int64,
    UInt64,
    Float64,
    StringLength,
    StringData,
    BinaryLength,
    BinaryData,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::KeyLength => "key length",
            Field::Key => "key",
            Field::TypeCode => "type code",
            Field::Int64 => "int64 value",
            Field::UInt64 => "uint64 value",
            Field::Float64 => "float64 value",
            Field::StringLength => "string length",
            Field::StringData => "string data",
            Field::BinaryLength => "binary length",
            Field::BinaryData => "binary data",
        };
        f.write_str(name)
    }
}
