//! Protocol Module
//!
//! Defines the dictionary wire format exchanged between peers.
//!
//! ## Message Format
//!
//! ```text
//! ┌──────────────┬─────────────────────────────────────────────┐
//! │ PayloadLen(4)│  Entry 1 │ Entry 2 │ ... │ Entry N          │
//! └──────────────┴─────────────────────────────────────────────┘
//! ```
//!
//! ### Entry Format
//! ```text
//! ┌───────────┬──────────────┬─────────┬────────────────────────┐
//! │ KeyLen(2) │ Key (KeyLen) │ Type(1) │ Value                  │
//! └───────────┴──────────────┴─────────┴────────────────────────┘
//! ```
//!
//! ### Type Codes
//! - 0x01: INT64   - Value: 8 bytes
//! - 0x02: UINT64  - Value: 8 bytes
//! - 0x03: FLOAT64 - Value: 8 bytes (IEEE-754 bit pattern)
//! - 0x04: STRING  - Value: len (4) + UTF-8 bytes
//! - 0x05: BINARY  - Value: len (4) + raw bytes
//!
//! All multi-byte integers are big-endian.

pub mod endian;
mod value;
mod message;
mod codec;

pub use value::{Value, ValueType};
pub use message::Message;
pub use codec::{
    check_limits, decode, encode, encode_checked, encoded_len, HEADER_SIZE, MAX_KEY_LEN,
    MAX_VALUE_LEN,
};
