//! Protocol codec
//!
//! Encoding and decoding functions for the dictionary wire format.
//!
//! ## Wire Format
//!
//! ```text
//! Message  := PayloadLen:u32 Payload
//! Payload  := Entry*                  (exactly PayloadLen bytes)
//! Entry    := KeyLen:u16 Key TypeCode:u8 Value
//! Value    := i64 | u64 | f64 bits | StrLen:u32 Str | BinLen:u32 Bin
//! ```

use bytes::{BufMut, Bytes, BytesMut};

use super::endian;
use super::{Message, Value, ValueType};
use crate::error::{Field, FormatError};

/// Header size: 4 bytes payload length
pub const HEADER_SIZE: usize = 4;

/// Largest key the 16-bit key length field can describe
pub const MAX_KEY_LEN: usize = u16::MAX as usize;

/// Largest string/binary value the 32-bit length field can describe
pub const MAX_VALUE_LEN: usize = u32::MAX as usize;

const KEY_LEN_SIZE: usize = 2;
const TYPE_CODE_SIZE: usize = 1;

// =============================================================================
// Encoding
// =============================================================================

/// Exact size of the encoded message, header included
pub fn encoded_len(message: &Message) -> usize {
    HEADER_SIZE + payload_len(message)
}

fn payload_len(message: &Message) -> usize {
    message
        .iter()
        .map(|(key, value)| KEY_LEN_SIZE + key.len() + TYPE_CODE_SIZE + value.wire_len())
        .sum()
}

/// Check that every length fits its wire field
pub fn check_limits(message: &Message) -> Result<(), FormatError> {
    for (key, value) in message {
        if key.len() > MAX_KEY_LEN {
            return Err(FormatError::KeyTooLong { len: key.len() });
        }
        let body_len = match value {
            Value::String(s) => s.len(),
            Value::Binary(b) => b.len(),
            _ => 0,
        };
        if body_len > MAX_VALUE_LEN {
            return Err(FormatError::ValueTooLong {
                key: key.clone(),
                len: body_len,
            });
        }
    }

    let len = payload_len(message);
    if len > u32::MAX as usize {
        return Err(FormatError::PayloadTooLong { len });
    }
    Ok(())
}

/// Encode a message to bytes
///
/// Entries are written in canonical key order. Lengths that overflow
/// their fields (see `check_limits`) are truncated on the wire, so
/// callers holding untrusted sizes should use `encode_checked`.
pub fn encode(message: &Message) -> Bytes {
    let payload_len = payload_len(message);
    let mut buf = BytesMut::with_capacity(HEADER_SIZE + payload_len);

    buf.put_slice(&endian::u32_to_wire(payload_len as u32));

    for (key, value) in message {
        buf.put_slice(&endian::u16_to_wire(key.len() as u16));
        buf.put_slice(key.as_bytes());
        buf.put_u8(value.value_type().code());

        match value {
            Value::Int64(v) => buf.put_slice(&endian::u64_to_wire(*v as u64)),
            Value::UInt64(v) => buf.put_slice(&endian::u64_to_wire(*v)),
            Value::Float64(v) => buf.put_slice(&endian::u64_to_wire(v.to_bits())),
            Value::String(s) => {
                buf.put_slice(&endian::u32_to_wire(s.len() as u32));
                buf.put_slice(s.as_bytes());
            }
            Value::Binary(b) => {
                buf.put_slice(&endian::u32_to_wire(b.len() as u32));
                buf.put_slice(b);
            }
        }
    }

    buf.freeze()
}

/// Encode a message after verifying all lengths fit the wire fields
pub fn encode_checked(message: &Message) -> Result<Bytes, FormatError> {
    check_limits(message)?;
    Ok(encode(message))
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode a message from bytes
///
/// The buffer must hold exactly one message: header plus the declared
/// payload, nothing more, nothing less.
pub fn decode(bytes: &[u8]) -> Result<Message, FormatError> {
    if bytes.len() < HEADER_SIZE {
        return Err(FormatError::TooShort { len: bytes.len() });
    }

    let declared = endian::u32_from_wire([bytes[0], bytes[1], bytes[2], bytes[3]]);
    let available = bytes.len() - HEADER_SIZE;

    if available < declared as usize {
        return Err(FormatError::Incomplete {
            declared,
            available,
        });
    }
    if available > declared as usize {
        return Err(FormatError::Oversized {
            declared,
            actual: available,
        });
    }

    let mut reader = Reader::new(&bytes[HEADER_SIZE..]);
    let mut message = Message::new();

    while !reader.is_empty() {
        let key_len = reader.read_u16(Field::KeyLength)? as usize;
        let key = reader.read_string(key_len, Field::Key)?;

        let type_code = reader.take(TYPE_CODE_SIZE, Field::TypeCode)?[0];
        let value = match ValueType::try_from(type_code)? {
            ValueType::Int64 => Value::Int64(reader.read_u64(Field::Int64)? as i64),
            ValueType::UInt64 => Value::UInt64(reader.read_u64(Field::UInt64)?),
            ValueType::Float64 => Value::Float64(f64::from_bits(reader.read_u64(Field::Float64)?)),
            ValueType::String => {
                let len = reader.read_u32(Field::StringLength)? as usize;
                Value::String(reader.read_string(len, Field::StringData)?)
            }
            ValueType::Binary => {
                let len = reader.read_u32(Field::BinaryLength)? as usize;
                Value::Binary(reader.take(len, Field::BinaryData)?.to_vec())
            }
        };

        // Duplicate keys on the wire: last one wins
        message.insert(key, value);
    }

    Ok(message)
}

/// Bounds-checked cursor over the payload
struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    fn take(&mut self, len: usize, field: Field) -> Result<&'a [u8], FormatError> {
        let remaining = self.buf.len() - self.pos;
        if len > remaining {
            return Err(FormatError::TruncatedField(field));
        }
        let slice = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self, field: Field) -> Result<[u8; N], FormatError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N, field)?);
        Ok(out)
    }

    fn read_u16(&mut self, field: Field) -> Result<u16, FormatError> {
        Ok(endian::u16_from_wire(self.take_array(field)?))
    }

    fn read_u32(&mut self, field: Field) -> Result<u32, FormatError> {
        Ok(endian::u32_from_wire(self.take_array(field)?))
    }

    fn read_u64(&mut self, field: Field) -> Result<u64, FormatError> {
        Ok(endian::u64_from_wire(self.take_array(field)?))
    }

    fn read_string(&mut self, len: usize, field: Field) -> Result<String, FormatError> {
        let bytes = self.take(len, field)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| FormatError::InvalidUtf8(field))
    }
}
