//! Byte-order conversions
//!
//! Host ⇄ wire (big-endian) conversions for the fixed-width unsigned
//! integers the codec uses. Every multi-byte integer crossing the wire
//! goes through these functions.

/// Convert a u16 to its 2-byte wire representation
#[inline]
pub const fn u16_to_wire(value: u16) -> [u8; 2] {
    value.to_be_bytes()
}

/// Convert a 2-byte wire representation back to a host u16
#[inline]
pub const fn u16_from_wire(bytes: [u8; 2]) -> u16 {
    u16::from_be_bytes(bytes)
}

/// Convert a u32 to its 4-byte wire representation
#[inline]
pub const fn u32_to_wire(value: u32) -> [u8; 4] {
    value.to_be_bytes()
}

/// Convert a 4-byte wire representation back to a host u32
#[inline]
pub const fn u32_from_wire(bytes: [u8; 4]) -> u32 {
    u32::from_be_bytes(bytes)
}

/// Convert a u64 to its 8-byte wire representation
#[inline]
pub const fn u64_to_wire(value: u64) -> [u8; 8] {
    value.to_be_bytes()
}

/// Convert an 8-byte wire representation back to a host u64
#[inline]
pub const fn u64_from_wire(bytes: [u8; 8]) -> u64 {
    u64::from_be_bytes(bytes)
}
