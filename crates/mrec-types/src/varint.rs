//! Variable-length integer codec.
//!
//! Unsigned values use little-endian base-128 (LEB128): seven payload bits per
//! byte, high bit set on every byte except the last. Signed values are
//! zig-zag mapped first (`0, -1, 1, -2, ...` -> `0, 1, 2, 3, ...`) so small
//! magnitudes stay short regardless of sign.

use crate::error::TypeError;

/// Longest possible encoding of a 64-bit value.
pub const MAX_LEN_64: usize = 10;

/// Longest possible encoding of a 32-bit value.
pub const MAX_LEN_32: usize = 5;

/// Append the unsigned varint encoding of `value` to `buf`.
pub fn write_uvarint(buf: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        buf.push((value as u8) | 0x80);
        value >>= 7;
    }
    buf.push(value as u8);
}

/// Unsigned varint encoding of `value`.
pub fn encode_uvarint(value: u64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(MAX_LEN_64);
    write_uvarint(&mut buf, value);
    buf
}

/// Read one unsigned varint from the front of `data`.
///
/// Returns the value and the number of bytes consumed.
pub fn read_uvarint(data: &[u8]) -> Result<(u64, usize), TypeError> {
    let mut value: u64 = 0;
    let mut shift = 0u32;
    for (i, &byte) in data.iter().enumerate() {
        if i == MAX_LEN_64 {
            return Err(TypeError::VarintOverflow);
        }
        if byte < 0x80 {
            if i == MAX_LEN_64 - 1 && byte > 1 {
                return Err(TypeError::VarintOverflow);
            }
            return Ok((value | u64::from(byte) << shift, i + 1));
        }
        value |= u64::from(byte & 0x7f) << shift;
        shift += 7;
    }
    Err(TypeError::UnexpectedEof("varint"))
}

/// Decode a buffer that holds exactly one unsigned varint.
pub fn decode_uvarint(data: &[u8]) -> Result<u64, TypeError> {
    let (value, n) = read_uvarint(data)?;
    if n != data.len() {
        return Err(TypeError::TrailingBytes(data.len() - n));
    }
    Ok(value)
}

/// Zig-zag signed varint encoding of `value`.
pub fn encode_varint(value: i64) -> Vec<u8> {
    encode_uvarint(zigzag(value))
}

/// Read one zig-zag signed varint from the front of `data`.
pub fn read_varint(data: &[u8]) -> Result<(i64, usize), TypeError> {
    let (raw, n) = read_uvarint(data)?;
    Ok((unzigzag(raw), n))
}

/// Decode a buffer that holds exactly one zig-zag signed varint.
pub fn decode_varint(data: &[u8]) -> Result<i64, TypeError> {
    decode_uvarint(data).map(unzigzag)
}

fn zigzag(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

fn unzigzag(raw: u64) -> i64 {
    ((raw >> 1) as i64) ^ -((raw & 1) as i64)
}
