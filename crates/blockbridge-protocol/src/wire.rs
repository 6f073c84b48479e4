//! Primitive field codecs for the Bedrock wire format.
//!
//! Bedrock mixes three integer encodings:
//!
//! - **LEB128 varints** (`uvarint`, `uvarlong`): 7 bits per byte, high bit
//!   set on every byte except the last.
//! - **Zig-zag varints** (`varint`, `varlong`): signed values folded onto
//!   unsigned ones (`0 → 0, -1 → 1, 1 → 2, ...`) and then LEB128 encoded.
//! - **Fixed little-endian** integers (`u16_le`, `i64_le`).
//!
//! Readers work on any [`Buf`] and never panic on short input: every read
//! checks `remaining()` first and returns [`ProtocolError::Truncated`].

use bytes::{Buf, BufMut, Bytes};

use crate::ProtocolError;

/// Maximum bytes in an encoded 32-bit varint.
const MAX_VARINT_BYTES: usize = 5;
/// Maximum bytes in an encoded 64-bit varint.
const MAX_VARLONG_BYTES: usize = 10;

fn ensure(buf: &impl Buf, needed: usize) -> Result<(), ProtocolError> {
    let remaining = buf.remaining();
    if remaining < needed {
        return Err(ProtocolError::Truncated { needed, remaining });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Varints
// ---------------------------------------------------------------------------

fn read_leb128(buf: &mut impl Buf, max_bytes: usize) -> Result<u64, ProtocolError> {
    let mut value: u64 = 0;
    for i in 0..max_bytes {
        ensure(buf, 1)?;
        let byte = buf.get_u8();
        value |= u64::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok(value);
        }
    }
    Err(ProtocolError::VarIntTooLong { max_bytes })
}

fn write_leb128(buf: &mut impl BufMut, mut value: u64) {
    loop {
        if value & !0x7f == 0 {
            buf.put_u8(value as u8);
            return;
        }
        buf.put_u8((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
}

/// Reads an unsigned 32-bit LEB128 varint.
pub fn read_uvarint(buf: &mut impl Buf) -> Result<u32, ProtocolError> {
    read_leb128(buf, MAX_VARINT_BYTES).map(|v| v as u32)
}

/// Reads an unsigned 64-bit LEB128 varint.
pub fn read_uvarlong(buf: &mut impl Buf) -> Result<u64, ProtocolError> {
    read_leb128(buf, MAX_VARLONG_BYTES)
}

/// Reads a zig-zag encoded signed 32-bit varint.
pub fn read_varint(buf: &mut impl Buf) -> Result<i32, ProtocolError> {
    let raw = read_uvarint(buf)?;
    Ok(((raw >> 1) as i32) ^ -((raw & 1) as i32))
}

/// Reads a zig-zag encoded signed 64-bit varint.
pub fn read_varlong(buf: &mut impl Buf) -> Result<i64, ProtocolError> {
    let raw = read_uvarlong(buf)?;
    Ok(((raw >> 1) as i64) ^ -((raw & 1) as i64))
}

pub fn write_uvarint(buf: &mut impl BufMut, value: u32) {
    write_leb128(buf, u64::from(value));
}

pub fn write_uvarlong(buf: &mut impl BufMut, value: u64) {
    write_leb128(buf, value);
}

pub fn write_varint(buf: &mut impl BufMut, value: i32) {
    write_uvarint(buf, ((value << 1) ^ (value >> 31)) as u32);
}

pub fn write_varlong(buf: &mut impl BufMut, value: i64) {
    write_uvarlong(buf, ((value << 1) ^ (value >> 63)) as u64);
}

// ---------------------------------------------------------------------------
// Fixed-width fields
// ---------------------------------------------------------------------------

pub fn read_u8(buf: &mut impl Buf) -> Result<u8, ProtocolError> {
    ensure(buf, 1)?;
    Ok(buf.get_u8())
}

pub fn read_i8(buf: &mut impl Buf) -> Result<i8, ProtocolError> {
    ensure(buf, 1)?;
    Ok(buf.get_i8())
}

/// Reads a single byte as a boolean. Any non-zero value is `true`.
pub fn read_bool(buf: &mut impl Buf) -> Result<bool, ProtocolError> {
    read_u8(buf).map(|b| b != 0)
}

pub fn write_bool(buf: &mut impl BufMut, value: bool) {
    buf.put_u8(u8::from(value));
}

pub fn read_u16_le(buf: &mut impl Buf) -> Result<u16, ProtocolError> {
    ensure(buf, 2)?;
    Ok(buf.get_u16_le())
}

pub fn read_i16_le(buf: &mut impl Buf) -> Result<i16, ProtocolError> {
    ensure(buf, 2)?;
    Ok(buf.get_i16_le())
}

pub fn read_i64_le(buf: &mut impl Buf) -> Result<i64, ProtocolError> {
    ensure(buf, 8)?;
    Ok(buf.get_i64_le())
}

pub fn read_f32_le(buf: &mut impl Buf) -> Result<f32, ProtocolError> {
    ensure(buf, 4)?;
    Ok(buf.get_f32_le())
}

pub fn read_f64_le(buf: &mut impl Buf) -> Result<f64, ProtocolError> {
    ensure(buf, 8)?;
    Ok(buf.get_f64_le())
}

/// Advances past `len` bytes without looking at them.
pub fn skip(buf: &mut impl Buf, len: usize) -> Result<(), ProtocolError> {
    ensure(buf, len)?;
    buf.advance(len);
    Ok(())
}

// ---------------------------------------------------------------------------
// Length-prefixed fields
// ---------------------------------------------------------------------------

/// Reads a uvarint length followed by that many raw bytes.
pub fn read_byte_array(buf: &mut impl Buf) -> Result<Bytes, ProtocolError> {
    let len = read_uvarint(buf)? as usize;
    ensure(buf, len)?;
    Ok(buf.copy_to_bytes(len))
}

pub fn write_byte_array(buf: &mut impl BufMut, data: &[u8]) {
    write_uvarint(buf, data.len() as u32);
    buf.put_slice(data);
}

/// Reads a uvarint-prefixed UTF-8 string.
pub fn read_string(buf: &mut impl Buf) -> Result<String, ProtocolError> {
    let raw = read_byte_array(buf)?;
    String::from_utf8(raw.to_vec()).map_err(|_| ProtocolError::InvalidString)
}

pub fn write_string(buf: &mut impl BufMut, value: &str) {
    write_byte_array(buf, value.as_bytes());
}
