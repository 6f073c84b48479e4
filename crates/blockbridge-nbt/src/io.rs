//! Bedrock network encoding of tag trees.
//!
//! This is the variant of NBT used inside Bedrock packets:
//!
//! ```text
//! Byte   i8
//! Short  i16 LE
//! Int    zig-zag varint
//! Long   zig-zag varlong
//! Float  f32 LE
//! Double f64 LE
//! String uvarint length + UTF-8
//! List   element type byte + zig-zag varint count + payloads
//! Compound  (type byte, name, payload)* then End
//! ```
//!
//! A tree on the wire is one named root compound; the bridge always writes
//! an empty root name.

use bytes::{BufMut, Bytes, BytesMut};

use blockbridge_protocol::wire;

use crate::{NbtError, NbtMap, NbtMapBuilder, TagType, TagValue};

/// Deepest nesting accepted when reading untrusted input.
const MAX_DEPTH: usize = 512;

/// Writes `map` as a root compound with an empty name.
pub fn write_network(buf: &mut BytesMut, map: &NbtMap) -> Result<(), NbtError> {
    buf.put_u8(TagType::Compound.id());
    wire::write_string(buf, "");
    write_compound(buf, map)
}

/// Reads a root compound written by [`write_network`].
pub fn read_network(buf: &mut Bytes) -> Result<NbtMap, NbtError> {
    let id = wire::read_u8(buf)?;
    let ty = TagType::from_id(id).ok_or(NbtError::UnknownTagType(id))?;
    if ty != TagType::Compound {
        return Err(NbtError::RootNotCompound(ty));
    }
    wire::read_string(buf)?;
    read_compound(buf, 0)
}

fn write_compound(buf: &mut BytesMut, map: &NbtMap) -> Result<(), NbtError> {
    for (key, value) in map.iter() {
        buf.put_u8(value.tag_type().id());
        wire::write_string(buf, key);
        write_payload(buf, key, value)?;
    }
    buf.put_u8(TagType::End.id());
    Ok(())
}

fn write_payload(buf: &mut BytesMut, key: &str, value: &TagValue) -> Result<(), NbtError> {
    match value {
        TagValue::Byte(v) => buf.put_i8(*v),
        TagValue::Short(v) => buf.put_i16_le(*v),
        TagValue::Int(v) => wire::write_varint(buf, *v),
        TagValue::Long(v) => wire::write_varlong(buf, *v),
        TagValue::Float(v) => buf.put_f32_le(*v),
        TagValue::Double(v) => buf.put_f64_le(*v),
        TagValue::String(v) => wire::write_string(buf, v),
        TagValue::List(items) => {
            let element = TagValue::list_element_type(items);
            if let Some(odd) = items.iter().find(|item| item.tag_type() != element) {
                return Err(NbtError::TypeMismatch {
                    key: key.to_owned(),
                    expected: element,
                    found: odd.tag_type(),
                });
            }
            buf.put_u8(element.id());
            wire::write_varint(buf, items.len() as i32);
            for item in items {
                write_payload(buf, key, item)?;
            }
        }
        TagValue::Compound(map) => write_compound(buf, map)?,
    }
    Ok(())
}

fn read_compound(buf: &mut Bytes, depth: usize) -> Result<NbtMap, NbtError> {
    if depth >= MAX_DEPTH {
        return Err(NbtError::TooDeep(MAX_DEPTH));
    }
    let mut builder = NbtMapBuilder::default();
    loop {
        let id = wire::read_u8(buf)?;
        let ty = TagType::from_id(id).ok_or(NbtError::UnknownTagType(id))?;
        if ty == TagType::End {
            return Ok(builder.build());
        }
        let key = wire::read_string(buf)?;
        let value = read_payload(buf, ty, depth + 1)?;
        builder.put(key, value);
    }
}

fn read_payload(buf: &mut Bytes, ty: TagType, depth: usize) -> Result<TagValue, NbtError> {
    Ok(match ty {
        TagType::End => return Err(NbtError::UnknownTagType(0)),
        TagType::Byte => TagValue::Byte(wire::read_i8(buf)?),
        TagType::Short => TagValue::Short(wire::read_i16_le(buf)?),
        TagType::Int => TagValue::Int(wire::read_varint(buf)?),
        TagType::Long => TagValue::Long(wire::read_varlong(buf)?),
        TagType::Float => TagValue::Float(wire::read_f32_le(buf)?),
        TagType::Double => TagValue::Double(wire::read_f64_le(buf)?),
        TagType::String => TagValue::String(wire::read_string(buf)?),
        TagType::List => {
            if depth >= MAX_DEPTH {
                return Err(NbtError::TooDeep(MAX_DEPTH));
            }
            let id = wire::read_u8(buf)?;
            let element = TagType::from_id(id).ok_or(NbtError::UnknownTagType(id))?;
            let len = wire::read_varint(buf)?.max(0) as usize;
            if element == TagType::End {
                return Ok(TagValue::List(Vec::new()));
            }
            let mut items = Vec::with_capacity(len.min(buf.len()));
            for _ in 0..len {
                items.push(read_payload(buf, element, depth + 1)?);
            }
            TagValue::List(items)
        }
        TagType::Compound => TagValue::Compound(read_compound(buf, depth)?),
    })
}
