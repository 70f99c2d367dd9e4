// Copyright 2026 driedpampas@proton.me
// SPDX-License-Identifier: GPL-3.0-or-later

//! The named-tag wire codec: recursive reader/writer plus exact-length
//! precomputation, matching the original implementation's two-pass
//! (`_rs_nbt_tag_length` then `_rs_nbt_write_tag`) writing discipline rather
//! than an incrementally-grown buffer.

use super::mutf8;
use super::{Tag, TagCompound, TagKind, TagList};
use crate::error::{CodecError, TagError};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::Write;

/// A cursor over a byte slice, used for the recursive descent parser.
struct Reader<'a> {
    data: &'a [u8],
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Reader { data }
    }

    fn remaining(&self) -> usize {
        self.data.len()
    }

    fn read_u8(&mut self) -> Result<u8, CodecError> {
        if self.data.is_empty() {
            return Err(CodecError::UnexpectedEof);
        }
        let b = self.data[0];
        self.data = &self.data[1..];
        Ok(b)
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], CodecError> {
        if self.data.len() < len {
            return Err(CodecError::UnexpectedEof);
        }
        let (head, tail) = self.data.split_at(len);
        self.data = tail;
        Ok(head)
    }

    fn read_i8(&mut self) -> Result<i8, CodecError> {
        self.read_u8().map(|b| b as i8)
    }

    fn read_u16(&mut self) -> Result<u16, CodecError> {
        let bytes = self.read_bytes(2)?;
        Ok(u16::from_be_bytes(bytes.try_into().unwrap()))
    }

    fn read_i16(&mut self) -> Result<i16, CodecError> {
        self.read_u16().map(|v| v as i16)
    }

    fn read_i32(&mut self) -> Result<i32, CodecError> {
        let bytes = self.read_bytes(4)?;
        Ok(i32::from_be_bytes(bytes.try_into().unwrap()))
    }

    fn read_i64(&mut self) -> Result<i64, CodecError> {
        let bytes = self.read_bytes(8)?;
        Ok(i64::from_be_bytes(bytes.try_into().unwrap()))
    }

    fn read_f32(&mut self) -> Result<f32, CodecError> {
        self.read_i32().map(|v| f32::from_bits(v as u32))
    }

    fn read_f64(&mut self) -> Result<f64, CodecError> {
        self.read_i64().map(|v| f64::from_bits(v as u64))
    }

    fn read_string(&mut self) -> Result<String, CodecError> {
        let len = self.read_u16()? as usize;
        let bytes = self.read_bytes(len)?;
        mutf8::decode(bytes)
    }
}

fn read_tag(reader: &mut Reader, kind: TagKind) -> Result<Tag, CodecError> {
    Ok(match kind {
        TagKind::End => {
            // Only reachable if a caller explicitly asks to read an End
            // payload, which never happens from read_named/read_compound.
            return Err(CodecError::InvalidTagKind(0));
        }
        TagKind::Byte => Tag::Byte(reader.read_i8()?),
        TagKind::Short => Tag::Short(reader.read_i16()?),
        TagKind::Int => Tag::Int(reader.read_i32()?),
        TagKind::Long => Tag::Long(reader.read_i64()?),
        TagKind::Float => Tag::Float(reader.read_f32()?),
        TagKind::Double => Tag::Double(reader.read_f64()?),
        TagKind::ByteArray => {
            let len = reader.read_i32()?.max(0) as usize;
            Tag::ByteArray(reader.read_bytes(len)?.to_vec())
        }
        TagKind::String => Tag::String(reader.read_string()?),
        TagKind::List => {
            let elem_type_id = reader.read_u8()?;
            let count = reader.read_i32()?;
            if count <= 0 {
                let elem_kind = if elem_type_id == 0 {
                    TagKind::End
                } else {
                    TagKind::from_type_id(elem_type_id)
                        .ok_or(CodecError::InvalidTagKind(elem_type_id))?
                };
                return Ok(Tag::List(TagList::new(elem_kind).unwrap_or_else(|_| TagList::empty())));
            }
            let elem_kind =
                TagKind::from_type_id(elem_type_id).ok_or(CodecError::InvalidTagKind(elem_type_id))?;
            let mut list = TagList::new(elem_kind)?;
            for _ in 0..count {
                // Input exhaustion before `count` elements have been read is
                // a hard failure — read_tag below will surface UnexpectedEof
                // on its own if the buffer runs out mid-element.
                let item = read_tag(reader, elem_kind)?;
                list.push(item).map_err(CodecError::Tag)?;
            }
            Tag::List(list)
        }
        TagKind::Compound => {
            let mut compound = TagCompound::new();
            loop {
                let entry_type_id = reader.read_u8()?;
                if entry_type_id == 0 {
                    break;
                }
                let entry_kind = TagKind::from_type_id(entry_type_id)
                    .ok_or(CodecError::InvalidTagKind(entry_type_id))?;
                let name = reader.read_string()?;
                let value = read_tag(reader, entry_kind)?;
                compound.set(name, value);
            }
            Tag::Compound(compound)
        }
    })
}

/// Parses a named tag (type id + name + payload) from `bytes`, requiring
/// every byte to be consumed.
pub fn read_named(bytes: &[u8]) -> Result<(String, Tag), CodecError> {
    let mut reader = Reader::new(bytes);
    let type_id = reader.read_u8()?;
    let kind = TagKind::from_type_id(type_id).ok_or(CodecError::InvalidTagKind(type_id))?;
    if kind == TagKind::End {
        return Err(CodecError::InvalidTagKind(0));
    }
    let name = reader.read_string()?;
    let root = read_tag(&mut reader, kind)?;
    if reader.remaining() != 0 {
        return Err(CodecError::TrailingBytes(reader.remaining()));
    }
    Ok((name, root))
}

/// Computes the exact number of bytes [`write_tag`] will emit for `tag`,
/// not including any leading type id.
fn encoded_len(tag: &Tag) -> usize {
    match tag {
        Tag::Byte(_) => 1,
        Tag::Short(_) => 2,
        Tag::Int(_) => 4,
        Tag::Long(_) => 8,
        Tag::Float(_) => 4,
        Tag::Double(_) => 8,
        Tag::ByteArray(v) => 4 + v.len(),
        Tag::String(s) => 2 + mutf8::encode(s).len(),
        Tag::List(list) => {
            1 + 4
                + list
                    .iter()
                    .map(encoded_len)
                    .sum::<usize>()
        }
        Tag::Compound(compound) => {
            let mut total = 1; // terminating End byte
            for (name, value) in compound.iter() {
                total += 1; // entry type id
                total += 2 + mutf8::encode(name).len(); // entry name
                total += encoded_len(value);
            }
            total
        }
    }
}

fn write_tag<W: Write>(writer: &mut W, tag: &Tag) -> std::io::Result<()> {
    match tag {
        Tag::Byte(v) => writer.write_i8(*v),
        Tag::Short(v) => writer.write_i16::<BigEndian>(*v),
        Tag::Int(v) => writer.write_i32::<BigEndian>(*v),
        Tag::Long(v) => writer.write_i64::<BigEndian>(*v),
        Tag::Float(v) => writer.write_f32::<BigEndian>(*v),
        Tag::Double(v) => writer.write_f64::<BigEndian>(*v),
        Tag::ByteArray(v) => {
            writer.write_i32::<BigEndian>(v.len() as i32)?;
            writer.write_all(v)
        }
        Tag::String(s) => write_string(writer, s),
        Tag::List(list) => {
            writer.write_u8(list.elem_kind().type_id())?;
            writer.write_i32::<BigEndian>(list.len() as i32)?;
            for item in list.iter() {
                write_tag(writer, item)?;
            }
            Ok(())
        }
        Tag::Compound(compound) => {
            for (name, value) in compound.iter() {
                writer.write_u8(value.kind().type_id())?;
                write_string(writer, name)?;
                write_tag(writer, value)?;
            }
            writer.write_u8(0)
        }
    }
}

fn write_string<W: Write>(writer: &mut W, s: &str) -> std::io::Result<()> {
    let bytes = mutf8::encode(s);
    writer.write_u16::<BigEndian>(bytes.len() as u16)?;
    writer.write_all(&bytes)
}

/// Serializes `root` under `name` as a named tag, in a single pre-sized
/// buffer.
pub fn write_named(name: &str, root: &Tag) -> Vec<u8> {
    let name_bytes = mutf8::encode(name);
    let total = 1 + 2 + name_bytes.len() + encoded_len(root);
    let mut buf = Vec::with_capacity(total);
    buf.write_u8(root.kind().type_id()).expect("writing to a Vec cannot fail");
    buf.write_u16::<BigEndian>(name_bytes.len() as u16)
        .expect("writing to a Vec cannot fail");
    buf.write_all(&name_bytes).expect("writing to a Vec cannot fail");
    write_tag(&mut buf, root).expect("writing to a Vec cannot fail");
    buf
}

impl From<TagError> for CodecError {
    fn from(e: TagError) -> Self {
        CodecError::Tag(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_compound() -> Tag {
        let mut inner = TagCompound::new();
        inner.set("byte", Tag::Byte(-1));
        inner.set("str", Tag::String("hi!".into()));
        let mut list = TagList::new(TagKind::Int).unwrap();
        list.push(Tag::Int(1)).unwrap();
        list.push(Tag::Int(2)).unwrap();
        inner.set("list", Tag::List(list));
        Tag::Compound(inner)
    }

    #[test]
    fn round_trips_nested_compound() {
        let root = sample_compound();
        let bytes = write_named("root", &root);
        let (name, decoded) = read_named(&bytes).unwrap();
        assert_eq!(name, "root");
        assert_eq!(decoded, root);
    }

    #[test]
    fn write_named_length_matches_precomputation() {
        let root = sample_compound();
        let bytes = write_named("root", &root);
        assert_eq!(bytes.len(), 1 + 2 + 4 + encoded_len(&root));
    }

    #[test]
    fn minimal_four_byte_compound_parses() {
        // type id 10 (Compound), empty name, immediate End byte.
        let bytes = vec![10, 0, 0, 0];
        let (name, tag) = read_named(&bytes).unwrap();
        assert_eq!(name, "");
        assert_eq!(tag, Tag::Compound(TagCompound::new()));
    }

    #[test]
    fn trailing_bytes_are_an_error() {
        let root = Tag::Compound(TagCompound::new());
        let mut bytes = write_named("root", &root);
        bytes.push(0xFF);
        assert!(matches!(read_named(&bytes), Err(CodecError::TrailingBytes(1))));
    }

    #[test]
    fn list_truncated_before_count_reached_is_hard_failure() {
        // List of 2 Ints, but only one is present.
        let mut bytes = vec![9u8]; // List type id
        bytes.extend_from_slice(b"\x00\x00"); // empty name
        bytes.push(TagKind::List.type_id());
        bytes.push(TagKind::Int.type_id()); // elem type
        bytes.extend_from_slice(&2i32.to_be_bytes()); // declared count = 2
        bytes.extend_from_slice(&7i32.to_be_bytes()); // only one Int present
        assert!(matches!(read_named(&bytes), Err(CodecError::UnexpectedEof)));
    }

    #[test]
    fn unterminated_compound_is_a_hard_failure() {
        let bytes = vec![10, 0, 0, 1]; // Compound, empty name, entry type id 1 (Byte) then EOF
        assert!(matches!(read_named(&bytes), Err(CodecError::UnexpectedEof)));
    }
}
