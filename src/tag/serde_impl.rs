// Copyright 2026 driedpampas@proton.me
// SPDX-License-Identifier: GPL-3.0-or-later

//! Serde support for the tag tree.
//!
//! Converts between arbitrary `Serialize`/`Deserialize` types and `Tag`
//! trees. Requires the `serde` feature.

use super::{Tag, TagCompound, TagList};
use serde::{Deserialize, Serialize, de, ser};
use std::fmt;
use thiserror::Error;

/// Errors from converting to/from a `Tag` tree via serde.
#[derive(Debug, Error)]
pub enum SerdeError {
    #[error("{0}")]
    Custom(String),
    #[error("NBT map keys must be strings")]
    NonStringKey,
    #[error("expected a compound with exactly one key for an enum")]
    ExpectedSingleKeyCompound,
    #[error("expected a string or compound tag for an enum")]
    ExpectedEnumRepresentation,
}

impl ser::Error for SerdeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        SerdeError::Custom(msg.to_string())
    }
}

impl de::Error for SerdeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        SerdeError::Custom(msg.to_string())
    }
}

/// Converts a `Serialize` value into a `Tag`.
pub fn to_tag<T: Serialize>(value: &T) -> Result<Tag, SerdeError> {
    value.serialize(TagSerializer)
}

/// Converts a `Tag` into a `Deserialize` value.
pub fn from_tag<'a, T: Deserialize<'a>>(tag: Tag) -> Result<T, SerdeError> {
    T::deserialize(TagDeserializer::new(tag))
}

/// Unit and `None` have no direct tag representation, so both serialize to
/// an empty compound; `deserialize_option` treats an empty compound as
/// `None` on the way back.
fn unit_tag() -> Tag {
    Tag::Compound(TagCompound::new())
}

struct TagSerializer;

impl ser::Serializer for TagSerializer {
    type Ok = Tag;
    type Error = SerdeError;

    type SerializeSeq = SerializeSeq;
    type SerializeTuple = SerializeSeq;
    type SerializeTupleStruct = SerializeSeq;
    type SerializeTupleVariant = SerializeTupleVariant;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeMap;
    type SerializeStructVariant = SerializeStructVariant;

    fn serialize_bool(self, v: bool) -> Result<Tag, SerdeError> {
        Ok(Tag::Byte(if v { 1 } else { 0 }))
    }

    fn serialize_i8(self, v: i8) -> Result<Tag, SerdeError> {
        Ok(Tag::Byte(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Tag, SerdeError> {
        Ok(Tag::Short(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Tag, SerdeError> {
        Ok(Tag::Int(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Tag, SerdeError> {
        Ok(Tag::Long(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Tag, SerdeError> {
        Ok(Tag::Byte(v as i8))
    }

    fn serialize_u16(self, v: u16) -> Result<Tag, SerdeError> {
        Ok(Tag::Short(v as i16))
    }

    fn serialize_u32(self, v: u32) -> Result<Tag, SerdeError> {
        Ok(Tag::Int(v as i32))
    }

    fn serialize_u64(self, v: u64) -> Result<Tag, SerdeError> {
        Ok(Tag::Long(v as i64))
    }

    fn serialize_f32(self, v: f32) -> Result<Tag, SerdeError> {
        Ok(Tag::Float(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Tag, SerdeError> {
        Ok(Tag::Double(v))
    }

    fn serialize_char(self, v: char) -> Result<Tag, SerdeError> {
        self.serialize_str(&v.to_string())
    }

    fn serialize_str(self, v: &str) -> Result<Tag, SerdeError> {
        Ok(Tag::String(v.to_owned()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Tag, SerdeError> {
        Ok(Tag::ByteArray(v.to_vec()))
    }

    fn serialize_none(self) -> Result<Tag, SerdeError> {
        Ok(unit_tag())
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Tag, SerdeError> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Tag, SerdeError> {
        Ok(unit_tag())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Tag, SerdeError> {
        self.serialize_unit()
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Tag, SerdeError> {
        self.serialize_str(variant)
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Tag, SerdeError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Tag, SerdeError> {
        let mut compound = TagCompound::new();
        compound.set(variant, value.serialize(self)?);
        Ok(Tag::Compound(compound))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeSeq, SerdeError> {
        Ok(SerializeSeq {
            elements: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeSeq, SerdeError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<SerializeSeq, SerdeError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeTupleVariant, SerdeError> {
        Ok(SerializeTupleVariant {
            variant: variant.to_owned(),
            elements: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<SerializeMap, SerdeError> {
        Ok(SerializeMap {
            compound: TagCompound::new(),
            next_key: None,
        })
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<SerializeMap, SerdeError> {
        self.serialize_map(Some(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<SerializeStructVariant, SerdeError> {
        Ok(SerializeStructVariant {
            variant: variant.to_owned(),
            compound: TagCompound::new(),
        })
    }
}

struct SerializeSeq {
    elements: Vec<Tag>,
}

impl ser::SerializeSeq for SerializeSeq {
    type Ok = Tag;
    type Error = SerdeError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), SerdeError> {
        self.elements.push(value.serialize(TagSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Tag, SerdeError> {
        Ok(Tag::List(TagList::from_vec(self.elements).map_err(ser::Error::custom)?))
    }
}

impl ser::SerializeTuple for SerializeSeq {
    type Ok = Tag;
    type Error = SerdeError;
    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), SerdeError> {
        ser::SerializeSeq::serialize_element(self, value)
    }
    fn end(self) -> Result<Tag, SerdeError> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SerializeSeq {
    type Ok = Tag;
    type Error = SerdeError;
    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), SerdeError> {
        ser::SerializeSeq::serialize_element(self, value)
    }
    fn end(self) -> Result<Tag, SerdeError> {
        ser::SerializeSeq::end(self)
    }
}

struct SerializeTupleVariant {
    variant: String,
    elements: Vec<Tag>,
}

impl ser::SerializeTupleVariant for SerializeTupleVariant {
    type Ok = Tag;
    type Error = SerdeError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), SerdeError> {
        self.elements.push(value.serialize(TagSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Tag, SerdeError> {
        let list = TagList::from_vec(self.elements).map_err(ser::Error::custom)?;
        let mut compound = TagCompound::new();
        compound.set(self.variant, Tag::List(list));
        Ok(Tag::Compound(compound))
    }
}

struct SerializeMap {
    compound: TagCompound,
    next_key: Option<String>,
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Tag;
    type Error = SerdeError;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), SerdeError> {
        match key.serialize(TagSerializer)? {
            Tag::String(s) => {
                self.next_key = Some(s);
                Ok(())
            }
            _ => Err(SerdeError::NonStringKey),
        }
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), SerdeError> {
        let key = self.next_key.take().expect("serialize_key called first");
        self.compound.set(key, value.serialize(TagSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Tag, SerdeError> {
        Ok(Tag::Compound(self.compound))
    }
}

impl ser::SerializeStruct for SerializeMap {
    type Ok = Tag;
    type Error = SerdeError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), SerdeError> {
        self.compound.set(key, value.serialize(TagSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Tag, SerdeError> {
        Ok(Tag::Compound(self.compound))
    }
}

struct SerializeStructVariant {
    variant: String,
    compound: TagCompound,
}

impl ser::SerializeStructVariant for SerializeStructVariant {
    type Ok = Tag;
    type Error = SerdeError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), SerdeError> {
        self.compound.set(key, value.serialize(TagSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Tag, SerdeError> {
        let mut outer = TagCompound::new();
        outer.set(self.variant, Tag::Compound(self.compound));
        Ok(Tag::Compound(outer))
    }
}

struct TagDeserializer {
    tag: Tag,
}

impl TagDeserializer {
    fn new(tag: Tag) -> Self {
        TagDeserializer { tag }
    }
}

fn is_unit(tag: &Tag) -> bool {
    matches!(tag, Tag::Compound(c) if c.is_empty())
}

impl<'de> de::Deserializer<'de> for TagDeserializer {
    type Error = SerdeError;

    fn deserialize_any<V: de::Visitor<'de>>(self, visitor: V) -> Result<V::Value, SerdeError> {
        match self.tag {
            Tag::Byte(v) => visitor.visit_i8(v),
            Tag::Short(v) => visitor.visit_i16(v),
            Tag::Int(v) => visitor.visit_i32(v),
            Tag::Long(v) => visitor.visit_i64(v),
            Tag::Float(v) => visitor.visit_f32(v),
            Tag::Double(v) => visitor.visit_f64(v),
            Tag::ByteArray(v) => visitor.visit_byte_buf(v),
            Tag::String(v) => visitor.visit_string(v),
            Tag::List(v) => visitor.visit_seq(SeqAccess {
                iter: v.into_iter(),
            }),
            Tag::Compound(v) => visitor.visit_map(MapAccess {
                iter: v.into_iter(),
                next_value: None,
            }),
        }
    }

    fn deserialize_bool<V: de::Visitor<'de>>(self, visitor: V) -> Result<V::Value, SerdeError> {
        match self.tag {
            Tag::Byte(v) => visitor.visit_bool(v != 0),
            _ => self.deserialize_any(visitor),
        }
    }

    fn deserialize_option<V: de::Visitor<'de>>(self, visitor: V) -> Result<V::Value, SerdeError> {
        if is_unit(&self.tag) {
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_unit<V: de::Visitor<'de>>(self, visitor: V) -> Result<V::Value, SerdeError> {
        visitor.visit_unit()
    }

    fn deserialize_newtype_struct<V: de::Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, SerdeError> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: de::Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, SerdeError> {
        match self.tag {
            Tag::String(s) => visitor.visit_enum(EnumAccess {
                variant: s,
                value: None,
            }),
            Tag::Compound(m) if m.len() == 1 => {
                let (k, v) = m.into_iter().next().unwrap();
                visitor.visit_enum(EnumAccess {
                    variant: k,
                    value: Some(v),
                })
            }
            Tag::Compound(_) => Err(SerdeError::ExpectedSingleKeyCompound),
            _ => Err(SerdeError::ExpectedEnumRepresentation),
        }
    }

    serde::forward_to_deserialize_any! {
        i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}

struct SeqAccess {
    iter: std::vec::IntoIter<Tag>,
}

impl<'de> de::SeqAccess<'de> for SeqAccess {
    type Error = SerdeError;

    fn next_element_seed<T: de::DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>, SerdeError> {
        match self.iter.next() {
            Some(tag) => seed.deserialize(TagDeserializer::new(tag)).map(Some),
            None => Ok(None),
        }
    }
}

struct MapAccess {
    iter: indexmap::map::IntoIter<String, Tag>,
    next_value: Option<Tag>,
}

impl<'de> de::MapAccess<'de> for MapAccess {
    type Error = SerdeError;

    fn next_key_seed<K: de::DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> Result<Option<K::Value>, SerdeError> {
        match self.iter.next() {
            Some((k, v)) => {
                self.next_value = Some(v);
                seed.deserialize(de::value::StringDeserializer::new(k)).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V: de::DeserializeSeed<'de>>(
        &mut self,
        seed: V,
    ) -> Result<V::Value, SerdeError> {
        let v = self.next_value.take().expect("next_key_seed called first");
        seed.deserialize(TagDeserializer::new(v))
    }
}

struct EnumAccess {
    variant: String,
    value: Option<Tag>,
}

impl<'de> de::EnumAccess<'de> for EnumAccess {
    type Error = SerdeError;
    type Variant = VariantAccess;

    fn variant_seed<V: de::DeserializeSeed<'de>>(
        self,
        seed: V,
    ) -> Result<(V::Value, VariantAccess), SerdeError> {
        let variant = seed.deserialize(de::value::StringDeserializer::new(self.variant))?;
        Ok((variant, VariantAccess { value: self.value }))
    }
}

struct VariantAccess {
    value: Option<Tag>,
}

impl<'de> de::VariantAccess<'de> for VariantAccess {
    type Error = SerdeError;

    fn unit_variant(self) -> Result<(), SerdeError> {
        match self.value {
            None => Ok(()),
            Some(tag) if is_unit(&tag) => Ok(()),
            Some(_) => Err(SerdeError::Custom("expected a unit variant".into())),
        }
    }

    fn newtype_variant_seed<T: de::DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value, SerdeError> {
        match self.value {
            Some(tag) => seed.deserialize(TagDeserializer::new(tag)),
            None => Err(SerdeError::Custom("expected a newtype variant".into())),
        }
    }

    fn tuple_variant<V: de::Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value, SerdeError> {
        match self.value {
            Some(Tag::List(v)) => visitor.visit_seq(SeqAccess {
                iter: v.into_iter(),
            }),
            _ => Err(SerdeError::Custom("expected a list for a tuple variant".into())),
        }
    }

    fn struct_variant<V: de::Visitor<'de>>(
        self,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, SerdeError> {
        match self.value {
            Some(Tag::Compound(v)) => visitor.visit_map(MapAccess {
                iter: v.into_iter(),
                next_value: None,
            }),
            _ => Err(SerdeError::Custom("expected a compound for a struct variant".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Meta {
        name: String,
        level: i32,
        tags: Vec<String>,
    }

    #[test]
    fn struct_round_trips_through_tag_tree() {
        let meta = Meta {
            name: "forest".into(),
            level: 7,
            tags: vec!["biome".into(), "overworld".into()],
        };
        let tag = to_tag(&meta).unwrap();
        let back: Meta = from_tag(tag).unwrap();
        assert_eq!(meta, back);
    }

    #[test]
    fn option_none_round_trips_via_unit_compound() {
        let tag = to_tag(&Option::<i32>::None).unwrap();
        assert!(is_unit(&tag));
        let back: Option<i32> = from_tag(tag).unwrap();
        assert_eq!(back, None);
    }
}
