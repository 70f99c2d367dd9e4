// Copyright 2026 driedpampas@proton.me
// SPDX-License-Identifier: GPL-3.0-or-later

//! The tagged-tree value type.
//!
//! `Tag` is an owned value tree: building one, handing it to a `TagList` or
//! `TagCompound`, and dropping it all happens through ordinary Rust
//! ownership. There is no reference count and no "floating reference" to
//! sink — `Clone` plays the role a `ref()` call would, and a value going out
//! of scope or being replaced plays the role `unref()` would.

pub mod codec;
pub mod mutf8;
pub mod named;
#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
pub mod serde_impl;

use crate::error::TagError;
use indexmap::IndexMap;

/// The wire-format discriminant for a tag. `End` is never the kind of a
/// value stored in a `Tag` — it only appears as the terminator byte of a
/// compound's member list, and as the default, not-yet-fixed element kind
/// of an empty `TagList`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    End,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    ByteArray,
    String,
    List,
    Compound,
}

impl TagKind {
    /// The one-byte wire discriminant for this kind.
    pub fn type_id(self) -> u8 {
        match self {
            TagKind::End => 0,
            TagKind::Byte => 1,
            TagKind::Short => 2,
            TagKind::Int => 3,
            TagKind::Long => 4,
            TagKind::Float => 5,
            TagKind::Double => 6,
            TagKind::ByteArray => 7,
            TagKind::String => 8,
            TagKind::List => 9,
            TagKind::Compound => 10,
        }
    }

    /// Recovers a `TagKind` from its wire discriminant.
    pub fn from_type_id(id: u8) -> Option<TagKind> {
        Some(match id {
            0 => TagKind::End,
            1 => TagKind::Byte,
            2 => TagKind::Short,
            3 => TagKind::Int,
            4 => TagKind::Long,
            5 => TagKind::Float,
            6 => TagKind::Double,
            7 => TagKind::ByteArray,
            8 => TagKind::String,
            9 => TagKind::List,
            10 => TagKind::Compound,
            _ => return None,
        })
    }

    fn name(self) -> &'static str {
        match self {
            TagKind::End => "End",
            TagKind::Byte => "Byte",
            TagKind::Short => "Short",
            TagKind::Int => "Int",
            TagKind::Long => "Long",
            TagKind::Float => "Float",
            TagKind::Double => "Double",
            TagKind::ByteArray => "ByteArray",
            TagKind::String => "String",
            TagKind::List => "List",
            TagKind::Compound => "Compound",
        }
    }
}

/// A value in the tagged tree. Exactly the eleven user-visible kinds; `End`
/// is deliberately not a variant here, only a `TagKind`.
#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<u8>),
    String(String),
    List(TagList),
    Compound(TagCompound),
}

impl Tag {
    pub fn kind(&self) -> TagKind {
        match self {
            Tag::Byte(_) => TagKind::Byte,
            Tag::Short(_) => TagKind::Short,
            Tag::Int(_) => TagKind::Int,
            Tag::Long(_) => TagKind::Long,
            Tag::Float(_) => TagKind::Float,
            Tag::Double(_) => TagKind::Double,
            Tag::ByteArray(_) => TagKind::ByteArray,
            Tag::String(_) => TagKind::String,
            Tag::List(_) => TagKind::List,
            Tag::Compound(_) => TagKind::Compound,
        }
    }

    /// Reads this tag as a 64-bit integer, widening from whichever integer
    /// width it actually holds.
    pub fn as_integer(&self) -> Result<i64, TagError> {
        match self {
            Tag::Byte(v) => Ok(*v as i64),
            Tag::Short(v) => Ok(*v as i64),
            Tag::Int(v) => Ok(*v as i64),
            Tag::Long(v) => Ok(*v),
            other => Err(TagError::WrongKind {
                expected: "an integer kind",
                found: other.kind().name(),
            }),
        }
    }

    /// Stores `val` into this tag, truncating to the tag's own width (plain
    /// `as` truncation — e.g. storing `0x1FF` into a `Byte` yields `-1`).
    pub fn set_integer(&mut self, val: i64) -> Result<(), TagError> {
        match self {
            Tag::Byte(v) => *v = val as i8,
            Tag::Short(v) => *v = val as i16,
            Tag::Int(v) => *v = val as i32,
            Tag::Long(v) => *v = val,
            other => {
                return Err(TagError::WrongKind {
                    expected: "an integer kind",
                    found: other.kind().name(),
                });
            }
        }
        Ok(())
    }

    /// Reads this tag as a 64-bit float, widening if it's a `Float`.
    pub fn as_float(&self) -> Result<f64, TagError> {
        match self {
            Tag::Float(v) => Ok(*v as f64),
            Tag::Double(v) => Ok(*v),
            other => Err(TagError::WrongKind {
                expected: "Float or Double",
                found: other.kind().name(),
            }),
        }
    }

    pub fn set_float(&mut self, val: f64) -> Result<(), TagError> {
        match self {
            Tag::Float(v) => *v = val as f32,
            Tag::Double(v) => *v = val,
            other => {
                return Err(TagError::WrongKind {
                    expected: "Float or Double",
                    found: other.kind().name(),
                });
            }
        }
        Ok(())
    }

    pub fn as_byte_array(&self) -> Result<&[u8], TagError> {
        match self {
            Tag::ByteArray(v) => Ok(v),
            other => Err(TagError::WrongKind {
                expected: "ByteArray",
                found: other.kind().name(),
            }),
        }
    }

    pub fn as_byte_array_mut(&mut self) -> Result<&mut Vec<u8>, TagError> {
        match self {
            Tag::ByteArray(v) => Ok(v),
            other => Err(TagError::WrongKind {
                expected: "ByteArray",
                found: other.kind().name(),
            }),
        }
    }

    pub fn set_byte_array(&mut self, data: Vec<u8>) -> Result<(), TagError> {
        match self {
            Tag::ByteArray(v) => {
                *v = data;
                Ok(())
            }
            other => Err(TagError::WrongKind {
                expected: "ByteArray",
                found: other.kind().name(),
            }),
        }
    }

    pub fn as_str(&self) -> Result<&str, TagError> {
        match self {
            Tag::String(v) => Ok(v),
            other => Err(TagError::WrongKind {
                expected: "String",
                found: other.kind().name(),
            }),
        }
    }

    pub fn set_string(&mut self, s: impl Into<String>) -> Result<(), TagError> {
        match self {
            Tag::String(v) => {
                *v = s.into();
                Ok(())
            }
            other => Err(TagError::WrongKind {
                expected: "String",
                found: other.kind().name(),
            }),
        }
    }

    pub fn as_list(&self) -> Result<&TagList, TagError> {
        match self {
            Tag::List(v) => Ok(v),
            other => Err(TagError::WrongKind {
                expected: "List",
                found: other.kind().name(),
            }),
        }
    }

    pub fn as_list_mut(&mut self) -> Result<&mut TagList, TagError> {
        match self {
            Tag::List(v) => Ok(v),
            other => Err(TagError::WrongKind {
                expected: "List",
                found: other.kind().name(),
            }),
        }
    }

    pub fn as_compound(&self) -> Result<&TagCompound, TagError> {
        match self {
            Tag::Compound(v) => Ok(v),
            other => Err(TagError::WrongKind {
                expected: "Compound",
                found: other.kind().name(),
            }),
        }
    }

    pub fn as_compound_mut(&mut self) -> Result<&mut TagCompound, TagError> {
        match self {
            Tag::Compound(v) => Ok(v),
            other => Err(TagError::WrongKind {
                expected: "Compound",
                found: other.kind().name(),
            }),
        }
    }
}

/// A homogeneously-typed list of tags. The element kind is fixed the first
/// time it's set (via [`TagList::new`], [`TagList::from_vec`], or the first
/// successful [`TagList::insert`] on an untyped empty list) and cannot
/// change afterward.
#[derive(Debug, Clone, PartialEq)]
pub struct TagList {
    elem_kind: TagKind,
    items: Vec<Tag>,
}

impl TagList {
    /// Creates an empty list fixed to `elem_kind`.
    pub fn new(elem_kind: TagKind) -> Result<TagList, TagError> {
        if elem_kind == TagKind::End {
            return Err(TagError::ListKindIsEnd);
        }
        Ok(TagList {
            elem_kind,
            items: Vec::new(),
        })
    }

    /// Creates an empty, not-yet-typed list. Its kind is fixed by the first
    /// call to [`TagList::insert`] or [`TagList::set_type`].
    pub fn empty() -> TagList {
        TagList {
            elem_kind: TagKind::End,
            items: Vec::new(),
        }
    }

    /// Builds a list from a non-empty vec, inferring the element kind from
    /// the first item and validating the rest are the same kind.
    pub fn from_vec(items: Vec<Tag>) -> Result<TagList, TagError> {
        let elem_kind = match items.first() {
            Some(tag) => tag.kind(),
            None => TagKind::End,
        };
        for item in &items {
            if item.kind() != elem_kind {
                return Err(TagError::ListElementKindMismatch {
                    expected: elem_kind.name(),
                    found: item.kind().name(),
                });
            }
        }
        Ok(TagList { elem_kind, items })
    }

    pub fn elem_kind(&self) -> TagKind {
        self.elem_kind
    }

    /// Fixes the element kind of an empty, untyped list. Fails if the list
    /// already has elements or an already-fixed kind.
    pub fn set_type(&mut self, kind: TagKind) -> Result<(), TagError> {
        if kind == TagKind::End {
            return Err(TagError::ListKindIsEnd);
        }
        if self.elem_kind != TagKind::End && self.elem_kind != kind {
            return Err(TagError::ListKindFixed {
                existing: self.elem_kind.name(),
                requested: kind.name(),
            });
        }
        self.elem_kind = kind;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&Tag> {
        self.items.get(i)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tag> {
        self.items.iter()
    }

    /// Inserts `tag` at position `i`. `i == 0` prepends, `i >= len` appends,
    /// anything else inserts before the existing element at `i` — matching
    /// the original implementation's three-way split, though `Vec::insert`
    /// does this in one call here.
    pub fn insert(&mut self, i: usize, tag: Tag) -> Result<(), TagError> {
        if self.elem_kind == TagKind::End {
            self.elem_kind = tag.kind();
        } else if tag.kind() != self.elem_kind {
            return Err(TagError::ListElementKindMismatch {
                expected: self.elem_kind.name(),
                found: tag.kind().name(),
            });
        }
        let at = i.min(self.items.len());
        self.items.insert(at, tag);
        Ok(())
    }

    /// Appends `tag`, a shorthand for `insert(len(), tag)`.
    pub fn push(&mut self, tag: Tag) -> Result<(), TagError> {
        let len = self.items.len();
        self.insert(len, tag)
    }

    pub fn delete(&mut self, i: usize) -> Option<Tag> {
        if i < self.items.len() {
            Some(self.items.remove(i))
        } else {
            None
        }
    }

    pub fn reverse(&mut self) {
        self.items.reverse();
    }
}

impl IntoIterator for TagList {
    type Item = Tag;
    type IntoIter = std::vec::IntoIter<Tag>;
    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// A keyed collection of tags, insertion-ordered. Re-`set`ting an existing
/// key replaces its value in place without moving it in iteration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TagCompound(IndexMap<String, Tag>);

impl TagCompound {
    pub fn new() -> TagCompound {
        TagCompound(IndexMap::new())
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, Tag)>) -> TagCompound {
        TagCompound(pairs.into_iter().collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Tag> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Tag> {
        self.0.get_mut(key)
    }

    /// Sets `key` to `value`, returning the previous value if any.
    pub fn set(&mut self, key: impl Into<String>, value: Tag) -> Option<Tag> {
        self.0.insert(key.into(), value)
    }

    pub fn delete(&mut self, key: &str) -> Option<Tag> {
        self.0.shift_remove(key)
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Tag> {
        self.0.iter()
    }

    /// Walks a chain of compound keys, returning the final tag if every
    /// intermediate step is itself a compound containing the next key.
    pub fn get_chain(&self, keys: &[&str]) -> Option<&Tag> {
        let (first, rest) = keys.split_first()?;
        let mut current = self.0.get(*first)?;
        for key in rest {
            current = current.as_compound().ok()?.get(key)?;
        }
        Some(current)
    }
}

impl IntoIterator for TagCompound {
    type Item = (String, Tag);
    type IntoIter = indexmap::map::IntoIter<String, Tag>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a TagCompound {
    type Item = (&'a String, &'a Tag);
    type IntoIter = indexmap::map::Iter<'a, String, Tag>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_kind_fixed_on_first_insert() {
        let mut list = TagList::empty();
        list.insert(0, Tag::Int(1)).unwrap();
        assert_eq!(list.elem_kind(), TagKind::Int);
        assert!(list.insert(0, Tag::String("nope".into())).is_err());
    }

    #[test]
    fn list_set_type_requires_empty() {
        let mut list = TagList::new(TagKind::Int).unwrap();
        list.push(Tag::Int(1)).unwrap();
        assert!(list.set_type(TagKind::Int).is_ok());
        assert!(list.set_type(TagKind::Long).is_err());
    }

    #[test]
    fn list_insert_variants_match_order() {
        let mut list = TagList::new(TagKind::Int).unwrap();
        list.insert(0, Tag::Int(3)).unwrap();
        list.insert(0, Tag::Int(2)).unwrap();
        list.insert(0, Tag::Int(1)).unwrap();
        list.insert(3, Tag::Int(4)).unwrap();
        let values: Vec<i64> = list.iter().map(|t| t.as_integer().unwrap()).collect();
        assert_eq!(values, vec![1, 2, 3, 4]);
    }

    #[test]
    fn prepend_then_reverse_matches_append_order() {
        let mut built_by_append = TagList::new(TagKind::Int).unwrap();
        for v in [1, 2, 3] {
            built_by_append.push(Tag::Int(v)).unwrap();
        }

        let mut built_by_prepend = TagList::new(TagKind::Int).unwrap();
        for v in [3, 2, 1] {
            built_by_prepend.insert(0, Tag::Int(v)).unwrap();
        }
        built_by_prepend.reverse();

        assert_eq!(built_by_append, built_by_prepend);
    }

    #[test]
    fn compound_set_replaces_in_place_not_at_front() {
        let mut compound = TagCompound::new();
        compound.set("a", Tag::Int(1));
        compound.set("b", Tag::Int(2));
        compound.set("a", Tag::Int(99));
        let keys: Vec<&str> = compound.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(compound.get("a").unwrap().as_integer().unwrap(), 99);
    }

    #[test]
    fn get_chain_walks_nested_compounds() {
        let mut inner = TagCompound::new();
        inner.set("y", Tag::Int(42));
        let mut outer = TagCompound::new();
        outer.set("x", Tag::Compound(inner));

        assert_eq!(
            outer.get_chain(&["x", "y"]).unwrap().as_integer().unwrap(),
            42
        );
        assert!(outer.get_chain(&["x", "missing"]).is_none());
        assert!(outer.get_chain(&["missing"]).is_none());
    }

    #[test]
    fn set_integer_truncates_to_width() {
        let mut tag = Tag::Byte(0);
        tag.set_integer(0x1FF).unwrap();
        assert_eq!(tag.as_integer().unwrap(), -1);
    }
}
