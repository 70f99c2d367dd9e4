// Copyright 2026 driedpampas@proton.me
// SPDX-License-Identifier: GPL-3.0-or-later

//! Read-only accessors over a [`Region`]'s header and chunk payloads.

use super::{Region, SECTOR_SIZE, slot_index};
use crate::compression::CompressionKind;
use crate::error::RegionError;
use crate::soft_warn;

/// A chunk's raw (still-compressed) payload and the codec it's stored with.
pub struct ChunkData {
    pub bytes: Vec<u8>,
    pub codec: CompressionKind,
}

/// Coordinate-checks `(x, z)`, logging and returning `None` on an
/// out-of-range pair rather than handing the caller a `RegionError` — every
/// read accessor in this module is a soft check, never a hard failure over
/// a bad coordinate.
fn checked_index(x: u8, z: u8) -> Option<usize> {
    match slot_index(x, z) {
        Ok(index) => Some(index),
        Err(_) => {
            soft_warn!("region read called with out-of-range coordinate ({x}, {z})");
            None
        }
    }
}

impl Region {
    /// Whether a chunk is present at `(x, z)`, accounting for pending
    /// queued writes that haven't been flushed yet. An out-of-range
    /// coordinate is a soft check: logged, and reported as absent.
    pub fn contains(&self, x: u8, z: u8) -> bool {
        let Some(index) = checked_index(x, z) else {
            return false;
        };
        if let Some(pending) = self.pending.get(&(x, z)) {
            return !pending.clear;
        }
        self.is_present_on_disk(index)
    }

    /// The slot's last-modified timestamp, or 0 if unset or out of range
    /// (logged, not an error — matches the soft-check convention for
    /// read-only queries).
    pub fn timestamp(&self, x: u8, z: u8) -> u32 {
        let Some(index) = checked_index(x, z) else {
            return 0;
        };
        if let Some(pending) = self.pending.get(&(x, z)) {
            return if pending.clear { 0 } else { pending.timestamp };
        }
        self.header.timestamps[index]
    }

    /// The on-disk compressed payload length for `(x, z)`, not counting the
    /// codec tag or length prefix. `None` if the slot is empty, not yet
    /// flushed, or the coordinate is out of range.
    pub fn length(&self, x: u8, z: u8) -> Result<Option<u32>, RegionError> {
        let Some(index) = checked_index(x, z) else {
            return Ok(None);
        };
        if let Some(pending) = self.pending.get(&(x, z)) {
            return Ok(if pending.clear {
                None
            } else {
                Some(pending.data.len() as u32)
            });
        }
        Ok(self.raw_sector_header(index)?.map(|(len, _)| len))
    }

    /// The stored codec for `(x, z)`. `None` if the slot is empty or the
    /// coordinate is out of range.
    pub fn compression(&self, x: u8, z: u8) -> Result<Option<CompressionKind>, RegionError> {
        let Some(index) = checked_index(x, z) else {
            return Ok(None);
        };
        if let Some(pending) = self.pending.get(&(x, z)) {
            return Ok(if pending.clear { None } else { Some(pending.codec) });
        }
        Ok(self.raw_sector_header(index)?.map(|(_, codec)| codec))
    }

    /// The chunk's raw, still-compressed bytes and codec, or `None` if the
    /// slot is empty or the coordinate is out of range.
    pub fn data(&self, x: u8, z: u8) -> Result<Option<ChunkData>, RegionError> {
        let Some(index) = checked_index(x, z) else {
            return Ok(None);
        };
        if let Some(pending) = self.pending.get(&(x, z)) {
            return Ok(if pending.clear {
                None
            } else {
                Some(ChunkData {
                    bytes: pending.data.clone(),
                    codec: pending.codec,
                })
            });
        }

        if !self.is_present_on_disk(index) {
            return Ok(None);
        }
        let location = self.header.locations[index];
        let Some(mmap) = &self.mmap else {
            return Ok(None);
        };

        let start = location.offset as usize * SECTOR_SIZE;
        let length = crate::endian::read_u32(mmap[start..start + 4].try_into().unwrap());
        let codec_byte = mmap[start + 4];
        let codec = codec_from_tag(codec_byte)?;
        let payload_len = length as usize - 1;
        let payload_start = start + 5;
        if payload_start + payload_len > mmap.len() {
            soft_warn!("chunk ({x}, {z}) payload extends past end of file");
            return Ok(None);
        }
        let bytes = mmap[payload_start..payload_start + payload_len].to_vec();
        Ok(Some(ChunkData { bytes, codec }))
    }

    /// Whether the slot at `index` is present: its location table entry is
    /// occupied, its timestamp is non-zero, and its on-disk sector header
    /// declares a positive payload length. All four must hold — a slot
    /// whose location looks occupied but whose declared length is zero (or
    /// whose sector header can't even be read) is not present.
    fn is_present_on_disk(&self, index: usize) -> bool {
        let location = self.header.locations[index];
        location.is_present()
            && self.header.timestamps[index] != 0
            && self.raw_declared_length(index).is_some_and(|len| len > 0)
    }

    /// The raw on-disk declared payload length for `index`, ignoring the
    /// codec tag, or `None` if the location is absent or unreadable.
    fn raw_declared_length(&self, index: usize) -> Option<u32> {
        let location = self.header.locations[index];
        if !location.is_present() {
            return None;
        }
        let mmap = self.mmap.as_ref()?;
        let start = location.offset as usize * SECTOR_SIZE;
        if start + 5 > mmap.len() {
            return None;
        }
        let length = crate::endian::read_u32(mmap[start..start + 4].try_into().unwrap());
        // on-disk length includes the one-byte codec tag; payload length is
        // one less.
        if length == 0 { None } else { Some(length - 1) }
    }

    /// Reads the raw `(length, codec)` sector header for `index`, ignoring
    /// any pending queued write.
    fn raw_sector_header(&self, index: usize) -> Result<Option<(u32, CompressionKind)>, RegionError> {
        if !self.is_present_on_disk(index) {
            return Ok(None);
        }
        let Some(mmap) = &self.mmap else {
            return Ok(None);
        };
        let location = self.header.locations[index];
        let start = location.offset as usize * SECTOR_SIZE;
        let codec = codec_from_tag(mmap[start + 4])?;
        let length = crate::endian::read_u32(mmap[start..start + 4].try_into().unwrap());
        Ok(Some((length - 1, codec)))
    }
}

fn codec_from_tag(tag: u8) -> Result<CompressionKind, RegionError> {
    match tag {
        1 => Ok(CompressionKind::Gzip),
        2 => Ok(CompressionKind::Zlib),
        other => Err(RegionError::UnknownChunkCodec(other)),
    }
}
