// Copyright 2026 driedpampas@proton.me
// SPDX-License-Identifier: GPL-3.0-or-later

//! The region store: a sector-allocated file holding up to 1024 chunks,
//! addressed by `(x, z)` in `0..32`.

pub mod access;
pub mod flush;

use crate::compression::CompressionKind;
use crate::error::RegionError;
use memmap2::Mmap;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::path::Path;

/// The size, in bytes, of one allocation unit within a region file.
pub const SECTOR_SIZE: usize = 4096;

/// The size of the two header tables (locations + timestamps) combined.
pub const HEADER_SIZE: usize = 2 * SECTOR_SIZE;

/// Number of chunk slots in a region (32 x 32).
pub const SLOT_COUNT: usize = 1024;

/// Where a chunk's data sits within the file, in sector units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChunkLocation {
    pub offset: u32,
    pub sector_count: u8,
}

impl ChunkLocation {
    /// Whether this location table entry itself looks occupied. This is
    /// necessary but not sufficient for "this slot holds a chunk" — a slot
    /// is only truly present once its timestamp and its on-disk declared
    /// payload length are also non-zero/positive; see
    /// [`Region::contains`](super::Region::contains), which checks all four.
    fn is_present(&self) -> bool {
        self.offset != 0 && self.sector_count != 0
    }
}

/// The parsed location + timestamp tables for all 1024 slots.
#[derive(Debug, Clone)]
pub struct RegionHeader {
    pub locations: [ChunkLocation; SLOT_COUNT],
    pub timestamps: [u32; SLOT_COUNT],
}

impl RegionHeader {
    fn empty() -> RegionHeader {
        RegionHeader {
            locations: [ChunkLocation::default(); SLOT_COUNT],
            timestamps: [0; SLOT_COUNT],
        }
    }

    fn parse(bytes: &[u8]) -> RegionHeader {
        let mut header = RegionHeader::empty();
        for i in 0..SLOT_COUNT {
            let start = i * 4;
            let offset = crate::endian::read_u24([bytes[start], bytes[start + 1], bytes[start + 2]]);
            header.locations[i] = ChunkLocation {
                offset,
                sector_count: bytes[start + 3],
            };
        }
        for i in 0..SLOT_COUNT {
            let start = SECTOR_SIZE + i * 4;
            let chunk: [u8; 4] = bytes[start..start + 4].try_into().unwrap();
            header.timestamps[i] = crate::endian::read_u32(chunk);
        }
        header
    }
}

fn slot_index(x: u8, z: u8) -> Result<usize, RegionError> {
    if x >= 32 || z >= 32 {
        return Err(RegionError::CoordinateOutOfRange { x, z });
    }
    Ok(x as usize + z as usize * 32)
}

/// A queued write, staged until [`Region::flush`] commits it to disk.
#[derive(Debug, Clone)]
pub(crate) struct QueuedWrite {
    pub(crate) codec: CompressionKind,
    pub(crate) data: Vec<u8>,
    pub(crate) timestamp: u32,
    /// `true` means "clear this slot", carried as an explicit flag rather
    /// than overloading an empty `data` vec (an empty compressed payload is
    /// a valid, if useless, chunk).
    pub(crate) clear: bool,
}

/// A memory-mapped region file.
pub struct Region {
    pub(crate) file: File,
    pub(crate) mmap: Option<Mmap>,
    pub(crate) header: RegionHeader,
    pub(crate) writable: bool,
    pub(crate) pending: HashMap<(u8, u8), QueuedWrite>,
}

impl Region {
    /// Opens (or, if `writable` and missing, creates) a region file at
    /// `path`. Rejects files whose size is neither 0 nor a multiple of
    /// [`SECTOR_SIZE`] of at least [`HEADER_SIZE`].
    pub fn open(path: impl AsRef<Path>, writable: bool) -> Result<Region, RegionError> {
        let file = if writable {
            OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .open(path)?
        } else {
            File::open(path)?
        };

        let len = file.metadata()?.len();
        if len != 0 && (len < HEADER_SIZE as u64 || len % SECTOR_SIZE as u64 != 0) {
            return Err(RegionError::InvalidFileSize(len));
        }

        let (mmap, header) = if len == 0 {
            (None, RegionHeader::empty())
        } else {
            let mmap = unsafe { Mmap::map(&file)? };
            let header = RegionHeader::parse(&mmap);
            (Some(mmap), header)
        };

        Ok(Region {
            file,
            mmap,
            header,
            writable,
            pending: HashMap::new(),
        })
    }

    /// Flushes any pending writes (if writable), then drops this region.
    pub fn close(mut self) -> Result<(), RegionError> {
        if self.writable {
            self.flush()?;
        }
        Ok(())
    }
}

impl Drop for Region {
    fn drop(&mut self) {
        if self.writable && !self.pending.is_empty() {
            if let Err(e) = self.flush() {
                log::error!("region dropped with unflushed writes that failed to flush: {e}");
            }
        }
    }
}
