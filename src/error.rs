// Copyright 2026 driedpampas@proton.me
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error types and the soft-check logging convention used at contract
//! boundaries.
//!
//! Functions here never panic on bad *external* input (a malformed file, an
//! out-of-range coordinate); they log a warning and return an `Err` or a
//! neutral value instead. `debug_assert!` is reserved for invariants this
//! crate itself is responsible for upholding.

use thiserror::Error;

/// Errors from `Tag`/`TagList`/`TagCompound` contract violations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TagError {
    #[error("expected a {expected} tag, found {found}")]
    WrongKind {
        expected: &'static str,
        found: &'static str,
    },
    #[error("list element kind already set to {existing}, cannot change to {requested}")]
    ListKindFixed {
        existing: &'static str,
        requested: &'static str,
    },
    #[error("list element kind must not be End")]
    ListKindIsEnd,
    #[error("list element kind is {expected}, but the inserted tag is {found}")]
    ListElementKindMismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("index {index} out of range for list of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Errors from the named-tag wire codec.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("unexpected end of input while parsing")]
    UnexpectedEof,
    #[error("invalid tag type id {0}")]
    InvalidTagKind(u8),
    #[error("invalid or undecodable string")]
    InvalidString,
    #[error("{0} trailing byte(s) after parsing the root tag")]
    TrailingBytes(usize),
    #[error("tag contract violation: {0}")]
    Tag(#[from] TagError),
    #[error("decompression failed: {0}")]
    Decompress(std::io::Error),
    #[error("compression format could not be determined")]
    UnknownCompression,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors from region-file operations.
#[derive(Debug, Error)]
pub enum RegionError {
    #[error("invalid region file size {0} bytes (must be 0 or at least 8192, in 4096-byte steps)")]
    InvalidFileSize(u64),
    #[error("chunk coordinate ({x}, {z}) out of range (must be 0..32)")]
    CoordinateOutOfRange { x: u8, z: u8 },
    #[error("region was opened read-only and cannot be written to")]
    NotWritable,
    #[error("chunk payload needs {sectors} sectors, which exceeds the 255-sector limit a single slot can address")]
    PayloadTooLarge { sectors: u32 },
    #[error("unknown chunk compression tag {0}")]
    UnknownChunkCodec(u8),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Logs a warning at a contract boundary. Used where C's `rs_critical` would
/// fire before returning a neutral value.
#[macro_export]
macro_rules! soft_warn {
    ($($arg:tt)*) => {
        log::warn!($($arg)*)
    };
}
