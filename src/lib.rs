// Copyright 2026 driedpampas@proton.me
// SPDX-License-Identifier: GPL-3.0-or-later

#![cfg_attr(docsrs, feature(doc_cfg))]

//! # redstone-nbt
//!
//! A Rust library for reading and writing the on-disk save format used by a
//! voxel-sandbox game: sector-allocated region files holding up to 1024
//! chunks, and a recursively-typed tagged-tree binary codec for the chunk
//! payload itself.
//!
//! Key features include:
//! - Full named-tag codec support (including Modified UTF-8 strings)
//! - Optional `serde` support for serializing Rust types to a tag tree (via
//!   the `serde` feature)
//! - Memory-mapped region file access
//! - A compacting, in-place region flush that grows or shrinks the backing
//!   file in sector-sized steps instead of rewriting it from scratch

pub mod compression;
pub mod endian;
pub mod error;
pub mod region;
pub mod tag;
