// Copyright 2026 driedpampas@proton.me
// SPDX-License-Identifier: GPL-3.0-or-later

//! Gzip/zlib compression and magic-byte sniffing.
//!
//! Standalone files are gzip-wrapped; region chunk payloads are zlib-wrapped.
//! Both are exposed here so the tag and region layers can pick the right one
//! for their destination.

use crate::error::CodecError;
use flate2::Compression;
use flate2::read::{GzDecoder, ZlibDecoder};
use flate2::write::{GzEncoder, ZlibEncoder};
use std::io::{Read, Write};

/// Which codec a compressed blob uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionKind {
    Gzip,
    Zlib,
}

/// Compresses `data` with the given codec at a fixed, low compression level.
///
/// The level is chosen for throughput over ratio, matching the original
/// implementation's own choice; round-tripping through [`decompress`] is the
/// only contract, not byte-identical output to any reference encoder.
pub fn compress(kind: CompressionKind, data: &[u8]) -> Vec<u8> {
    match kind {
        CompressionKind::Gzip => {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::fast());
            encoder.write_all(data).expect("writing to a Vec cannot fail");
            encoder.finish().expect("writing to a Vec cannot fail")
        }
        CompressionKind::Zlib => {
            let mut encoder = ZlibEncoder::new(Vec::new(), Compression::fast());
            encoder.write_all(data).expect("writing to a Vec cannot fail");
            encoder.finish().expect("writing to a Vec cannot fail")
        }
    }
}

/// Decompresses `data` using the given codec.
pub fn decompress(kind: CompressionKind, data: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::new();
    match kind {
        CompressionKind::Gzip => GzDecoder::new(data)
            .read_to_end(&mut out)
            .map_err(CodecError::Decompress)?,
        CompressionKind::Zlib => ZlibDecoder::new(data)
            .read_to_end(&mut out)
            .map_err(CodecError::Decompress)?,
    };
    Ok(out)
}

/// Inspects the leading bytes of `data` to guess its compression codec.
///
/// Gzip streams start with the two-byte magic `1F 8B`; zlib streams start
/// with a header byte whose low nibble is `8` (deflate) and whose first byte
/// is a multiple of... in practice the common encoders always emit `0x78`,
/// which is what is checked here. Anything else is unknown.
pub fn sniff(data: &[u8]) -> Option<CompressionKind> {
    match data {
        [0x1F, 0x8B, ..] => Some(CompressionKind::Gzip),
        [0x78, ..] => Some(CompressionKind::Zlib),
        _ => None,
    }
}

/// Sniffs `data`'s codec and decompresses it, failing if the codec can't be
/// determined.
pub fn decompress_auto(data: &[u8]) -> Result<Vec<u8>, CodecError> {
    let kind = sniff(data).ok_or(CodecError::UnknownCompression)?;
    decompress(kind, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gzip_round_trips() {
        let data = b"the quick brown fox jumps over the lazy dog";
        let compressed = compress(CompressionKind::Gzip, data);
        assert_eq!(sniff(&compressed), Some(CompressionKind::Gzip));
        assert_eq!(decompress(CompressionKind::Gzip, &compressed).unwrap(), data);
    }

    #[test]
    fn zlib_round_trips() {
        let data = b"the quick brown fox jumps over the lazy dog";
        let compressed = compress(CompressionKind::Zlib, data);
        assert_eq!(sniff(&compressed), Some(CompressionKind::Zlib));
        assert_eq!(decompress(CompressionKind::Zlib, &compressed).unwrap(), data);
    }

    #[test]
    fn sniff_unknown_is_none() {
        assert_eq!(sniff(b"not a compressed stream"), None);
        assert_eq!(sniff(&[]), None);
    }

    #[test]
    fn decompress_auto_dispatches() {
        let data = b"round trip via auto-detection";
        let gz = compress(CompressionKind::Gzip, data);
        let zl = compress(CompressionKind::Zlib, data);
        assert_eq!(decompress_auto(&gz).unwrap(), data);
        assert_eq!(decompress_auto(&zl).unwrap(), data);
    }
}
