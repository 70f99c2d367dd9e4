// Copyright 2026 driedpampas@proton.me
// SPDX-License-Identifier: GPL-3.0-or-later

use redstone_nbt::compression::CompressionKind;
use redstone_nbt::region::Region;
use redstone_nbt::tag::named::NamedNbt;
use redstone_nbt::tag::{Tag, TagCompound, TagKind, TagList};

fn temp_path(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("redstone-nbt-integration-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir.join(name)
}

#[test]
fn complex_tag_tree_round_trips_through_gzip() {
    let mut root = TagCompound::new();
    root.set("byte", Tag::Byte(127));
    root.set("short", Tag::Short(32767));
    root.set("int", Tag::Int(2147483647));

    let mut list = TagList::new(TagKind::String).unwrap();
    list.push(Tag::String("A".into())).unwrap();
    list.push(Tag::String("B".into())).unwrap();
    list.push(Tag::String("C".into())).unwrap();
    root.set("list", Tag::List(list));

    let mut nested = TagCompound::new();
    nested.set("key", Tag::String("value".into()));
    root.set("nested", Tag::Compound(nested));

    let named = NamedNbt::new("Level", Tag::Compound(root));
    let wire = named.write(CompressionKind::Gzip);
    let decoded = NamedNbt::parse(&wire, CompressionKind::Gzip).unwrap();

    assert_eq!(decoded, named);
}

#[test]
fn sniffed_compression_matches_the_codec_actually_used() {
    let named = NamedNbt::new("root", Tag::Byte(5));

    let gzipped = named.write(CompressionKind::Gzip);
    assert_eq!(
        redstone_nbt::compression::sniff(&gzipped),
        Some(CompressionKind::Gzip)
    );
    assert_eq!(NamedNbt::parse_auto(&gzipped).unwrap(), named);

    let zlibbed = named.write(CompressionKind::Zlib);
    assert_eq!(
        redstone_nbt::compression::sniff(&zlibbed),
        Some(CompressionKind::Zlib)
    );
    assert_eq!(NamedNbt::parse_auto(&zlibbed).unwrap(), named);
}

#[test]
fn opening_a_missing_path_for_reading_fails() {
    let path = temp_path("does-not-exist.mca");
    std::fs::remove_file(&path).ok();
    assert!(Region::open(&path, false).is_err());
}

#[test]
fn region_chunk_round_trips_through_flush_and_reopen() {
    let path = temp_path("roundtrip.mca");
    std::fs::remove_file(&path).ok();

    let mut compound = TagCompound::new();
    compound.set("Data", Tag::Int(123));
    let named = NamedNbt::new("Chunk", Tag::Compound(compound));

    {
        let mut region = Region::open(&path, true).unwrap();
        named.write_to_region(&mut region, 0, 0).unwrap();
    }

    let region = Region::open(&path, false).unwrap();
    let decoded = NamedNbt::parse_from_region(&region, 0, 0).unwrap().unwrap();
    assert_eq!(decoded, named);
    assert!(NamedNbt::parse_from_region(&region, 1, 1).unwrap().is_none());

    std::fs::remove_file(&path).ok();
}

#[test]
fn region_grows_with_a_new_slot_then_shrinks_when_cleared() {
    let path = temp_path("grow-shrink.mca");
    std::fs::remove_file(&path).ok();

    let mut region = Region::open(&path, true).unwrap();
    region.set(5, 5, CompressionKind::Zlib, vec![0u8; 20_000]).unwrap();
    region.flush().unwrap();
    let grown = std::fs::metadata(&path).unwrap().len();
    assert!(grown > 2 * redstone_nbt::region::SECTOR_SIZE as u64);

    region.set(6, 6, CompressionKind::Zlib, vec![1, 2, 3]).unwrap();
    region.flush().unwrap();
    assert!(region.contains(5, 5));
    assert!(region.contains(6, 6));

    region.clear(5, 5).unwrap();
    region.clear(6, 6).unwrap();
    region.flush().unwrap();
    let shrunk = std::fs::metadata(&path).unwrap().len();
    assert_eq!(shrunk, 2 * redstone_nbt::region::SECTOR_SIZE as u64);

    std::fs::remove_file(&path).ok();
}

#[test]
fn minimal_four_byte_compound_parses_through_the_public_api() {
    let bytes = vec![10u8, 0, 0, 0];
    let (name, tag) = redstone_nbt::tag::codec::read_named(&bytes).unwrap();
    assert_eq!(name, "");
    assert_eq!(tag, Tag::Compound(TagCompound::new()));
}
