// Copyright 2026 driedpampas@proton.me
// SPDX-License-Identifier: GPL-3.0-or-later

use std::hint::black_box;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use redstone_nbt::compression::CompressionKind;
use redstone_nbt::region::Region;
use redstone_nbt::tag::codec;
use redstone_nbt::tag::named::NamedNbt;
use redstone_nbt::tag::{Tag, TagCompound, TagKind, TagList};

/// A compound with a handful of nested lists/compounds, in the shape a
/// player or chunk root tag actually takes — not a worst-case fuzz input.
fn sample_tag() -> Tag {
    let mut root = TagCompound::new();
    root.set("DataVersion", Tag::Int(3700));
    root.set("Health", Tag::Float(20.0));
    root.set("Score", Tag::Long(1_000_000));

    let mut inventory = TagList::new(TagKind::Compound).unwrap();
    for i in 0..64 {
        let mut item = TagCompound::new();
        item.set("id", Tag::String(format!("minecraft:item_{i}")));
        item.set("Count", Tag::Byte((i % 64) as i8));
        item.set("Slot", Tag::Byte(i as i8));
        inventory.push(Tag::Compound(item)).unwrap();
    }
    root.set("Inventory", Tag::List(inventory));

    let mut position = TagList::new(TagKind::Double).unwrap();
    for v in [100.5, 64.0, -200.25] {
        position.push(Tag::Double(v)).unwrap();
    }
    root.set("Pos", Tag::List(position));

    root.set("Heightmap", Tag::ByteArray(vec![0u8; 2048]));

    Tag::Compound(root)
}

fn bench_codec(c: &mut Criterion) {
    let tag = sample_tag();
    let wire = codec::write_named("root", &tag);

    let mut group = c.benchmark_group("codec");
    group.throughput(Throughput::Bytes(wire.len() as u64));

    group.bench_function("parse", |b| {
        b.iter(|| black_box(codec::read_named(&wire).unwrap()));
    });

    group.bench_function("write", |b| {
        b.iter(|| black_box(codec::write_named("root", &tag)));
    });

    group.finish();
}

fn bench_compression(c: &mut Criterion) {
    let tag = sample_tag();
    let wire = codec::write_named("root", &tag);

    let mut group = c.benchmark_group("compression");
    group.throughput(Throughput::Bytes(wire.len() as u64));

    let gzipped = redstone_nbt::compression::compress(CompressionKind::Gzip, &wire);
    group.bench_function("gzip_decompress", |b| {
        b.iter(|| black_box(redstone_nbt::compression::decompress(CompressionKind::Gzip, &gzipped).unwrap()));
    });
    group.bench_function("gzip_compress", |b| {
        b.iter(|| black_box(redstone_nbt::compression::compress(CompressionKind::Gzip, &wire)));
    });

    group.finish();
}

fn bench_region_flush(c: &mut Criterion) {
    let named = NamedNbt::new("root", sample_tag());
    let path = std::env::temp_dir().join(format!("redstone-nbt-bench-{}.mca", std::process::id()));
    std::fs::remove_file(&path).ok();

    let mut group = c.benchmark_group("region");
    group.bench_function("flush_32_chunks", |b| {
        b.iter(|| {
            std::fs::remove_file(&path).ok();
            let mut region = Region::open(&path, true).unwrap();
            let compressed = named.write(CompressionKind::Zlib);
            for i in 0..32u8 {
                region.set(i, 0, CompressionKind::Zlib, compressed.clone()).unwrap();
            }
            region.flush().unwrap();
            black_box(());
        });
    });
    group.finish();

    std::fs::remove_file(&path).ok();
}

criterion_group!(compare, bench_codec, bench_compression, bench_region_flush);
criterion_main!(compare);
