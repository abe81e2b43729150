//! Benchmarks for remapper construction and queries.
//!
//! Uses a synthetic mapping of a few thousand types arranged in shallow inheritance chains:
//! - Stage parsing and composition
//! - Type and descriptor translation
//! - Inherited member lookups, cold and warm

extern crate jremap;

use std::{hint::black_box, sync::Arc};

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use jremap::{
    hierarchy::{FieldHeader, HeaderReader, MemoryProvider, TypeHeader},
    mapping::{compose, MappingStage},
    model::AccessFlags,
    Error, Remapper, RemapperConfig, Result,
};

const TYPES: usize = 2_000;
const CHAIN: usize = 4;

/// Headers are stored as `name super` text to keep setup cheap.
struct TextHeaderReader;

impl HeaderReader for TextHeaderReader {
    fn read(&self, bytes: &[u8]) -> Result<TypeHeader> {
        let text = std::str::from_utf8(bytes).map_err(|e| Error::Error(e.to_string()))?;
        let mut parts = text.split(' ');
        let name = parts.next().unwrap_or_default().to_string();
        let super_type = parts.next().map(str::to_string);
        Ok(TypeHeader {
            name,
            access: AccessFlags::PUBLIC,
            super_type,
            interfaces: Vec::new(),
            fields: vec![FieldHeader {
                access: AccessFlags::PRIVATE,
                name: "value".to_string(),
                descriptor: "I".to_string(),
            }],
        })
    }
}

fn obfuscated(i: usize) -> String {
    format!("o{i}")
}

fn developer(i: usize) -> String {
    format!("net/example/gen/Type{i}")
}

fn parent(i: usize) -> Option<usize> {
    (i % CHAIN != 0).then(|| i - 1)
}

fn mapping_lines() -> Vec<String> {
    let mut lines = Vec::with_capacity(TYPES * 3);
    for i in 0..TYPES {
        let (from, to) = (obfuscated(i), developer(i));
        lines.push(format!("CL: {from} {to}"));
        lines.push(format!("FD: {from}/a{i} {to}/field{i}"));
        lines.push(format!("MD: {from}/b (L{from};)V {to}/method{i} (L{to};)V"));
    }
    lines
}

fn provider() -> MemoryProvider {
    let provider = MemoryProvider::new();
    for i in 0..TYPES {
        let super_type = parent(i).map_or_else(|| "java/lang/Object".to_string(), developer);
        provider.insert(developer(i), format!("{} {super_type}", developer(i)).into_bytes());
    }
    provider
}

fn remapper() -> Remapper {
    let stage = MappingStage::from_lines(mapping_lines()).unwrap();
    Remapper::with_config(
        stage,
        Arc::new(provider()),
        Arc::new(TextHeaderReader),
        &RemapperConfig::default(),
    )
}

fn bench_stage_parse(c: &mut Criterion) {
    let lines = mapping_lines();

    c.bench_function("stage_parse", |b| {
        b.iter(|| {
            let stage = MappingStage::from_lines(black_box(&lines)).unwrap();
            black_box(stage)
        });
    });
}

fn bench_stage_compose(c: &mut Criterion) {
    let first = MappingStage::from_lines(mapping_lines()).unwrap();
    let identity: Vec<String> = (0..TYPES)
        .flat_map(|i| {
            let to = developer(i);
            [
                format!("CL: {to} {to}"),
                format!("FD: {to}/field{i} {to}/field{i}"),
                format!("MD: {to}/method{i} (L{to};)V {to}/method{i} (L{to};)V"),
            ]
        })
        .collect();
    let second = MappingStage::from_lines(identity).unwrap();

    c.bench_function("stage_compose", |b| {
        b.iter(|| black_box(compose(black_box(&first), black_box(&second))));
    });
}

fn bench_map_descriptor(c: &mut Criterion) {
    let remapper = remapper();
    let descriptor = "(Lo1;[[Lo2;ILjava/lang/String;Lo3$1;)Lo4;";

    c.bench_function("map_method_descriptor", |b| {
        b.iter(|| black_box(remapper.map_method_descriptor(black_box(descriptor))));
    });
}

fn bench_inherited_lookup_warm(c: &mut Criterion) {
    let remapper = remapper();
    let owner = obfuscated(CHAIN - 1);
    let _ = remapper.map_field(&owner, "a0", None);

    c.bench_function("inherited_field_warm", |b| {
        b.iter(|| black_box(remapper.map_field(black_box(&owner), "a0", None)));
    });
}

fn bench_inherited_lookup_cold(c: &mut Criterion) {
    let owners: Vec<String> = (0..TYPES).map(obfuscated).collect();

    c.bench_function("inherited_field_cold", |b| {
        b.iter_batched(
            remapper,
            |remapper| {
                for owner in owners.iter().take(64) {
                    black_box(remapper.map_field(owner, "a0", Some("I")));
                }
            },
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(
    benches,
    bench_stage_parse,
    bench_stage_compose,
    bench_map_descriptor,
    bench_inherited_lookup_warm,
    bench_inherited_lookup_cold
);
criterion_main!(benches);
