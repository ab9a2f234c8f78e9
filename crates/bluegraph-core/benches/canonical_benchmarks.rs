//! Canonicalization and identity benchmarks.
//!
//! Measures canonical rendering, digest computation, and the text encodings
//! of blueIds across flat and deeply nested documents.

#![allow(missing_docs)]

use bluegraph_core::{blue_id_of, canonicalize, BlueId, Node};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn flat_document(width: i64) -> Node {
    let mut node = Node::new().with_name("Flat");
    for i in 0..width {
        node.insert_property(format!("field_{i:04}"), Node::new().with_value(i));
    }
    node
}

fn deep_document(depth: i64) -> Node {
    let mut node = Node::new().with_value("leaf");
    for i in 0..depth {
        node = Node::new().with_property(format!("level_{i:03}"), node);
    }
    node
}

/// Benchmark canonical JSON rendering at various widths.
fn bench_canonical_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("canonical/render");

    for width in [1_i64, 10, 50, 200] {
        let doc = flat_document(width);
        group.bench_with_input(BenchmarkId::from_parameter(width), &doc, |b, doc| {
            b.iter(|| canonicalize(black_box(doc)));
        });
    }

    group.finish();
}

/// Benchmark digest computation over flat and nested shapes.
fn bench_blue_id(c: &mut Criterion) {
    let mut group = c.benchmark_group("canonical/blue_id");

    for width in [1_i64, 10, 50, 200] {
        let doc = flat_document(width);
        group.bench_with_input(BenchmarkId::new("flat", width), &doc, |b, doc| {
            b.iter(|| blue_id_of(black_box(doc)));
        });
    }

    for depth in [4_i64, 16, 64] {
        let doc = deep_document(depth);
        group.bench_with_input(BenchmarkId::new("nested", depth), &doc, |b, doc| {
            b.iter(|| blue_id_of(black_box(doc)));
        });
    }

    group.finish();
}

/// Benchmark the base-58 and CID text encodings.
fn bench_text_forms(c: &mut Criterion) {
    let mut group = c.benchmark_group("ident/text_forms");

    let id = blue_id_of(&flat_document(10)).unwrap();
    let base58 = id.to_base58();
    let cid = id.to_cid();

    group.bench_function("to_base58", |b| {
        b.iter(|| black_box(&id).to_base58());
    });
    group.bench_function("from_base58", |b| {
        b.iter(|| BlueId::from_base58(black_box(&base58)));
    });
    group.bench_function("to_cid", |b| {
        b.iter(|| black_box(&id).to_cid());
    });
    group.bench_function("from_cid", |b| {
        b.iter(|| BlueId::from_cid(black_box(&cid)));
    });

    group.finish();
}

/// Benchmark wire JSON parsing and rendering.
fn bench_wire_json(c: &mut Criterion) {
    let mut group = c.benchmark_group("wire/json");

    for width in [10_i64, 100] {
        let doc = flat_document(width);
        let text = serde_json::to_string(&doc.to_json_value()).unwrap();

        group.bench_with_input(BenchmarkId::new("parse", width), &text, |b, text| {
            b.iter(|| Node::from_json_str(black_box(text)));
        });
        group.bench_with_input(BenchmarkId::new("render", width), &doc, |b, doc| {
            b.iter(|| black_box(doc).to_json_value());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_canonical_render,
    bench_blue_id,
    bench_text_forms,
    bench_wire_json,
);

criterion_main!(benches);
