//! Benchmarks for encoding, decoding and tree rendering.
//!
//! Run with: `cargo bench --bench codec`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::time::Duration;

use huffman_service::{decode, render, Compressed, HuffmanTree, TreeLayout};

/// Input texts for benchmarking
struct Corpus {
    name: &'static str,
    text: String,
}

fn corpora() -> Vec<Corpus> {
    let prose = "It was the best of times, it was the worst of times, it was the age of \
                 wisdom, it was the age of foolishness. ";
    vec![
        Corpus {
            name: "prose_1k",
            text: prose.repeat(1024 / prose.len() + 1),
        },
        Corpus {
            name: "prose_64k",
            text: prose.repeat(64 * 1024 / prose.len() + 1),
        },
        Corpus {
            name: "skewed_64k",
            text: "a".repeat(60 * 1024) + &"bcdefgh".repeat(600),
        },
        Corpus {
            name: "unicode_16k",
            text: "héllo wörld ✓ 日本語 ".repeat(800),
        },
    ]
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    group.sample_size(50);
    group.measurement_time(Duration::from_secs(10));

    for corpus in corpora() {
        group.throughput(Throughput::Bytes(corpus.text.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(corpus.name),
            &corpus.text,
            |b, text| b.iter(|| Compressed::from_text(black_box(text)).unwrap()),
        );
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    group.sample_size(50);
    group.measurement_time(Duration::from_secs(10));

    for corpus in corpora() {
        let compressed = Compressed::from_text(&corpus.text).unwrap();
        group.throughput(Throughput::Bytes(corpus.text.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(corpus.name),
            &compressed,
            |b, compressed| b.iter(|| decode(black_box(&compressed.payload), &compressed.tree).unwrap()),
        );
    }

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    group.sample_size(20);

    let text: String = ('!'..='~').collect();
    let tree = HuffmanTree::from_text(&text).unwrap();
    let layout = TreeLayout::compute(&tree);

    group.bench_function("layout", |b| b.iter(|| TreeLayout::compute(black_box(&tree))));
    group.bench_function("png", |b| b.iter(|| render::render_png(black_box(&layout)).unwrap()));
    group.bench_function("pdf", |b| {
        b.iter(|| render::export_pdf(black_box(&layout), "bench", render::DEFAULT_MIN_SCALE).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode, bench_render);
criterion_main!(benches);
