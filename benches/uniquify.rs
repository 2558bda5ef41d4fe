//! Column name deduplication and statement splitting benchmarks

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use frameql::frame::uniquify;
use frameql::query::{extract_table_names, split_statements};
use std::hint::black_box;

fn bench_uniquify(c: &mut Criterion) {
    let mut group = c.benchmark_group("uniquify");

    for n in [10, 100, 1_000] {
        let distinct: Vec<String> = (0..n).map(|i| format!("col_{}", i)).collect();
        let repeated: Vec<String> = (0..n).map(|_| "id".to_string()).collect();

        group.bench_with_input(BenchmarkId::new("distinct", n), &distinct, |b, names| {
            b.iter(|| black_box(uniquify(names)));
        });
        group.bench_with_input(BenchmarkId::new("repeated", n), &repeated, |b, names| {
            b.iter(|| black_box(uniquify(names)));
        });
    }

    group.finish();
}

fn bench_script_parsing(c: &mut Criterion) {
    let script: String = (0..50)
        .map(|i| format!("SELECT a.x, b.y FROM t{} AS a JOIN u{} b ON a.id = b.id -- step {}", i, i, i))
        .collect::<Vec<_>>()
        .join(";\n");

    c.bench_function("split_statements_50", |b| {
        b.iter(|| black_box(split_statements(black_box(&script)).len()));
    });
    c.bench_function("extract_table_names_50", |b| {
        b.iter(|| black_box(extract_table_names(black_box(&script))));
    });
}

criterion_group!(benches, bench_uniquify, bench_script_parsing);
criterion_main!(benches);
