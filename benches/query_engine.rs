//! Query engine benchmarks
//!
//! Measures a full `run` call: table materialization, statement execution
//! and result conversion. `reuse` keeps one engine so tables load once;
//! `fresh` builds an engine per call the way a live query node does.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use frameql::frame::DataFrame;
use frameql::query::{query_frames, EngineConfig, ParamSet, QueryEngine, Tables};
use frameql::types::Value;
use std::hint::black_box;

fn frame(rows: usize) -> DataFrame {
    let data = (0..rows)
        .map(|i| {
            vec![
                Value::Int(i as i64),
                Value::Text(format!("name_{}", i)),
                Value::Float(i as f64 * 0.5),
            ]
        })
        .collect();
    DataFrame::from_rows(vec!["id", "name", "score"], data).unwrap()
}

fn tables(rows: usize) -> Tables {
    [("t".to_string(), frame(rows))].into_iter().collect()
}

fn bench_fresh_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_fresh");
    let config = EngineConfig::default();
    let params: ParamSet = [("min", 10)].into_iter().collect();

    for rows in [100, 1_000, 10_000] {
        let input = tables(rows);
        group.bench_with_input(BenchmarkId::from_parameter(rows), &input, |b, input| {
            b.iter(|| {
                black_box(
                    query_frames(&config, "SELECT count(*) FROM t WHERE id >= :min", input, &params)
                        .unwrap(),
                )
            });
        });
    }

    group.finish();
}

fn bench_reused_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_reuse");
    let params: ParamSet = [("min", 10)].into_iter().collect();

    for rows in [100, 1_000, 10_000] {
        let input = tables(rows);
        let mut engine = QueryEngine::in_memory().unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(rows), &input, |b, input| {
            b.iter(|| {
                black_box(
                    engine
                        .run("SELECT name, score FROM t WHERE id >= :min", input, &params)
                        .unwrap(),
                )
            });
        });
    }

    group.finish();
}

fn bench_multi_statement(c: &mut Criterion) {
    let sql = "CREATE TEMP TABLE IF NOT EXISTS scratch (v);\n\
               DELETE FROM scratch;\n\
               INSERT INTO scratch SELECT score FROM t;\n\
               SELECT sum(v) AS total FROM scratch";
    let input = tables(1_000);
    let mut engine = QueryEngine::in_memory().unwrap();

    c.bench_function("multi_statement_1000", |b| {
        b.iter(|| black_box(engine.run(sql, &input, &ParamSet::new()).unwrap()));
    });
}

criterion_group!(benches, bench_fresh_engine, bench_reused_engine, bench_multi_statement);
criterion_main!(benches);
