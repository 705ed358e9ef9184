//! Benchmarks for column inference, version resolution and script splitting
//!
//! Run with: cargo bench -p schema-replay-core

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use schema_replay_core::inference::{ColumnType, InferenceConfig, infer_with_config};
use schema_replay_core::period::Period;
use schema_replay_core::script::split;
use schema_replay_core::versioning::{ColumnSchema, resolve};

/// Raw values shaped like one extract column
fn generate_column(kind: &str, count: usize) -> Vec<String> {
    (0..count)
        .map(|i| match kind {
            "integer" => format!("{}", 100_000_000 + i * 7),
            "decimal" => format!("{}.{}", 20 + i % 60, i % 10),
            _ => format!("DRUG NAME {} {}", i, "X".repeat(i % 40)),
        })
        .collect()
}

/// Benchmark inference over growing samples
fn bench_column_inference(c: &mut Criterion) {
    let mut group = c.benchmark_group("column_inference");

    for kind in ["integer", "decimal", "text"] {
        for count in [100, 1_000, 10_000] {
            let values = generate_column(kind, count);
            let config = InferenceConfig::builder().sample_rows(count).build();
            group.throughput(Throughput::Elements(count as u64));

            group.bench_with_input(
                BenchmarkId::new(kind, count),
                &values,
                |b, values| {
                    b.iter(|| black_box(infer_with_config(values.iter().map(String::as_str), &config)));
                },
            );
        }
    }

    group.finish();
}

/// Benchmark version resolution across many quarters
fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");

    for quarters in [40, 200] {
        let observations: Vec<(Period, ColumnSchema)> = (0..quarters)
            .map(|i| {
                let period = Period::new(2004 + i / 4, (i % 4) as u8 + 1).unwrap();
                let mut columns = vec![
                    ("primaryid".to_string(), ColumnType::BigInt),
                    ("caseid".to_string(), ColumnType::BigInt),
                ];
                // Layout changes every ten quarters
                for extra in 0..(i / 10) {
                    columns.push((format!("col_{extra}"), ColumnType::Varchar(50)));
                }
                (period, columns.into_iter().collect())
            })
            .collect();

        group.bench_with_input(
            BenchmarkId::new("quarters", quarters),
            &observations,
            |b, observations| {
                b.iter(|| black_box(resolve("demo", observations.clone())));
            },
        );
    }

    group.finish();
}

/// Benchmark splitting scripts mixing plain statements and blocks
fn bench_split(c: &mut Criterion) {
    let mut group = c.benchmark_group("split");

    for statements in [100, 1_000] {
        let mut script = String::new();
        for i in 0..statements {
            if i % 10 == 0 {
                script.push_str(&format!(
                    "DO $$\nBEGIN\n  IF NOT EXISTS (SELECT 1 FROM t{i}) THEN\n    INSERT INTO t{i} VALUES (1);\n  END IF;\nEND\n$$;\n"
                ));
            } else {
                script.push_str(&format!(
                    "-- table {i}\nCREATE TABLE IF NOT EXISTS t{i} (\n    id bigint,\n    name varchar(50)\n);\n"
                ));
            }
        }
        group.throughput(Throughput::Bytes(script.len() as u64));

        group.bench_with_input(BenchmarkId::new("statements", statements), &script, |b, script| {
            b.iter(|| black_box(split(script)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_column_inference, bench_resolve, bench_split);
criterion_main!(benches);
