//! Benchmark suite for etymon-core
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use etymon_core::{floyd_warshall, select_nearest, EtymonConfig, GraphemeDistance, ScanPolicy};

fn bench_select_nearest(c: &mut Criterion) {
    let renderings = [
        Some("gwyn"),
        Some("albus"),
        Some("hwit"),
        Some("hvítr"),
        Some("-"),
        Some("λευκός"),
    ];
    c.bench_function("select_nearest/6 languages", |b| {
        b.iter(|| {
            select_nearest(
                &GraphemeDistance,
                black_box("white"),
                renderings.iter().copied().enumerate(),
                ScanPolicy::Full,
            )
        })
    });
}

fn bench_floyd_warshall(c: &mut Criterion) {
    let graph = EtymonConfig::default()
        .relatedness_graph()
        .expect("default graph is valid");
    c.bench_function("floyd_warshall/default graph", |b| {
        b.iter(|| {
            let mut dist = graph.weights().clone();
            floyd_warshall(black_box(&mut dist));
            dist
        })
    });
}

criterion_group!(benches, bench_select_nearest, bench_floyd_warshall);
criterion_main!(benches);
