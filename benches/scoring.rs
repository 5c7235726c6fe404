//! Benchmarks for CSR construction and the two scoring engines.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::prelude::*;
use rand::SeedableRng;
use std::hint::black_box;
use trustwalk::{
    monte_carlo_run, personalized_pagerank_run, CsrGraph, MonteCarloConfig, PprConfig,
};

/// Directed preferential attachment graph with `m` out-edges per new node.
///
/// Targets are picked proportional to in-degree + 1, giving the heavy-tailed
/// “hub” structure of transaction graphs. Weights are uniform in `[0.1, 10)`.
fn preferential_attachment(n: usize, m: usize, seed: u64) -> Vec<(usize, usize, f64)> {
    assert!(n > m && m >= 1);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut targets: Vec<usize> = (0..=m).collect(); // node ids repeated by in-degree + 1
    let mut edges = Vec::with_capacity(n * m);

    for v in (m + 1)..n {
        for _ in 0..m {
            let u = targets[rng.random_range(0..targets.len())];
            edges.push((v, u, rng.random_range(0.1..10.0)));
            targets.push(u);
        }
        targets.push(v);
    }
    // Close some loops so mass does not all drain into the oldest nodes.
    for _ in 0..n / 4 {
        let u = rng.random_range(0..n);
        let v = rng.random_range(0..n);
        edges.push((u, v, 1.0));
    }
    edges
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("csr_build");
    for n in [10_000usize, 100_000] {
        let edges = preferential_attachment(n, 4, 123);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| CsrGraph::from_triples(black_box(n), black_box(&edges)).unwrap())
        });
    }
    group.finish();
}

fn bench_engines(c: &mut Criterion) {
    let mut group = c.benchmark_group("scoring");
    group.sample_size(20);

    for n in [1_000usize, 10_000] {
        let g = CsrGraph::from_triples(n, &preferential_attachment(n, 4, 123)).unwrap();
        let seeds = [0usize, 1, 2];

        // Same alphas the sweep defaults to.
        for alpha in [0.15, 0.5, 0.85] {
            let tag = (alpha * 100.0).round() as u32;
            let ppr = PprConfig { alpha, ..PprConfig::default() };
            group.bench_with_input(BenchmarkId::new(format!("ppr/alpha{tag}"), n), &n, |b, _| {
                b.iter(|| black_box(personalized_pagerank_run(black_box(&g), ppr, &seeds)))
            });

            let mc = MonteCarloConfig { alpha, total_walks: 20_000, seed: Some(7) };
            group.bench_with_input(BenchmarkId::new(format!("mc/alpha{tag}"), n), &n, |b, _| {
                b.iter(|| black_box(monte_carlo_run(black_box(&g), mc, &seeds)))
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_build, bench_engines);
criterion_main!(benches);
