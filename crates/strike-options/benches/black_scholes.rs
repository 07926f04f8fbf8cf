//! Benchmarks for the Black–Scholes kernel.
//!
//! Run with: cargo bench -p strike-options

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use strike_core::types::OptionType;
use strike_options::prelude::*;

fn bench_single(c: &mut Criterion) {
    let mut group = c.benchmark_group("black_scholes");
    let params = BsParams::new(100.0, 1.0, 105.0, 0.05, 0.01, 0.3, OptionType::Call);
    let price = params.value();

    group.bench_function("value", |b| {
        b.iter(|| {
            bs_value(
                black_box(100.0),
                black_box(1.0),
                black_box(105.0),
                0.05,
                0.01,
                0.3,
                OptionType::Call,
            )
        });
    });
    group.bench_function("greeks", |b| b.iter(|| black_box(params).greeks()));
    group.bench_function("implied_vol", |b| {
        b.iter(|| bs_implied_vol(100.0, 1.0, 105.0, 0.05, 0.01, black_box(price), OptionType::Call))
    });
    group.bench_function("baw_put", |b| {
        b.iter(|| baw_value(black_box(100.0), 1.0, 105.0, 0.05, 0.01, 0.3, OptionType::Put))
    });
    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("black_scholes_batch");
    for size in [1_000usize, 10_000, 100_000] {
        let batch: Vec<BsParams> = (0..size)
            .map(|i| {
                let k = 50.0 + (i % 100) as f64;
                let option_type = if i % 2 == 0 { OptionType::Call } else { OptionType::Put };
                BsParams::new(100.0, 0.5 + (i % 7) as f64 * 0.25, k, 0.04, 0.01, 0.25, option_type)
            })
            .collect();
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("value", size), &batch, |b, batch| {
            b.iter(|| bs_value_batch(black_box(batch)))
        });
        group.bench_with_input(BenchmarkId::new("greeks", size), &batch, |b, batch| {
            b.iter(|| bs_greeks_batch(black_box(batch)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_single, bench_batch);
criterion_main!(benches);
