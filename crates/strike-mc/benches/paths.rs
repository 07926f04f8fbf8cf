use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use strike_math::linear_algebra::constant_correlation;
use strike_mc::prelude::*;

fn bench_single_asset(c: &mut Criterion) {
    let gbm = Gbm::new(100.0, 0.05, 0.2).unwrap();
    let mut group = c.benchmark_group("gbm_single");
    for paths in [1_000, 10_000] {
        let config = McConfig::new(paths, 252, 42);
        group.bench_with_input(BenchmarkId::from_parameter(paths), &config, |b, config| {
            b.iter(|| gbm.simulate(black_box(1.0), config).unwrap());
        });
    }
    group.finish();
}

fn bench_basket(c: &mut Criterion) {
    let model = CorrelatedGbm::new(
        vec![100.0; 5],
        vec![0.04; 5],
        vec![0.3; 5],
        &constant_correlation(5, 0.4).unwrap(),
    )
    .unwrap();
    let config = McConfig::new(10_000, 252, 42);
    c.bench_function("gbm_basket_5x10k", |b| {
        b.iter(|| model.simulate(black_box(1.0), &config).unwrap());
    });
}

criterion_group!(benches, bench_single_asset, bench_basket);
criterion_main!(benches);
