//! Reproducibility and antithetic properties of simulated paths.

use approx::assert_relative_eq;
use ndarray::s;
use proptest::prelude::*;

use strike_math::linear_algebra::one_factor_correlation;
use strike_mc::prelude::*;

fn basket(beta: f64) -> CorrelatedGbm {
    CorrelatedGbm::new(
        vec![100.0, 90.0, 110.0],
        vec![0.04, 0.04, 0.04],
        vec![0.2, 0.3, 0.25],
        &one_factor_correlation(&[beta, beta, beta]).unwrap(),
    )
    .unwrap()
}

#[test]
fn same_seed_same_tensor_on_any_thread_count() {
    let model = basket(0.6);
    let config = McConfig::new(64, 20, 1234);
    let parallel = model.simulate(1.0, &config).unwrap();
    let single = rayon::ThreadPoolBuilder::new()
        .num_threads(1)
        .build()
        .unwrap()
        .install(|| model.simulate(1.0, &config).unwrap());
    assert_eq!(parallel, single);

    let other_seed = model.simulate(1.0, &McConfig::new(64, 20, 1235)).unwrap();
    assert_ne!(parallel, other_seed);
}

#[test]
fn terminal_mean_matches_forward() {
    let (spot, r, t) = (100.0, 0.05, 2.0);
    let gbm = Gbm::new(spot, r, 0.3).unwrap();
    let config = McConfig::new(50_000, 4, 99).with_antithetic(false);
    let paths = gbm.simulate(t, &config).unwrap();
    let terminal: Vec<f64> = paths.column(4).to_vec();
    let estimate = McEstimate::from_samples(&terminal);
    assert!(
        estimate.contains(spot * (r * t).exp(), 3.0),
        "{estimate:?} vs {}",
        spot * (r * t).exp()
    );
}

#[test]
fn mirrored_paths_reduce_error() {
    let gbm = Gbm::new(100.0, 0.05, 0.2).unwrap();
    let paired = gbm.simulate(1.0, &McConfig::new(5_000, 1, 3)).unwrap();
    let plain = gbm.simulate(1.0, &McConfig::new(10_000, 1, 3).with_antithetic(false)).unwrap();
    let terminal = |p: &ndarray::Array2<f64>| p.column(1).to_vec();
    let with = McEstimate::from_antithetic(&terminal(&paired));
    let without = McEstimate::from_samples(&terminal(&plain));
    assert!(with.std_error < without.std_error);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn antithetic_drivers_are_mirrored(
        seed in any::<u64>(),
        paths in 1usize..16,
        steps in 1usize..10,
        beta in -0.9f64..0.9,
    ) {
        let model = basket(beta);
        let horizon = 1.5;
        let tensor = model.simulate(horizon, &McConfig::new(paths, steps, seed)).unwrap();
        prop_assert_eq!(tensor.dim(), (2 * paths, steps + 1, 3));

        let dt = horizon / steps as f64;
        let vols = [0.2, 0.3, 0.25];
        for p in 0..paths {
            for i in 0..3 {
                prop_assert_eq!(tensor[[p + paths, 0, i]], model.spots()[i]);
            }
            for k in 0..steps {
                for i in 0..3 {
                    let drift = (0.04 - 0.5 * vols[i] * vols[i]) * dt;
                    let up = (tensor[[p, k + 1, i]] / tensor[[p, k, i]]).ln() - drift;
                    let down = (tensor[[p + paths, k + 1, i]] / tensor[[p + paths, k, i]]).ln() - drift;
                    prop_assert!((up + down).abs() < 1e-9, "path {p} step {k} asset {i}: {up} vs {down}");
                }
            }
        }
    }

    #[test]
    fn paths_stay_positive(seed in any::<u64>(), vol in 0.0f64..2.0) {
        let gbm = Gbm::new(50.0, 0.0, vol).unwrap();
        let paths = gbm.simulate(3.0, &McConfig::new(8, 6, seed)).unwrap();
        prop_assert!(paths.iter().all(|s| *s > 0.0 && s.is_finite()));
        prop_assert!(paths.slice(s![.., 0]).iter().all(|s| *s == 50.0));
    }
}

#[test]
fn grid_endpoints_are_reported() {
    let gbm = Gbm::new(100.0, 0.0, 0.0).unwrap();
    let paths = gbm.simulate_on_grid(&[0.1, 0.4, 1.0], &McConfig::new(2, 1, 0)).unwrap();
    assert_eq!(paths.dim(), (4, 4));
    assert_relative_eq!(paths[[3, 3]], 100.0);
}
