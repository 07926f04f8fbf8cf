//! Property-based tests for solvers and interpolators.

use proptest::prelude::*;
use strike_math::prelude::*;

fn sorted_knots() -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
    prop::collection::vec((0.01f64..2.0, -0.05f64..0.0), 3..12).prop_map(|steps| {
        let mut xs = Vec::with_capacity(steps.len());
        let mut ys = Vec::with_capacity(steps.len());
        let (mut x, mut y) = (0.0, 0.0);
        for (dx, dy) in steps {
            x += dx;
            y += dy;
            xs.push(x);
            ys.push(y);
        }
        (xs, ys)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn pchip_preserves_monotone_data((xs, ys) in sorted_knots()) {
        let pchip = Pchip::new(xs.clone(), ys).unwrap();
        let lo = xs[0];
        let hi = xs[xs.len() - 1];
        let mut prev = pchip.interpolate(lo);
        for i in 1..=400 {
            let x = lo + (hi - lo) * f64::from(i) / 400.0;
            let y = pchip.interpolate(x);
            prop_assert!(y <= prev + 1e-14);
            prev = y;
        }
    }

    #[test]
    fn linear_stays_within_neighbours((xs, ys) in sorted_knots(), w in 0.0f64..1.0) {
        let interp = LinearInterpolator::new(xs.clone(), ys.clone()).unwrap();
        for i in 0..xs.len() - 1 {
            let x = xs[i] + w * (xs[i + 1] - xs[i]);
            let y = interp.interpolate(x);
            prop_assert!(y <= ys[i].max(ys[i + 1]) + 1e-15);
            prop_assert!(y >= ys[i].min(ys[i + 1]) - 1e-15);
        }
    }

    #[test]
    fn fallback_finds_root_of_monotone_cubic(root in -5.0f64..5.0, guess in -20.0f64..20.0) {
        let f = |x: f64| (x - root).powi(3) + 0.1 * (x - root);
        let df = |x: f64| 3.0 * (x - root).powi(2) + 0.1;
        let result = newton_with_fallback(f, df, guess, Some((-10.0, 10.0)), &SolverConfig::default()).unwrap();
        prop_assert!((result.root - root).abs() < 1e-6);
    }

    #[test]
    fn bisection_respects_xtol(root in 0.0f64..1.0) {
        let f = |x: f64| x - root;
        let cfg = SolverConfig::default().with_tolerance(1e-9);
        let result = bisection(f, 0.0 - 1e-3, 1.0 + 1e-3, &cfg).unwrap();
        prop_assert!((result.root - root).abs() < 1e-9);
    }
}
