//! Property-based tests for discount curves.

use proptest::prelude::*;
use strike_core::daycounts::DayCountType;
use strike_core::types::{Compounding, Frequency};
use strike_core::Date;
use strike_curves::prelude::*;

fn anchor() -> Date {
    Date::from_ymd(2024, 1, 2).unwrap()
}

fn interpolation_strategy() -> impl Strategy<Value = InterpolationType> {
    prop::sample::select(InterpolationType::all().to_vec())
}

fn compounding_strategy() -> impl Strategy<Value = Compounding> {
    prop_oneof![
        Just(Compounding::Simple),
        Just(Compounding::Annual),
        Just(Compounding::SemiAnnual),
        Just(Compounding::Quarterly),
        Just(Compounding::Monthly),
        Just(Compounding::Continuous),
    ]
}

/// Knot times and discount factors from positive forward rates.
fn knots_strategy() -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
    prop::collection::vec((0.1f64..3.0, 0.0001f64..0.08), 2..10).prop_map(|steps| {
        let mut t = 0.0;
        let mut log_df = 0.0;
        let mut ts = Vec::new();
        let mut dfs = Vec::new();
        for (dt, fwd) in steps {
            t += dt;
            log_df -= fwd * dt;
            ts.push(t);
            dfs.push(log_df.exp());
        }
        (ts, dfs)
    })
}

/// Knots from an upward-sloping zero curve.
fn smooth_knots_strategy() -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
    (0.0f64..0.05, 0.0f64..0.002, prop::collection::vec(0.25f64..3.0, 2..10)).prop_map(|(level, slope, steps)| {
        let mut t = 0.0;
        let mut ts = Vec::new();
        let mut dfs = Vec::new();
        for dt in steps {
            t += dt;
            ts.push(t);
            dfs.push((-(level + slope * t) * t).exp());
        }
        (ts, dfs)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn flat_curve_df_bounded(rate in 0.0f64..0.15, days in 0i64..20_000, comp in compounding_strategy()) {
        let curve = FlatCurve::new(anchor(), rate, comp, DayCountType::Act365F).unwrap();
        let df = curve.df(anchor().add_days(days));
        prop_assert!(df > 0.0 && df <= 1.0);
        prop_assert_eq!(curve.df(anchor()), 1.0);
    }

    #[test]
    fn interpolated_df_bounded(
        (ts, dfs) in knots_strategy(),
        kind in interpolation_strategy(),
        days in 0i64..20_000,
    ) {
        let curve = DiscountCurve::new(anchor(), &ts, &dfs, kind, DayCountType::Act365F).unwrap();
        let df = curve.df(anchor().add_days(days));
        prop_assert!(df > 0.0);
        // Natural splines may overshoot between knots
        if !matches!(kind, InterpolationType::CubicZeroRates | InterpolationType::NatcubicLogDiscount) {
            prop_assert!(df <= 1.0 + 1e-15);
        }
        prop_assert_eq!(curve.df(anchor()), 1.0);
    }

    #[test]
    fn monotone_interpolation_keeps_df_non_increasing(
        (ts, dfs) in knots_strategy(),
        kind in prop::sample::select(vec![
            InterpolationType::FlatFwdRates,
            InterpolationType::LinearFwdRates,
            InterpolationType::PchipLogDiscount,
        ]),
        a in 0.0f64..20.0,
        b in 0.0f64..20.0,
    ) {
        let curve = DiscountCurve::new(anchor(), &ts, &dfs, kind, DayCountType::Act365F).unwrap();
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(curve.discount_factor(hi) <= curve.discount_factor(lo) + 1e-15);
    }

    #[test]
    fn linear_forwards_are_non_increasing_on_a_fine_grid((ts, dfs) in knots_strategy()) {
        let curve = DiscountCurve::new(anchor(), &ts, &dfs, InterpolationType::LinearFwdRates, DayCountType::Act365F).unwrap();
        let t_max = ts[ts.len() - 1];
        let mut prev = 1.0;
        for k in 1..=400_u32 {
            let df = curve.discount_factor(t_max * f64::from(k) / 400.0);
            prop_assert!(df <= prev + 1e-15);
            prev = df;
        }
    }

    #[test]
    fn zero_rate_interpolations_stay_non_increasing_on_smooth_curves(
        (ts, dfs) in smooth_knots_strategy(),
        kind in prop::sample::select(vec![InterpolationType::LinearZeroRates, InterpolationType::PchipZeroRates]),
        a in 0.0f64..20.0,
        b in 0.0f64..20.0,
    ) {
        let curve = DiscountCurve::new(anchor(), &ts, &dfs, kind, DayCountType::Act365F).unwrap();
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(curve.discount_factor(hi) <= curve.discount_factor(lo) + 1e-15);
    }

    #[test]
    fn bump_shifts_continuous_zero(rate in -0.01f64..0.1, shift in -0.01f64..0.01, t in 0.1f64..30.0) {
        let curve = FlatCurve::continuous(anchor(), rate);
        let bumped = curve.bump(shift);
        let diff = bumped.zero_rate(t, Compounding::Continuous) - curve.zero_rate(t, Compounding::Continuous);
        prop_assert!((diff - shift).abs() < 1e-12);
    }

    #[test]
    fn bootstrapped_swaps_reprice(r1 in 0.005f64..0.08, r2 in 0.005f64..0.08, r3 in 0.005f64..0.08) {
        let valuation = anchor();
        let swaps: Vec<Swap> = [r1, r2, r3]
            .iter()
            .enumerate()
            .map(|(i, r)| {
                Swap::new(
                    valuation,
                    valuation.add_years(2 * i as i32 + 1).unwrap(),
                    *r,
                    Frequency::Annual,
                    DayCountType::ThirtyE360,
                )
                .unwrap()
            })
            .collect();
        let result = IborBootstrapper::new(valuation).with_swaps(swaps).build().unwrap();
        prop_assert!(result.report.is_valid());
    }
}
