//! End-to-end curve scenarios.

use approx::assert_relative_eq;
use strike_core::daycounts::DayCountType;
use strike_core::types::{Compounding, Frequency};
use strike_core::Date;
use strike_curves::prelude::*;

fn d(y: i32, m: u32, day: u32) -> Date {
    Date::from_ymd(y, m, day).unwrap()
}

#[test]
fn flat_curve_discount_factor() {
    let curve = FlatCurve::new(
        d(2019, 1, 1),
        0.05,
        Compounding::Continuous,
        DayCountType::ActActIsda,
    )
    .unwrap();
    assert_relative_eq!(curve.df(d(2020, 1, 1)), 0.951_229_42, epsilon = 1e-8);
    assert_eq!(curve.df(d(2019, 1, 1)), 1.0);
}

#[test]
fn par_swap_bootstrap_recursion() {
    let valuation = d(2021, 3, 15);
    let rates = [0.035, 0.040, 0.045];
    let swaps: Vec<Swap> = rates
        .iter()
        .enumerate()
        .map(|(i, rate)| {
            Swap::new(
                valuation,
                valuation.add_years(i as i32 + 1).unwrap(),
                *rate,
                Frequency::Annual,
                DayCountType::ThirtyE360,
            )
            .unwrap()
        })
        .collect();

    for interpolation in [
        InterpolationType::FlatFwdRates,
        InterpolationType::LinearZeroRates,
        InterpolationType::NatcubicLogDiscount,
    ] {
        let result = IborBootstrapper::new(valuation)
            .with_swaps(swaps.clone())
            .with_interpolation(interpolation)
            .build()
            .unwrap();
        let curve = &result.curve;

        let df1 = curve.df(d(2022, 3, 15));
        let df2 = curve.df(d(2023, 3, 15));
        let df3 = curve.df(d(2024, 3, 15));
        assert_relative_eq!(df1, 1.0 / 1.035, epsilon = 1e-12);
        assert_relative_eq!(df2 * 1.04 + df1 * 0.04, 1.0, epsilon = 1e-12);
        assert_relative_eq!(df3 * 1.045 + (df1 + df2) * 0.045, 1.0, epsilon = 1e-12);

        for swap in &swaps {
            assert!(swap.pv(curve).abs() < 1e-10);
        }
        assert!(result.report.is_valid());
    }
}

#[test]
fn bootstrapped_curve_swap_rates_match_quotes() {
    let valuation = d(2024, 1, 2);
    let dc = DayCountType::Act360;
    let result = IborBootstrapper::new(valuation)
        .with_deposit(Deposit::new(valuation, d(2024, 7, 2), 0.052, dc).unwrap())
        .with_swaps([(2, 0.046), (5, 0.042), (10, 0.0405)].map(|(years, rate)| {
            Swap::new(
                valuation,
                valuation.add_years(years).unwrap(),
                rate,
                Frequency::SemiAnnual,
                DayCountType::Thirty360Bond,
            )
            .unwrap()
        }))
        .build()
        .unwrap();
    let par = result
        .curve
        .swap_rate(valuation, d(2029, 1, 2), Frequency::SemiAnnual, DayCountType::Thirty360Bond)
        .unwrap();
    assert_relative_eq!(par, 0.042, epsilon = 1e-10);
}

#[test]
fn ois_curve_reprices_quotes() {
    let valuation = d(2024, 3, 1);
    let mut bootstrapper = OisBootstrapper::new(valuation);
    for (tenor, rate) in [("1M", 0.0531), ("3M", 0.0530), ("1Y", 0.0500), ("3Y", 0.0430), ("10Y", 0.0395)] {
        bootstrapper = bootstrapper.with_tenor_quote(tenor, rate).unwrap();
    }
    let result = bootstrapper
        .with_interpolation(InterpolationType::PchipZeroRates)
        .build()
        .unwrap();
    assert!(result.report.is_valid(), "{}", result.report);
    assert!(result.report.max_error() < 1e-10);
}
