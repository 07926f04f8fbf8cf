//! End-to-end option kernel scenarios.

use approx::assert_relative_eq;
use strike_core::types::{ExerciseType, OptionType};
use strike_options::prelude::*;

const S: f64 = 100.0;
const K: f64 = 100.0;
const T: f64 = 1.0;
const R: f64 = 0.05;
const Q: f64 = 0.01;
const V: f64 = 0.30;

#[test]
fn european_call_value_and_delta() {
    let value = bs_value(S, T, K, R, Q, V, OptionType::Call);
    let delta = bs_delta(S, T, K, R, Q, V, OptionType::Call);
    assert_relative_eq!(value, 13.6164, epsilon = 1e-4);
    assert_relative_eq!(delta, 0.6055, epsilon = 1e-4);

    let greeks = BsParams::new(S, T, K, R, Q, V, OptionType::Call).greeks();
    assert_relative_eq!(greeks.value, value, epsilon = 1e-12);
    assert_relative_eq!(greeks.delta, delta, epsilon = 1e-12);
}

#[test]
fn implied_vol_recovers_european_price() {
    for option_type in [OptionType::Call, OptionType::Put] {
        let price = bs_value(S, T, K, R, Q, V, option_type);
        let vol = bs_implied_vol(S, T, K, R, Q, price, option_type).unwrap();
        assert_relative_eq!(vol, V, epsilon = 1e-6);
    }
}

#[test]
fn implied_vol_rejects_arbitrage_prices() {
    let intrinsic = bs_intrinsic(S, T, 80.0, R, Q, OptionType::Call);
    let err = bs_implied_vol(S, T, 80.0, R, Q, intrinsic - 0.5, OptionType::Call).unwrap_err();
    assert!(matches!(err, OptionsError::NegativeTimeValue { .. }));
    assert_eq!(err.kind(), strike_core::ErrorKind::Domain);

    let err = bs_implied_vol(S, T, K, R, Q, S, OptionType::Call).unwrap_err();
    assert!(matches!(err, OptionsError::AboveUpperBound { .. }));
}

#[test]
fn american_put_methods_agree() {
    let baw = baw_value(S, T, K, 0.08, 0.0, 0.25, OptionType::Put).unwrap();
    let tree = crr_tree(S, T, K, 0.08, 0.0, 0.25, OptionType::Put, ExerciseType::American, 800)
        .unwrap();
    let european = bs_value(S, T, K, 0.08, 0.0, 0.25, OptionType::Put);
    assert!(baw > european);
    assert!(tree.value > european);
    assert_relative_eq!(baw, tree.value, epsilon = 0.05);
}

#[test]
fn barrier_in_out_parity_through_prelude() {
    let knock_in = BarrierOption::new(OptionType::Put, 100.0, 90.0, BarrierDirection::Down, BarrierStyle::In);
    let knock_out = BarrierOption::new(OptionType::Put, 100.0, 90.0, BarrierDirection::Down, BarrierStyle::Out);
    let vanilla = bs_value(S, 0.5, 100.0, R, Q, 0.25, OptionType::Put);
    let total = knock_in.value(S, 0.5, R, Q, 0.25).unwrap() + knock_out.value(S, 0.5, R, Q, 0.25).unwrap();
    assert_relative_eq!(total, vanilla, epsilon = 1e-10);
}

#[test]
fn fx_quote_conversion() {
    let fx = FxInputs::new(1.25, 1.0, 0.04, 0.02).unwrap();
    let k_call = fx
        .strike_from_delta(DeltaMethod::SpotDelta, 0.25, 0.10, OptionType::Call)
        .unwrap();
    let k_put = fx
        .strike_from_delta(DeltaMethod::SpotDelta, -0.25, 0.10, OptionType::Put)
        .unwrap();
    assert!(k_put < fx.forward() && fx.forward() < k_call);

    let gk = fx.garman_kohlhagen(k_call, 0.10, OptionType::Call);
    assert_relative_eq!(gk.delta, 0.25, epsilon = 1e-12);
}
