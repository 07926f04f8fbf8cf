//! European options on a weighted basket.
//!
//! `Analytic` matches the first two moments of the basket at expiry to a
//! lognormal (Levy):
//!
//! ```text
//! M1 = Σ w_i F_i
//! M2 = Σ_ij w_i w_j F_i F_j e^{ρ_ij σ_i σ_j T}
//! σ_B² = ln(M2 / M1²) / T
//! ```
//!
//! and prices with Black-76 on `M1`. `MonteCarlo` simulates the correlated
//! terminal prices.

use std::ops::ControlFlow;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use strike_core::types::OptionType;
use strike_core::Date;
use strike_mc::{CorrelatedGbm, McConfig, McEstimate, PathPayoff};
use strike_options::black76::black_value;

use super::{alive, estimate};
use crate::error::{require_positive, PricingError, PricingResult};
use crate::market::MarketState;
use crate::model::Model;
use crate::pricer::Pricer;

/// A European call or put on `Σ w_i S_i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasketOption {
    /// Call or put.
    pub option_type: OptionType,
    /// Strike on the weighted sum.
    pub strike: f64,
    /// Expiry date.
    pub expiry: Date,
    /// Weight of each market asset, in market order.
    pub weights: Vec<f64>,
}

/// Per-asset inputs read from the market.
struct BasketMarket {
    t: f64,
    r: f64,
    spots: Vec<f64>,
    carries: Vec<f64>,
    vols: Vec<f64>,
    correlation: DMatrix<f64>,
}

impl BasketOption {
    /// Creates a basket option.
    pub fn new(option_type: OptionType, strike: f64, expiry: Date, weights: Vec<f64>) -> Self {
        Self {
            option_type,
            strike,
            expiry,
            weights,
        }
    }

    /// Equal weights summing to one over `n` assets.
    pub fn equal_weight(option_type: OptionType, strike: f64, expiry: Date, n: usize) -> Self {
        Self::new(option_type, strike, expiry, vec![1.0 / n.max(1) as f64; n])
    }

    fn read(&self, market: &MarketState) -> PricingResult<BasketMarket> {
        require_positive("strike", self.strike)?;
        if self.weights.is_empty() {
            return Err(PricingError::invalid_input("basket has no assets"));
        }
        if let Some(w) = self.weights.iter().find(|w| !(w.is_finite() && **w >= 0.0)) {
            return Err(PricingError::invalid_input(format!(
                "basket weights must be non-negative, got {w}"
            )));
        }
        let t = alive(market, self.expiry, self.name())?;
        let n = self.weights.len();
        let spots = (0..n).map(|i| market.spot(i)).collect::<PricingResult<Vec<_>>>()?;
        let basket_spot: f64 = self.weights.iter().zip(&spots).map(|(w, s)| w * s).sum();
        let moneyness = self.strike / basket_spot;
        let vols = (0..n)
            .map(|i| market.vol(i, spots[i] * moneyness, self.expiry))
            .collect::<PricingResult<Vec<_>>>()?;
        let carries = (0..n)
            .map(|i| market.carry_to(i, self.expiry))
            .collect::<PricingResult<Vec<_>>>()?;
        Ok(BasketMarket {
            t,
            r: market.rate_to(self.expiry),
            spots,
            carries,
            vols,
            correlation: market.correlation(n)?,
        })
    }

    /// Moment-matched lognormal basket vol and forward.
    pub fn moment_match(&self, market: &MarketState) -> PricingResult<(f64, f64)> {
        let m = self.read(market)?;
        let forwards: Vec<f64> = (0..self.weights.len())
            .map(|i| self.weights[i] * m.spots[i] * ((m.r - m.carries[i]) * m.t).exp())
            .collect();
        let m1: f64 = forwards.iter().sum();
        let mut m2 = 0.0;
        for (i, fi) in forwards.iter().enumerate() {
            for (j, fj) in forwards.iter().enumerate() {
                m2 += fi * fj * (m.correlation[(i, j)] * m.vols[i] * m.vols[j] * m.t).exp();
            }
        }
        let sigma = ((m2 / (m1 * m1)).ln().max(0.0) / m.t).sqrt();
        Ok((m1, sigma))
    }

    /// Monte Carlo estimate on correlated terminal prices.
    pub fn value_mc(&self, market: &MarketState, config: &McConfig) -> PricingResult<McEstimate> {
        let m = self.read(market)?;
        let drifts = m.carries.iter().map(|q| m.r - q).collect();
        let gbm = CorrelatedGbm::new(m.spots, drifts, m.vols, &m.correlation)?;
        let samples = gbm.evaluate_on_grid(&[m.t], config, self)?;
        Ok(estimate(&samples, config).scaled((-m.r * m.t).exp()))
    }
}

impl PathPayoff for BasketOption {
    type State = ();

    fn start(&self) -> Self::State {}

    fn observe(&self, _state: &mut Self::State, _step: usize, _prices: &[f64]) -> ControlFlow<f64> {
        ControlFlow::Continue(())
    }

    fn finish(&self, _state: Self::State, prices: &[f64]) -> f64 {
        let basket: f64 = self.weights.iter().zip(prices).map(|(w, s)| w * s).sum();
        self.option_type.payoff(basket, self.strike)
    }
}

impl Pricer for BasketOption {
    fn name(&self) -> &'static str {
        match self.option_type {
            OptionType::Call => "basket call",
            OptionType::Put => "basket put",
        }
    }

    fn value(&self, market: &MarketState, model: &Model) -> PricingResult<f64> {
        match model {
            Model::Analytic => {
                let (forward, sigma) = self.moment_match(market)?;
                let t = market.time_to(self.expiry);
                let df = (-market.rate_to(self.expiry) * t).exp();
                Ok(black_value(forward, self.strike, t, sigma, df, self.option_type))
            }
            Model::MonteCarlo(config) => Ok(self.value_mc(market, config)?.value),
            _ => Err(self.mismatch(model)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equity::VanillaOption;
    use approx::assert_relative_eq;
    use std::sync::Arc;
    use strike_curves::curves::FlatCurve;
    use strike_math::linear_algebra::constant_correlation;

    fn today() -> Date {
        Date::from_ymd(2025, 1, 2).unwrap()
    }

    fn market(n: usize, rho: f64) -> MarketState {
        let mut m = MarketState::new(today(), Arc::new(FlatCurve::continuous(today(), 0.04)));
        for _ in 0..n {
            m = m.add_flat_vol_asset(100.0, 0.01, 0.25).unwrap();
        }
        m.with_correlation(constant_correlation(n, rho).unwrap()).unwrap()
    }

    #[test]
    fn test_single_asset_is_vanilla() {
        let expiry = today().add_days(365);
        let m = market(1, 0.0);
        let basket = BasketOption::new(OptionType::Call, 100.0, expiry, vec![1.0]);
        let vanilla = VanillaOption::european(OptionType::Call, 100.0, expiry)
            .value(&m, &Model::Analytic)
            .unwrap();
        assert_relative_eq!(basket.value(&m, &Model::Analytic).unwrap(), vanilla, epsilon = 1e-10);
    }

    #[test]
    fn test_diversification_lowers_value() {
        let expiry = today().add_days(365);
        let basket = BasketOption::equal_weight(OptionType::Call, 100.0, expiry, 4);
        let high = basket.value(&market(4, 0.9), &Model::Analytic).unwrap();
        let low = basket.value(&market(4, 0.1), &Model::Analytic).unwrap();
        assert!(low < high);
    }

    #[test]
    fn test_moment_matching_close_to_monte_carlo() {
        let expiry = today().add_days(365);
        let m = market(3, 0.5);
        let basket = BasketOption::equal_weight(OptionType::Put, 100.0, expiry, 3);
        let analytic = basket.value(&m, &Model::Analytic).unwrap();
        let est = basket.value_mc(&m, &McConfig::new(20_000, 1, 77)).unwrap();
        assert!((est.value - analytic).abs() < 4.0 * est.std_error + 0.1, "{est:?} vs {analytic}");
    }
}
