//! European and American vanilla options.
//!
//! | Model | European | American |
//! |-------|----------|----------|
//! | `Analytic` | Black–Scholes | - |
//! | `Binomial` | CRR | CRR |
//! | `BaroneAdesiWhaley` | - | BAW |
//! | `MonteCarlo` | terminal GBM | - |

use std::ops::ControlFlow;

use serde::{Deserialize, Serialize};

use strike_core::types::{ExerciseType, OptionType, ProductType};
use strike_core::Date;
use strike_mc::{Gbm, McConfig, McEstimate, PathPayoff};
use strike_options::baw::baw_value;
use strike_options::binomial::crr_tree;
use strike_options::black_scholes::{bs_value, BsParams, Greeks};
use strike_options::implied_vol::bs_implied_vol_with_config;
use strike_math::solvers::SolverConfig;

use super::{estimate, BsInputs};
use crate::error::{require_positive, PricingError, PricingResult};
use crate::market::MarketState;
use crate::model::Model;
use crate::pricer::Pricer;

/// A vanilla call or put on one underlying.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VanillaOption {
    /// Call or put.
    pub option_type: OptionType,
    /// European or American.
    pub exercise: ExerciseType,
    /// Strike.
    pub strike: f64,
    /// Expiry date.
    pub expiry: Date,
    /// Index of the underlying in the market state.
    #[serde(default)]
    pub asset: usize,
}

impl VanillaOption {
    /// European option on the first asset.
    pub fn european(option_type: OptionType, strike: f64, expiry: Date) -> Self {
        Self {
            option_type,
            exercise: ExerciseType::European,
            strike,
            expiry,
            asset: 0,
        }
    }

    /// American option on the first asset.
    pub fn american(option_type: OptionType, strike: f64, expiry: Date) -> Self {
        Self {
            exercise: ExerciseType::American,
            ..Self::european(option_type, strike, expiry)
        }
    }

    /// Vanilla from a boundary product type.
    pub fn from_product(product: ProductType, strike: f64, expiry: Date) -> PricingResult<Self> {
        match product {
            ProductType::EuropeanCall
            | ProductType::EuropeanPut
            | ProductType::AmericanCall
            | ProductType::AmericanPut => Ok(Self {
                exercise: product.exercise(),
                ..Self::european(product.option_type(), strike, expiry)
            }),
            other => Err(PricingError::invalid_input(format!("{other:?} is not a vanilla option"))),
        }
    }

    /// On underlying `asset`.
    #[must_use]
    pub fn on_asset(mut self, asset: usize) -> Self {
        self.asset = asset;
        self
    }

    fn inputs(&self, market: &MarketState) -> PricingResult<BsInputs> {
        require_positive("strike", self.strike)?;
        BsInputs::read(market, self.asset, self.strike, self.expiry, self.name())
    }

    /// Closed-form Black–Scholes value and Greeks of a European option.
    pub fn greeks(&self, market: &MarketState) -> PricingResult<Greeks> {
        if self.exercise != ExerciseType::European {
            return Err(self.mismatch(&Model::Analytic));
        }
        let x = self.inputs(market)?;
        Ok(BsParams::new(x.s, x.t, self.strike, x.r, x.q, x.sigma, self.option_type).greeks())
    }

    /// Black vol that reproduces `price` for a European option.
    pub fn implied_vol(&self, market: &MarketState, price: f64, config: &SolverConfig) -> PricingResult<f64> {
        if self.exercise != ExerciseType::European {
            return Err(PricingError::invalid_input("implied vol needs a European option"));
        }
        let x = self.inputs(market)?;
        Ok(bs_implied_vol_with_config(
            x.s,
            x.t,
            self.strike,
            x.r,
            x.q,
            price,
            self.option_type,
            config,
        )?)
    }

    /// Monte Carlo estimate of a European option on terminal GBM prices.
    pub fn value_mc(&self, market: &MarketState, config: &McConfig) -> PricingResult<McEstimate> {
        if self.exercise != ExerciseType::European {
            return Err(self.mismatch(&Model::MonteCarlo(*config)));
        }
        let x = self.inputs(market)?;
        let gbm = Gbm::new(x.s, x.drift(), x.sigma)?;
        let payoff = Terminal {
            option_type: self.option_type,
            strike: self.strike,
        };
        let samples = gbm.evaluate_on_grid(&[x.t], config, &payoff)?;
        Ok(estimate(&samples, config).scaled(x.df()))
    }
}

impl Pricer for VanillaOption {
    fn name(&self) -> &'static str {
        match (self.exercise, self.option_type) {
            (ExerciseType::European, OptionType::Call) => "European call",
            (ExerciseType::European, OptionType::Put) => "European put",
            (ExerciseType::American, OptionType::Call) => "American call",
            (ExerciseType::American, OptionType::Put) => "American put",
            (ExerciseType::Bermudan, _) => "Bermudan vanilla",
        }
    }

    fn value(&self, market: &MarketState, model: &Model) -> PricingResult<f64> {
        if self.exercise == ExerciseType::Bermudan {
            return Err(self.mismatch(model));
        }
        let american = self.exercise == ExerciseType::American;
        match model {
            Model::Analytic if !american => {
                let x = self.inputs(market)?;
                Ok(bs_value(x.s, x.t, self.strike, x.r, x.q, x.sigma, self.option_type))
            }
            Model::Binomial { steps } => {
                let x = self.inputs(market)?;
                let tree = crr_tree(
                    x.s,
                    x.t,
                    self.strike,
                    x.r,
                    x.q,
                    x.sigma,
                    self.option_type,
                    self.exercise,
                    *steps,
                )?;
                Ok(tree.value)
            }
            Model::BaroneAdesiWhaley if american => {
                let x = self.inputs(market)?;
                Ok(baw_value(x.s, x.t, self.strike, x.r, x.q, x.sigma, self.option_type)?)
            }
            Model::MonteCarlo(config) if !american => Ok(self.value_mc(market, config)?.value),
            _ => Err(self.mismatch(model)),
        }
    }
}

/// Undiscounted terminal payoff of a single-asset vanilla.
pub(crate) struct Terminal {
    pub option_type: OptionType,
    pub strike: f64,
}

impl PathPayoff for Terminal {
    type State = ();

    fn start(&self) -> Self::State {}

    fn observe(&self, _state: &mut Self::State, _step: usize, _prices: &[f64]) -> ControlFlow<f64> {
        ControlFlow::Continue(())
    }

    fn finish(&self, _state: Self::State, prices: &[f64]) -> f64 {
        self.option_type.payoff(prices[0], self.strike)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::sync::Arc;
    use strike_curves::curves::FlatCurve;

    fn today() -> Date {
        Date::from_ymd(2025, 1, 2).unwrap()
    }

    fn market() -> MarketState {
        MarketState::new(today(), Arc::new(FlatCurve::continuous(today(), 0.05)))
            .add_flat_vol_asset(100.0, 0.01, 0.30)
            .unwrap()
    }

    fn one_year() -> Date {
        today().add_days(365)
    }

    #[test]
    fn test_analytic_european() {
        let call = VanillaOption::european(OptionType::Call, 100.0, one_year());
        let value = call.value(&market(), &Model::Analytic).unwrap();
        assert_relative_eq!(value, 13.6164, epsilon = 1e-4);
        let greeks = call.greeks(&market()).unwrap();
        assert_relative_eq!(greeks.delta, 0.6055, epsilon = 1e-4);
    }

    #[test]
    fn test_binomial_converges_to_analytic() {
        let put = VanillaOption::european(OptionType::Put, 110.0, one_year());
        let analytic = put.value(&market(), &Model::Analytic).unwrap();
        let tree = put.value(&market(), &Model::Binomial { steps: 1000 }).unwrap();
        assert_relative_eq!(tree, analytic, epsilon = 0.02);
    }

    #[test]
    fn test_american_put_premium() {
        let american = VanillaOption::american(OptionType::Put, 100.0, one_year());
        let european = VanillaOption::european(OptionType::Put, 100.0, one_year());
        let m = market();
        let tree = american.value(&m, &Model::Binomial { steps: 500 }).unwrap();
        let baw = american.value(&m, &Model::BaroneAdesiWhaley).unwrap();
        let euro = european.value(&m, &Model::Analytic).unwrap();
        assert!(tree > euro);
        assert_relative_eq!(baw, tree, epsilon = 0.1);
    }

    #[test]
    fn test_monte_carlo_within_error() {
        let call = VanillaOption::european(OptionType::Call, 100.0, one_year());
        let m = market();
        let est = call.value_mc(&m, &McConfig::new(20_000, 1, 11)).unwrap();
        let analytic = call.value(&m, &Model::Analytic).unwrap();
        assert!(est.contains(analytic, 4.0), "{est:?} vs {analytic}");
    }

    #[test]
    fn test_model_mismatch_and_expiry() {
        let m = market();
        let american = VanillaOption::american(OptionType::Put, 100.0, one_year());
        let err = american.value(&m, &Model::Analytic).unwrap_err();
        assert_eq!(err.kind(), strike_core::ErrorKind::ModelMismatch);
        let err = american.value(&m, &Model::Black).unwrap_err();
        assert_eq!(err.kind(), strike_core::ErrorKind::ModelMismatch);

        let expired = VanillaOption::european(OptionType::Call, 100.0, today());
        let err = expired.value(&m, &Model::Analytic).unwrap_err();
        assert_eq!(err.kind(), strike_core::ErrorKind::Domain);
    }

    #[test]
    fn test_implied_vol_round_trip() {
        let call = VanillaOption::european(OptionType::Call, 90.0, one_year());
        let m = market();
        let price = call.value(&m, &Model::Analytic).unwrap();
        let vol = call.implied_vol(&m, price, &SolverConfig::new(1e-12, 100)).unwrap();
        assert_relative_eq!(vol, 0.30, epsilon = 1e-6);
    }

    #[test]
    fn test_from_product() {
        let put = VanillaOption::from_product(ProductType::AmericanPut, 95.0, one_year()).unwrap();
        assert_eq!(put.exercise, ExerciseType::American);
        assert_eq!(put.option_type, OptionType::Put);
        assert!(VanillaOption::from_product(ProductType::SnowballCall, 95.0, one_year()).is_err());
    }
}
