//! Cash-or-nothing and asset-or-nothing digitals.

use std::ops::ControlFlow;

use serde::{Deserialize, Serialize};

use strike_core::types::OptionType;
use strike_core::Date;
use strike_mc::{Gbm, McConfig, McEstimate, PathPayoff};
use strike_options::black_scholes::Greeks;
use strike_options::digital::{asset_or_nothing, cash_or_nothing};

use super::{estimate, BsInputs};
use crate::error::{require_positive, PricingResult};
use crate::market::MarketState;
use crate::model::Model;
use crate::pricer::Pricer;

/// What a digital delivers when it finishes in the money.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DigitalPayout {
    /// A fixed cash amount.
    CashOrNothing {
        /// Cash paid.
        amount: f64,
    },
    /// One unit of the underlying.
    AssetOrNothing,
}

/// A European digital option.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DigitalOption {
    /// Pays when `φ(S_T − K) > 0`.
    pub option_type: OptionType,
    /// Strike.
    pub strike: f64,
    /// Expiry date.
    pub expiry: Date,
    /// Payout.
    pub payout: DigitalPayout,
    /// Index of the underlying in the market state.
    #[serde(default)]
    pub asset: usize,
}

impl DigitalOption {
    /// Cash-or-nothing digital on the first asset.
    pub fn cash(option_type: OptionType, strike: f64, expiry: Date, amount: f64) -> Self {
        Self {
            option_type,
            strike,
            expiry,
            payout: DigitalPayout::CashOrNothing { amount },
            asset: 0,
        }
    }

    /// Asset-or-nothing digital on the first asset.
    pub fn asset(option_type: OptionType, strike: f64, expiry: Date) -> Self {
        Self {
            option_type,
            strike,
            expiry,
            payout: DigitalPayout::AssetOrNothing,
            asset: 0,
        }
    }

    fn inputs(&self, market: &MarketState) -> PricingResult<BsInputs> {
        require_positive("strike", self.strike)?;
        BsInputs::read(market, self.asset, self.strike, self.expiry, self.name())
    }

    /// Closed-form value and Greeks.
    pub fn greeks(&self, market: &MarketState) -> PricingResult<Greeks> {
        let x = self.inputs(market)?;
        Ok(match self.payout {
            DigitalPayout::CashOrNothing { amount } => {
                cash_or_nothing(x.s, x.t, self.strike, x.r, x.q, x.sigma, self.option_type, amount)
            }
            DigitalPayout::AssetOrNothing => {
                asset_or_nothing(x.s, x.t, self.strike, x.r, x.q, x.sigma, self.option_type)
            }
        })
    }

    /// Monte Carlo estimate on terminal GBM prices.
    pub fn value_mc(&self, market: &MarketState, config: &McConfig) -> PricingResult<McEstimate> {
        let x = self.inputs(market)?;
        let gbm = Gbm::new(x.s, x.drift(), x.sigma)?;
        let samples = gbm.evaluate_on_grid(&[x.t], config, self)?;
        Ok(estimate(&samples, config).scaled(x.df()))
    }
}

impl PathPayoff for DigitalOption {
    type State = ();

    fn start(&self) -> Self::State {}

    fn observe(&self, _state: &mut Self::State, _step: usize, _prices: &[f64]) -> ControlFlow<f64> {
        ControlFlow::Continue(())
    }

    fn finish(&self, _state: Self::State, prices: &[f64]) -> f64 {
        let s = prices[0];
        if self.option_type.phi() * (s - self.strike) <= 0.0 {
            return 0.0;
        }
        match self.payout {
            DigitalPayout::CashOrNothing { amount } => amount,
            DigitalPayout::AssetOrNothing => s,
        }
    }
}

impl Pricer for DigitalOption {
    fn name(&self) -> &'static str {
        match (self.payout, self.option_type) {
            (DigitalPayout::CashOrNothing { .. }, OptionType::Call) => "cash-or-nothing call",
            (DigitalPayout::CashOrNothing { .. }, OptionType::Put) => "cash-or-nothing put",
            (DigitalPayout::AssetOrNothing, OptionType::Call) => "asset-or-nothing call",
            (DigitalPayout::AssetOrNothing, OptionType::Put) => "asset-or-nothing put",
        }
    }

    fn value(&self, market: &MarketState, model: &Model) -> PricingResult<f64> {
        match model {
            Model::Analytic => Ok(self.greeks(market)?.value),
            Model::MonteCarlo(config) => Ok(self.value_mc(market, config)?.value),
            _ => Err(self.mismatch(model)),
        }
    }
}
