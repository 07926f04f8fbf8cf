//! FX vanillas under Garman–Kohlhagen.
//!
//! The first asset of the market state is the FX spot (domestic per unit
//! of foreign). The domestic rate comes from the discount curve and the
//! foreign rate from the foreign curve, or the asset's yield without one.

use serde::{Deserialize, Serialize};

use strike_core::types::OptionType;
use strike_core::Date;
use strike_mc::{Gbm, McConfig, McEstimate};
use strike_options::black_scholes::Greeks;
use strike_options::fx::{DeltaMethod, FxInputs};

use super::vanilla::Terminal;
use super::{alive, estimate};
use crate::error::{require_positive, PricingResult};
use crate::market::MarketState;
use crate::model::Model;
use crate::pricer::Pricer;

/// A European FX option on a foreign notional.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FxOption {
    /// Call or put on the foreign currency.
    pub option_type: OptionType,
    /// Strike in domestic per foreign.
    pub strike: f64,
    /// Expiry date.
    pub expiry: Date,
    /// Foreign notional.
    #[serde(default = "unit_notional")]
    pub notional: f64,
    /// Convention of [`FxOption::delta`].
    #[serde(default)]
    pub delta_method: DeltaMethod,
}

fn unit_notional() -> f64 {
    1.0
}

impl FxOption {
    /// Option on one unit of foreign currency with spot delta.
    pub fn new(option_type: OptionType, strike: f64, expiry: Date) -> Self {
        Self {
            option_type,
            strike,
            expiry,
            notional: 1.0,
            delta_method: DeltaMethod::SpotDelta,
        }
    }

    /// Sets the foreign notional.
    #[must_use]
    pub fn with_notional(mut self, notional: f64) -> Self {
        self.notional = notional;
        self
    }

    /// Sets the delta convention.
    #[must_use]
    pub fn with_delta_method(mut self, method: DeltaMethod) -> Self {
        self.delta_method = method;
        self
    }

    fn fx_inputs(&self, market: &MarketState) -> PricingResult<FxInputs> {
        let t = alive(market, self.expiry, self.name())?;
        Ok(FxInputs::new(
            market.spot(0)?,
            t,
            market.rate_to(self.expiry),
            market.carry_to(0, self.expiry)?,
        )?)
    }

    /// Garman–Kohlhagen value and Greeks for the whole notional.
    pub fn greeks(&self, market: &MarketState) -> PricingResult<Greeks> {
        require_positive("strike", self.strike)?;
        let fx = self.fx_inputs(market)?;
        let sigma = market.vol(0, self.strike, self.expiry)?;
        let g = fx.garman_kohlhagen(self.strike, sigma, self.option_type);
        let n = self.notional;
        Ok(Greeks {
            value: n * g.value,
            delta: n * g.delta,
            gamma: n * g.gamma,
            vega: n * g.vega,
            theta: n * g.theta,
            rho: n * g.rho,
            psi: n * g.psi,
        })
    }

    /// Delta per unit of foreign notional under the contract's convention.
    pub fn delta(&self, market: &MarketState) -> PricingResult<f64> {
        require_positive("strike", self.strike)?;
        let fx = self.fx_inputs(market)?;
        let sigma = market.vol(0, self.strike, self.expiry)?;
        Ok(fx.delta(self.delta_method, self.strike, sigma, self.option_type))
    }

    /// Strike with the given delta under the contract's convention, using
    /// the at-the-forward vol.
    pub fn strike_for_delta(&self, market: &MarketState, delta: f64) -> PricingResult<f64> {
        let fx = self.fx_inputs(market)?;
        let sigma = market.vol(0, fx.forward(), self.expiry)?;
        Ok(fx.strike_from_delta(self.delta_method, delta, sigma, self.option_type)?)
    }

    /// Monte Carlo estimate on terminal spot.
    pub fn value_mc(&self, market: &MarketState, config: &McConfig) -> PricingResult<McEstimate> {
        require_positive("strike", self.strike)?;
        let fx = self.fx_inputs(market)?;
        let sigma = market.vol(0, self.strike, self.expiry)?;
        let gbm = Gbm::new(fx.spot, fx.rd - fx.rf, sigma)?;
        let payoff = Terminal {
            option_type: self.option_type,
            strike: self.strike,
        };
        let samples = gbm.evaluate_on_grid(&[fx.time_to_expiry], config, &payoff)?;
        Ok(estimate(&samples, config).scaled(fx.domestic_df() * self.notional))
    }
}

impl Pricer for FxOption {
    fn name(&self) -> &'static str {
        match self.option_type {
            OptionType::Call => "FX call",
            OptionType::Put => "FX put",
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
