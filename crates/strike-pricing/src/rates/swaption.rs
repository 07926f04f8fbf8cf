//! European and Bermudan swaptions.
//!
//! | Model | European physical | European cash | Bermudan |
//! |-------|-------------------|---------------|----------|
//! | `Black`, `ShiftedBlack`, `Bachelier`, `Sabr` | annuity × forward option | cash annuity × forward option | - |
//! | `HullWhite` | Jamshidian | - | - |
//! | `ShortRateTree` | lattice | - | lattice |
//!
//! Lattice and Jamshidian prices treat the swap as a coupon bond against
//! a floating leg worth par at each reset, so they assume the forecast
//! and discount curves coincide.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use strike_core::types::{ExerciseType, Frequency, OptionType, SwapType};
use strike_core::Date;
use strike_math::solvers::SolverConfig;

use super::bond::{horizon, roll_cashflows};
use super::swap::InterestRateSwap;
use super::{curve_flows, fit_lattice, forward_option, is_black_like};
use crate::error::{require_positive, PricingError, PricingResult};
use crate::lattice::{HullWhiteAnalytic, ShortRateModel};
use crate::market::MarketState;
use crate::model::Model;
use crate::pricer::Pricer;

/// How an exercised swaption settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Settlement {
    /// Enter the underlying swap.
    #[default]
    Physical,
    /// Receive its value under the par-yield cash annuity.
    Cash,
}

/// An option to enter a fixed-for-floating swap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Swaption {
    /// Underlying swap; its effective date is the first exercise date and
    /// its fixed rate the strike.
    pub swap: InterestRateSwap,
    /// European or Bermudan on the fixed-leg reset dates.
    pub exercise: ExerciseType,
    /// Settlement.
    #[serde(default)]
    pub settlement: Settlement,
}

impl Swaption {
    /// European physically settled swaption exercising into a swap from
    /// `expiry` to `swap_maturity`.
    pub fn european(
        swap_type: SwapType,
        notional: f64,
        strike: f64,
        expiry: Date,
        swap_maturity: Date,
        fixed_frequency: Frequency,
    ) -> Self {
        let swap = InterestRateSwap {
            fixed_frequency,
            ..InterestRateSwap::new(swap_type, notional, strike, expiry, swap_maturity)
        };
        Self {
            swap,
            exercise: ExerciseType::European,
            settlement: Settlement::Physical,
        }
    }

    /// Bermudan swaption exercisable on each fixed reset date.
    #[must_use]
    pub fn bermudan(mut self) -> Self {
        self.exercise = ExerciseType::Bermudan;
        self
    }

    /// Cash settlement.
    #[must_use]
    pub fn cash_settled(mut self) -> Self {
        self.settlement = Settlement::Cash;
        self
    }

    /// First exercise date.
    pub fn expiry(&self) -> Date {
        self.swap.effective
    }

    fn check(&self, market: &MarketState) -> PricingResult<()> {
        require_positive("swaption notional", self.swap.notional)?;
        if self.expiry() <= market.valuation_date() {
            return Err(PricingError::expired(self.name(), self.expiry(), market.valuation_date()));
        }
        if self.exercise == ExerciseType::American {
            return Err(PricingError::invalid_input(
                "swaptions are European or Bermudan on fixed reset dates",
            ));
        }
        Ok(())
    }

    /// Forward par rate of the underlying.
    pub fn forward_rate(&self, market: &MarketState) -> PricingResult<f64> {
        self.swap.par_rate(market)
    }

    /// Cash-settlement annuity at swap rate `rate`, discounted from expiry.
    pub fn cash_annuity(&self, market: &MarketState, rate: f64) -> PricingResult<f64> {
        let mut growth = 1.0;
        let mut annuity = 0.0;
        for (_, _, alpha) in self.swap.fixed_periods()? {
            growth *= 1.0 + rate * alpha;
            annuity += alpha / growth;
        }
        Ok(annuity * market.df(self.expiry()))
    }

    fn black_value(&self, market: &MarketState, model: &Model) -> PricingResult<f64> {
        let forward = self.forward_rate(market)?;
        let annuity = match self.settlement {
            Settlement::Physical => self.swap.annuity(market)?,
            Settlement::Cash => self.cash_annuity(market, forward)?,
        };
        let unit = forward_option(
            market,
            model,
            self.name(),
            forward,
            self.swap.fixed_rate,
            self.expiry(),
            annuity,
            self.swap.swap_type.as_option_type(),
        )?;
        Ok(self.swap.notional * unit)
    }

    /// Option type on the fixed-coupon bond: a payer swaption is a put.
    fn bond_option_type(&self) -> OptionType {
        match self.swap.swap_type {
            SwapType::Pay => OptionType::Put,
            SwapType::Receive => OptionType::Call,
        }
    }

    fn jamshidian_value(&self, market: &MarketState, a: f64, sigma: f64) -> PricingResult<f64> {
        let discount = |t: f64| market.discount_at(t);
        let model = HullWhiteAnalytic::new(a, sigma, &discount)?;
        let flows = curve_flows(market, &self.swap.fixed_bond_flows(self.swap.fixed_rate, self.expiry())?);
        let expiry = market.curve_time_to(self.expiry());
        let unit = model.coupon_bond_option(
            expiry,
            &flows,
            1.0,
            self.bond_option_type(),
            &SolverConfig::default(),
        )?;
        Ok(self.swap.notional * unit)
    }

    /// Value on a short-rate lattice.
    pub fn lattice_value(&self, market: &MarketState, model: &ShortRateModel, steps: usize) -> PricingResult<f64> {
        let flows = curve_flows(market, &self.swap.fixed_bond_flows(self.swap.fixed_rate, self.expiry())?);
        let lattice = fit_lattice(market, model, horizon(&flows)?, steps)?;

        let exercise_dates: Vec<Date> = match self.exercise {
            ExerciseType::Bermudan => self
                .swap
                .fixed_periods()?
                .into_iter()
                .map(|(start, _, _)| start)
                .filter(|start| *start >= self.expiry())
                .collect(),
            _ => vec![self.expiry()],
        };
        let layers: Vec<usize> = exercise_dates
            .iter()
            .map(|d| lattice.step_of(market.curve_time_to(*d)))
            .collect();

        let phi = self.bond_option_type().phi();
        let notional = self.swap.notional;
        let mut intrinsic: BTreeMap<usize, Vec<f64>> = BTreeMap::new();
        roll_cashflows(&lattice, &flows, 0.0, |i, bond| {
            if layers.contains(&i) {
                let payoff = bond.iter().map(|b| notional * (phi * (b - 1.0)).max(0.0)).collect();
                intrinsic.insert(i, payoff);
            }
        });

        let Some((&last, terminal)) = intrinsic.iter().next_back() else {
            return Err(PricingError::invalid_input("swaption has no exercise date on the lattice"));
        };
        let mut values = terminal.clone();
        for i in (0..last).rev() {
            values = lattice.step_back(i, &values, 0.0);
            if let Some(exercise) = intrinsic.get(&i) {
                for (v, e) in values.iter_mut().zip(exercise) {
                    *v = v.max(*e);
                }
            }
        }
        debug!(
            exercises = intrinsic.len(),
            steps,
            value = values[0],
            "swaption lattice"
        );
        Ok(values[0])
    }
}

impl Pricer for Swaption {
    fn name(&self) -> &'static str {
        match (self.exercise, self.swap.swap_type) {
            (ExerciseType::Bermudan, SwapType::Pay) => "Bermudan payer swaption",
            (ExerciseType::Bermudan, SwapType::Receive) => "Bermudan receiver swaption",
            (_, SwapType::Pay) => "payer swaption",
            (_, SwapType::Receive) => "receiver swaption",
        }
    }

    fn value(&self, market: &MarketState, model: &Model) -> PricingResult<f64> {
        self.check(market)?;
        let european = self.exercise == ExerciseType::European;
        let cash = self.settlement == Settlement::Cash;
        match model {
            m if is_black_like(m) && european => self.black_value(market, m),
            Model::HullWhite {
                mean_reversion,
                volatility,
            } if european && !cash => self.jamshidian_value(market, *mean_reversion, *volatility),
            Model::ShortRateTree { model, steps } if !cash => self.lattice_value(market, model, *steps),
            _ => Err(self.mismatch(model)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::sync::Arc;
    use strike_curves::curves::FlatCurve;
    use strike_vol::flat::FlatVolSurface;

    fn today() -> Date {
        Date::from_ymd(2025, 1, 2).unwrap()
    }

    fn market() -> MarketState {
        MarketState::new(today(), Arc::new(FlatCurve::continuous(today(), 0.04)))
            .with_rate_vol(Arc::new(FlatVolSurface::new(today(), 0.2).unwrap()))
    }

    fn payer(strike: f64) -> Swaption {
        Swaption::european(
            SwapType::Pay,
            1e6,
            strike,
            Date::from_ymd(2026, 1, 2).unwrap(),
            Date::from_ymd(2031, 1, 2).unwrap(),
            Frequency::Annual,
        )
    }

    fn receiver(strike: f64) -> Swaption {
        let mut s = payer(strike);
        s.swap.swap_type = SwapType::Receive;
        s
    }

    #[test]
    fn test_payer_receiver_parity() {
        let m = market();
        let k = 0.042;
        let p = payer(k).value(&m, &Model::Black).unwrap();
        let r = receiver(k).value(&m, &Model::Black).unwrap();
        let swap = payer(k);
        let forward = swap.forward_rate(&m).unwrap();
        let annuity = swap.swap.annuity(&m).unwrap();
        assert_relative_eq!(p - r, 1e6 * annuity * (forward - k), epsilon = 1e-6);
    }

    #[test]
    fn test_sabr_without_vol_of_vol_is_black() {
        let m = market();
        let black = payer(0.04).value(&m, &Model::Black).unwrap();
        let sabr = payer(0.04)
            .value(
                &m,
                &Model::Sabr {
                    alpha: 0.2,
                    beta: 1.0,
                    rho: 0.0,
                    nu: 0.0,
                    shift: 0.0,
                },
            )
            .unwrap();
        assert_relative_eq!(sabr, black, max_relative = 1e-6);
    }

    #[test]
    fn test_cash_settlement() {
        let m = market();
        let k = payer(0.0).forward_rate(&m).unwrap();
        let physical = payer(k).value(&m, &Model::Black).unwrap();
        let cash = payer(k).cash_settled().value(&m, &Model::Black).unwrap();
        assert_relative_eq!(cash, physical, max_relative = 0.02);

        let hw = Model::HullWhite {
            mean_reversion: 0.05,
            volatility: 0.01,
        };
        let err = payer(k).cash_settled().value(&m, &hw).unwrap_err();
        assert_eq!(err.kind(), strike_core::ErrorKind::ModelMismatch);
    }

    #[test]
    fn test_jamshidian_matches_lattice() {
        let m = market();
        let swaption = payer(0.041);
        let analytic = swaption
            .value(
                &m,
                &Model::HullWhite {
                    mean_reversion: 0.05,
                    volatility: 0.01,
                },
            )
            .unwrap();
        let tree = swaption
            .value(
                &m,
                &Model::ShortRateTree {
                    model: ShortRateModel::hull_white(0.05, 0.01),
                    steps: 300,
                },
            )
            .unwrap();
        assert_relative_eq!(tree, analytic, max_relative = 0.02);
    }

    #[test]
    fn test_bermudan_worth_more_than_european() {
        let m = market();
        let tree = Model::ShortRateTree {
            model: ShortRateModel::hull_white(0.05, 0.01),
            steps: 300,
        };
        let european = receiver(0.04).value(&m, &tree).unwrap();
        let bermudan = receiver(0.04).bermudan().value(&m, &tree).unwrap();
        assert!(bermudan >= european - 1e-9);
        let err = receiver(0.04).bermudan().value(&m, &Model::Black).unwrap_err();
        assert_eq!(err.kind(), strike_core::ErrorKind::ModelMismatch);
    }
}
