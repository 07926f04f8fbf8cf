//! Convertible bonds on a CRR stock tree.
//!
//! The holder may convert into `conversion_ratio` shares at any node; an
//! issuer call caps the value and a holder put floors it. Hold values are
//! discounted at the risk-free rate plus the market credit spread.

use serde::{Deserialize, Serialize};
use tracing::debug;

use strike_core::types::Frequency;
use strike_core::Date;

use super::alive;
use crate::error::{require_positive, PricingError, PricingResult};
use crate::market::MarketState;
use crate::model::Model;
use crate::pricer::Pricer;

/// A fixed-coupon convertible bond on one underlying.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConvertibleBond {
    /// Face value redeemed at maturity.
    pub face: f64,
    /// Annual coupon rate on face.
    pub coupon_rate: f64,
    /// Coupon frequency.
    #[serde(default)]
    pub frequency: Frequency,
    /// Maturity date.
    pub maturity: Date,
    /// Shares received per bond on conversion.
    pub conversion_ratio: f64,
    /// Issuer call price.
    #[serde(default)]
    pub call_price: Option<f64>,
    /// Holder put price.
    #[serde(default)]
    pub put_price: Option<f64>,
    /// Index of the underlying in the market state.
    #[serde(default)]
    pub asset: usize,
}

impl ConvertibleBond {
    /// Non-callable, non-puttable convertible.
    pub fn new(face: f64, coupon_rate: f64, frequency: Frequency, maturity: Date, conversion_ratio: f64) -> Self {
        Self {
            face,
            coupon_rate,
            frequency,
            maturity,
            conversion_ratio,
            call_price: None,
            put_price: None,
            asset: 0,
        }
    }

    /// Adds an issuer call.
    #[must_use]
    pub fn callable(mut self, price: f64) -> Self {
        self.call_price = Some(price);
        self
    }

    /// Adds a holder put.
    #[must_use]
    pub fn puttable(mut self, price: f64) -> Self {
        self.put_price = Some(price);
        self
    }

    /// Shares times spot.
    pub fn conversion_value(&self, market: &MarketState) -> PricingResult<f64> {
        Ok(self.conversion_ratio * market.spot(self.asset)?)
    }

    /// Coupon dates after `valuation`, rolled back from maturity.
    pub fn coupon_dates(&self, valuation: Date) -> PricingResult<Vec<Date>> {
        if self.frequency.is_zero() {
            return Ok(Vec::new());
        }
        let step = self.frequency.months_per_period() as i32;
        let mut dates = Vec::new();
        let mut k = 0;
        loop {
            let date = self.maturity.add_months(-step * k)?;
            if date <= valuation {
                break;
            }
            dates.push(date);
            k += 1;
        }
        dates.reverse();
        Ok(dates)
    }

    fn apply_features(&self, hold: f64, conversion: f64) -> f64 {
        let mut value = hold.max(conversion);
        if let Some(put) = self.put_price {
            value = value.max(put);
        }
        if let Some(call) = self.call_price {
            value = value.min(call.max(conversion));
        }
        value
    }

    fn check(&self) -> PricingResult<()> {
        require_positive("face", self.face)?;
        if self.conversion_ratio < 0.0 || !self.conversion_ratio.is_finite() {
            return Err(PricingError::invalid_input("conversion ratio must be non-negative"));
        }
        if self.coupon_rate < 0.0 || !self.coupon_rate.is_finite() {
            return Err(PricingError::invalid_input("coupon rate must be non-negative"));
        }
        Ok(())
    }

    /// Value on a CRR tree with `steps` steps.
    pub fn tree_value(&self, market: &MarketState, steps: usize) -> PricingResult<f64> {
        self.check()?;
        if steps == 0 {
            return Err(PricingError::invalid_input("tree needs at least one step"));
        }
        let t = alive(market, self.maturity, self.name())?;
        let spot = market.spot(self.asset)?;
        let vol_strike = if self.conversion_ratio > 0.0 {
            self.face / self.conversion_ratio
        } else {
            spot
        };
        let sigma = market.vol(self.asset, vol_strike, self.maturity)?;
        let r = market.rate_to(self.maturity);
        let q = market.carry_to(self.asset, self.maturity)?;
        let spread = market.credit_spread();

        let dt = t / steps as f64;
        let u = (sigma * dt.sqrt()).exp();
        let d = 1.0 / u;
        let p = (((r - q) * dt).exp() - d) / (u - d);
        if !(0.0..=1.0).contains(&p) {
            return Err(PricingError::invalid_input(format!(
                "risk-neutral probability {p} outside [0, 1], use more steps"
            )));
        }
        let disc = (-(r + spread) * dt).exp();

        let mut coupons = vec![0.0; steps + 1];
        let amount = match self.frequency.periods_per_year() {
            0 => 0.0,
            f => self.face * self.coupon_rate / f64::from(f),
        };
        for date in self.coupon_dates(market.valuation_date())? {
            let i = ((market.time_to(date) / dt).round() as usize).clamp(1, steps);
            coupons[i] += amount;
        }

        let stock = |i: usize, j: usize| spot * u.powi(j as i32) * d.powi((i - j) as i32);
        let mut values: Vec<f64> = (0..=steps)
            .map(|j| self.apply_features(self.face, self.conversion_ratio * stock(steps, j)))
            .collect();
        for i in (0..steps).rev() {
            for j in 0..=i {
                let hold = disc * (p * values[j + 1] + (1.0 - p) * values[j] + coupons[i + 1]);
                values[j] = self.apply_features(hold, self.conversion_ratio * stock(i, j));
            }
        }
        debug!(steps, sigma, spread, value = values[0], "convertible tree");
        Ok(values[0])
    }
}

impl Pricer for ConvertibleBond {
    fn name(&self) -> &'static str {
        "convertible bond"
    }

    fn value(&self, market: &MarketState, model: &Model) -> PricingResult<f64> {
        match model {
            Model::Binomial { steps } => self.tree_value(market, *steps),
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

    fn today() -> Date {
        Date::from_ymd(2025, 1, 2).unwrap()
    }

    fn market(spot: f64) -> MarketState {
        MarketState::new(today(), Arc::new(FlatCurve::continuous(today(), 0.04)))
            .add_flat_vol_asset(spot, 0.0, 0.25)
            .unwrap()
            .with_credit_spread(0.02)
    }

    fn maturity() -> Date {
        Date::from_ymd(2030, 1, 2).unwrap()
    }

    #[test]
    fn test_no_conversion_is_risky_bond() {
        let m = market(100.0);
        let bond = ConvertibleBond::new(100.0, 0.05, Frequency::Annual, maturity(), 0.0);
        let tree = bond.value(&m, &Model::Binomial { steps: 500 }).unwrap();
        let straight: f64 = bond
            .coupon_dates(today())
            .unwrap()
            .iter()
            .map(|d| 5.0 * (-0.06 * m.time_to(*d)).exp())
            .sum::<f64>()
            + 100.0 * (-0.06 * m.time_to(maturity())).exp();
        assert_relative_eq!(tree, straight, max_relative = 2e-3);
    }

    #[test]
    fn test_bounded_below_by_conversion_and_bond() {
        let bond = ConvertibleBond::new(100.0, 0.03, Frequency::SemiAnnual, maturity(), 1.0);
        for spot in [50.0, 100.0, 200.0] {
            let m = market(spot);
            let value = bond.value(&m, &Model::Binomial { steps: 300 }).unwrap();
            assert!(value >= bond.conversion_value(&m).unwrap() - 1e-9);
            let floor = ConvertibleBond {
                conversion_ratio: 0.0,
                ..bond
            }
            .value(&m, &Model::Binomial { steps: 300 })
            .unwrap();
            assert!(value >= floor - 1e-9);
        }
    }

    #[test]
    fn test_call_and_put_features() {
        let m = market(100.0);
        let plain = ConvertibleBond::new(100.0, 0.03, Frequency::Annual, maturity(), 1.0);
        let steps = Model::Binomial { steps: 300 };
        let base = plain.value(&m, &steps).unwrap();
        let called = plain.callable(105.0).value(&m, &steps).unwrap();
        let put = plain.puttable(100.0).value(&m, &steps).unwrap();
        assert!(called < base);
        assert!(put >= base);
        assert!(put >= 100.0);
    }

    #[test]
    fn test_coupon_dates() {
        let bond = ConvertibleBond::new(100.0, 0.03, Frequency::SemiAnnual, maturity(), 1.0);
        let dates = bond.coupon_dates(today()).unwrap();
        assert_eq!(dates.len(), 10);
        assert_eq!(dates[0], Date::from_ymd(2025, 7, 2).unwrap());
        assert_eq!(*dates.last().unwrap(), maturity());
    }

    #[test]
    fn test_requires_tree() {
        let bond = ConvertibleBond::new(100.0, 0.03, Frequency::Annual, maturity(), 1.0);
        assert!(bond.value(&market(100.0), &Model::Analytic).is_err());
    }
}
