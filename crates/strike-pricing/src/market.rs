//! Immutable market snapshots and scenario overrides.
//!
//! A [`MarketState`] bundles everything a pricer reads: the valuation date,
//! discount and projection curves, an optional foreign curve, spot,
//! dividend yield and vol surface per underlying, their correlation, a
//! credit spread and a rates vol surface. Scenarios never mutate a state;
//! [`MarketState::with_override`] and the bump helpers return a new one.
//!
//! ```rust
//! use std::sync::Arc;
//! use strike_core::Date;
//! use strike_curves::curves::FlatCurve;
//! use strike_pricing::market::{MarketOverride, MarketState};
//!
//! let today = Date::from_ymd(2025, 1, 2).unwrap();
//! let market = MarketState::new(today, Arc::new(FlatCurve::continuous(today, 0.05)))
//!     .add_flat_vol_asset(100.0, 0.01, 0.30)
//!     .unwrap();
//! let up = market.with_override(MarketOverride::Spot { asset: 0, spot: 101.0 }).unwrap();
//! assert_eq!(market.spot(0).unwrap(), 100.0);
//! assert_eq!(up.spot(0).unwrap(), 101.0);
//! ```

use std::fmt;
use std::sync::Arc;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use strike_core::daycounts::DayCountType;
use strike_core::Date;
use strike_curves::curves::ShiftedCurve;
use strike_curves::Curve;
use strike_math::linear_algebra::validate_correlation;
use strike_vol::flat::FlatVolSurface;
use strike_vol::traits::year_fraction;
use strike_vol::VolSurface;

use crate::error::{require_positive, PricingError, PricingResult};

/// A single underlying: spot, continuous dividend (or foreign) yield and
/// an optional vol surface.
#[derive(Clone)]
pub struct Asset {
    /// Spot price.
    pub spot: f64,
    /// Continuous dividend yield.
    pub dividend_yield: f64,
    /// Black vol surface.
    pub vol: Option<Arc<dyn VolSurface>>,
}

impl fmt::Debug for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Asset")
            .field("spot", &self.spot)
            .field("dividend_yield", &self.dividend_yield)
            .field("has_vol", &self.vol.is_some())
            .finish()
    }
}

/// A scenario applied to a market state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "override", rename_all = "snake_case")]
pub enum MarketOverride {
    /// Sets one asset's spot.
    Spot {
        /// Asset index.
        asset: usize,
        /// New spot.
        spot: f64,
    },
    /// Scales every spot by `1 + relative`.
    SpotBump {
        /// Relative bump.
        relative: f64,
    },
    /// Adds a parallel shift to every vol surface.
    VolShift {
        /// Absolute vol shift.
        shift: f64,
    },
    /// Shifts the continuously compounded zero rates of the discount and
    /// projection curves.
    RateShift {
        /// Rate shift.
        shift: f64,
    },
    /// Moves the valuation date.
    ValuationDate {
        /// New valuation date.
        date: Date,
    },
    /// Replaces the credit spread.
    CreditSpread {
        /// New spread.
        spread: f64,
    },
}

/// Market data snapshot read by every pricer.
#[derive(Clone)]
pub struct MarketState {
    valuation_date: Date,
    discount: Arc<dyn Curve>,
    forecast: Option<Arc<dyn Curve>>,
    foreign: Option<Arc<dyn Curve>>,
    assets: Vec<Asset>,
    correlation: Option<DMatrix<f64>>,
    credit_spread: f64,
    rate_vol: Option<Arc<dyn VolSurface>>,
}

impl fmt::Debug for MarketState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarketState")
            .field("valuation_date", &self.valuation_date)
            .field("curve_date", &self.discount.reference_date())
            .field("assets", &self.assets)
            .field("credit_spread", &self.credit_spread)
            .finish_non_exhaustive()
    }
}

impl MarketState {
    /// Creates a state with a discount curve and no underlyings.
    pub fn new(valuation_date: Date, discount: Arc<dyn Curve>) -> Self {
        Self {
            valuation_date,
            discount,
            forecast: None,
            foreign: None,
            assets: Vec::new(),
            correlation: None,
            credit_spread: 0.0,
            rate_vol: None,
        }
    }

    // ---------------------------------------------------------------------
    // Construction
    // ---------------------------------------------------------------------

    /// Sets the projection curve for floating-rate fixings.
    #[must_use]
    pub fn with_forecast_curve(mut self, curve: Arc<dyn Curve>) -> Self {
        self.forecast = Some(curve);
        self
    }

    /// Sets the foreign curve; the first asset's carry is then read from
    /// it instead of its dividend yield.
    #[must_use]
    pub fn with_foreign_curve(mut self, curve: Arc<dyn Curve>) -> Self {
        self.foreign = Some(curve);
        self
    }

    /// Appends an underlying.
    #[must_use]
    pub fn add_asset(mut self, spot: f64, dividend_yield: f64, vol: Arc<dyn VolSurface>) -> Self {
        self.assets.push(Asset {
            spot,
            dividend_yield,
            vol: Some(vol),
        });
        self
    }

    /// Appends an underlying with a flat vol.
    pub fn add_flat_vol_asset(self, spot: f64, dividend_yield: f64, vol: f64) -> PricingResult<Self> {
        let surface = FlatVolSurface::new(self.valuation_date, vol)?;
        Ok(self.add_asset(spot, dividend_yield, Arc::new(surface)))
    }

    /// Sets the asset correlation matrix.
    pub fn with_correlation(mut self, correlation: DMatrix<f64>) -> PricingResult<Self> {
        validate_correlation(&correlation)?;
        self.correlation = Some(correlation);
        Ok(self)
    }

    /// Sets the credit spread added to risky discounting.
    #[must_use]
    pub fn with_credit_spread(mut self, spread: f64) -> Self {
        self.credit_spread = spread;
        self
    }

    /// Sets the vol surface for caps, floors and swaptions.
    #[must_use]
    pub fn with_rate_vol(mut self, vol: Arc<dyn VolSurface>) -> Self {
        self.rate_vol = Some(vol);
        self
    }

    // ---------------------------------------------------------------------
    // Scenarios
    // ---------------------------------------------------------------------

    /// Returns a copy of the state with `scenario` applied.
    pub fn with_override(&self, scenario: MarketOverride) -> PricingResult<Self> {
        match scenario {
            MarketOverride::Spot { asset, spot } => self.with_spot(asset, spot),
            MarketOverride::SpotBump { relative } => self.bumped_spots(relative),
            MarketOverride::VolShift { shift } => Ok(self.shifted_vols(shift)),
            MarketOverride::RateShift { shift } => Ok(self.shifted_rates(shift)),
            MarketOverride::ValuationDate { date } => self.rolled_to(date),
            MarketOverride::CreditSpread { spread } => Ok(self.clone().with_credit_spread(spread)),
        }
    }

    /// Copy with one asset's spot replaced.
    pub fn with_spot(&self, asset: usize, spot: f64) -> PricingResult<Self> {
        require_positive("spot", spot)?;
        self.asset(asset)?;
        let mut next = self.clone();
        next.assets[asset].spot = spot;
        Ok(next)
    }

    /// Copy with every spot scaled by `1 + relative`.
    pub fn bumped_spots(&self, relative: f64) -> PricingResult<Self> {
        if !(relative.is_finite() && relative > -1.0) {
            return Err(PricingError::invalid_input(format!(
                "relative spot bump must exceed -1, got {relative}"
            )));
        }
        let mut next = self.clone();
        for asset in &mut next.assets {
            asset.spot *= 1.0 + relative;
        }
        Ok(next)
    }

    /// Copy with `shift` added to every vol surface.
    #[must_use]
    pub fn shifted_vols(&self, shift: f64) -> Self {
        let mut next = self.clone();
        for asset in &mut next.assets {
            asset.vol = asset.vol.take().map(|vol| shift_surface(vol, shift));
        }
        next.rate_vol = next.rate_vol.take().map(|vol| shift_surface(vol, shift));
        next
    }

    /// Copy with the discount and projection curves shifted in parallel.
    #[must_use]
    pub fn shifted_rates(&self, shift: f64) -> Self {
        let mut next = self.clone();
        next.discount = Arc::new(ShiftedCurve::new(Arc::clone(&self.discount), shift));
        next.forecast = self
            .forecast
            .as_ref()
            .map(|curve| Arc::new(ShiftedCurve::new(Arc::clone(curve), shift)) as Arc<dyn Curve>);
        next
    }

    /// Copy valued on `date`; curves and surfaces keep their anchors.
    pub fn rolled_to(&self, date: Date) -> PricingResult<Self> {
        if date < self.discount.reference_date() {
            return Err(PricingError::invalid_input(format!(
                "valuation date {date} precedes the curve anchor {}",
                self.discount.reference_date()
            )));
        }
        let mut next = self.clone();
        next.valuation_date = date;
        Ok(next)
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    /// Valuation date.
    pub fn valuation_date(&self) -> Date {
        self.valuation_date
    }

    /// The discount curve.
    pub fn discount_curve(&self) -> &dyn Curve {
        self.discount.as_ref()
    }

    /// The projection curve, falling back to the discount curve.
    pub fn forecast_curve(&self) -> &dyn Curve {
        self.forecast.as_deref().unwrap_or(self.discount.as_ref())
    }

    /// Credit spread.
    pub fn credit_spread(&self) -> f64 {
        self.credit_spread
    }

    /// Number of underlyings.
    pub fn num_assets(&self) -> usize {
        self.assets.len()
    }

    /// Underlying `i`.
    pub fn asset(&self, i: usize) -> PricingResult<&Asset> {
        self.assets
            .get(i)
            .ok_or_else(|| PricingError::missing(format!("asset {i} (market holds {})", self.assets.len())))
    }

    /// Spot of underlying `i`.
    pub fn spot(&self, i: usize) -> PricingResult<f64> {
        Ok(self.asset(i)?.spot)
    }

    /// Option clock: ACT/365F years from the valuation date.
    pub fn time_to(&self, date: Date) -> f64 {
        year_fraction(self.valuation_date, date)
    }

    /// Curve time from the valuation date to `date`.
    pub fn curve_time_to(&self, date: Date) -> f64 {
        self.discount.time(date) - self.discount.time(self.valuation_date)
    }

    /// Discount factor from `date` back to the valuation date.
    pub fn df(&self, date: Date) -> f64 {
        self.discount.df(date) / self.discount.df(self.valuation_date)
    }

    /// Discount factor over `t` curve years from the valuation date.
    pub fn discount_at(&self, t: f64) -> f64 {
        let t0 = self.discount.time(self.valuation_date);
        self.discount.discount_factor(t0 + t) / self.discount.discount_factor(t0)
    }

    /// Risky discount factor including the credit spread.
    pub fn risky_df(&self, date: Date) -> f64 {
        self.df(date) * (-self.credit_spread * self.curve_time_to(date)).exp()
    }

    /// Continuously compounded rate to `date` on the option clock.
    pub fn rate_to(&self, date: Date) -> f64 {
        continuous_rate(self.df(date), self.time_to(date), || {
            self.discount.instantaneous_forward(self.discount.time(self.valuation_date))
        })
    }

    /// Continuous carry of asset `i` to `date`: the foreign rate for the
    /// first asset when a foreign curve is set, else its dividend yield.
    pub fn carry_to(&self, i: usize, date: Date) -> PricingResult<f64> {
        let asset = self.asset(i)?;
        match (&self.foreign, i) {
            (Some(foreign), 0) => {
                let df = foreign.df(date) / foreign.df(self.valuation_date);
                Ok(continuous_rate(df, self.time_to(date), || {
                    foreign.instantaneous_forward(foreign.time(self.valuation_date))
                }))
            }
            _ => Ok(asset.dividend_yield),
        }
    }

    /// Black vol of asset `i` at `strike` for expiry `date`.
    pub fn vol(&self, i: usize, strike: f64, date: Date) -> PricingResult<f64> {
        let surface = self
            .asset(i)?
            .vol
            .as_ref()
            .ok_or_else(|| PricingError::missing(format!("vol surface for asset {i}")))?;
        Ok(surface.vol(strike, self.time_to(date)))
    }

    /// Rates vol at `strike` for expiry `date`.
    pub fn rate_vol(&self, strike: f64, date: Date) -> PricingResult<f64> {
        let surface = self
            .rate_vol
            .as_ref()
            .ok_or_else(|| PricingError::missing("rates vol surface"))?;
        Ok(surface.vol(strike, self.time_to(date)))
    }

    /// Correlation of the first `n` assets; identity when none is set.
    pub fn correlation(&self, n: usize) -> PricingResult<DMatrix<f64>> {
        match &self.correlation {
            None => Ok(DMatrix::identity(n, n)),
            Some(c) if c.nrows() == n => Ok(c.clone()),
            Some(c) => Err(PricingError::invalid_input(format!(
                "correlation is {}x{}, instrument has {n} assets",
                c.nrows(),
                c.ncols()
            ))),
        }
    }

    /// Forward rate between two dates on the projection curve.
    pub fn forward_rate(&self, start: Date, end: Date, day_count: DayCountType) -> PricingResult<f64> {
        Ok(self.forecast_curve().fwd_rate(start, end, day_count)?)
    }
}

fn continuous_rate(df: f64, t: f64, short_rate: impl FnOnce() -> f64) -> f64 {
    if t > 1e-10 {
        -df.ln() / t
    } else {
        short_rate()
    }
}

fn shift_surface(base: Arc<dyn VolSurface>, shift: f64) -> Arc<dyn VolSurface> {
    Arc::new(ShiftedVolSurface { base, shift })
}

/// A surface with a constant added to every vol.
#[derive(Clone)]
pub struct ShiftedVolSurface {
    base: Arc<dyn VolSurface>,
    shift: f64,
}

impl ShiftedVolSurface {
    /// Wraps `base`.
    pub fn new(base: Arc<dyn VolSurface>, shift: f64) -> Self {
        Self { base, shift }
    }
}

impl VolSurface for ShiftedVolSurface {
    fn reference_date(&self) -> Date {
        self.base.reference_date()
    }

    fn vol(&self, strike: f64, t: f64) -> f64 {
        (self.base.vol(strike, t) + self.shift).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use strike_curves::curves::FlatCurve;

    fn today() -> Date {
        Date::from_ymd(2025, 1, 2).unwrap()
    }

    fn market() -> MarketState {
        MarketState::new(today(), Arc::new(FlatCurve::continuous(today(), 0.05)))
            .add_flat_vol_asset(100.0, 0.01, 0.30)
            .unwrap()
    }

    #[test]
    fn test_rates_on_option_clock() {
        let m = market();
        let expiry = today().add_days(365);
        assert_relative_eq!(m.time_to(expiry), 1.0);
        assert_relative_eq!(m.rate_to(expiry), 0.05, epsilon = 1e-12);
        assert_relative_eq!(m.carry_to(0, expiry).unwrap(), 0.01);
        assert_relative_eq!(m.vol(0, 120.0, expiry).unwrap(), 0.30);
        assert_relative_eq!(m.rate_to(today()), 0.05, epsilon = 1e-6);
    }

    #[test]
    fn test_overrides_leave_original_untouched() {
        let m = market();
        let expiry = today().add_days(365);
        let up = m.with_override(MarketOverride::SpotBump { relative: 0.01 }).unwrap();
        assert_relative_eq!(up.spot(0).unwrap(), 101.0);
        assert_eq!(m.spot(0).unwrap(), 100.0);

        let vol = m.with_override(MarketOverride::VolShift { shift: 0.01 }).unwrap();
        assert_relative_eq!(vol.vol(0, 100.0, expiry).unwrap(), 0.31, epsilon = 1e-12);

        let rates = m.with_override(MarketOverride::RateShift { shift: 0.001 }).unwrap();
        assert_relative_eq!(rates.rate_to(expiry), 0.051, epsilon = 1e-10);

        let rolled = m
            .with_override(MarketOverride::ValuationDate { date: today().add_days(1) })
            .unwrap();
        assert_relative_eq!(rolled.time_to(expiry), 364.0 / 365.0);
        assert_relative_eq!(rolled.df(today().add_days(1)), 1.0);
        assert!(m.rolled_to(today().add_days(-1)).is_err());
    }

    #[test]
    fn test_missing_data() {
        let m = market();
        assert_eq!(m.spot(3).unwrap_err().kind(), strike_core::ErrorKind::InputValidation);
        assert!(m.rate_vol(0.03, today().add_days(30)).is_err());
        assert!(m.with_spot(0, -1.0).is_err());
    }

    #[test]
    fn test_correlation_dimension() {
        let m = market();
        assert_eq!(m.correlation(3).unwrap(), DMatrix::identity(3, 3));
        let m = m
            .with_correlation(DMatrix::from_row_slice(2, 2, &[1.0, 0.5, 0.5, 1.0]))
            .unwrap();
        assert!(m.correlation(3).is_err());
        assert!(MarketState::new(today(), Arc::new(FlatCurve::continuous(today(), 0.0)))
            .with_correlation(DMatrix::from_row_slice(2, 2, &[1.0, 1.5, 1.5, 1.0]))
            .is_err());
    }

    #[test]
    fn test_foreign_curve_sets_first_asset_carry() {
        let m = market().with_foreign_curve(Arc::new(FlatCurve::continuous(today(), 0.02)));
        assert_relative_eq!(m.carry_to(0, today().add_days(365)).unwrap(), 0.02, epsilon = 1e-12);
    }
}
