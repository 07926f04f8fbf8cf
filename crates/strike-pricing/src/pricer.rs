//! The valuation contract between instruments and the engine.
//!
//! An instrument is immutable contract data. [`Pricer::value`] reads a
//! [`MarketState`] and a [`Model`] and either returns a present value or
//! fails; nothing is cached on the instrument. [`Instrument`] gathers
//! every supported contract behind one dispatch point for callers that
//! hold heterogeneous books.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::equity::{
    Barrier, BasketOption, ConvertibleBond, DigitalOption, FxOption, Snowball, TouchOption, VanillaOption,
};
use crate::error::{PricingError, PricingResult};
use crate::market::MarketState;
use crate::model::Model;
use crate::rates::{
    BondOption, CallableBond, CapFloor, FixedRateBond, FloatingRateNote, InterestRateSwap, Swaption,
};

/// Values a contract under a model.
pub trait Pricer {
    /// Short description used in errors and logs.
    fn name(&self) -> &'static str;

    /// Present value on the market's valuation date.
    fn value(&self, market: &MarketState, model: &Model) -> PricingResult<f64>;

    /// The error returned for a model the contract does not support.
    fn mismatch(&self, model: &Model) -> PricingError {
        PricingError::model_mismatch(self.name(), model)
    }
}

impl<P: Pricer + ?Sized> Pricer for &P {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn value(&self, market: &MarketState, model: &Model) -> PricingResult<f64> {
        (**self).value(market, model)
    }
}

impl<P: Pricer + ?Sized> Pricer for Box<P> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn value(&self, market: &MarketState, model: &Model) -> PricingResult<f64> {
        (**self).value(market, model)
    }
}

/// Every contract the engine prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "instrument", rename_all = "snake_case")]
pub enum Instrument {
    /// European or American vanilla.
    Vanilla(VanillaOption),
    /// Cash- or asset-or-nothing digital.
    Digital(DigitalOption),
    /// Single barrier option.
    Barrier(Barrier),
    /// One-touch or no-touch.
    Touch(TouchOption),
    /// FX vanilla.
    FxVanilla(FxOption),
    /// European basket option.
    Basket(BasketOption),
    /// Snowball autocallable on a basket.
    Snowball(Snowball),
    /// Convertible bond.
    Convertible(ConvertibleBond),
    /// Fixed-rate bond.
    Bond(FixedRateBond),
    /// Floating-rate note.
    FloatingRateNote(FloatingRateNote),
    /// Fixed-float swap.
    Swap(InterestRateSwap),
    /// Cap or floor.
    CapFloor(CapFloor),
    /// Swaption.
    Swaption(Swaption),
    /// Option on a fixed-rate bond.
    BondOption(BondOption),
    /// Callable or puttable bond.
    CallableBond(CallableBond),
}

impl Instrument {
    fn as_pricer(&self) -> &dyn Pricer {
        match self {
            Instrument::Vanilla(x) => x,
            Instrument::Digital(x) => x,
            Instrument::Barrier(x) => x,
            Instrument::Touch(x) => x,
            Instrument::FxVanilla(x) => x,
            Instrument::Basket(x) => x,
            Instrument::Snowball(x) => x,
            Instrument::Convertible(x) => x,
            Instrument::Bond(x) => x,
            Instrument::FloatingRateNote(x) => x,
            Instrument::Swap(x) => x,
            Instrument::CapFloor(x) => x,
            Instrument::Swaption(x) => x,
            Instrument::BondOption(x) => x,
            Instrument::CallableBond(x) => x,
        }
    }
}

impl Pricer for Instrument {
    fn name(&self) -> &'static str {
        self.as_pricer().name()
    }

    fn value(&self, market: &MarketState, model: &Model) -> PricingResult<f64> {
        let value = self.as_pricer().value(market, model)?;
        debug!(instrument = self.name(), model = model.name(), value, "priced");
        Ok(value)
    }
}

macro_rules! impl_from {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Instrument {
                fn from(x: $ty) -> Self {
                    Instrument::$variant(x)
                }
            }
        )*
    };
}

impl_from!(
    Vanilla(VanillaOption),
    Digital(DigitalOption),
    Barrier(Barrier),
    Touch(TouchOption),
    FxVanilla(FxOption),
    Basket(BasketOption),
    Snowball(Snowball),
    Convertible(ConvertibleBond),
    Bond(FixedRateBond),
    FloatingRateNote(FloatingRateNote),
    Swap(InterestRateSwap),
    CapFloor(CapFloor),
    Swaption(Swaption),
    BondOption(BondOption),
    CallableBond(CallableBond),
);

/// Values each instrument under the same market and model.
///
/// Failures are returned per instrument; one failing contract does not
/// stop the others.
pub fn price_all<'a, I>(instruments: I, market: &MarketState, model: &Model) -> Vec<PricingResult<f64>>
where
    I: IntoIterator<Item = &'a Instrument>,
{
    instruments.into_iter().map(|i| i.value(market, model)).collect()
}
