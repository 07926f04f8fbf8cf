//! Interest-rate instruments: bonds, FRNs, swaps, caps and floors,
//! swaptions and bond options.

pub mod bond;
pub mod bond_option;
pub mod capfloor;
pub mod frn;
pub mod swap;
pub mod swaption;

pub use bond::{FixedRateBond, YieldResult};
pub use bond_option::{BondOption, CallableBond, ExercisePrice};
pub use capfloor::{CapFloor, CapFloorType};
pub use frn::FloatingRateNote;
pub use swap::InterestRateSwap;
pub use swaption::{Settlement, Swaption};

use serde::{Deserialize, Serialize};

use strike_core::types::OptionType;
use strike_core::Date;
use strike_options::black76::{bachelier_value, black_value, shifted_black_value};

use crate::error::{PricingError, PricingResult};
use crate::lattice::{RateLattice, ShortRateModel};
use crate::market::MarketState;
use crate::model::Model;

/// A dated cash amount.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cashflow {
    /// Payment date.
    pub date: Date,
    /// Amount paid.
    pub amount: f64,
}

impl Cashflow {
    /// Creates a cash flow.
    pub fn new(date: Date, amount: f64) -> Self {
        Self { date, amount }
    }
}

/// Future flows as `(curve time, amount)` pairs.
pub(crate) fn curve_flows(market: &MarketState, flows: &[Cashflow]) -> Vec<(f64, f64)> {
    let valuation = market.valuation_date();
    flows
        .iter()
        .filter(|cf| cf.date > valuation)
        .map(|cf| (market.curve_time_to(cf.date), cf.amount))
        .collect()
}

/// Short-rate lattice over `[0, horizon]` curve years fitted to the
/// market discount curve.
pub(crate) fn fit_lattice(
    market: &MarketState,
    model: &ShortRateModel,
    horizon: f64,
    steps: usize,
) -> PricingResult<RateLattice> {
    let discount = |t: f64| market.discount_at(t);
    model.build_lattice(&discount, horizon, steps)
}

/// Value of an option on a forward rate under the Black-like models.
///
/// `Black`, `ShiftedBlack` and `Bachelier` read the market rates vol at
/// `strike`; `Sabr` computes its own. Any other model is a mismatch for
/// `instrument`.
#[allow(clippy::too_many_arguments)]
pub(crate) fn forward_option(
    market: &MarketState,
    model: &Model,
    instrument: &'static str,
    forward: f64,
    strike: f64,
    expiry: Date,
    df: f64,
    option_type: OptionType,
) -> PricingResult<f64> {
    let t = market.time_to(expiry);
    match *model {
        Model::Black => {
            if forward <= 0.0 || strike <= 0.0 {
                return Err(PricingError::invalid_input(format!(
                    "Black-76 needs a positive forward and strike, got {forward} and {strike}"
                )));
            }
            let sigma = market.rate_vol(strike, expiry)?;
            Ok(black_value(forward, strike, t, sigma, df, option_type))
        }
        Model::ShiftedBlack { shift } => {
            let sigma = market.rate_vol(strike, expiry)?;
            Ok(shifted_black_value(forward, strike, t, sigma, df, shift, option_type))
        }
        Model::Bachelier => {
            let sigma = market.rate_vol(strike, expiry)?;
            Ok(bachelier_value(forward, strike, t, sigma, df, option_type))
        }
        Model::Sabr {
            alpha,
            beta,
            rho,
            nu,
            shift,
        } => {
            let sabr = Model::sabr(alpha, beta, rho, nu, shift)?;
            let sigma = sabr.implied_vol(forward, strike, t);
            Ok(shifted_black_value(forward, strike, t, sigma, df, shift, option_type))
        }
        _ => Err(PricingError::model_mismatch(instrument, model)),
    }
}

/// True for the models handled by [`forward_option`].
pub(crate) fn is_black_like(model: &Model) -> bool {
    matches!(
        model,
        Model::Black | Model::ShiftedBlack { .. } | Model::Bachelier | Model::Sabr { .. }
    )
}
