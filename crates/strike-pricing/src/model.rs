//! Model choice passed alongside the market state.
//!
//! A [`Model`] names the valuation kernel and carries its parameters
//! (tree steps, simulation size and seed, short-rate dynamics). Each
//! instrument accepts a subset of models and returns
//! [`PricingError::ModelMismatch`](crate::error::PricingError::ModelMismatch)
//! for the rest.

use std::fmt;

use serde::{Deserialize, Serialize};

use strike_mc::McConfig;
use strike_options::sabr::SabrParams;

use crate::error::PricingResult;
use crate::lattice::ShortRateModel;

/// Valuation model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum Model {
    /// Closed-form Black–Scholes family: vanilla, digital, barrier,
    /// Garman–Kohlhagen and moment-matched basket formulas.
    Analytic,
    /// Cox–Ross–Rubinstein tree on the underlying.
    Binomial {
        /// Time steps.
        steps: usize,
    },
    /// Barone-Adesi–Whaley approximation for American exercise.
    BaroneAdesiWhaley,
    /// Monte Carlo on (correlated) geometric Brownian motion.
    MonteCarlo(McConfig),
    /// Cash-flow discounting on the market curves.
    Discounting,
    /// Black-76 on forward rates with the market rates vol.
    Black,
    /// Black-76 on shifted forwards.
    ShiftedBlack {
        /// Forward and strike shift.
        shift: f64,
    },
    /// Normal model; the rates vol surface is read as normal vols.
    Bachelier,
    /// Hagan SABR implied vol fed into (shifted) Black-76.
    Sabr {
        /// Initial vol.
        alpha: f64,
        /// CEV exponent.
        beta: f64,
        /// Spot-vol correlation.
        rho: f64,
        /// Vol of vol.
        nu: f64,
        /// Forward and strike shift.
        shift: f64,
    },
    /// Closed-form Hull–White bond options and Jamshidian decomposition.
    HullWhite {
        /// Mean reversion speed.
        mean_reversion: f64,
        /// Short-rate volatility.
        volatility: f64,
    },
    /// Short-rate lattice fitted to the discount curve.
    ShortRateTree {
        /// Dynamics.
        #[serde(rename = "dynamics")]
        model: ShortRateModel,
        /// Time steps.
        steps: usize,
    },
}

impl Model {
    /// Short name for messages and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Model::Analytic => "analytic",
            Model::Binomial { .. } => "binomial tree",
            Model::BaroneAdesiWhaley => "Barone-Adesi-Whaley",
            Model::MonteCarlo(_) => "Monte Carlo",
            Model::Discounting => "discounting",
            Model::Black => "Black-76",
            Model::ShiftedBlack { .. } => "shifted Black",
            Model::Bachelier => "Bachelier",
            Model::Sabr { .. } => "SABR",
            Model::HullWhite { .. } => "Hull-White analytic",
            Model::ShortRateTree { model, .. } => model.kind.name(),
        }
    }

    /// SABR parameters of a [`Model::Sabr`].
    pub(crate) fn sabr(alpha: f64, beta: f64, rho: f64, nu: f64, shift: f64) -> PricingResult<SabrParams> {
        Ok(SabrParams::new(alpha, beta, rho, nu)?.with_shift(shift))
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
