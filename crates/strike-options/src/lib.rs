//! # Strike Options
//!
//! Closed-form and lattice option kernels for the Strike pricing library.
//!
//! This crate provides:
//!
//! - **Black–Scholes**: premium, Greeks and delayed-delivery valuation with
//!   continuous rate and dividend yield, plus parallel batch evaluation
//! - **Implied Volatility**: Newton on vega with a bisection fallback,
//!   seeded by the Hallerbach approximation
//! - **American Exercise**: Barone-Adesi–Whaley and the CRR binomial tree
//! - **Exotics**: Reiner–Rubinstein barriers, one-touch, cash and asset
//!   digitals
//! - **Forward Measure**: Black-76, shifted Black, Bachelier and SABR
//! - **FX**: Garman–Kohlhagen and the spot/forward, premium-adjusted delta
//!   conventions
//!
//! ## Quick Start
//!
//! ```rust
//! use strike_core::types::OptionType;
//! use strike_options::prelude::*;
//!
//! let price = bs_value(100.0, 1.0, 100.0, 0.05, 0.01, 0.3, OptionType::Call);
//! let vol = bs_implied_vol(100.0, 1.0, 100.0, 0.05, 0.01, price, OptionType::Call).unwrap();
//! assert!((vol - 0.3).abs() < 1e-8);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::similar_names)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::float_cmp)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::unreadable_literal)]

pub mod barrier;
pub mod baw;
pub mod binomial;
pub mod black76;
pub mod black_scholes;
pub mod digital;
pub mod error;
pub mod fx;
pub mod implied_vol;
pub mod sabr;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::barrier::{BarrierDirection, BarrierOption, BarrierStyle, OneTouch, TouchPayment};
    pub use crate::baw::{baw_early_exercise_premium, baw_value};
    pub use crate::binomial::{crr_tree, TreeGreeks};
    pub use crate::black76::{
        bachelier_value, bachelier_vega, black_delta, black_implied_vol, black_value, black_vega,
        shifted_black_value,
    };
    pub use crate::black_scholes::{
        bs_delta, bs_gamma, bs_greeks_batch, bs_intrinsic, bs_psi, bs_rho, bs_theta, bs_value,
        bs_value_batch, bs_value_delivery, bs_vega, BsParams, Greeks,
    };
    pub use crate::digital::{asset_or_nothing, cash_or_nothing};
    pub use crate::error::{OptionsError, OptionsResult};
    pub use crate::fx::{DeltaMethod, FxInputs};
    pub use crate::implied_vol::{bs_implied_vol, bs_implied_vol_with_config};
    pub use crate::sabr::{sabr_vol, SabrParams};
}

pub use error::{OptionsError, OptionsResult};
