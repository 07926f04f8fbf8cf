//! # Strike Pricing
//!
//! Instrument valuation for the Strike pricing library.
//!
//! This crate provides:
//!
//! - **Market state**: immutable snapshots of curves, spots, vol surfaces,
//!   correlation and credit spread, with scenario overrides
//! - **Models**: one [`Model`] sum type naming the kernel and its
//!   parameters (closed form, trees, Monte Carlo, Black-76 family, SABR,
//!   Hull–White and fitted short-rate lattices)
//! - **Equity and FX**: vanillas, digitals, barriers, touches, FX options,
//!   baskets, snowballs and convertible bonds
//! - **Rates**: fixed-rate bonds with yields and spreads, FRNs, swaps,
//!   caps and floors, swaptions, bond options and callable bonds
//! - **Risk**: finite-difference Greeks for any [`Pricer`]
//! - **Configuration**: [`PricingConfig`] loaded from TOML
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use strike_core::types::OptionType;
//! use strike_core::Date;
//! use strike_curves::curves::FlatCurve;
//! use strike_pricing::prelude::*;
//!
//! let today = Date::from_ymd(2025, 1, 2).unwrap();
//! let market = MarketState::new(today, Arc::new(FlatCurve::continuous(today, 0.05)))
//!     .add_flat_vol_asset(100.0, 0.01, 0.30)
//!     .unwrap();
//! let call = VanillaOption::european(OptionType::Call, 100.0, Date::from_ymd(2026, 1, 2).unwrap());
//! let value = call.value(&market, &Model::Analytic).unwrap();
//! assert!(value > 10.0 && value < 20.0);
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

pub mod config;
pub mod equity;
pub mod error;
pub mod lattice;
pub mod market;
pub mod model;
pub mod pricer;
pub mod rates;
pub mod risk;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::{PricingConfig, RiskSettings, Validate};
    pub use crate::equity::{
        Barrier, BasketOption, ConvertibleBond, DigitalOption, DigitalPayout, FxOption, KnockInPayoff, Snowball,
        TouchOption, VanillaOption,
    };
    pub use crate::error::{PricingError, PricingResult};
    pub use crate::lattice::{HullWhiteAnalytic, ShortRateKind, ShortRateModel};
    pub use crate::market::{MarketOverride, MarketState};
    pub use crate::model::Model;
    pub use crate::pricer::{price_all, Instrument, Pricer};
    pub use crate::rates::{
        BondOption, CallableBond, CapFloor, CapFloorType, Cashflow, FixedRateBond, FloatingRateNote,
        InterestRateSwap, Settlement, Swaption,
    };
    pub use crate::risk::{fd_greeks, FdGreeks, FiniteDifference};
}

pub use config::PricingConfig;
pub use error::{PricingError, PricingResult};
pub use market::{MarketOverride, MarketState};
pub use model::Model;
pub use pricer::{Instrument, Pricer};
