//! # Strike Vol
//!
//! Volatility smiles and surfaces for the Strike pricing library.
//!
//! This crate provides:
//!
//! - **Smile functions**: Clark (3 and 5 parameters), SABR with free or
//!   fixed beta, Bloomberg-style delta quadratic, SVI, SSVI and
//!   vanna-volga, behind one [`VolFunction`] sum type
//! - **FX surfaces**: per-tenor calibration to ATM, market strangle and
//!   risk reversal quotes at 25 delta with optional 10-delta terms, under
//!   any ATM and delta convention
//! - **Equity surfaces**: least-squares fits of the same smiles to
//!   strike-vol quotes
//! - **Queries**: vol interpolated in total variance, strike from delta
//!   and the Breeden–Litzenberger implied density
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use strike_core::daycounts::DayCountType;
//! use strike_core::types::Compounding;
//! use strike_core::Date;
//! use strike_curves::curves::FlatCurve;
//! use strike_vol::prelude::*;
//!
//! let anchor = Date::from_ymd(2024, 1, 2).unwrap();
//! let domestic = FlatCurve::new(anchor, 0.0294, Compounding::Continuous, DayCountType::Act365F).unwrap();
//! let foreign = FlatCurve::new(anchor, 0.0171, Compounding::Continuous, DayCountType::Act365F).unwrap();
//! let surface = FxVolSurface::builder(anchor, 1.3465)
//!     .with_function(VolFunctionType::Clark)
//!     .add_quote(FxVolQuote::new("1Y", 0.21, 0.0075, -0.0025).unwrap())
//!     .build(&domestic, &foreign)
//!     .unwrap();
//! let k = surface.strike_from_delta(0.25, 1.0).unwrap();
//! println!("25D call strike {k:.4}, vol {:.4}", surface.vol(k, 1.0));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::similar_names)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::float_cmp)]
#![allow(clippy::doc_markdown)]

pub mod calibration;
pub mod equity_surface;
pub mod error;
pub mod flat;
pub mod function;
pub mod fx_surface;
pub mod quotes;
pub mod traits;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::calibration::{CalibrationConfig, WingStrikes};
    pub use crate::equity_surface::{EquityVolQuote, EquityVolSlice, EquityVolSurface, EquityVolSurfaceBuilder};
    pub use crate::error::{VolError, VolResult};
    pub use crate::flat::FlatVolSurface;
    pub use crate::function::{VolFunction, VolFunctionType, MIN_VOL};
    pub use crate::fx_surface::{CalibrationReport, FxVolSurface, FxVolSurfaceBuilder, FxVolTenor};
    pub use crate::quotes::{AtmMethod, FxVolQuote};
    pub use crate::traits::{year_fraction, VolSurface};
    pub use strike_options::fx::DeltaMethod;
}

pub use error::{VolError, VolResult};
pub use function::{VolFunction, VolFunctionType};
pub use traits::VolSurface;
