//! # Strike Curves
//!
//! Discount curves and curve bootstrapping for the Strike pricing library.
//!
//! This crate provides:
//!
//! - **Curve Trait**: the [`Curve`] trait; every curve maps time to a
//!   discount factor and derives zero, forward and swap rates from it
//! - **Curve Types**: flat, zero, piecewise flat, polynomial,
//!   Nelson-Siegel, Svensson, FX-implied, knot-interpolated and shifted
//!   curves, plus an inflation index curve
//! - **Interpolation**: discount factor interpolation between knots in
//!   log discount, zero rate or forward space
//! - **Bootstrap**: IBOR (deposits, FRAs, swaps) and OIS curve
//!   construction with repricing checks
//!
//! ## Quick Start
//!
//! ```rust
//! use strike_curves::prelude::*;
//! use strike_core::types::Compounding;
//! use strike_core::Date;
//!
//! let curve = DiscountCurve::builder(Date::from_ymd(2025, 1, 1).unwrap())
//!     .add_knot(0.25, 0.99)
//!     .add_knot(0.5, 0.98)
//!     .add_knot(1.0, 0.96)
//!     .add_knot(2.0, 0.92)
//!     .with_interpolation(InterpolationType::PchipLogDiscount)
//!     .build()
//!     .unwrap();
//!
//! let df = curve.discount_factor(1.5);
//! let zero = curve.zero_rate(1.5, Compounding::Continuous);
//! let fwd = curve.forward_rate(1.0, 2.0);
//! assert!(df < 0.96 && zero > 0.0 && fwd > 0.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::similar_names)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::float_cmp)]

pub mod bootstrap;
pub mod curves;
pub mod error;
pub mod interpolation;
pub mod traits;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bootstrap::{
        BootstrapConfig, BootstrapResult, CalibrationInstrument, Deposit, Fra, IborBootstrapper,
        OisBootstrapper, RepricingReport, Swap,
    };
    pub use crate::curves::{
        DiscountCurve, DiscountCurveBuilder, FlatCurve, FxImpliedCurve, InflationIndexCurve,
        NelsonSiegel, NelsonSiegelSvensson, PiecewiseFlatCurve, PolynomialCurve, ShiftedCurve,
        ZeroCurve,
    };
    pub use crate::error::{CurveError, CurveResult};
    pub use crate::interpolation::{CurveInterpolator, InterpolationType};
    pub use crate::traits::{swap_rate_on, BumpableCurve, Curve};
}

pub use error::{CurveError, CurveResult};
pub use traits::{BumpableCurve, Curve};
