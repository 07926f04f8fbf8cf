//! Curve bootstrapping.
//!
//! Knots are solved one instrument at a time, each at the instrument's
//! maturity, so that the instrument prices to zero given the knots already
//! solved:
//!
//! - deposits, and FRAs starting on a knot, in closed form
//!   `df(end) = df(start) / (1 + r α)`
//! - other FRAs by Newton-secant on the FRA value
//! - swaps by Newton with a bisection fallback on the swap value
//!
//! The interpolator is refitted after every knot. For interpolation types
//! where a knot moves the curve beyond its neighbouring segments, the
//! knots are then re-solved in sweeps until they settle. Every instrument
//! is finally repriced on the built curve.

mod engine;
mod ibor;
mod instruments;
mod ois;
mod repricing;

pub use engine::BootstrapConfig;
pub use ibor::IborBootstrapper;
pub use instruments::{CalibrationInstrument, Deposit, Fra, InstrumentKind, Swap};
pub use ois::OisBootstrapper;
pub use repricing::{tolerances, BootstrapResult, RepricingCheck, RepricingReport};
