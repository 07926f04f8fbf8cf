//! Curve implementations.

mod flat;
mod fx_implied;
mod inflation;
mod interpolated;
mod parametric;
mod polynomial;
mod shifted;
mod zero;

pub use flat::FlatCurve;
pub use fx_implied::FxImpliedCurve;
pub use inflation::InflationIndexCurve;
pub use interpolated::{DiscountCurve, DiscountCurveBuilder};
pub use parametric::{NelsonSiegel, NelsonSiegelSvensson};
pub use polynomial::PolynomialCurve;
pub use shifted::ShiftedCurve;
pub use zero::{PiecewiseFlatCurve, ZeroCurve};
