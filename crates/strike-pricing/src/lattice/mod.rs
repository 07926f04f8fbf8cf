//! Short-rate models: fitted lattices and Hull–White closed forms.

pub mod hull_white;
pub mod short_rate;
pub mod tree;

pub use hull_white::HullWhiteAnalytic;
pub use short_rate::{ShortRateKind, ShortRateModel};
pub use tree::{Branch, RateLattice};
