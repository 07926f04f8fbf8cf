//! One-dimensional root finders.
//!
//! - [`newton`]: Newton-Raphson with an analytical derivative
//! - [`newton_secant`]: Newton iteration with a two-point secant slope
//! - [`bisection`]: bracketing method, requires a sign change
//! - [`newton_with_fallback`]: Newton, then bisection on a widened bracket
//!
//! All solvers take a closure, so extra arguments are captured rather than
//! passed as a tuple, and report failures as [`MathError`](crate::MathError).
//!
//! # Example
//!
//! ```rust
//! use strike_math::solvers::{newton_with_fallback, SolverConfig};
//!
//! // Bond: 5% coupon, 5 years, price 95
//! let price_fn = |y: f64| {
//!     let mut pv = 0.0;
//!     for t in 1..=5 {
//!         pv += 5.0 / (1.0 + y).powi(t);
//!     }
//!     pv + 100.0 / (1.0 + y).powi(5) - 95.0
//! };
//! let d_price_fn = |y: f64| {
//!     let mut dpv = 0.0;
//!     for t in 1..=5 {
//!         dpv -= f64::from(t) * 5.0 / (1.0 + y).powi(t + 1);
//!     }
//!     dpv - 500.0 / (1.0 + y).powi(6)
//! };
//!
//! let result =
//!     newton_with_fallback(price_fn, d_price_fn, 0.05, Some((0.0, 0.2)), &SolverConfig::default())
//!         .unwrap();
//! assert!(result.root > 0.05);
//! ```

mod bisection;
mod fallback;
mod newton;
mod secant;

pub use bisection::bisection;
pub use fallback::{find_bracket, newton_with_fallback, secant_with_fallback};
pub use newton::{newton, newton_numerical};
pub use secant::newton_secant;

/// Default tolerance for root-finding algorithms.
pub const DEFAULT_TOLERANCE: f64 = 1e-10;

/// Default maximum iterations for root-finding algorithms.
pub const DEFAULT_MAX_ITERATIONS: u32 = 50;

/// Smallest derivative magnitude a Newton step will divide by.
pub(crate) const MIN_DERIVATIVE: f64 = 1e-15;

/// Configuration for root-finding algorithms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// Tolerance for convergence.
    pub tolerance: f64,
    /// Maximum number of iterations.
    pub max_iterations: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl SolverConfig {
    /// Creates a new solver configuration.
    #[must_use]
    pub fn new(tolerance: f64, max_iterations: u32) -> Self {
        Self {
            tolerance,
            max_iterations,
        }
    }

    /// Sets the tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the maximum iterations.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

/// Result of a root-finding operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverResult {
    /// The root found.
    pub root: f64,
    /// Number of iterations used.
    pub iterations: u32,
    /// Function value at the root.
    pub residual: f64,
}
