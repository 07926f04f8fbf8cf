//! # Strike Math
//!
//! Numerical building blocks for the Strike pricing library.
//!
//! This crate provides:
//!
//! - **Solvers**: Newton, Newton-secant, bisection and a Newton-with-bisection
//!   fallback used for implied volatility, bootstrapping and yield solves
//! - **Interpolation**: linear, natural cubic spline and monotone PCHIP
//! - **Distributions**: standard normal density, CDF and inverse
//! - **Linear algebra**: correlation validation and Cholesky factors
//! - **Optimization**: Nelder-Mead and nonlinear conjugate gradient

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::similar_names)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unreadable_literal)]
#![allow(clippy::float_cmp)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::match_same_arms)]

pub mod distributions;
pub mod error;
pub mod interpolation;
pub mod linear_algebra;
pub mod optimization;
pub mod solvers;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::distributions::{norm_cdf, norm_inv_cdf, norm_pdf};
    pub use crate::error::{MathError, MathResult};
    pub use crate::interpolation::{CubicSpline, Interpolator, LinearInterpolator, Pchip};
    pub use crate::linear_algebra::{
        cholesky_lower, correlation_cholesky, one_factor_correlation, validate_correlation,
    };
    pub use crate::optimization::{
        conjugate_gradient, minimize, nelder_mead, OptimizationConfig, OptimizationResult,
    };
    pub use crate::solvers::{
        bisection, find_bracket, newton, newton_numerical, newton_secant, newton_with_fallback,
        secant_with_fallback, SolverConfig, SolverResult,
    };
}

pub use error::{MathError, MathResult};
