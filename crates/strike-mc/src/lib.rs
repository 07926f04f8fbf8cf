//! # Strike MC
//!
//! Reproducible Monte Carlo path generation for the Strike pricing library.
//!
//! This crate provides:
//!
//! - **GBM**: single-asset and Cholesky-correlated multi-asset geometric
//!   Brownian motion on uniform or explicit time grids
//! - **Variance reduction**: antithetic pairing, with the mirrored paths
//!   stored after the drawn ones
//! - **Reproducibility**: one counter-based ChaCha stream per path, so a
//!   seed gives the same tensor on any number of threads
//! - **Streaming payoffs**: path-by-path evaluation with early exit for
//!   knock-out style products
//! - **Estimates**: sample means with standard errors
//!
//! ## Quick Start
//!
//! ```rust
//! use strike_mc::prelude::*;
//!
//! let gbm = Gbm::new(100.0, 0.05, 0.2).unwrap();
//! let paths = gbm.simulate(1.0, &McConfig::new(1_000, 12, 1234)).unwrap();
//! let payoffs: Vec<f64> = paths.column(12).iter().map(|s| (s - 100.0).max(0.0)).collect();
//! let call = McEstimate::from_antithetic(&payoffs).scaled((-0.05_f64).exp());
//! assert!(call.contains(10.45, 5.0));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::needless_range_loop)]
#![allow(clippy::float_cmp)]

pub mod config;
pub mod error;
pub mod estimate;
pub mod gbm;
pub mod payoff;
pub mod rng;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::McConfig;
    pub use crate::error::{McError, McResult};
    pub use crate::estimate::McEstimate;
    pub use crate::gbm::{CorrelatedGbm, Gbm};
    pub use crate::payoff::PathPayoff;
    pub use crate::rng::path_rng;
}

pub use config::McConfig;
pub use error::{McError, McResult};
pub use estimate::McEstimate;
pub use gbm::{CorrelatedGbm, Gbm};
pub use payoff::PathPayoff;
