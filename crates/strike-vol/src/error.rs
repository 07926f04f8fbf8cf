//! Error types for volatility surfaces.

use strike_core::{CoreError, ErrorKind};
use strike_curves::CurveError;
use strike_math::MathError;
use strike_options::OptionsError;
use thiserror::Error;

use crate::function::VolFunctionType;

/// A specialized Result type for volatility surfaces.
pub type VolResult<T> = Result<T, VolError>;

/// Error types for volatility surfaces.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VolError {
    /// Invalid surface input.
    #[error("Invalid vol surface input: {reason}")]
    InvalidInput {
        /// Description of the problem.
        reason: String,
    },

    /// Wrong number of parameters for a vol function.
    #[error("{function} takes {expected} parameters, got {got}")]
    ParameterCount {
        /// The function.
        function: VolFunctionType,
        /// Parameters it takes.
        expected: usize,
        /// Parameters supplied.
        got: usize,
    },

    /// A tenor could not be fitted.
    #[error("Calibration failed for {tenor}: objective {objective:.3e} ({reason})")]
    CalibrationFailure {
        /// Tenor label.
        tenor: String,
        /// Objective at the terminal iterate.
        objective: f64,
        /// What went wrong.
        reason: String,
    },

    /// A strike search on a fitted smile failed.
    #[error("Strike search for delta {delta} failed at T={time:.4}: {source}")]
    StrikeSearchFailed {
        /// Target delta.
        delta: f64,
        /// Expiry in years.
        time: f64,
        /// Underlying solver error.
        source: MathError,
    },

    /// Date error.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Curve error.
    #[error(transparent)]
    Curve(#[from] CurveError),

    /// Option kernel error.
    #[error(transparent)]
    Options(#[from] OptionsError),

    /// Numerical error.
    #[error(transparent)]
    Math(#[from] MathError),
}

impl VolError {
    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Creates a calibration failure.
    #[must_use]
    pub fn calibration_failure(tenor: impl Into<String>, objective: f64, reason: impl Into<String>) -> Self {
        Self::CalibrationFailure {
            tenor: tenor.into(),
            objective,
            reason: reason.into(),
        }
    }

    /// Returns the taxonomy class of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            VolError::InvalidInput { .. } | VolError::ParameterCount { .. } => {
                ErrorKind::InputValidation
            }
            VolError::CalibrationFailure { .. } => ErrorKind::CalibrationFailure,
            VolError::StrikeSearchFailed { .. } => ErrorKind::SolverFailure,
            VolError::Core(e) => e.kind(),
            VolError::Curve(e) => e.kind(),
            VolError::Options(e) => e.kind(),
            VolError::Math(e) => e.kind(),
        }
    }

    /// Returns the component that raised the error.
    #[must_use]
    pub fn component(&self) -> &'static str {
        match self {
            VolError::Core(e) => e.component(),
            VolError::Curve(e) => e.component(),
            VolError::Options(e) => e.component(),
            VolError::Math(e) => e.component(),
            _ => "vol_surface",
        }
    }
}
