//! Error types for curve operations.

use strike_core::{CoreError, ErrorKind};
use strike_math::MathError;
use thiserror::Error;

/// A specialized Result type for curve operations.
pub type CurveResult<T> = Result<T, CurveError>;

/// Error types for curve operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CurveError {
    /// Invalid curve input.
    #[error("Invalid curve input: {reason}")]
    InvalidInput {
        /// Description of the problem.
        reason: String,
    },

    /// Not enough data points.
    #[error("Insufficient points: need at least {required}, got {got}")]
    InsufficientPoints {
        /// Minimum required points.
        required: usize,
        /// Actual number of points provided.
        got: usize,
    },

    /// Knot times are not strictly increasing.
    #[error("Non-monotonic times at index {index}: {prev:.6} >= {current:.6}")]
    NonMonotonicTimes {
        /// Index where the violation occurred.
        index: usize,
        /// Previous time.
        prev: f64,
        /// Current time.
        current: f64,
    },

    /// A query fell outside the data the curve holds.
    #[error("{what} {value} is outside [{min}, {max}]")]
    OutOfRange {
        /// What was queried.
        what: &'static str,
        /// The queried value.
        value: String,
        /// Lower bound.
        min: String,
        /// Upper bound.
        max: String,
    },

    /// Calibration instruments are inconsistent with each other or with the
    /// valuation date.
    #[error("Invalid instrument {instrument}: {reason}")]
    InvalidInstrument {
        /// Instrument description.
        instrument: String,
        /// What is wrong.
        reason: String,
    },

    /// A bootstrap step could not solve for its knot.
    #[error("Bootstrap failed for {instrument}: {source}")]
    BootstrapFailed {
        /// Instrument description.
        instrument: String,
        /// Underlying solver error.
        source: MathError,
    },

    /// An instrument does not reprice within tolerance after the build.
    #[error("Repricing failed for {instrument}: error {error:.3e} exceeds tolerance {tolerance:.1e}")]
    RepricingFailed {
        /// Instrument description.
        instrument: String,
        /// Absolute repricing error.
        error: f64,
        /// Allowed tolerance.
        tolerance: f64,
    },

    /// A parametric fit did not reach its tolerance.
    #[error("Curve fit failed (objective {objective:.3e}): {reason}")]
    FitFailed {
        /// Final objective value.
        objective: f64,
        /// Description of failure.
        reason: String,
    },

    /// Date or day count error.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Numerical error.
    #[error(transparent)]
    Math(#[from] MathError),
}

impl CurveError {
    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Creates an invalid instrument error.
    #[must_use]
    pub fn invalid_instrument(instrument: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInstrument {
            instrument: instrument.into(),
            reason: reason.into(),
        }
    }

    /// Creates an out of range error.
    #[must_use]
    pub fn out_of_range(
        what: &'static str,
        value: impl ToString,
        min: impl ToString,
        max: impl ToString,
    ) -> Self {
        Self::OutOfRange {
            what,
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        }
    }

    /// Returns the taxonomy class of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            CurveError::InvalidInput { .. }
            | CurveError::InsufficientPoints { .. }
            | CurveError::NonMonotonicTimes { .. }
            | CurveError::OutOfRange { .. } => ErrorKind::InputValidation,
            CurveError::InvalidInstrument { .. } => ErrorKind::Domain,
            CurveError::BootstrapFailed { .. } => ErrorKind::SolverFailure,
            CurveError::RepricingFailed { .. } | CurveError::FitFailed { .. } => {
                ErrorKind::CalibrationFailure
            }
            CurveError::Core(e) => e.kind(),
            CurveError::Math(e) => e.kind(),
        }
    }

    /// Returns the component that raised the error.
    #[must_use]
    pub fn component(&self) -> &'static str {
        match self {
            CurveError::InvalidInstrument { .. }
            | CurveError::BootstrapFailed { .. }
            | CurveError::RepricingFailed { .. } => "bootstrap",
            CurveError::Core(_) => "dates",
            CurveError::Math(e) => e.component(),
            _ => "curves",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        let err = CurveError::invalid_instrument("FRA 3Mx6M", "starts before last deposit end");
        assert_eq!(err.kind(), ErrorKind::Domain);
        assert_eq!(err.component(), "bootstrap");

        let err: CurveError = MathError::convergence_failed("Newton", 50, 1.0).into();
        assert_eq!(err.kind(), ErrorKind::SolverFailure);
    }
}
