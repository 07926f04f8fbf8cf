//! Error types for path simulation.

use thiserror::Error;

use strike_core::ErrorKind;
use strike_math::MathError;

/// A specialized Result type for simulation.
pub type McResult<T> = Result<T, McError>;

/// Errors raised while setting up or running a simulation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum McError {
    /// A model or run parameter is out of range.
    #[error("Invalid simulation input: {reason}")]
    InvalidInput {
        /// What was wrong.
        reason: String,
    },

    /// Per-asset inputs disagree in length.
    #[error("{what} has {got} entries, expected {expected}")]
    DimensionMismatch {
        /// Which input.
        what: &'static str,
        /// Number of assets.
        expected: usize,
        /// Number supplied.
        got: usize,
    },

    /// Correlation validation or factorisation failed.
    #[error(transparent)]
    Math(#[from] MathError),
}

impl McError {
    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Returns the taxonomy class of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            McError::InvalidInput { .. } | McError::DimensionMismatch { .. } => {
                ErrorKind::InputValidation
            }
            McError::Math(e) => e.kind(),
        }
    }

    /// Returns the component that raised the error.
    #[must_use]
    pub fn component(&self) -> &'static str {
        match self {
            McError::Math(e) => e.component(),
            _ => "monte_carlo",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(McError::invalid_input("x").kind(), ErrorKind::InputValidation);
        let err: McError = MathError::invalid_correlation("asymmetric").into();
        assert_eq!(err.kind(), ErrorKind::InputValidation);
        assert_eq!(err.component(), "linalg");
        assert!(err.to_string().contains("asymmetric"));
    }
}
