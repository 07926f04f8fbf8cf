//! Error types for numerical operations.

use strike_core::ErrorKind;
use thiserror::Error;

/// A specialized Result type for numerical operations.
pub type MathResult<T> = Result<T, MathError>;

/// Errors that can occur during numerical operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    /// Root-finding algorithm failed to converge.
    #[error("{solver} did not converge after {iterations} iterations (residual: {residual:.2e})")]
    ConvergenceFailed {
        /// Name of the algorithm.
        solver: &'static str,
        /// Number of iterations attempted.
        iterations: u32,
        /// Final residual value.
        residual: f64,
    },

    /// Invalid bracket for root-finding.
    #[error("Invalid bracket: f({a}) = {fa:.2e} and f({b}) = {fb:.2e} have same sign")]
    InvalidBracket {
        /// Lower bound of bracket.
        a: f64,
        /// Upper bound of bracket.
        b: f64,
        /// Function value at a.
        fa: f64,
        /// Function value at b.
        fb: f64,
    },

    /// Division by zero or near-zero value.
    #[error("Division by zero or near-zero value: {value:.2e}")]
    DivisionByZero {
        /// The near-zero value.
        value: f64,
    },

    /// An iterate or function value became NaN or infinite.
    #[error("{solver} produced a non-finite value")]
    NonFinite {
        /// Name of the algorithm.
        solver: &'static str,
    },

    /// Insufficient data points for operation.
    #[error("Insufficient data: need at least {required}, got {actual}")]
    InsufficientData {
        /// Minimum required points.
        required: usize,
        /// Actual number of points.
        actual: usize,
    },

    /// Matrix is not symmetric positive definite.
    #[error("Matrix is not positive definite")]
    NotPositiveDefinite,

    /// A correlation matrix failed validation.
    #[error("Invalid correlation matrix: {reason}")]
    InvalidCorrelation {
        /// What was wrong.
        reason: String,
    },

    /// A multivariate minimisation failed.
    #[error("{method} failed: {reason}")]
    OptimizationFailed {
        /// Name of the method.
        method: &'static str,
        /// Description of the failure.
        reason: String,
    },

    /// Invalid input parameter.
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// Description of the invalid input.
        reason: String,
    },
}

impl MathError {
    /// Creates a convergence failed error.
    #[must_use]
    pub fn convergence_failed(solver: &'static str, iterations: u32, residual: f64) -> Self {
        Self::ConvergenceFailed {
            solver,
            iterations,
            residual,
        }
    }

    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Creates an insufficient data error.
    #[must_use]
    pub fn insufficient_data(required: usize, actual: usize) -> Self {
        Self::InsufficientData { required, actual }
    }

    /// Creates an invalid correlation error.
    #[must_use]
    pub fn invalid_correlation(reason: impl Into<String>) -> Self {
        Self::InvalidCorrelation {
            reason: reason.into(),
        }
    }

    /// Creates an optimisation failure.
    #[must_use]
    pub fn optimization_failed(method: &'static str, reason: impl Into<String>) -> Self {
        Self::OptimizationFailed {
            method,
            reason: reason.into(),
        }
    }

    /// Returns the taxonomy class of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            MathError::ConvergenceFailed { .. }
            | MathError::InvalidBracket { .. }
            | MathError::DivisionByZero { .. }
            | MathError::NonFinite { .. }
            | MathError::OptimizationFailed { .. } => ErrorKind::SolverFailure,
            MathError::InsufficientData { .. }
            | MathError::NotPositiveDefinite
            | MathError::InvalidCorrelation { .. }
            | MathError::InvalidInput { .. } => ErrorKind::InputValidation,
        }
    }

    /// Returns the component that raised the error.
    #[must_use]
    pub fn component(&self) -> &'static str {
        match self {
            MathError::ConvergenceFailed { .. }
            | MathError::InvalidBracket { .. }
            | MathError::DivisionByZero { .. }
            | MathError::NonFinite { .. } => "solver",
            MathError::OptimizationFailed { .. } => "optimization",
            MathError::NotPositiveDefinite | MathError::InvalidCorrelation { .. } => "linalg",
            MathError::InsufficientData { .. } | MathError::InvalidInput { .. } => "math",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MathError::convergence_failed("Newton", 100, 1e-6);
        assert!(err.to_string().contains("100 iterations"));
        assert_eq!(err.kind(), ErrorKind::SolverFailure);
    }

    #[test]
    fn test_correlation_is_input_validation() {
        let err = MathError::invalid_correlation("diagonal entry 1 is 0.9");
        assert_eq!(err.kind(), ErrorKind::InputValidation);
        assert_eq!(err.component(), "linalg");
    }
}
