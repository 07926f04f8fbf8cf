//! Error types for option kernels.

use strike_core::ErrorKind;
use strike_math::MathError;
use thiserror::Error;

/// A specialized Result type for option kernels.
pub type OptionsResult<T> = Result<T, OptionsError>;

/// Error types for option kernels.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OptionsError {
    /// Malformed input: non-positive spot, strike or vol, non-finite values.
    #[error("Invalid option input: {reason}")]
    InvalidInput {
        /// Description of the problem.
        reason: String,
    },

    /// A premium below intrinsic value cannot be inverted to a volatility.
    #[error("Negative time value {time_value:.3e} for premium {price}")]
    NegativeTimeValue {
        /// The premium supplied.
        price: f64,
        /// Premium minus discounted intrinsic value.
        time_value: f64,
    },

    /// A premium above the no-arbitrage upper bound.
    #[error("Premium {price} exceeds the upper bound {bound}")]
    AboveUpperBound {
        /// The premium supplied.
        price: f64,
        /// The bound it breaches.
        bound: f64,
    },

    /// The option has already expired.
    #[error("Option expired: time to expiry {time_to_expiry} is not positive")]
    Expired {
        /// Time to expiry in years.
        time_to_expiry: f64,
    },

    /// Root search for a volatility failed.
    #[error("Implied volatility search failed: {source}")]
    ImpliedVolFailed {
        /// Underlying solver error.
        source: MathError,
    },

    /// Root search for a strike or critical price failed.
    #[error("{what} search failed: {source}")]
    SolveFailed {
        /// What was being solved for.
        what: &'static str,
        /// Underlying solver error.
        source: MathError,
    },

    /// Numerical error.
    #[error(transparent)]
    Math(#[from] MathError),
}

impl OptionsError {
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
            OptionsError::InvalidInput { .. } => ErrorKind::InputValidation,
            OptionsError::NegativeTimeValue { .. }
            | OptionsError::AboveUpperBound { .. }
            | OptionsError::Expired { .. } => ErrorKind::Domain,
            OptionsError::ImpliedVolFailed { .. } | OptionsError::SolveFailed { .. } => {
                ErrorKind::SolverFailure
            }
            OptionsError::Math(e) => e.kind(),
        }
    }

    /// Returns the component that raised the error.
    #[must_use]
    pub fn component(&self) -> &'static str {
        match self {
            OptionsError::NegativeTimeValue { .. }
            | OptionsError::AboveUpperBound { .. }
            | OptionsError::ImpliedVolFailed { .. } => "implied_vol",
            OptionsError::Math(e) => e.component(),
            _ => "black_scholes",
        }
    }
}

/// Rejects non-finite or non-positive values.
pub(crate) fn require_positive(name: &str, value: f64) -> OptionsResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(OptionsError::invalid_input(format!(
            "{name} must be positive and finite, got {value}"
        )));
    }
    Ok(())
}

/// Rejects non-finite values.
pub(crate) fn require_finite(name: &str, value: f64) -> OptionsResult<()> {
    if !value.is_finite() {
        return Err(OptionsError::invalid_input(format!(
            "{name} must be finite, got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        let err = OptionsError::NegativeTimeValue {
            price: 1.0,
            time_value: -0.5,
        };
        assert_eq!(err.kind(), ErrorKind::Domain);
        assert_eq!(err.component(), "implied_vol");

        let err = OptionsError::ImpliedVolFailed {
            source: MathError::convergence_failed("Newton", 50, 1.0),
        };
        assert_eq!(err.kind(), ErrorKind::SolverFailure);
    }

    #[test]
    fn test_require_positive() {
        assert!(require_positive("spot", 100.0).is_ok());
        assert!(require_positive("spot", 0.0).is_err());
        assert!(require_positive("spot", f64::NAN).is_err());
        assert!(require_finite("rate", -0.01).is_ok());
        assert!(require_finite("rate", f64::INFINITY).is_err());
    }
}
