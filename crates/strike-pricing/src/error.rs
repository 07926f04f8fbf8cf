//! Error types for the pricing layer.

use thiserror::Error;

use strike_core::{CoreError, Date, ErrorKind};
use strike_curves::CurveError;
use strike_math::MathError;
use strike_mc::McError;
use strike_options::OptionsError;
use strike_vol::VolError;

use crate::config::ValidationError;

/// Result type for pricing operations.
pub type PricingResult<T> = Result<T, PricingError>;

/// Errors that can occur while pricing an instrument.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PricingError {
    /// Invalid contract or market input.
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// Description of the problem.
        reason: String,
    },

    /// The market state lacks data the pricer needs.
    #[error("Missing market data: {what}")]
    MissingMarketData {
        /// What is missing.
        what: String,
    },

    /// The instrument expired or settles before the valuation date.
    #[error("{instrument} expiring {expiry} is not alive on {valuation}")]
    Expired {
        /// Instrument description.
        instrument: String,
        /// Expiry or maturity date.
        expiry: Date,
        /// Valuation date.
        valuation: Date,
    },

    /// The instrument cannot be priced under the requested model.
    #[error("{instrument} cannot be priced with {model}")]
    ModelMismatch {
        /// Instrument description.
        instrument: &'static str,
        /// Model name.
        model: String,
    },

    /// A yield, spread or exercise-boundary search did not converge.
    #[error("Solving for {what} failed: {source}")]
    SolveFailed {
        /// Quantity being solved for.
        what: &'static str,
        /// Underlying solver error.
        source: MathError,
    },

    /// Configuration could not be read or parsed.
    #[error("Configuration error: {reason}")]
    Config {
        /// Description of the problem.
        reason: String,
    },

    /// Configuration failed validation.
    #[error("Invalid configuration: {}", format_validation(.0))]
    Validation(Vec<ValidationError>),

    /// Date or schedule error.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Numerical error.
    #[error(transparent)]
    Math(#[from] MathError),

    /// Curve error.
    #[error(transparent)]
    Curve(#[from] CurveError),

    /// Option kernel error.
    #[error(transparent)]
    Options(#[from] OptionsError),

    /// Vol surface error.
    #[error(transparent)]
    Vol(#[from] VolError),

    /// Simulation error.
    #[error(transparent)]
    Mc(#[from] McError),
}

fn format_validation(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl PricingError {
    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Creates a missing market data error.
    #[must_use]
    pub fn missing(what: impl Into<String>) -> Self {
        Self::MissingMarketData { what: what.into() }
    }

    /// Creates a model mismatch error.
    #[must_use]
    pub fn model_mismatch(instrument: &'static str, model: impl ToString) -> Self {
        Self::ModelMismatch {
            instrument,
            model: model.to_string(),
        }
    }

    /// Creates an expiry error.
    #[must_use]
    pub fn expired(instrument: impl Into<String>, expiry: Date, valuation: Date) -> Self {
        Self::Expired {
            instrument: instrument.into(),
            expiry,
            valuation,
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// Returns the taxonomy class of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            PricingError::InvalidInput { .. }
            | PricingError::MissingMarketData { .. }
            | PricingError::Config { .. }
            | PricingError::Validation(_) => ErrorKind::InputValidation,
            PricingError::Expired { .. } => ErrorKind::Domain,
            PricingError::ModelMismatch { .. } => ErrorKind::ModelMismatch,
            PricingError::SolveFailed { .. } => ErrorKind::SolverFailure,
            PricingError::Core(e) => e.kind(),
            PricingError::Math(e) => e.kind(),
            PricingError::Curve(e) => e.kind(),
            PricingError::Options(e) => e.kind(),
            PricingError::Vol(e) => e.kind(),
            PricingError::Mc(e) => e.kind(),
        }
    }

    /// Returns the component that raised the error.
    #[must_use]
    pub fn component(&self) -> &'static str {
        match self {
            PricingError::Config { .. } | PricingError::Validation(_) => "config",
            PricingError::Core(e) => e.component(),
            PricingError::Math(e) => e.component(),
            PricingError::Curve(e) => e.component(),
            PricingError::Options(e) => e.component(),
            PricingError::Vol(e) => e.component(),
            PricingError::Mc(e) => e.component(),
            _ => "pricing",
        }
    }
}

/// Rejects non-finite or non-positive values.
pub(crate) fn require_positive(name: &str, value: f64) -> PricingResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(PricingError::invalid_input(format!(
            "{name} must be positive and finite, got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(
            PricingError::model_mismatch("Bermudan swaption", "Black").kind(),
            ErrorKind::ModelMismatch
        );
        let d = Date::from_ymd(2025, 1, 2).unwrap();
        let err = PricingError::expired("call", d, d.add_days(1));
        assert_eq!(err.kind(), ErrorKind::Domain);
        assert_eq!(err.component(), "pricing");

        let err: PricingError = VolError::calibration_failure("1Y", 1e-3, "stuck").into();
        assert_eq!(err.kind(), ErrorKind::CalibrationFailure);
        assert_eq!(err.component(), "vol_surface");
    }

    #[test]
    fn test_validation_lists_every_field() {
        let err = PricingError::Validation(vec![
            ValidationError::new("solver.tolerance", "must be positive"),
            ValidationError::new("tree.steps", "must be at least 2"),
        ]);
        let message = err.to_string();
        assert!(message.contains("solver.tolerance"));
        assert!(message.contains("tree.steps"));
    }
}
