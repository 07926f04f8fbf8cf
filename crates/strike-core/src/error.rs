//! Error types for the Strike library.
//!
//! Every crate in the workspace carries its own error enum. All of them
//! classify into the same [`ErrorKind`] taxonomy so callers can react to
//! the class of failure without matching on crate-specific variants.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A specialized Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Classification shared by every error type in the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Malformed input: bad dates, non-positive prices, mismatched lengths,
    /// invalid correlation matrices.
    InputValidation,
    /// Inputs are well formed but outside the domain of the operation:
    /// expiry before valuation, negative time value, instrument ordering.
    Domain,
    /// A calibration objective did not converge, including its fallback.
    CalibrationFailure,
    /// A root search diverged and no bracket with a sign change was found.
    SolverFailure,
    /// An instrument was asked to price under a model its kernel does not
    /// support.
    ModelMismatch,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InputValidation => "input validation",
            ErrorKind::Domain => "domain",
            ErrorKind::CalibrationFailure => "calibration failure",
            ErrorKind::SolverFailure => "solver failure",
            ErrorKind::ModelMismatch => "model mismatch",
        };
        write!(f, "{name}")
    }
}

/// The error type for dates, calendars, day counts and schedules.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Error in date construction or arithmetic.
    #[error("Invalid date: {message}")]
    InvalidDate {
        /// Description of the date error.
        message: String,
    },

    /// A tenor string could not be parsed.
    #[error("Invalid tenor '{tenor}': {reason}")]
    InvalidTenor {
        /// The offending tenor string.
        tenor: String,
        /// Reason for rejection.
        reason: String,
    },

    /// Day count calculation error.
    #[error("Day count error: {reason}")]
    DayCountError {
        /// Description of the error.
        reason: String,
    },

    /// Schedule generation error.
    #[error("Schedule error: {reason}")]
    ScheduleError {
        /// Description of the error.
        reason: String,
    },

    /// Generic invalid input.
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// Description of the invalid input.
        reason: String,
    },
}

impl CoreError {
    /// Creates an invalid date error.
    #[must_use]
    pub fn invalid_date(message: impl Into<String>) -> Self {
        Self::InvalidDate {
            message: message.into(),
        }
    }

    /// Creates an invalid tenor error.
    #[must_use]
    pub fn invalid_tenor(tenor: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTenor {
            tenor: tenor.into(),
            reason: reason.into(),
        }
    }

    /// Creates a day count error.
    #[must_use]
    pub fn day_count(reason: impl Into<String>) -> Self {
        Self::DayCountError {
            reason: reason.into(),
        }
    }

    /// Creates a schedule error.
    #[must_use]
    pub fn schedule(reason: impl Into<String>) -> Self {
        Self::ScheduleError {
            reason: reason.into(),
        }
    }

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
            CoreError::ScheduleError { .. } => ErrorKind::Domain,
            _ => ErrorKind::InputValidation,
        }
    }

    /// Returns the component that raised the error.
    #[must_use]
    pub fn component(&self) -> &'static str {
        match self {
            CoreError::InvalidDate { .. } | CoreError::InvalidTenor { .. } => "date",
            CoreError::DayCountError { .. } => "daycount",
            CoreError::ScheduleError { .. } => "schedule",
            CoreError::InvalidInput { .. } => "core",
        }
    }
}
