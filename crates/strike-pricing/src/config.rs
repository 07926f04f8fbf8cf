//! Pricing configuration loaded from TOML.
//!
//! ```toml
//! [solver]
//! tolerance = 1e-10
//! max_iterations = 50
//!
//! [monte_carlo]
//! num_paths = 100000
//! seed = 1234
//!
//! [risk]
//! spot_bump = 0.01
//! ```
//!
//! Every section and field has a default, so an empty document is a valid
//! configuration.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use strike_math::solvers::SolverConfig;
use strike_mc::McConfig;
use strike_vol::calibration::CalibrationConfig;

use crate::error::{PricingError, PricingResult};

// =============================================================================
// VALIDATION
// =============================================================================

/// A single validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Field that failed validation.
    pub field: String,
    /// Validation error message.
    pub message: String,
    /// Validation rule that was violated.
    pub rule: Option<String>,
}

impl ValidationError {
    /// Creates a new validation error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: None,
        }
    }

    /// Creates a validation error with a rule name.
    pub fn with_rule(field: impl Into<String>, message: impl Into<String>, rule: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: Some(rule.into()),
        }
    }

    fn prefixed(mut self, section: &str) -> Self {
        self.field = format!("{section}.{}", self.field);
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref rule) = self.rule {
            write!(f, "{}: {} (rule: {})", self.field, self.message, rule)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

/// Trait for validatable configurations.
pub trait Validate {
    /// Returns every validation error, or an empty vector if valid.
    fn validate(&self) -> Vec<ValidationError>;

    /// Returns true if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Validates and returns all errors at once if invalid.
    fn validate_or_error(&self) -> PricingResult<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(PricingError::Validation(errors))
        }
    }
}

fn positive(field: &str, value: f64, errors: &mut Vec<ValidationError>) {
    if !(value.is_finite() && value > 0.0) {
        errors.push(ValidationError::with_rule(
            field,
            format!("must be positive, got {value}"),
            "positive",
        ));
    }
}

// =============================================================================
// SECTIONS
// =============================================================================

/// `[solver]`: root searches for yields, spreads and implied quantities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    /// Convergence tolerance.
    pub tolerance: f64,
    /// Iteration cap.
    pub max_iterations: u32,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: 50,
        }
    }
}

impl SolverSettings {
    /// The settings as a solver configuration.
    pub fn solver_config(&self) -> SolverConfig {
        SolverConfig::new(self.tolerance, self.max_iterations)
    }
}

impl Validate for SolverSettings {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        positive("tolerance", self.tolerance, &mut errors);
        if self.max_iterations == 0 {
            errors.push(ValidationError::new("max_iterations", "must be at least 1"));
        }
        errors
    }
}

/// `[risk]`: bump sizes for finite-difference Greeks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskSettings {
    /// Relative spot bump, e.g. 0.01 for 1%.
    pub spot_bump: f64,
    /// Absolute vol bump.
    pub vol_bump: f64,
    /// Parallel rate bump in rate units.
    pub rate_bump: f64,
    /// Calendar days the valuation date rolls for theta.
    pub theta_days: u32,
}

impl Default for RiskSettings {
    fn default() -> Self {
        Self {
            spot_bump: 0.01,
            vol_bump: 0.01,
            rate_bump: 1e-4,
            theta_days: 1,
        }
    }
}

impl Validate for RiskSettings {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        positive("spot_bump", self.spot_bump, &mut errors);
        if self.spot_bump >= 0.5 {
            errors.push(ValidationError::with_rule(
                "spot_bump",
                format!("relative bump {} is too large", self.spot_bump),
                "below 0.5",
            ));
        }
        positive("vol_bump", self.vol_bump, &mut errors);
        positive("rate_bump", self.rate_bump, &mut errors);
        if self.theta_days == 0 {
            errors.push(ValidationError::new("theta_days", "must be at least 1"));
        }
        errors
    }
}

/// `[tree]`: lattice defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeSettings {
    /// Time steps.
    pub steps: usize,
}

impl Default for TreeSettings {
    fn default() -> Self {
        Self { steps: 200 }
    }
}

impl Validate for TreeSettings {
    fn validate(&self) -> Vec<ValidationError> {
        if self.steps < 2 {
            vec![ValidationError::new("steps", format!("must be at least 2, got {}", self.steps))]
        } else {
            Vec::new()
        }
    }
}

impl Validate for McConfig {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if self.num_paths == 0 {
            errors.push(ValidationError::new("num_paths", "must be at least 1"));
        }
        if self.num_steps == 0 {
            errors.push(ValidationError::new("num_steps", "must be at least 1"));
        }
        errors
    }
}

impl Validate for CalibrationConfig {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if self.max_iterations == 0 {
            errors.push(ValidationError::new("max_iterations", "must be at least 1"));
        }
        positive("tolerance", self.tolerance, &mut errors);
        positive("max_objective", self.max_objective, &mut errors);
        positive("max_error", self.max_error, &mut errors);
        if !(0.0..=1.0).contains(&self.weight_10d) {
            errors.push(ValidationError::with_rule(
                "weight_10d",
                format!("must lie in [0, 1], got {}", self.weight_10d),
                "unit interval",
            ));
        }
        errors
    }
}

// =============================================================================
// PRICING CONFIGURATION
// =============================================================================

/// Numerical settings shared by all pricers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Root search settings.
    pub solver: SolverSettings,
    /// Default Monte Carlo run.
    pub monte_carlo: McConfig,
    /// Vol surface calibration.
    pub calibration: CalibrationConfig,
    /// Finite-difference bumps.
    pub risk: RiskSettings,
    /// Lattice defaults.
    pub tree: TreeSettings,
}

impl PricingConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(content: &str) -> PricingResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| PricingError::config(e.to_string()))?;
        config.validate_or_error()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> PricingResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| PricingError::config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Serializes to TOML.
    pub fn to_toml_string(&self) -> PricingResult<String> {
        toml::to_string_pretty(self).map_err(|e| PricingError::config(e.to_string()))
    }
}

impl Validate for PricingConfig {
    fn validate(&self) -> Vec<ValidationError> {
        let sections: [(&str, Vec<ValidationError>); 5] = [
            ("solver", self.solver.validate()),
            ("monte_carlo", Validate::validate(&self.monte_carlo)),
            ("calibration", Validate::validate(&self.calibration)),
            ("risk", self.risk.validate()),
            ("tree", self.tree.validate()),
        ];
        sections
            .into_iter()
            .flat_map(|(section, errors)| errors.into_iter().map(move |e| e.prefixed(section)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        let config = PricingConfig::from_toml_str("").unwrap();
        assert_eq!(config, PricingConfig::default());
        assert!(config.is_valid());
    }

    #[test]
    fn test_partial_sections() {
        let config = PricingConfig::from_toml_str(
            r#"
            [monte_carlo]
            num_paths = 100000
            seed = 1234

            [risk]
            vol_bump = 0.001
            "#,
        )
        .unwrap();
        assert_eq!(config.monte_carlo.num_paths, 100_000);
        assert_eq!(config.monte_carlo.seed, 1234);
        assert_eq!(config.monte_carlo.num_steps, 252);
        assert!(config.monte_carlo.antithetic);
        assert_eq!(config.risk.vol_bump, 0.001);
        assert_eq!(config.risk.spot_bump, 0.01);
        assert_eq!(config.tree.steps, 200);
    }

    #[test]
    fn test_reports_all_errors_at_once() {
        let err = PricingConfig::from_toml_str(
            r#"
            [solver]
            tolerance = -1.0
            max_iterations = 0

            [tree]
            steps = 1

            [calibration]
            weight_10d = 2.0
            max_error = 0.0
            "#,
        )
        .unwrap_err();
        match err {
            PricingError::Validation(errors) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(
                    fields,
                    [
                        "solver.tolerance",
                        "solver.max_iterations",
                        "calibration.max_error",
                        "calibration.weight_10d",
                        "tree.steps"
                    ]
                );
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_error_is_config_error() {
        let err = PricingConfig::from_toml_str("[solver\ntolerance = 1").unwrap_err();
        assert_eq!(err.kind(), strike_core::ErrorKind::InputValidation);
        assert_eq!(err.component(), "config");
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = PricingConfig::default();
        config.tree.steps = 500;
        config.monte_carlo.antithetic = false;
        let text = config.to_toml_string().unwrap();
        assert_eq!(PricingConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_solver_config() {
        let solver = SolverSettings::default().solver_config();
        assert_eq!(solver.max_iterations, 50);
        assert_eq!(solver.tolerance, 1e-10);
    }
}
