//! Nelson-Siegel and Nelson-Siegel-Svensson curves.
//!
//! Both models parameterise the zero rate
//!
//! ```text
//! z(t) = β₀ + β₁ L(t/τ₁) + β₂ (L(t/τ₁) - e^(-t/τ₁)) [+ β₃ (L(t/τ₂) - e^(-t/τ₂))]
//! ```
//!
//! with `L(θ) = (1 - e^(-θ)) / θ`, and convert it to a discount factor with
//! the curve's compounding convention. `z(0) = β₀ + β₁`.

use serde::{Deserialize, Serialize};
use strike_core::daycounts::DayCountType;
use strike_core::types::Compounding;
use strike_core::Date;
use strike_math::optimization::{nelder_mead, OptimizationConfig};
use tracing::debug;

use crate::error::{CurveError, CurveResult};
use crate::traits::{check_time_day_count, Curve};

/// Objective above which a fit is reported as failed (mean squared error
/// in rate units).
const FIT_TOLERANCE: f64 = 1e-6;

fn loading(theta: f64) -> f64 {
    if theta.abs() < 1e-8 {
        1.0 - 0.5 * theta
    } else {
        (1.0 - (-theta).exp()) / theta
    }
}

fn hump(theta: f64) -> f64 {
    loading(theta) - (-theta).exp()
}

fn check_points(times: &[f64], rates: &[f64], required: usize) -> CurveResult<()> {
    if times.len() != rates.len() {
        return Err(CurveError::invalid_input(format!(
            "times and rates differ in length: {} vs {}",
            times.len(),
            rates.len()
        )));
    }
    if times.len() < required {
        return Err(CurveError::InsufficientPoints {
            required,
            got: times.len(),
        });
    }
    if times.iter().any(|t| !(t.is_finite() && *t > 0.0)) {
        return Err(CurveError::invalid_input("fit times must be positive"));
    }
    Ok(())
}

/// Nelson-Siegel curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NelsonSiegel {
    reference_date: Date,
    beta0: f64,
    beta1: f64,
    beta2: f64,
    tau: f64,
    compounding: Compounding,
    day_count: DayCountType,
}

impl NelsonSiegel {
    /// Creates a Nelson-Siegel curve with continuous compounding on
    /// ACT/365F.
    pub fn new(reference_date: Date, beta0: f64, beta1: f64, beta2: f64, tau: f64) -> CurveResult<Self> {
        if !(tau.is_finite() && tau > 0.0) {
            return Err(CurveError::invalid_input(format!(
                "tau must be positive, got {tau}"
            )));
        }
        Ok(Self {
            reference_date,
            beta0,
            beta1,
            beta2,
            tau,
            compounding: Compounding::Continuous,
            day_count: DayCountType::Act365F,
        })
    }

    /// Sets the compounding of the model rate.
    #[must_use]
    pub fn with_compounding(mut self, compounding: Compounding) -> Self {
        self.compounding = compounding;
        self
    }

    /// Sets the day count measuring curve time.
    pub fn with_day_count(mut self, day_count: DayCountType) -> CurveResult<Self> {
        check_time_day_count(day_count)?;
        self.day_count = day_count;
        Ok(self)
    }

    /// Fits the four parameters to zero rates observed at `times`.
    pub fn fit(reference_date: Date, times: &[f64], rates: &[f64]) -> CurveResult<Self> {
        check_points(times, rates, 4)?;
        let objective = |p: &[f64]| {
            let tau = p[3].exp();
            times
                .iter()
                .zip(rates)
                .map(|(t, z)| {
                    let theta = t / tau;
                    let model = p[0] + p[1] * loading(theta) + p[2] * hump(theta);
                    (model - z).powi(2)
                })
                .sum::<f64>()
                / times.len() as f64
        };

        let last = rates[rates.len() - 1];
        let initial = [last, rates[0] - last, 0.0, 1.5_f64.ln()];
        let result = nelder_mead(objective, &initial, &OptimizationConfig::default())?;
        debug!(objective = result.objective_value, iterations = result.iterations, "Nelson-Siegel fit");
        if result.objective_value > FIT_TOLERANCE {
            return Err(CurveError::FitFailed {
                objective: result.objective_value,
                reason: "Nelson-Siegel residuals too large".to_string(),
            });
        }
        let p = result.parameters;
        Self::new(reference_date, p[0], p[1], p[2], p[3].exp())
    }

    /// Model parameters `[β₀, β₁, β₂, τ]`.
    pub fn parameters(&self) -> [f64; 4] {
        [self.beta0, self.beta1, self.beta2, self.tau]
    }

    /// Model zero rate at time `t`.
    pub fn rate(&self, t: f64) -> f64 {
        let theta = t.max(0.0) / self.tau;
        self.beta0 + self.beta1 * loading(theta) + self.beta2 * hump(theta)
    }
}

impl Curve for NelsonSiegel {
    fn reference_date(&self) -> Date {
        self.reference_date
    }

    fn discount_factor(&self, t: f64) -> f64 {
        if t <= 0.0 {
            return 1.0;
        }
        self.compounding.discount_factor(self.rate(t), t)
    }

    fn day_count(&self) -> DayCountType {
        self.day_count
    }
}

/// Nelson-Siegel-Svensson curve, adding a second hump with its own decay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NelsonSiegelSvensson {
    reference_date: Date,
    betas: [f64; 4],
    tau1: f64,
    tau2: f64,
    compounding: Compounding,
    day_count: DayCountType,
}

impl NelsonSiegelSvensson {
    /// Creates a Svensson curve with continuous compounding on ACT/365F.
    pub fn new(reference_date: Date, betas: [f64; 4], tau1: f64, tau2: f64) -> CurveResult<Self> {
        if !(tau1.is_finite() && tau1 > 0.0 && tau2.is_finite() && tau2 > 0.0) {
            return Err(CurveError::invalid_input(format!(
                "decay factors must be positive, got {tau1} and {tau2}"
            )));
        }
        Ok(Self {
            reference_date,
            betas,
            tau1,
            tau2,
            compounding: Compounding::Continuous,
            day_count: DayCountType::Act365F,
        })
    }

    /// Sets the compounding of the model rate.
    #[must_use]
    pub fn with_compounding(mut self, compounding: Compounding) -> Self {
        self.compounding = compounding;
        self
    }

    /// Fits the six parameters to zero rates observed at `times`.
    pub fn fit(reference_date: Date, times: &[f64], rates: &[f64]) -> CurveResult<Self> {
        check_points(times, rates, 6)?;
        let model = |p: &[f64], t: f64| {
            let th1 = t / p[4].exp();
            let th2 = t / p[5].exp();
            p[0] + p[1] * loading(th1) + p[2] * hump(th1) + p[3] * hump(th2)
        };
        let objective = |p: &[f64]| {
            times
                .iter()
                .zip(rates)
                .map(|(t, z)| (model(p, *t) - z).powi(2))
                .sum::<f64>()
                / times.len() as f64
        };

        let last = rates[rates.len() - 1];
        let initial = [last, rates[0] - last, 0.0, 0.0, 1.5_f64.ln(), 5.0_f64.ln()];
        let config = OptimizationConfig::default().with_max_iterations(5000);
        let result = nelder_mead(objective, &initial, &config)?;
        debug!(objective = result.objective_value, iterations = result.iterations, "Svensson fit");
        if result.objective_value > FIT_TOLERANCE {
            return Err(CurveError::FitFailed {
                objective: result.objective_value,
                reason: "Svensson residuals too large".to_string(),
            });
        }
        let p = result.parameters;
        Self::new(reference_date, [p[0], p[1], p[2], p[3]], p[4].exp(), p[5].exp())
    }

    /// Model parameters `[β₀, β₁, β₂, β₃, τ₁, τ₂]`.
    pub fn parameters(&self) -> [f64; 6] {
        let [b0, b1, b2, b3] = self.betas;
        [b0, b1, b2, b3, self.tau1, self.tau2]
    }

    /// Model zero rate at time `t`.
    pub fn rate(&self, t: f64) -> f64 {
        let [b0, b1, b2, b3] = self.betas;
        let th1 = t.max(0.0) / self.tau1;
        let th2 = t.max(0.0) / self.tau2;
        b0 + b1 * loading(th1) + b2 * hump(th1) + b3 * hump(th2)
    }
}

impl Curve for NelsonSiegelSvensson {
    fn reference_date(&self) -> Date {
        self.reference_date
    }

    fn discount_factor(&self, t: f64) -> f64 {
        if t <= 0.0 {
            return 1.0;
        }
        self.compounding.discount_factor(self.rate(t), t)
    }

    fn day_count(&self) -> DayCountType {
        self.day_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn anchor() -> Date {
        Date::from_ymd(2020, 1, 1).unwrap()
    }

    #[test]
    fn test_limits() {
        let ns = NelsonSiegel::new(anchor(), 0.045, -0.02, 0.01, 2.0).unwrap();
        assert_relative_eq!(ns.rate(0.0), 0.025, epsilon = 1e-12);
        assert_relative_eq!(ns.rate(1000.0), 0.045, epsilon = 1e-4);
        assert!(ns.rate(0.25) < ns.rate(30.0));
    }

    #[test]
    fn test_svensson_reduces_to_ns() {
        let ns = NelsonSiegel::new(anchor(), 0.04, -0.01, 0.02, 1.7).unwrap();
        let nss = NelsonSiegelSvensson::new(anchor(), [0.04, -0.01, 0.02, 0.0], 1.7, 4.0).unwrap();
        for t in [0.1, 1.0, 5.0, 20.0] {
            assert_relative_eq!(ns.rate(t), nss.rate(t), epsilon = 1e-15);
            assert_relative_eq!(ns.discount_factor(t), nss.discount_factor(t), epsilon = 1e-15);
        }
    }

    #[test]
    fn test_fit_recovers_curve() {
        let truth = NelsonSiegel::new(anchor(), 0.05, -0.02, 0.015, 2.5).unwrap();
        let times = [0.25, 0.5, 1.0, 2.0, 3.0, 5.0, 7.0, 10.0, 20.0, 30.0];
        let rates: Vec<f64> = times.iter().map(|t| truth.rate(*t)).collect();
        let fitted = NelsonSiegel::fit(anchor(), &times, &rates).unwrap();
        for (t, z) in times.iter().zip(&rates) {
            assert_relative_eq!(fitted.rate(*t), *z, epsilon = 2e-5);
        }
    }

    #[test]
    fn test_fit_needs_points() {
        assert!(NelsonSiegel::fit(anchor(), &[1.0, 2.0], &[0.01, 0.02]).is_err());
        assert!(NelsonSiegel::new(anchor(), 0.04, 0.0, 0.0, -1.0).is_err());
    }
}
