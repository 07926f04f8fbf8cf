//! Multivariate minimisation.
//!
//! Thin wrappers over `argmin` solvers for objectives written as plain
//! closures over `&[f64]`:
//!
//! - [`nelder_mead`]: derivative-free simplex search
//! - [`conjugate_gradient`]: Polak-Ribière nonlinear CG with More-Thuente
//!   line search and central-difference gradients
//! - [`minimize`]: Nelder-Mead, then CG when the simplex does not converge

use argmin::core::{CostFunction, Error as ArgminError, Executor, Gradient, State, TerminationReason};
use argmin::solver::conjugategradient::beta::PolakRibiere;
use argmin::solver::conjugategradient::NonlinearConjugateGradient;
use argmin::solver::linesearch::MoreThuenteLineSearch;
use argmin::solver::neldermead::NelderMead;
use tracing::debug;

use crate::error::{MathError, MathResult};

/// Configuration for optimization algorithms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimizationConfig {
    /// Convergence tolerance (simplex standard deviation for Nelder-Mead).
    pub tolerance: f64,
    /// Maximum number of iterations.
    pub max_iterations: u64,
    /// Step size for numerical gradients.
    pub step_size: f64,
    /// Relative size of the initial simplex.
    pub initial_step: f64,
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-12,
            max_iterations: 2000,
            step_size: 1e-7,
            initial_step: 0.05,
        }
    }
}

impl OptimizationConfig {
    /// Sets the tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the maximum iterations.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

/// Result of an optimization run.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationResult {
    /// Optimal parameters found.
    pub parameters: Vec<f64>,
    /// Final objective function value.
    pub objective_value: f64,
    /// Number of iterations used.
    pub iterations: u64,
    /// Whether the solver reported convergence.
    pub converged: bool,
}

struct Objective<F> {
    f: F,
    step: f64,
}

impl<F> CostFunction for Objective<F>
where
    F: Fn(&[f64]) -> f64,
{
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, param: &Self::Param) -> Result<Self::Output, ArgminError> {
        let value = (self.f)(param);
        // Non-finite costs are mapped to +inf so the simplex moves away
        Ok(if value.is_finite() { value } else { f64::INFINITY })
    }
}

impl<F> Gradient for Objective<F>
where
    F: Fn(&[f64]) -> f64,
{
    type Param = Vec<f64>;
    type Gradient = Vec<f64>;

    fn gradient(&self, param: &Self::Param) -> Result<Self::Gradient, ArgminError> {
        let mut bumped = param.clone();
        let mut grad = Vec::with_capacity(param.len());
        for i in 0..param.len() {
            let h = self.step * param[i].abs().max(1.0);
            bumped[i] = param[i] + h;
            let up = (self.f)(&bumped);
            bumped[i] = param[i] - h;
            let down = (self.f)(&bumped);
            bumped[i] = param[i];
            grad.push((up - down) / (2.0 * h));
        }
        Ok(grad)
    }
}

/// Simplex offset used for coordinates that start at zero.
const ZERO_COORDINATE_STEP: f64 = 0.00025;

fn initial_simplex(initial: &[f64], step: f64) -> Vec<Vec<f64>> {
    let mut simplex = Vec::with_capacity(initial.len() + 1);
    simplex.push(initial.to_vec());
    for i in 0..initial.len() {
        let mut vertex = initial.to_vec();
        vertex[i] = if vertex[i].abs() > 1e-8 {
            vertex[i] * (1.0 + step)
        } else {
            ZERO_COORDINATE_STEP
        };
        simplex.push(vertex);
    }
    simplex
}

fn check_initial(initial: &[f64]) -> MathResult<()> {
    if initial.is_empty() {
        return Err(MathError::insufficient_data(1, 0));
    }
    if initial.iter().any(|x| !x.is_finite()) {
        return Err(MathError::invalid_input("initial parameters must be finite"));
    }
    Ok(())
}

/// Minimises `f` with the Nelder-Mead simplex method.
pub fn nelder_mead<F>(f: F, initial: &[f64], config: &OptimizationConfig) -> MathResult<OptimizationResult>
where
    F: Fn(&[f64]) -> f64,
{
    check_initial(initial)?;
    let problem = Objective {
        f,
        step: config.step_size,
    };
    let solver = NelderMead::new(initial_simplex(initial, config.initial_step))
        .with_sd_tolerance(config.tolerance)
        .map_err(|e| MathError::optimization_failed("Nelder-Mead", e.to_string()))?;

    let res = Executor::new(problem, solver)
        .configure(|state| state.max_iters(config.max_iterations))
        .run()
        .map_err(|e| MathError::optimization_failed("Nelder-Mead", e.to_string()))?;

    let state = res.state();
    let parameters = state
        .get_best_param()
        .cloned()
        .ok_or_else(|| MathError::optimization_failed("Nelder-Mead", "no parameters returned"))?;
    Ok(OptimizationResult {
        parameters,
        objective_value: state.get_best_cost(),
        iterations: state.get_iter(),
        converged: matches!(
            state.get_termination_reason(),
            Some(TerminationReason::SolverConverged | TerminationReason::TargetCostReached)
        ),
    })
}

/// Minimises `f` with Polak-Ribière nonlinear conjugate gradient.
pub fn conjugate_gradient<F>(
    f: F,
    initial: &[f64],
    config: &OptimizationConfig,
) -> MathResult<OptimizationResult>
where
    F: Fn(&[f64]) -> f64,
{
    check_initial(initial)?;
    let problem = Objective {
        f,
        step: config.step_size,
    };
    let linesearch = MoreThuenteLineSearch::new();
    let solver = NonlinearConjugateGradient::new(linesearch, PolakRibiere::new())
        .restart_iters(10)
        .restart_orthogonality(0.1);

    let res = Executor::new(problem, solver)
        .configure(|state| {
            state
                .param(initial.to_vec())
                .max_iters(config.max_iterations)
        })
        .run()
        .map_err(|e| MathError::optimization_failed("Conjugate gradient", e.to_string()))?;

    let state = res.state();
    let parameters = state.get_best_param().cloned().ok_or_else(|| {
        MathError::optimization_failed("Conjugate gradient", "no parameters returned")
    })?;
    Ok(OptimizationResult {
        parameters,
        objective_value: state.get_best_cost(),
        iterations: state.get_iter(),
        converged: matches!(
            state.get_termination_reason(),
            Some(TerminationReason::SolverConverged | TerminationReason::TargetCostReached)
        ),
    })
}

/// Nelder-Mead with a conjugate gradient fallback.
///
/// When the simplex errors or stops without converging, CG restarts from
/// the best point found so far and the better of the two results is
/// returned. Fails only when both methods fail.
pub fn minimize<F>(f: F, initial: &[f64], config: &OptimizationConfig) -> MathResult<OptimizationResult>
where
    F: Fn(&[f64]) -> f64,
{
    let simplex = nelder_mead(&f, initial, config);
    if let Ok(result) = &simplex {
        if result.converged {
            return simplex;
        }
    }

    let restart = simplex
        .as_ref()
        .map_or_else(|_| initial.to_vec(), |r| r.parameters.clone());
    debug!(
        objective = simplex.as_ref().map_or(f64::NAN, |r| r.objective_value),
        "Nelder-Mead did not converge, trying conjugate gradient"
    );

    match (simplex, conjugate_gradient(&f, &restart, config)) {
        (Ok(a), Ok(b)) => Ok(if b.objective_value < a.objective_value { b } else { a }),
        (Ok(a), Err(_)) => Ok(a),
        (Err(_), Ok(b)) => Ok(b),
        (Err(_), Err(e)) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rosenbrock(p: &[f64]) -> f64 {
        (1.0 - p[0]).powi(2) + 100.0 * (p[1] - p[0] * p[0]).powi(2)
    }

    #[test]
    fn test_nelder_mead_quadratic() {
        let f = |p: &[f64]| (p[0] - 1.0).powi(2) + (p[1] + 2.0).powi(2);
        let result = nelder_mead(f, &[0.0, 0.0], &OptimizationConfig::default()).unwrap();
        assert_relative_eq!(result.parameters[0], 1.0, epsilon = 1e-4);
        assert_relative_eq!(result.parameters[1], -2.0, epsilon = 1e-4);
    }

    #[test]
    fn test_nelder_mead_rosenbrock() {
        let result = nelder_mead(rosenbrock, &[-1.2, 1.0], &OptimizationConfig::default()).unwrap();
        assert!(result.objective_value < 1e-8);
    }

    #[test]
    fn test_conjugate_gradient_quadratic() {
        let f = |p: &[f64]| 3.0 * (p[0] - 0.5).powi(2) + (p[1] - 0.25).powi(2);
        let result = conjugate_gradient(f, &[2.0, 2.0], &OptimizationConfig::default()).unwrap();
        assert_relative_eq!(result.parameters[0], 0.5, epsilon = 1e-5);
        assert_relative_eq!(result.parameters[1], 0.25, epsilon = 1e-5);
    }

    #[test]
    fn test_minimize_falls_back() {
        // Too few simplex iterations; CG finishes the job
        let f = |p: &[f64]| (p[0] - 3.0).powi(2) + (p[1] - 1.0).powi(2);
        let config = OptimizationConfig::default().with_max_iterations(5);
        let result = minimize(f, &[0.0, 0.0], &config).unwrap();
        assert!(result.objective_value < f(&[0.0, 0.0]));
    }

    #[test]
    fn test_empty_initial_rejected() {
        let f = |_p: &[f64]| 0.0;
        assert!(nelder_mead(f, &[], &OptimizationConfig::default()).is_err());
    }
}
