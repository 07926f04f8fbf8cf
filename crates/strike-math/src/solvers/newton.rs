//! Newton-Raphson root-finding algorithm.

use crate::error::{MathError, MathResult};
use crate::solvers::{SolverConfig, SolverResult, MIN_DERIVATIVE};

/// Newton-Raphson root-finding algorithm.
///
/// Uses the iteration `x_{n+1} = x_n - f(x_n) / f'(x_n)` and stops when
/// either `|f(x)|` or the step falls below the tolerance. Fails on a
/// vanishing derivative, a non-finite iterate, or when the iteration budget
/// runs out.
///
/// # Example
///
/// ```rust
/// use strike_math::solvers::{newton, SolverConfig};
///
/// let f = |x: f64| x * x - 2.0;
/// let df = |x: f64| 2.0 * x;
///
/// let result = newton(f, df, 1.5, &SolverConfig::default()).unwrap();
/// assert!((result.root - std::f64::consts::SQRT_2).abs() < 1e-10);
/// ```
pub fn newton<F, DF>(
    f: F,
    df: DF,
    initial_guess: f64,
    config: &SolverConfig,
) -> MathResult<SolverResult>
where
    F: Fn(f64) -> f64,
    DF: Fn(f64) -> f64,
{
    let mut x = initial_guess;

    for iteration in 0..config.max_iterations {
        let fx = f(x);
        if !fx.is_finite() {
            return Err(MathError::NonFinite { solver: "Newton" });
        }

        if fx.abs() < config.tolerance {
            return Ok(SolverResult {
                root: x,
                iterations: iteration,
                residual: fx,
            });
        }

        let dfx = df(x);
        if !dfx.is_finite() || dfx.abs() < MIN_DERIVATIVE {
            return Err(MathError::DivisionByZero { value: dfx });
        }

        let step = fx / dfx;
        x -= step;

        if !x.is_finite() {
            return Err(MathError::NonFinite { solver: "Newton" });
        }

        if step.abs() < config.tolerance {
            return Ok(SolverResult {
                root: x,
                iterations: iteration + 1,
                residual: f(x),
            });
        }
    }

    Err(MathError::convergence_failed(
        "Newton",
        config.max_iterations,
        f(x).abs(),
    ))
}

/// Newton-Raphson with a central-difference derivative.
pub fn newton_numerical<F>(f: F, initial_guess: f64, config: &SolverConfig) -> MathResult<SolverResult>
where
    F: Fn(f64) -> f64,
{
    let h = 1e-8;
    let df = |x: f64| (f(x + h) - f(x - h)) / (2.0 * h);
    newton(&f, df, initial_guess, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sqrt_2() {
        let f = |x: f64| x * x - 2.0;
        let df = |x: f64| 2.0 * x;
        let result = newton(f, df, 1.0, &SolverConfig::default()).unwrap();
        assert_relative_eq!(result.root, std::f64::consts::SQRT_2, epsilon = 1e-10);
        assert!(result.iterations < 10);
    }

    #[test]
    fn test_zero_derivative() {
        let f = |x: f64| x * x + 1.0;
        let df = |x: f64| 2.0 * x;
        let err = newton(f, df, 0.0, &SolverConfig::default()).unwrap_err();
        assert!(matches!(err, MathError::DivisionByZero { .. }));
    }

    #[test]
    fn test_no_root_runs_out_of_iterations() {
        // x^2 + 1 has no real root; Newton wanders
        let f = |x: f64| x * x + 1.0;
        let df = |x: f64| 2.0 * x;
        let err = newton(f, df, 0.5, &SolverConfig::default().with_max_iterations(20)).unwrap_err();
        assert_eq!(err.kind(), strike_core::ErrorKind::SolverFailure);
    }

    #[test]
    fn test_nan_is_reported() {
        let f = |x: f64| x.ln();
        let df = |x: f64| 1.0 / x;
        let err = newton(f, df, -1.0, &SolverConfig::default()).unwrap_err();
        assert!(matches!(err, MathError::NonFinite { .. }));
    }

    #[test]
    fn test_numerical_derivative() {
        let f = |x: f64| x.exp() - 2.0;
        let result = newton_numerical(f, 0.0, &SolverConfig::default()).unwrap();
        assert_relative_eq!(result.root, 2.0_f64.ln(), epsilon = 1e-9);
    }
}
