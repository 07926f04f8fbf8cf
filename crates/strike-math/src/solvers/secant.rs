//! Newton iteration with a secant slope.

use crate::error::{MathError, MathResult};
use crate::solvers::{SolverConfig, SolverResult};

/// Relative offset of the second starting point.
const SECOND_POINT_OFFSET: f64 = 1e-4;

/// Newton-secant root-finding algorithm.
///
/// Only one starting point is needed: the second one is placed at
/// `x0 * (1 + 1e-4) ± 1e-4`, and each iteration replaces the derivative by
/// the slope through the two most recent iterates. Convergence is declared
/// when successive iterates differ by less than the tolerance.
///
/// # Example
///
/// ```rust
/// use strike_math::solvers::{newton_secant, SolverConfig};
///
/// let f = |x: f64| x * x * x - x - 2.0;
/// let result = newton_secant(f, 1.5, &SolverConfig::default()).unwrap();
/// assert!(f(result.root).abs() < 1e-9);
/// ```
pub fn newton_secant<F>(f: F, initial_guess: f64, config: &SolverConfig) -> MathResult<SolverResult>
where
    F: Fn(f64) -> f64,
{
    let mut p0 = initial_guess;
    let mut p1 = if initial_guess >= 0.0 {
        initial_guess * (1.0 + SECOND_POINT_OFFSET) + SECOND_POINT_OFFSET
    } else {
        initial_guess * (1.0 + SECOND_POINT_OFFSET) - SECOND_POINT_OFFSET
    };
    let mut q0 = f(p0);
    let mut q1 = f(p1);

    if q1.abs() < q0.abs() {
        std::mem::swap(&mut p0, &mut p1);
        std::mem::swap(&mut q0, &mut q1);
    }

    for iteration in 0..config.max_iterations {
        if !q0.is_finite() || !q1.is_finite() {
            return Err(MathError::NonFinite {
                solver: "Newton-secant",
            });
        }

        if q1 == q0 {
            if (p1 - p0).abs() < config.tolerance || q1 == 0.0 {
                let root = 0.5 * (p0 + p1);
                return Ok(SolverResult {
                    root,
                    iterations: iteration,
                    residual: f(root),
                });
            }
            return Err(MathError::DivisionByZero { value: q1 - q0 });
        }

        // Step from the point with the smaller residual
        let p = if q1.abs() > q0.abs() {
            (-q0 / q1 * p1 + p0) / (1.0 - q0 / q1)
        } else {
            (-q1 / q0 * p0 + p1) / (1.0 - q1 / q0)
        };

        if !p.is_finite() {
            return Err(MathError::NonFinite {
                solver: "Newton-secant",
            });
        }

        if (p - p1).abs() < config.tolerance {
            return Ok(SolverResult {
                root: p,
                iterations: iteration + 1,
                residual: f(p),
            });
        }

        p0 = p1;
        q0 = q1;
        p1 = p;
        q1 = f(p1);
    }

    Err(MathError::convergence_failed(
        "Newton-secant",
        config.max_iterations,
        q1.abs(),
    ))
}
