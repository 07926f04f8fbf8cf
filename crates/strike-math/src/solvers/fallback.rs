//! Newton-type iteration with a bisection safety net.

use tracing::debug;

use crate::error::{MathError, MathResult};
use crate::solvers::{bisection, newton, newton_secant, SolverConfig, SolverResult};

/// Maximum number of bracket expansions.
const MAX_BRACKET_EXPANSIONS: u32 = 50;

/// Newton-Raphson, falling back to bisection.
///
/// Newton is tried first from `initial_guess`. When it fails, or lands
/// outside `bounds`, bisection runs on `bounds` widened until the function
/// changes sign (or on a bracket searched outward from the initial guess
/// when no bounds are given). If no sign change is found the bisection
/// error is returned.
pub fn newton_with_fallback<F, DF>(
    f: F,
    df: DF,
    initial_guess: f64,
    bounds: Option<(f64, f64)>,
    config: &SolverConfig,
) -> MathResult<SolverResult>
where
    F: Fn(f64) -> f64,
    DF: Fn(f64) -> f64,
{
    let first = newton(&f, &df, initial_guess, config);
    fall_back(&f, first, initial_guess, bounds, config)
}

/// Newton-secant, falling back to bisection.
///
/// Same strategy as [`newton_with_fallback`] for functions without an
/// analytical derivative.
pub fn secant_with_fallback<F>(
    f: F,
    initial_guess: f64,
    bounds: Option<(f64, f64)>,
    config: &SolverConfig,
) -> MathResult<SolverResult>
where
    F: Fn(f64) -> f64,
{
    let first = newton_secant(&f, initial_guess, config);
    fall_back(&f, first, initial_guess, bounds, config)
}

fn fall_back<F>(
    f: &F,
    first: MathResult<SolverResult>,
    initial_guess: f64,
    bounds: Option<(f64, f64)>,
    config: &SolverConfig,
) -> MathResult<SolverResult>
where
    F: Fn(f64) -> f64,
{
    let reason = match first {
        Ok(result) if within(result.root, bounds) => return Ok(result),
        Ok(result) => format!("root {} outside bounds", result.root),
        Err(err) => err.to_string(),
    };

    let (lo, hi) = match bounds {
        Some((a, b)) => widen_bracket(f, a, b).unwrap_or((a, b)),
        None => find_bracket(f, initial_guess).ok_or_else(|| {
            MathError::invalid_input(format!(
                "{reason}; no bracketing interval found around {initial_guess}"
            ))
        })?,
    };

    debug!(%reason, lo, hi, "root search falling back to bisection");
    bisection(f, lo, hi, config)
}

fn within(x: f64, bounds: Option<(f64, f64)>) -> bool {
    match bounds {
        Some((a, b)) => x >= a.min(b) && x <= a.max(b),
        None => true,
    }
}

/// Widens `[a, b]` geometrically about its midpoint until `f` changes sign.
fn widen_bracket<F>(f: &F, a: f64, b: f64) -> Option<(f64, f64)>
where
    F: Fn(f64) -> f64,
{
    let mut lo = a.min(b);
    let mut hi = a.max(b);
    let mut f_lo = f(lo);
    let mut f_hi = f(hi);

    for _ in 0..MAX_BRACKET_EXPANSIONS {
        if f_lo.is_finite() && f_hi.is_finite() && f_lo * f_hi <= 0.0 {
            return Some((lo, hi));
        }
        let half = 0.5 * (hi - lo).max(1e-8);
        if f_lo.abs() < f_hi.abs() {
            lo -= 1.6 * half;
            f_lo = f(lo);
        } else {
            hi += 1.6 * half;
            f_hi = f(hi);
        }
    }
    None
}

/// Searches outward from `initial_guess` for an interval with a sign change.
///
/// The search step starts at 0.1 and doubles each round; it gives up once
/// the step exceeds 1e6.
pub fn find_bracket<F>(f: &F, initial_guess: f64) -> Option<(f64, f64)>
where
    F: Fn(f64) -> f64,
{
    let f_init = f(initial_guess);
    if f_init == 0.0 {
        return Some((initial_guess, initial_guess));
    }

    let mut left = initial_guess;
    let mut right = initial_guess;
    let mut delta = 0.1;

    while delta <= 1e6 {
        left -= delta;
        right += delta;

        let f_left = f(left);
        let f_right = f(right);

        if f_left.is_finite() && f_left * f_init <= 0.0 {
            return Some((left, left + delta));
        }
        if f_right.is_finite() && f_right * f_init <= 0.0 {
            return Some((right - delta, right));
        }

        delta *= 2.0;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_newton_succeeds_directly() {
        let f = |x: f64| x * x * x - x - 2.0;
        let df = |x: f64| 3.0 * x * x - 1.0;
        let result = newton_with_fallback(f, df, 1.5, Some((1.0, 2.0)), &SolverConfig::default())
            .unwrap();
        assert!(f(result.root).abs() < 1e-10);
    }

    #[test]
    fn test_falls_back_on_flat_derivative() {
        // Newton from 0 divides by a zero derivative
        let f = |x: f64| x * x * x - 8.0;
        let df = |x: f64| 3.0 * x * x;
        let result = newton_with_fallback(f, df, 0.0, Some((1.0, 4.0)), &SolverConfig::default())
            .unwrap();
        assert_relative_eq!(result.root, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_widens_bracket() {
        let f = |x: f64| x - 10.0;
        let df = |_x: f64| 0.0;
        let result = newton_with_fallback(f, df, 0.5, Some((0.0, 1.0)), &SolverConfig::default())
            .unwrap();
        assert_relative_eq!(result.root, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_no_sign_change_is_solver_failure() {
        let f = |x: f64| x * x + 1.0;
        let df = |x: f64| 2.0 * x;
        let err = newton_with_fallback(f, df, 0.0, Some((-1.0, 1.0)), &SolverConfig::default())
            .unwrap_err();
        assert_eq!(err.kind(), strike_core::ErrorKind::SolverFailure);
    }

    #[test]
    fn test_secant_fallback_without_bounds() {
        let f = |x: f64| (x - 4.0).atan();
        let result = secant_with_fallback(f, 0.0, None, &SolverConfig::default()).unwrap();
        assert_relative_eq!(result.root, 4.0, epsilon = 1e-8);
    }

    #[test]
    fn test_find_bracket() {
        let f = |x: f64| x - 5.0;
        let (a, b) = find_bracket(&f, 0.0).unwrap();
        assert!(f(a) * f(b) <= 0.0);
    }
}
