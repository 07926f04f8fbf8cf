//! Bisection root-finding algorithm.

use crate::error::{MathError, MathResult};
use crate::solvers::{SolverConfig, SolverResult};

/// Bisection root-finding algorithm.
///
/// Requires `f(lo) * f(hi) <= 0`. The bracket is halved until its width is
/// below `config.tolerance` (an absolute x tolerance). The iteration count
/// is the number of halvings that width reduction needs, so a valid bracket
/// always converges and `config.max_iterations` is not consulted.
///
/// # Example
///
/// ```rust
/// use strike_math::solvers::{bisection, SolverConfig};
///
/// let f = |x: f64| x * x - 2.0;
/// let result = bisection(f, 1.0, 2.0, &SolverConfig::default()).unwrap();
/// assert!((result.root - std::f64::consts::SQRT_2).abs() < 1e-10);
/// ```
pub fn bisection<F>(f: F, lo: f64, hi: f64, config: &SolverConfig) -> MathResult<SolverResult>
where
    F: Fn(f64) -> f64,
{
    let mut lo_x = lo.min(hi);
    let mut hi_x = lo.max(hi);
    let mut f_lo = f(lo_x);
    let f_hi = f(hi_x);

    if !f_lo.is_finite() || !f_hi.is_finite() {
        return Err(MathError::NonFinite {
            solver: "Bisection",
        });
    }

    if f_lo == 0.0 {
        return Ok(SolverResult {
            root: lo_x,
            iterations: 0,
            residual: 0.0,
        });
    }
    if f_hi == 0.0 {
        return Ok(SolverResult {
            root: hi_x,
            iterations: 0,
            residual: 0.0,
        });
    }
    if f_lo * f_hi > 0.0 {
        return Err(MathError::InvalidBracket {
            a: lo_x,
            b: hi_x,
            fa: f_lo,
            fb: f_hi,
        });
    }

    let xtol = config.tolerance.max(f64::EPSILON);
    let width = hi_x - lo_x;
    let needed = if width > xtol {
        (width / xtol).log2().ceil() as u32 + 1
    } else {
        1
    };

    let mut mid = 0.5 * (lo_x + hi_x);
    let mut f_mid = f(mid);
    for iteration in 0..needed {
        mid = 0.5 * (lo_x + hi_x);
        f_mid = f(mid);

        if f_mid == 0.0 || (hi_x - lo_x) * 0.5 < xtol {
            return Ok(SolverResult {
                root: mid,
                iterations: iteration + 1,
                residual: f_mid,
            });
        }

        if f_lo * f_mid < 0.0 {
            hi_x = mid;
        } else {
            lo_x = mid;
            f_lo = f_mid;
        }
    }

    Ok(SolverResult {
        root: mid,
        iterations: needed,
        residual: f_mid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sqrt_2() {
        let f = |x: f64| x * x - 2.0;
        let result = bisection(f, 1.0, 2.0, &SolverConfig::default()).unwrap();
        assert_relative_eq!(result.root, std::f64::consts::SQRT_2, epsilon = 1e-10);
    }

    #[test]
    fn test_reversed_bracket() {
        let f = |x: f64| x - 0.7;
        let result = bisection(f, 1.0, 0.0, &SolverConfig::default()).unwrap();
        assert_relative_eq!(result.root, 0.7, epsilon = 1e-10);
    }

    #[test]
    fn test_invalid_bracket() {
        let f = |x: f64| x * x + 1.0;
        let err = bisection(f, -1.0, 1.0, &SolverConfig::default()).unwrap_err();
        assert!(matches!(err, MathError::InvalidBracket { .. }));
    }

    #[test]
    fn test_root_at_endpoint() {
        let f = |x: f64| x - 1.0;
        let result = bisection(f, 1.0, 3.0, &SolverConfig::default()).unwrap();
        assert_eq!(result.root, 1.0);
        assert_eq!(result.iterations, 0);
    }

    #[test]
    fn test_wide_bracket_ignores_iteration_cap() {
        let f = |x: f64| x - 3.25;
        let cfg = SolverConfig::default().with_max_iterations(5);
        let result = bisection(f, 0.0, 1000.0, &cfg).unwrap();
        assert_relative_eq!(result.root, 3.25, epsilon = 1e-9);
    }
}
