//! Cox–Ross–Rubinstein binomial tree for European and American options.

use serde::{Deserialize, Serialize};

use strike_core::types::{ExerciseType, OptionType};

use crate::error::{require_finite, require_positive, OptionsError, OptionsResult};

/// Value and Greeks read off a binomial tree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeGreeks {
    /// Option value at the root.
    pub value: f64,
    /// Delta from the first time step.
    pub delta: f64,
    /// Gamma from the second time step.
    pub gamma: f64,
    /// Theta per year, from the middle node two steps in.
    pub theta: f64,
}

/// Prices a vanilla option on a CRR tree with `steps` time steps.
///
/// American exercise compares continuation with intrinsic value at every
/// node. Bermudan exercise needs exercise dates and is not accepted here.
///
/// # Example
///
/// ```rust
/// use strike_core::types::{ExerciseType, OptionType};
/// use strike_options::binomial::crr_tree;
///
/// let tree = crr_tree(100.0, 1.0, 100.0, 0.05, 0.0, 0.2, OptionType::Put, ExerciseType::American, 500)
///     .unwrap();
/// assert!((tree.value - 6.09).abs() < 0.02);
/// ```
#[allow(clippy::too_many_arguments)]
pub fn crr_tree(
    s: f64,
    t: f64,
    k: f64,
    r: f64,
    q: f64,
    sigma: f64,
    option_type: OptionType,
    exercise: ExerciseType,
    steps: usize,
) -> OptionsResult<TreeGreeks> {
    require_positive("spot", s)?;
    require_positive("strike", k)?;
    require_positive("volatility", sigma)?;
    require_finite("rate", r)?;
    require_finite("dividend yield", q)?;
    if !t.is_finite() || t <= 0.0 {
        return Err(OptionsError::Expired { time_to_expiry: t });
    }
    if steps < 2 {
        return Err(OptionsError::invalid_input(format!(
            "tree needs at least 2 steps, got {steps}"
        )));
    }
    let american = match exercise {
        ExerciseType::European => false,
        ExerciseType::American => true,
        ExerciseType::Bermudan => {
            return Err(OptionsError::invalid_input(
                "Bermudan exercise needs an exercise schedule",
            ))
        }
    };

    let dt = t / steps as f64;
    let u = (sigma * dt.sqrt()).exp();
    let d = 1.0 / u;
    let growth = ((r - q) * dt).exp();
    let p = (growth - d) / (u - d);
    if !(0.0..=1.0).contains(&p) {
        return Err(OptionsError::invalid_input(format!(
            "risk-neutral probability {p} outside [0, 1]; increase the number of steps"
        )));
    }
    let disc = (-r * dt).exp();
    let node = |i: usize, j: usize| s * u.powi(j as i32) * d.powi((i - j) as i32);

    let mut values: Vec<f64> = (0..=steps)
        .map(|j| option_type.payoff(node(steps, j), k))
        .collect();
    let mut level_two = [0.0; 3];
    let mut level_one = [0.0; 2];

    for i in (0..steps).rev() {
        for j in 0..=i {
            let continuation = disc * (p * values[j + 1] + (1.0 - p) * values[j]);
            values[j] = if american {
                continuation.max(option_type.payoff(node(i, j), k))
            } else {
                continuation
            };
        }
        match i {
            2 => level_two.copy_from_slice(&values[..3]),
            1 => level_one.copy_from_slice(&values[..2]),
            _ => {}
        }
    }
    let value = values[0];

    let delta = (level_one[1] - level_one[0]) / (s * u - s * d);
    let s_uu = s * u * u;
    let s_dd = s * d * d;
    let delta_up = (level_two[2] - level_two[1]) / (s_uu - s);
    let delta_down = (level_two[1] - level_two[0]) / (s - s_dd);
    let gamma = (delta_up - delta_down) / (0.5 * (s_uu - s_dd));
    let theta = (level_two[1] - value) / (2.0 * dt);

    Ok(TreeGreeks {
        value,
        delta,
        gamma,
        theta,
    })
}
