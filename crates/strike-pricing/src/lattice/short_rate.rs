//! One-factor short-rate dynamics and their lattices.
//!
//! All three models are written as `r = g(α(t) + x)` with `x` a
//! driftless or mean-reverting state variable and `α(t)` fitted layer by
//! layer so the lattice reprices the discount curve exactly:
//!
//! | Model | `dx` | `g` | Lattice |
//! |-------|------|-----|---------|
//! | Hull–White | `−a·x·dt + σ·dW` | identity | trinomial |
//! | Black–Karasinski | `−a·x·dt + σ·dW` | `exp` | trinomial |
//! | Black–Derman–Toy | `σ·dW` | `exp` | binomial |
//!
//! The trinomial lattices follow Hull and White: spacing `σ√(3dt)`, the
//! state truncated at `j_max = ⌈0.184 / (a·dt)⌉` with the branching
//! switched at the edges.

use serde::{Deserialize, Serialize};
use tracing::debug;

use strike_math::solvers::{newton_with_fallback, SolverConfig};

use super::tree::{Branch, RateLattice};
use crate::error::{require_positive, PricingError, PricingResult};

/// Short-rate model family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShortRateKind {
    /// Normal short rate.
    HullWhite,
    /// Lognormal mean-reverting short rate.
    BlackKarasinski,
    /// Lognormal short rate on a binomial lattice.
    BlackDermanToy,
}

impl ShortRateKind {
    /// Display name of the lattice model.
    pub fn name(&self) -> &'static str {
        match self {
            ShortRateKind::HullWhite => "Hull-White tree",
            ShortRateKind::BlackKarasinski => "Black-Karasinski tree",
            ShortRateKind::BlackDermanToy => "Black-Derman-Toy tree",
        }
    }

    fn is_lognormal(self) -> bool {
        !matches!(self, ShortRateKind::HullWhite)
    }
}

/// Short-rate dynamics with constant parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShortRateModel {
    /// Model family.
    pub kind: ShortRateKind,
    /// Mean reversion speed `a`; ignored by Black–Derman–Toy.
    pub mean_reversion: f64,
    /// Volatility: absolute for Hull–White, of `ln r` otherwise.
    pub volatility: f64,
}

impl ShortRateModel {
    /// Creates a model.
    pub fn new(kind: ShortRateKind, mean_reversion: f64, volatility: f64) -> Self {
        Self {
            kind,
            mean_reversion,
            volatility,
        }
    }

    /// Hull–White dynamics.
    pub fn hull_white(mean_reversion: f64, volatility: f64) -> Self {
        Self::new(ShortRateKind::HullWhite, mean_reversion, volatility)
    }

    /// Black–Karasinski dynamics.
    pub fn black_karasinski(mean_reversion: f64, volatility: f64) -> Self {
        Self::new(ShortRateKind::BlackKarasinski, mean_reversion, volatility)
    }

    /// Black–Derman–Toy dynamics with constant vol.
    pub fn black_derman_toy(volatility: f64) -> Self {
        Self::new(ShortRateKind::BlackDermanToy, 0.0, volatility)
    }

    /// Checks the parameters.
    pub fn validate(&self) -> PricingResult<()> {
        require_positive("short-rate volatility", self.volatility)?;
        if !self.mean_reversion.is_finite() || self.mean_reversion < 0.0 {
            return Err(PricingError::invalid_input(format!(
                "mean reversion must be non-negative, got {}",
                self.mean_reversion
            )));
        }
        Ok(())
    }

    /// Builds a lattice over `[0, horizon]` fitted to `discount`, the
    /// discount factor `P(0, t)` from the valuation date.
    pub fn build_lattice(
        &self,
        discount: &dyn Fn(f64) -> f64,
        horizon: f64,
        steps: usize,
    ) -> PricingResult<RateLattice> {
        self.validate()?;
        require_positive("lattice horizon", horizon)?;
        if steps < 1 {
            return Err(PricingError::invalid_input("lattice needs at least one step"));
        }
        let dt = horizon / steps as f64;
        let (states, branches) = match self.kind {
            ShortRateKind::HullWhite | ShortRateKind::BlackKarasinski => {
                trinomial_layout(self.mean_reversion, self.volatility, dt, steps)
            }
            ShortRateKind::BlackDermanToy => binomial_layout(self.volatility, dt, steps),
        };
        let lattice = fit(self.kind, discount, dt, &states, branches)?;
        debug!(
            model = self.kind.name(),
            steps,
            dt,
            top_layer = lattice.nodes(steps),
            "short-rate lattice fitted"
        );
        Ok(lattice)
    }
}

type Layout = (Vec<Vec<f64>>, Vec<Vec<Branch>>);

/// Hull–White trinomial geometry for `dx = −a·x·dt + σ·dW`.
fn trinomial_layout(a: f64, sigma: f64, dt: f64, steps: usize) -> Layout {
    let dx = sigma * (3.0 * dt).sqrt();
    let m = -a * dt;
    let j_max = if a > 0.0 {
        ((0.184 / (a * dt)).ceil() as usize).clamp(1, steps.max(1))
    } else {
        steps.max(1)
    };
    let width = |i: usize| i.min(j_max) as i64;

    let mut states = Vec::with_capacity(steps + 1);
    let mut branches = Vec::with_capacity(steps);
    for i in 0..=steps {
        let w = width(i);
        states.push((-w..=w).map(|j| j as f64 * dx).collect());
        if i == steps {
            break;
        }
        let next = width(i + 1);
        let layer = (-w..=w)
            .map(|j| {
                let jm = j as f64 * m;
                let jm2 = jm * jm;
                let (centre, probs) = if j == j_max as i64 {
                    (
                        j - 1,
                        [
                            1.0 / 6.0 + (jm2 + jm) / 2.0,
                            -1.0 / 3.0 - jm2 - 2.0 * jm,
                            7.0 / 6.0 + (jm2 + 3.0 * jm) / 2.0,
                        ],
                    )
                } else if j == -(j_max as i64) {
                    (
                        j + 1,
                        [
                            7.0 / 6.0 + (jm2 - 3.0 * jm) / 2.0,
                            -1.0 / 3.0 - jm2 + 2.0 * jm,
                            1.0 / 6.0 + (jm2 - jm) / 2.0,
                        ],
                    )
                } else {
                    (
                        j,
                        [
                            1.0 / 6.0 + (jm2 - jm) / 2.0,
                            2.0 / 3.0 - jm2,
                            1.0 / 6.0 + (jm2 + jm) / 2.0,
                        ],
                    )
                };
                // probs are ordered down, middle, up
                let index = |k: i64| (k + next) as usize;
                Branch {
                    children: [index(centre - 1), index(centre), index(centre + 1)],
                    probs,
                }
            })
            .collect();
        branches.push(layer);
    }
    (states, branches)
}

/// Recombining binomial geometry with `x = σ√dt·(2j − i)`.
fn binomial_layout(sigma: f64, dt: f64, steps: usize) -> Layout {
    let dx = sigma * dt.sqrt();
    let states = (0..=steps)
        .map(|i| (0..=i).map(|j| dx * (2.0 * j as f64 - i as f64)).collect())
        .collect();
    let branches = (0..steps)
        .map(|i| (0..=i).map(|j| Branch::binomial(j, j + 1)).collect())
        .collect();
    (states, branches)
}

/// Forward induction on Arrow–Debreu prices fitting `α` per layer.
fn fit(
    kind: ShortRateKind,
    discount: &dyn Fn(f64) -> f64,
    dt: f64,
    states: &[Vec<f64>],
    branches: Vec<Vec<Branch>>,
) -> PricingResult<RateLattice> {
    let steps = branches.len();
    let lognormal = kind.is_lognormal();
    let config = SolverConfig::new(1e-12, 100);
    let mut arrow_debreu = vec![vec![1.0]];
    let mut rates = Vec::with_capacity(steps);

    for i in 0..steps {
        let q = &arrow_debreu[i];
        let x = &states[i];
        let p_now = discount(i as f64 * dt);
        let p_next = discount((i + 1) as f64 * dt);
        if !(p_next.is_finite() && p_next > 0.0) {
            return Err(PricingError::invalid_input(format!(
                "discount factor {p_next} at t = {} cannot be fitted",
                (i + 1) as f64 * dt
            )));
        }

        let alpha = if lognormal {
            let forward = (p_now / p_next).ln() / dt;
            if forward <= 0.0 {
                return Err(PricingError::invalid_input(format!(
                    "{} needs positive forward rates, got {forward} at t = {}",
                    kind.name(),
                    i as f64 * dt
                )));
            }
            let price = |alpha: f64| -> f64 {
                q.iter()
                    .zip(x)
                    .map(|(qj, xj)| qj * (-(alpha + xj).exp() * dt).exp())
                    .sum::<f64>()
                    - p_next
            };
            let slope = |alpha: f64| -> f64 {
                q.iter()
                    .zip(x)
                    .map(|(qj, xj)| {
                        let r = (alpha + xj).exp();
                        -qj * r * dt * (-r * dt).exp()
                    })
                    .sum()
            };
            let guess = forward.ln();
            newton_with_fallback(price, slope, guess, Some((guess - 5.0, guess + 5.0)), &config)
                .map_err(|source| PricingError::SolveFailed {
                    what: "lattice drift",
                    source,
                })?
                .root
        } else {
            let sum: f64 = q.iter().zip(x).map(|(qj, xj)| qj * (-xj * dt).exp()).sum();
            (sum / p_next).ln() / dt
        };

        let layer_rates: Vec<f64> = x
            .iter()
            .map(|xj| if lognormal { (alpha + xj).exp() } else { alpha + xj })
            .collect();

        let mut next = vec![0.0; states[i + 1].len()];
        for ((branch, qj), r) in branches[i].iter().zip(q).zip(&layer_rates) {
            let carried = qj * (-r * dt).exp();
            for (child, p) in branch.children.iter().zip(branch.probs) {
                next[*child] += carried * p;
            }
        }
        rates.push(layer_rates);
        arrow_debreu.push(next);
    }

    Ok(RateLattice {
        dt,
        rates,
        branches,
        arrow_debreu,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn curve(t: f64) -> f64 {
        // upward sloping: 3% short end rising to 5%
        let z = 0.05 - 0.02 * (-0.5 * t).exp();
        (-z * t).exp()
    }

    #[test]
    fn test_lattices_reprice_the_curve() {
        let models = [
            ShortRateModel::hull_white(0.1, 0.01),
            ShortRateModel::black_karasinski(0.1, 0.2),
            ShortRateModel::black_derman_toy(0.2),
        ];
        for model in models {
            let lattice = model.build_lattice(&curve, 5.0, 50).unwrap();
            for i in [1, 10, 25, 50] {
                assert_relative_eq!(lattice.zero_bond(i), curve(lattice.time(i)), epsilon = 1e-10);
            }
            let rolled = lattice.zero_bond_values(0, 50);
            assert_relative_eq!(rolled[0], curve(5.0), epsilon = 1e-10);
        }
    }

    #[test]
    fn test_trinomial_probabilities_are_valid() {
        let lattice = ShortRateModel::hull_white(0.2, 0.01).build_lattice(&curve, 10.0, 40).unwrap();
        for layer in &lattice.branches {
            for branch in layer {
                let total: f64 = branch.probs.iter().sum();
                assert_relative_eq!(total, 1.0, epsilon = 1e-12);
                assert!(branch.probs.iter().all(|p| *p >= 0.0));
            }
        }
        // 0.184 / (0.2 * 0.25) rounds up to 4
        assert_eq!(lattice.nodes(40), 9);
    }

    #[test]
    fn test_lognormal_rates_stay_positive() {
        let lattice = ShortRateModel::black_karasinski(0.05, 0.3).build_lattice(&curve, 3.0, 30).unwrap();
        assert!(lattice.rates.iter().flatten().all(|r| *r > 0.0));
    }

    #[test]
    fn test_rejects_bad_parameters() {
        assert!(ShortRateModel::hull_white(0.1, 0.0).build_lattice(&curve, 1.0, 10).is_err());
        assert!(ShortRateModel::hull_white(-0.1, 0.01).build_lattice(&curve, 1.0, 10).is_err());
        assert!(ShortRateModel::hull_white(0.1, 0.01).build_lattice(&curve, 1.0, 0).is_err());
        let negative = |t: f64| (0.01 * t).exp();
        assert!(ShortRateModel::black_karasinski(0.1, 0.2).build_lattice(&negative, 1.0, 10).is_err());
        assert!(ShortRateModel::hull_white(0.1, 0.01).build_lattice(&negative, 1.0, 10).is_ok());
    }

    #[test]
    fn test_names() {
        assert_eq!(ShortRateKind::BlackDermanToy.name(), "Black-Derman-Toy tree");
        let json = serde_json::to_string(&ShortRateModel::hull_white(0.1, 0.01)).unwrap();
        assert!(json.contains("HULL_WHITE"));
    }
}
