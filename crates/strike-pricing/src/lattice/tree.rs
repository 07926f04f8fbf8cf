//! Recombining short-rate lattice.
//!
//! Layer `i` sits at time `i·dt` and holds one short rate per node, applied
//! over `[t_i, t_{i+1}]`. Each node branches to two or three nodes of the
//! next layer. Values are priced by backward induction:
//!
//! ```text
//! V(i, j) = e^{−(r(i, j) + s)·dt} · Σ_m p_m(i, j) · V(i + 1, child_m(i, j))
//! ```
//!
//! with `s` an optional spread (OAS or credit). Arrow–Debreu prices
//! `Q(i, j)` are kept from the fit so the lattice can be checked against
//! the curve it was built on: `Σ_j Q(i, j) = P(0, t_i)`.

/// Transition from one node to the next layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Branch {
    /// Child node indices in the next layer.
    pub children: [usize; 3],
    /// Transition probabilities; a binomial branch leaves the third at 0.
    pub probs: [f64; 3],
}

impl Branch {
    /// Two-way branch with equal probabilities.
    pub(crate) fn binomial(down: usize, up: usize) -> Self {
        Self {
            children: [down, up, up],
            probs: [0.5, 0.5, 0.0],
        }
    }

    #[inline]
    fn expectation(&self, next: &[f64]) -> f64 {
        self.probs
            .iter()
            .zip(self.children)
            .map(|(p, k)| p * next[k])
            .sum()
    }
}

/// A fitted short-rate lattice.
#[derive(Debug, Clone)]
pub struct RateLattice {
    pub(crate) dt: f64,
    /// `rates[i][j]` for layers `0..steps`.
    pub(crate) rates: Vec<Vec<f64>>,
    /// `branches[i][j]` for layers `0..steps`.
    pub(crate) branches: Vec<Vec<Branch>>,
    /// Arrow–Debreu prices for layers `0..=steps`.
    pub(crate) arrow_debreu: Vec<Vec<f64>>,
}

impl RateLattice {
    /// Number of time steps.
    pub fn steps(&self) -> usize {
        self.rates.len()
    }

    /// Step size in years.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Time of layer `i`.
    pub fn time(&self, i: usize) -> f64 {
        i as f64 * self.dt
    }

    /// Nodes in layer `i`.
    pub fn nodes(&self, i: usize) -> usize {
        self.arrow_debreu[i].len()
    }

    /// Short rate at node `(i, j)`, `i < steps`.
    pub fn rate(&self, i: usize, j: usize) -> f64 {
        self.rates[i][j]
    }

    /// Arrow–Debreu prices of layer `i`.
    pub fn arrow_debreu(&self, i: usize) -> &[f64] {
        &self.arrow_debreu[i]
    }

    /// Price of a zero bond maturing at layer `i` implied by the lattice.
    pub fn zero_bond(&self, i: usize) -> f64 {
        self.arrow_debreu[i].iter().sum()
    }

    /// Layer closest to time `t`, clamped to the lattice.
    pub fn step_of(&self, t: f64) -> usize {
        let k = (t / self.dt).round();
        if k <= 0.0 {
            0
        } else {
            (k as usize).min(self.steps())
        }
    }

    /// Values at layer `i` from values at layer `i + 1`.
    pub fn step_back(&self, i: usize, next: &[f64], spread: f64) -> Vec<f64> {
        self.branches[i]
            .iter()
            .zip(&self.rates[i])
            .map(|(branch, r)| branch.expectation(next) * (-(r + spread) * self.dt).exp())
            .collect()
    }

    /// Rolls `values` at layer `to` back to layer `from`.
    pub fn roll_back(&self, from: usize, to: usize, values: Vec<f64>, spread: f64) -> Vec<f64> {
        (from..to)
            .rev()
            .fold(values, |next, i| self.step_back(i, &next, spread))
    }

    /// Node prices at layer `i` of a zero bond paying 1 at layer `maturity`.
    pub fn zero_bond_values(&self, i: usize, maturity: usize) -> Vec<f64> {
        self.roll_back(i, maturity, vec![1.0; self.nodes(maturity)], 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Two-step binomial lattice with flat 5% rates.
    fn flat() -> RateLattice {
        let dt = 0.5;
        let r: f64 = 0.05;
        let d = (-r * dt).exp();
        RateLattice {
            dt,
            rates: vec![vec![r], vec![r, r]],
            branches: vec![
                vec![Branch::binomial(0, 1)],
                vec![Branch::binomial(0, 1), Branch::binomial(1, 2)],
            ],
            arrow_debreu: vec![vec![1.0], vec![0.5 * d, 0.5 * d], vec![0.25 * d * d, 0.5 * d * d, 0.25 * d * d]],
        }
    }

    #[test]
    fn test_backward_induction_discounts() {
        let lattice = flat();
        let v = lattice.roll_back(0, 2, vec![1.0; 3], 0.0);
        assert_eq!(v.len(), 1);
        assert_relative_eq!(v[0], (-0.05_f64).exp(), epsilon = 1e-14);
        assert_relative_eq!(lattice.zero_bond(2), v[0], epsilon = 1e-14);
        let spread = lattice.roll_back(0, 2, vec![1.0; 3], 0.01);
        assert_relative_eq!(spread[0], (-0.06_f64).exp(), epsilon = 1e-14);
    }

    #[test]
    fn test_step_of() {
        let lattice = flat();
        assert_eq!(lattice.step_of(-1.0), 0);
        assert_eq!(lattice.step_of(0.2), 0);
        assert_eq!(lattice.step_of(0.3), 1);
        assert_eq!(lattice.step_of(5.0), 2);
        assert_eq!(lattice.zero_bond_values(1, 2).len(), 2);
    }
}
