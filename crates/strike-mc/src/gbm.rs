//! Geometric Brownian motion paths.
//!
//! `S_i ← S_i · exp((μ_i − σ_i²/2)Δt + σ_i √Δt ε_i)` with `ε = L z`, `L` the
//! lower Cholesky factor of the asset correlation and `z` iid standard
//! normals. Output tensors are indexed `[path, time, asset]`; time index 0
//! holds the initial prices. With antithetic pairing, path `p + P` is
//! driven by `−ε` of path `p`.

use nalgebra::DMatrix;
use ndarray::{s, Array2, Array3, Axis};
use rayon::prelude::*;
use tracing::debug;

use strike_math::linear_algebra::correlation_cholesky;

use crate::config::McConfig;
use crate::error::{McError, McResult};
use crate::payoff::{PathPayoff, Walker};
use crate::rng::{fill_standard_normal, path_rng};

/// Correlated multi-asset GBM.
#[derive(Debug, Clone)]
pub struct CorrelatedGbm {
    spots: Vec<f64>,
    drifts: Vec<f64>,
    vols: Vec<f64>,
    cholesky: DMatrix<f64>,
}

impl CorrelatedGbm {
    /// Creates the model from per-asset spots, drifts and vols plus an
    /// `n × n` correlation matrix.
    pub fn new(spots: Vec<f64>, drifts: Vec<f64>, vols: Vec<f64>, correlation: &DMatrix<f64>) -> McResult<Self> {
        let n = spots.len();
        if n == 0 {
            return Err(McError::invalid_input("need at least one asset"));
        }
        for (what, got) in [("drifts", drifts.len()), ("vols", vols.len()), ("correlation", correlation.nrows())] {
            if got != n {
                return Err(McError::DimensionMismatch { what, expected: n, got });
            }
        }
        if let Some(s) = spots.iter().find(|s| !(s.is_finite() && **s > 0.0)) {
            return Err(McError::invalid_input(format!("spot prices must be positive, got {s}")));
        }
        if let Some(v) = vols.iter().find(|v| !(v.is_finite() && **v >= 0.0)) {
            return Err(McError::invalid_input(format!("vols must be non-negative, got {v}")));
        }
        if let Some(m) = drifts.iter().find(|m| !m.is_finite()) {
            return Err(McError::invalid_input(format!("drifts must be finite, got {m}")));
        }
        let cholesky = correlation_cholesky(correlation)?;
        Ok(Self {
            spots,
            drifts,
            vols,
            cholesky,
        })
    }

    /// Number of assets.
    pub fn num_assets(&self) -> usize {
        self.spots.len()
    }

    /// Initial prices.
    pub fn spots(&self) -> &[f64] {
        &self.spots
    }

    /// Simulates `config.num_steps` equal steps up to `horizon` years.
    ///
    /// Returns `[total_paths, num_steps + 1, num_assets]`.
    pub fn simulate(&self, horizon: f64, config: &McConfig) -> McResult<Array3<f64>> {
        config.validate()?;
        if !(horizon.is_finite() && horizon >= 0.0) {
            return Err(McError::invalid_input(format!("horizon must be non-negative, got {horizon}")));
        }
        let dt = horizon / config.num_steps as f64;
        Ok(self.run(&vec![dt; config.num_steps], config))
    }

    /// Simulates on an explicit grid of strictly increasing times after
    /// the start; `config.num_steps` is ignored.
    ///
    /// Returns `[total_paths, times.len() + 1, num_assets]`.
    pub fn simulate_on_grid(&self, times: &[f64], config: &McConfig) -> McResult<Array3<f64>> {
        if config.num_paths == 0 {
            return Err(McError::invalid_input("need at least one path"));
        }
        let dts = grid_steps(times)?;
        Ok(self.run(&dts, config))
    }

    fn run(&self, dts: &[f64], config: &McConfig) -> Array3<f64> {
        let n = self.num_assets();
        let steps = dts.len();
        let paths = config.num_paths;
        debug!(
            assets = n,
            paths = config.total_paths(),
            steps,
            seed = config.seed,
            antithetic = config.antithetic,
            "simulating GBM paths"
        );

        let (drift, diffusion) = self.increments(dts);

        let generated: Vec<(Array2<f64>, Option<Array2<f64>>)> = (0..paths)
            .into_par_iter()
            .map(|p| self.path_pair(p, config, &drift, &diffusion))
            .collect();

        let mut out = Array3::<f64>::zeros((config.total_paths(), steps + 1, n));
        for (p, (path, mirror)) in generated.into_iter().enumerate() {
            out.slice_mut(s![p, .., ..]).assign(&path);
            if let Some(mirror) = mirror {
                out.slice_mut(s![p + paths, .., ..]).assign(&mirror);
            }
        }
        out
    }

    fn path_pair(
        &self,
        p: usize,
        config: &McConfig,
        drift: &[Vec<f64>],
        diffusion: &[Vec<f64>],
    ) -> (Array2<f64>, Option<Array2<f64>>) {
        let n = self.num_assets();
        let steps = drift.len();
        let mut rng = path_rng(config.seed, p);
        let mut z = vec![0.0; n];
        let mut eps = vec![0.0; n];

        let mut path = Array2::<f64>::zeros((steps + 1, n));
        let mut mirror = config.antithetic.then(|| Array2::<f64>::zeros((steps + 1, n)));
        let mut s = self.spots.clone();
        let mut m = self.spots.clone();
        path.row_mut(0).assign(&ndarray::aview1(&s));
        if let Some(mirror) = mirror.as_mut() {
            mirror.row_mut(0).assign(&ndarray::aview1(&m));
        }

        for k in 0..steps {
            fill_standard_normal(&mut rng, &mut z);
            self.correlate(&z, &mut eps);
            for i in 0..n {
                let shock = diffusion[k][i] * eps[i];
                s[i] *= (drift[k][i] + shock).exp();
                path[[k + 1, i]] = s[i];
                if let Some(mirror) = mirror.as_mut() {
                    m[i] *= (drift[k][i] - shock).exp();
                    mirror[[k + 1, i]] = m[i];
                }
            }
        }
        (path, mirror)
    }

    /// Streams every path on `times` through `payoff` without storing the
    /// path tensor.
    ///
    /// Returns one value per path in the `[draws.., mirrors..]` layout of
    /// [`simulate`](Self::simulate), with the same random drivers. A path
    /// stops as soon as the payoff breaks out of it.
    pub fn evaluate_on_grid<P>(&self, times: &[f64], config: &McConfig, payoff: &P) -> McResult<Vec<f64>>
    where
        P: PathPayoff + Sync,
    {
        if config.num_paths == 0 {
            return Err(McError::invalid_input("need at least one path"));
        }
        let dts = grid_steps(times)?;
        let (drift, diffusion) = self.increments(&dts);
        debug!(
            assets = self.num_assets(),
            paths = config.total_paths(),
            steps = dts.len(),
            seed = config.seed,
            antithetic = config.antithetic,
            "evaluating GBM path payoffs"
        );

        let pairs: Vec<(f64, Option<f64>)> = (0..config.num_paths)
            .into_par_iter()
            .map(|p| self.evaluate_pair(p, config, &drift, &diffusion, payoff))
            .collect();

        let mut values = Vec::with_capacity(config.total_paths());
        values.extend(pairs.iter().map(|(draw, _)| *draw));
        values.extend(pairs.iter().filter_map(|(_, mirror)| *mirror));
        Ok(values)
    }

    fn evaluate_pair<P: PathPayoff>(
        &self,
        p: usize,
        config: &McConfig,
        drift: &[Vec<f64>],
        diffusion: &[Vec<f64>],
        payoff: &P,
    ) -> (f64, Option<f64>) {
        let n = self.num_assets();
        let mut rng = path_rng(config.seed, p);
        let mut z = vec![0.0; n];
        let mut eps = vec![0.0; n];
        let mut draw = Walker::new(payoff, &self.spots);
        let mut mirror = config.antithetic.then(|| Walker::new(payoff, &self.spots));

        for k in 0..drift.len() {
            if draw.is_done() && mirror.as_ref().map_or(true, Walker::is_done) {
                break;
            }
            fill_standard_normal(&mut rng, &mut z);
            self.correlate(&z, &mut eps);
            draw.step(payoff, k + 1, &drift[k], &diffusion[k], &eps, 1.0);
            if let Some(mirror) = mirror.as_mut() {
                mirror.step(payoff, k + 1, &drift[k], &diffusion[k], &eps, -1.0);
            }
        }
        (draw.finish(payoff), mirror.map(|m| m.finish(payoff)))
    }

    fn increments(&self, dts: &[f64]) -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
        let drift = dts
            .iter()
            .map(|dt| {
                self.drifts
                    .iter()
                    .zip(&self.vols)
                    .map(|(mu, sigma)| (mu - 0.5 * sigma * sigma) * dt)
                    .collect()
            })
            .collect();
        let diffusion = dts
            .iter()
            .map(|dt| self.vols.iter().map(|sigma| sigma * dt.sqrt()).collect())
            .collect();
        (drift, diffusion)
    }

    #[inline]
    fn correlate(&self, z: &[f64], eps: &mut [f64]) {
        for i in 0..eps.len() {
            eps[i] = (0..=i).map(|j| self.cholesky[(i, j)] * z[j]).sum();
        }
    }
}

/// Single-asset GBM.
#[derive(Debug, Clone)]
pub struct Gbm {
    inner: CorrelatedGbm,
}

impl Gbm {
    /// Creates the model; under the risk-neutral measure `drift = r − q`.
    pub fn new(spot: f64, drift: f64, vol: f64) -> McResult<Self> {
        let inner = CorrelatedGbm::new(vec![spot], vec![drift], vec![vol], &DMatrix::identity(1, 1))?;
        Ok(Self { inner })
    }

    /// Simulates equal steps up to `horizon`; returns `[total_paths, num_steps + 1]`.
    pub fn simulate(&self, horizon: f64, config: &McConfig) -> McResult<Array2<f64>> {
        Ok(self.inner.simulate(horizon, config)?.index_axis_move(Axis(2), 0))
    }

    /// Simulates on an explicit time grid; returns `[total_paths, times.len() + 1]`.
    pub fn simulate_on_grid(&self, times: &[f64], config: &McConfig) -> McResult<Array2<f64>> {
        Ok(self.inner.simulate_on_grid(times, config)?.index_axis_move(Axis(2), 0))
    }

    /// Streams paths through `payoff`; see [`CorrelatedGbm::evaluate_on_grid`].
    pub fn evaluate_on_grid<P>(&self, times: &[f64], config: &McConfig, payoff: &P) -> McResult<Vec<f64>>
    where
        P: PathPayoff + Sync,
    {
        self.inner.evaluate_on_grid(times, config, payoff)
    }
}

fn grid_steps(times: &[f64]) -> McResult<Vec<f64>> {
    if times.is_empty() {
        return Err(McError::invalid_input("time grid is empty"));
    }
    let mut prev = 0.0;
    let mut dts = Vec::with_capacity(times.len());
    for &t in times {
        if !(t.is_finite() && t > prev) {
            return Err(McError::invalid_input(format!(
                "time grid must be positive and strictly increasing, got {t} after {prev}"
            )));
        }
        dts.push(t - prev);
        prev = t;
    }
    Ok(dts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use strike_math::linear_algebra::constant_correlation;

    fn two_assets(rho: f64) -> CorrelatedGbm {
        CorrelatedGbm::new(
            vec![100.0, 50.0],
            vec![0.03, 0.01],
            vec![0.2, 0.4],
            &constant_correlation(2, rho).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_shape_and_start() {
        let paths = two_assets(0.5).simulate(1.0, &McConfig::new(10, 12, 1)).unwrap();
        assert_eq!(paths.dim(), (20, 13, 2));
        for p in 0..20 {
            assert_eq!(paths[[p, 0, 0]], 100.0);
            assert_eq!(paths[[p, 0, 1]], 50.0);
        }
    }

    #[test]
    fn test_zero_horizon_is_flat() {
        let paths = two_assets(0.0).simulate(0.0, &McConfig::new(4, 3, 1)).unwrap();
        assert!(paths.slice(s![.., .., 0]).iter().all(|x| *x == 100.0));
    }

    #[test]
    fn test_zero_vol_is_deterministic() {
        let gbm = Gbm::new(100.0, 0.05, 0.0).unwrap();
        let paths = gbm.simulate(2.0, &McConfig::new(3, 8, 9)).unwrap();
        for p in 0..6 {
            assert_relative_eq!(paths[[p, 8]], 100.0 * (0.1_f64).exp(), epsilon = 1e-10);
        }
    }

    #[test]
    fn test_correlated_shocks() {
        let config = McConfig::new(20_000, 1, 5).with_antithetic(false);
        let paths = two_assets(0.7).simulate(1.0, &config).unwrap();
        let x: Vec<f64> = (0..20_000).map(|p| (paths[[p, 1, 0]] / 100.0).ln()).collect();
        let y: Vec<f64> = (0..20_000).map(|p| (paths[[p, 1, 1]] / 50.0).ln()).collect();
        let mean = |v: &[f64]| v.iter().sum::<f64>() / v.len() as f64;
        let (mx, my) = (mean(&x), mean(&y));
        let cov: f64 = x.iter().zip(&y).map(|(a, b)| (a - mx) * (b - my)).sum::<f64>() / 20_000.0;
        let sx = (x.iter().map(|a| (a - mx) * (a - mx)).sum::<f64>() / 20_000.0).sqrt();
        let sy = (y.iter().map(|b| (b - my) * (b - my)).sum::<f64>() / 20_000.0).sqrt();
        assert_relative_eq!(cov / (sx * sy), 0.7, epsilon = 0.02);
        assert_relative_eq!(sx, 0.2, epsilon = 0.005);
    }

    #[test]
    fn test_validation() {
        let corr = constant_correlation(2, 0.0).unwrap();
        assert!(CorrelatedGbm::new(vec![100.0, -1.0], vec![0.0; 2], vec![0.2; 2], &corr).is_err());
        assert!(matches!(
            CorrelatedGbm::new(vec![100.0; 2], vec![0.0; 3], vec![0.2; 2], &corr),
            Err(McError::DimensionMismatch { what: "drifts", .. })
        ));
        let asymmetric = DMatrix::from_row_slice(2, 2, &[1.0, 0.3, 0.2, 1.0]);
        assert!(matches!(
            CorrelatedGbm::new(vec![100.0; 2], vec![0.0; 2], vec![0.2; 2], &asymmetric),
            Err(McError::Math(_))
        ));
        let not_unit = DMatrix::from_row_slice(2, 2, &[2.0, 0.0, 0.0, 1.0]);
        assert!(CorrelatedGbm::new(vec![100.0; 2], vec![0.0; 2], vec![0.2; 2], &not_unit).is_err());
        let gbm = Gbm::new(100.0, 0.0, 0.2).unwrap();
        assert!(gbm.simulate(-1.0, &McConfig::default()).is_err());
        assert!(gbm.simulate_on_grid(&[0.5, 0.5], &McConfig::default()).is_err());
    }

    #[test]
    fn test_grid_matches_uniform_steps() {
        let gbm = Gbm::new(100.0, 0.02, 0.3).unwrap();
        let config = McConfig::new(8, 4, 77);
        let uniform = gbm.simulate(1.0, &config).unwrap();
        let grid = gbm.simulate_on_grid(&[0.25, 0.5, 0.75, 1.0], &config).unwrap();
        for (a, b) in uniform.iter().zip(grid.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-12);
        }
    }
}
