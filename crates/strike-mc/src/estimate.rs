//! Monte Carlo estimates with standard errors.

use serde::{Deserialize, Serialize};

/// Sample mean of discounted payoffs and its standard error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct McEstimate {
    /// Estimated value.
    pub value: f64,
    /// Standard error of `value`.
    pub std_error: f64,
    /// Independent samples behind the estimate.
    pub num_samples: usize,
}

impl McEstimate {
    /// Estimate from independent samples.
    pub fn from_samples(samples: &[f64]) -> Self {
        let n = samples.len();
        if n == 0 {
            return Self {
                value: f64::NAN,
                std_error: f64::NAN,
                num_samples: 0,
            };
        }
        let mean = samples.iter().sum::<f64>() / n as f64;
        let std_error = if n > 1 {
            let var = samples.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / (n - 1) as f64;
            (var / n as f64).sqrt()
        } else {
            0.0
        };
        Self {
            value: mean,
            std_error,
            num_samples: n,
        }
    }

    /// Estimate from an antithetic run laid out as `[draws.., mirrors..]`.
    ///
    /// Each draw is averaged with its mirror first so the error reflects
    /// the pairing.
    pub fn from_antithetic(samples: &[f64]) -> Self {
        let half = samples.len() / 2;
        let pairs: Vec<f64> = (0..half)
            .map(|p| 0.5 * (samples[p] + samples[p + half]))
            .collect();
        Self::from_samples(&pairs)
    }

    /// Scales value and error, e.g. by a discount factor or notional.
    #[must_use]
    pub fn scaled(self, factor: f64) -> Self {
        Self {
            value: self.value * factor,
            std_error: self.std_error * factor.abs(),
            num_samples: self.num_samples,
        }
    }

    /// Whether `x` lies within `k` standard errors of the estimate.
    pub fn contains(&self, x: f64, k: f64) -> bool {
        (x - self.value).abs() <= k * self.std_error
    }
}
