//! Simulation run settings.

use serde::{Deserialize, Serialize};

use crate::error::{McError, McResult};

/// Size, seed and variance reduction of one simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct McConfig {
    /// Independent paths drawn. Antithetic runs return twice as many.
    pub num_paths: usize,
    /// Time steps per path on a uniform grid.
    pub num_steps: usize,
    /// Master seed; path `p` uses substream `p` of this seed.
    pub seed: u64,
    /// Append the mirrored path of every draw.
    pub antithetic: bool,
}

impl Default for McConfig {
    fn default() -> Self {
        Self {
            num_paths: 10_000,
            num_steps: 252,
            seed: 42,
            antithetic: true,
        }
    }
}

impl McConfig {
    /// Creates settings for `num_paths` paths of `num_steps` steps.
    pub fn new(num_paths: usize, num_steps: usize, seed: u64) -> Self {
        Self {
            num_paths,
            num_steps,
            seed,
            antithetic: true,
        }
    }

    /// Enables or disables antithetic pairing.
    #[must_use]
    pub fn with_antithetic(mut self, antithetic: bool) -> Self {
        self.antithetic = antithetic;
        self
    }

    /// Paths in the output, counting mirrored paths.
    pub fn total_paths(&self) -> usize {
        if self.antithetic {
            2 * self.num_paths
        } else {
            self.num_paths
        }
    }

    /// Checks the run has at least one path and one step.
    pub fn validate(&self) -> McResult<()> {
        if self.num_paths == 0 || self.num_steps == 0 {
            return Err(McError::invalid_input(format!(
                "need at least one path and one step, got {} paths and {} steps",
                self.num_paths, self.num_steps
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_paths() {
        let config = McConfig::new(100, 12, 7);
        assert_eq!(config.total_paths(), 200);
        assert_eq!(config.with_antithetic(false).total_paths(), 100);
        assert!(McConfig::new(0, 12, 7).validate().is_err());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: McConfig = serde_json::from_str(r#"{"seed": 1234}"#).unwrap();
        assert_eq!(config.seed, 1234);
        assert_eq!(config.num_paths, McConfig::default().num_paths);
    }
}
