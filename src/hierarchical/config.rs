//! Configuration for the hierarchical composer.

use std::time::Duration;

/// Global tuning of [`super::HierarchicalQubo`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct HierarchicalConfig {
    /// Multiplier applied to every connection weight.
    pub inter_level_weight: f64,
    /// Penalty scale of `(x - target)²` for constrained variables.
    pub constraint_weight: f64,
    /// A flip must lower the energy by more than this to be kept.
    pub convergence_threshold: f64,
    /// Upper bound on local-search sweeps.
    pub max_iterations: usize,
    /// Wall-clock limit for an external solver submission.
    pub submission_timeout: Duration,
    /// Seed for the random part of the starting point; `None` draws from
    /// entropy.
    pub seed: Option<u64>,
}

impl Default for HierarchicalConfig {
    fn default() -> Self {
        Self {
            inter_level_weight: 0.5,
            constraint_weight: 10.0,
            convergence_threshold: 1e-6,
            max_iterations: 1000,
            submission_timeout: Duration::from_secs(300),
            seed: None,
        }
    }
}

impl HierarchicalConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = HierarchicalConfig::default();
        assert_eq!(cfg.inter_level_weight, 0.5);
        assert_eq!(cfg.constraint_weight, 10.0);
        assert_eq!(cfg.max_iterations, 1000);
    }
}
