//! Configuration for the reasoning learner.

/// Tuning of [`super::QuantumReact`] weight learning.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct ReactConfig {
    /// Relative weight change per reported outcome.
    pub learning_rate: f64,
    /// Lower bound applied to an action weight after each adjustment.
    pub min_weight: f64,
}

impl Default for ReactConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.2,
            min_weight: 0.1,
        }
    }
}
