//! Configuration for the reasoning-weighted solver.

use std::time::Duration;

/// Tuning of [`super::ReasoningScheduler`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct SolverConfig {
    // --- Candidate search ---
    /// Number of candidate schedules generated per optimization.
    pub max_attempts: usize,
    /// Makespan weight per unit of horizon when solving assignment QUBOs.
    /// Values below 1 keep every assignment cheaper than none.
    pub makespan_weight: f64,

    // --- External solver ---
    /// Wall-clock limit for one external submission.
    pub submission_timeout: Duration,

    // --- Classical fallback ---
    /// Upper bound on greedy bit-flip sweeps.
    pub max_sweeps: usize,

    /// Seed for the solver's RNG; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_attempts: 100,
            makespan_weight: 0.5,
            submission_timeout: Duration::from_secs(300),
            max_sweeps: 1000,
            seed: None,
        }
    }
}

impl SolverConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
