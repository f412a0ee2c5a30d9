//! Configuration for the QAOA optimizer.

/// Circuit depth and gradient-descent tuning of [`super::QaoaOptimizer`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct QaoaConfig {
    /// Number of phase/mixer layer pairs `p`.
    pub p_steps: usize,
    pub learning_rate: f64,
    pub max_iterations: usize,
    /// Stop once the energy changes by less than this between iterations.
    pub convergence_threshold: f64,
    /// Step of the central finite difference.
    pub gradient_epsilon: f64,
    /// Gradient components are clipped to `[-max_gradient, max_gradient]`.
    pub max_gradient: f64,
    /// Seed for the initial angles; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for QaoaConfig {
    fn default() -> Self {
        Self {
            p_steps: 2,
            learning_rate: 0.1,
            max_iterations: 100,
            convergence_threshold: 1e-5,
            gradient_epsilon: 1e-4,
            max_gradient: 1.0,
            seed: None,
        }
    }
}

impl QaoaConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
