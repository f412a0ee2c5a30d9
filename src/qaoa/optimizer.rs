//! Gradient-descent QAOA over a simulated statevector.

use std::f64::consts::PI;

use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::linalg::QuboMatrix;

use super::circuit::{apply_layers, basis_bits, expectation, qubit_count, uniform_superposition};
use super::config::QaoaConfig;
use super::error::QaoaError;

/// Circuit angles, one pair per layer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct QaoaParameters {
    pub gamma: Vec<f64>,
    pub beta: Vec<f64>,
}

/// Outcome of one [`QaoaOptimizer::optimize`] call.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct OptimizationResult {
    /// One-hot vector over the `2ⁿ` basis states.
    pub solution: Vec<u8>,
    /// Index of the set entry of `solution`.
    pub basis_state: usize,
    /// Problem bits of `basis_state`.
    pub bits: Vec<u8>,
    /// Lowest expectation value reached, including the initial state.
    pub energy: f64,
    /// `⟨k|H|k⟩` of the measured basis state.
    pub solution_energy: f64,
    pub parameters: QaoaParameters,
    /// True if the energy converged before `max_iterations`.
    pub success: bool,
    pub iterations: usize,
    /// Expectation value after each iteration.
    pub history: Vec<f64>,
}

/// QAOA optimizer with a persistent result history.
///
/// Each iteration applies `p` phase/mixer layers to the current state and
/// measures `Re(⟨ψ|H|ψ⟩)`. Angles are updated by clipped central-difference
/// gradients computed against the iteration's input state. The phase
/// separator uses only the diagonal of the Hamiltonian.
///
/// # Example
///
/// ```
/// use qam::linalg::QuboMatrix;
/// use qam::qaoa::{diagonal_hamiltonian, QaoaConfig, QaoaOptimizer};
///
/// let q = QuboMatrix::from_rows(vec![vec![-1.0, 2.0], vec![0.0, -1.0]]).unwrap();
/// let h = diagonal_hamiltonian(&q).unwrap();
///
/// let mut optimizer = QaoaOptimizer::new(QaoaConfig::default().with_seed(7));
/// let result = optimizer.optimize(&h, None).unwrap();
/// assert_eq!(result.solution.iter().filter(|&&b| b == 1).count(), 1);
/// assert_eq!(optimizer.optimization_history().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct QaoaOptimizer {
    config: QaoaConfig,
    history: Vec<OptimizationResult>,
    rng: StdRng,
}

impl Default for QaoaOptimizer {
    fn default() -> Self {
        Self::new(QaoaConfig::default())
    }
}

fn rng_for(config: &QaoaConfig) -> StdRng {
    config
        .seed
        .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64)
}

impl QaoaOptimizer {
    pub fn new(config: QaoaConfig) -> Self {
        let rng = rng_for(&config);
        Self {
            config,
            history: Vec::new(),
            rng,
        }
    }

    pub fn config(&self) -> &QaoaConfig {
        &self.config
    }

    /// Replaces the configuration. A configured seed restarts the RNG.
    pub fn set_config(&mut self, config: QaoaConfig) {
        if config.seed.is_some() {
            self.rng = rng_for(&config);
        }
        self.config = config;
    }

    /// Every result produced by this instance, oldest first.
    pub fn optimization_history(&self) -> &[OptimizationResult] {
        &self.history
    }

    /// Minimizes `⟨ψ|H|ψ⟩` and measures the most probable basis state whose
    /// energy is at most the initial expectation.
    ///
    /// `initial_state` defaults to the uniform superposition and is
    /// normalized before use.
    ///
    /// # Errors
    ///
    /// - [`QaoaError::Shape`] if `hamiltonian` is not square or its side is
    ///   not a power of two
    /// - [`QaoaError::InitialState`] if `initial_state` has the wrong length
    pub fn optimize(
        &mut self,
        hamiltonian: &QuboMatrix,
        initial_state: Option<&[Complex64]>,
    ) -> Result<OptimizationResult, QaoaError> {
        let dim = hamiltonian.dim()?;
        let n_qubits = qubit_count(dim)?;
        let mut state = match initial_state {
            Some(s) if s.len() != dim => {
                return Err(QaoaError::InitialState {
                    expected: dim,
                    found: s.len(),
                })
            }
            Some(s) => normalized(s).unwrap_or_else(|| uniform_superposition(n_qubits)),
            None => uniform_superposition(n_qubits),
        };

        let p = self.config.p_steps;
        let mut params = QaoaParameters {
            gamma: (0..p).map(|_| self.rng.gen_range(0.0..2.0 * PI)).collect(),
            beta: (0..p).map(|_| self.rng.gen_range(0.0..PI)).collect(),
        };
        let diagonal = hamiltonian.diagonal();

        let initial_energy = expectation(&state, hamiltonian);
        let mut best_energy = initial_energy;
        let mut best_state = state.clone();
        let mut history = Vec::new();
        let mut success = false;

        for _ in 0..self.config.max_iterations {
            let evolved = apply_layers(&state, &diagonal, &params.gamma, &params.beta);
            let energy = expectation(&evolved, hamiltonian);
            let previous = history.last().copied();
            history.push(energy);

            if energy < best_energy {
                best_energy = energy;
                best_state.clone_from(&evolved);
            }
            if previous.is_some_and(|e: f64| (energy - e).abs() < self.config.convergence_threshold) {
                success = true;
                break;
            }

            params = self.update_parameters(&state, &diagonal, hamiltonian, params);
            state = evolved;
        }

        let basis_state = measure(&best_state, &diagonal, initial_energy);
        let mut solution = vec![0u8; dim];
        solution[basis_state] = 1;

        let result = OptimizationResult {
            solution,
            basis_state,
            bits: basis_bits(basis_state, n_qubits),
            energy: best_energy,
            solution_energy: diagonal[basis_state],
            parameters: params,
            success,
            iterations: history.len(),
            history,
        };
        tracing::debug!(
            qubits = n_qubits,
            iterations = result.iterations,
            energy = result.energy,
            converged = result.success,
            "QAOA finished"
        );
        self.history.push(result.clone());
        Ok(result)
    }

    fn update_parameters(
        &self,
        state: &[Complex64],
        diagonal: &[f64],
        hamiltonian: &QuboMatrix,
        params: QaoaParameters,
    ) -> QaoaParameters {
        let eps = self.config.gradient_epsilon;
        let clip = self.config.max_gradient;
        let energy_at = |gamma: &[f64], beta: &[f64]| {
            expectation(&apply_layers(state, diagonal, gamma, beta), hamiltonian)
        };

        let mut gamma = params.gamma.clone();
        let mut beta = params.beta.clone();
        for layer in 0..params.gamma.len() {
            let mut plus = params.gamma.clone();
            let mut minus = params.gamma.clone();
            plus[layer] += eps;
            minus[layer] -= eps;
            let grad = (energy_at(&plus, &params.beta) - energy_at(&minus, &params.beta)) / (2.0 * eps);
            gamma[layer] -= self.config.learning_rate * grad.clamp(-clip, clip);

            let mut plus = params.beta.clone();
            let mut minus = params.beta.clone();
            plus[layer] += eps;
            minus[layer] -= eps;
            let grad = (energy_at(&params.gamma, &plus) - energy_at(&params.gamma, &minus)) / (2.0 * eps);
            beta[layer] -= self.config.learning_rate * grad.clamp(-clip, clip);
        }
        QaoaParameters { gamma, beta }
    }
}

fn normalized(state: &[Complex64]) -> Option<Vec<Complex64>> {
    let total: f64 = state.iter().map(|a| a.norm_sqr()).sum();
    if !total.is_finite() || total <= f64::MIN_POSITIVE {
        return None;
    }
    let factor = 1.0 / total.sqrt();
    Some(state.iter().map(|&a| a * factor).collect())
}

/// Index of the most probable basis state among those whose energy does not
/// exceed `ceiling`, the expectation of the initial state. Near-ties go to the
/// lower diagonal energy, then to the lower index.
///
/// For a diagonal Hamiltonian some basis state always lies under the
/// ceiling; otherwise every basis state is eligible.
fn measure(state: &[Complex64], diagonal: &[f64], ceiling: f64) -> usize {
    const TIE: f64 = 1e-12;
    let eligible: Vec<usize> = (0..state.len())
        .filter(|&k| diagonal[k] <= ceiling + 1e-9)
        .collect();
    let candidates = if eligible.is_empty() {
        (0..state.len()).collect()
    } else {
        eligible
    };

    let mut best = candidates[0];
    for &k in &candidates[1..] {
        let (pk, pb) = (state[k].norm_sqr(), state[best].norm_sqr());
        if pk > pb + TIE || ((pk - pb).abs() <= TIE && diagonal[k] < diagonal[best]) {
            best = k;
        }
    }
    best
}
