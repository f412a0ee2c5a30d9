//! Normalized amplitude distribution over decision paths.

use std::collections::BTreeMap;

use num_complex::Complex64;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::linalg::ComplexMatrix;

use super::error::ReasoningError;
use super::path::DecisionPath;

/// Maximum deviation of `Σ|amplitude|²` from 1 before renormalizing.
pub const NORMALIZATION_TOLERANCE: f64 = 1e-10;

/// Snapshot taken after each evolution step.
#[derive(Debug, Clone)]
pub struct EvolutionRecord {
    pub amplitudes: BTreeMap<DecisionPath, Complex64>,
    pub timestamp: f64,
}

/// Complex amplitudes over [`DecisionPath`]s.
///
/// # Invariants
///
/// - `Σ|amplitude|² = 1` (within [`NORMALIZATION_TOLERANCE`]) after every
///   mutation, unless the state is empty
/// - Paths are kept ordered by id, which fixes the basis order used by
///   [`evolve`](Self::evolve) and [`state_vector`](Self::state_vector)
///
/// The evolution history is append-only and never trimmed.
#[derive(Debug, Clone, Default)]
pub struct QuantumReasoningState {
    amplitudes: BTreeMap<DecisionPath, Complex64>,
    history: Vec<EvolutionRecord>,
}

impl QuantumReasoningState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.amplitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amplitudes.is_empty()
    }

    /// Iterates paths in id order.
    pub fn paths(&self) -> impl Iterator<Item = &DecisionPath> {
        self.amplitudes.keys()
    }

    pub fn amplitude(&self, path: &DecisionPath) -> Option<Complex64> {
        self.amplitudes.get(path).copied()
    }

    pub fn history(&self) -> &[EvolutionRecord] {
        &self.history
    }

    /// `Σ|amplitude|²`.
    pub fn total_probability(&self) -> f64 {
        self.amplitudes.values().map(|a| a.norm_sqr()).sum()
    }

    /// Rescales amplitudes to unit total probability.
    ///
    /// A state whose amplitudes all vanish is reset to the uniform
    /// superposition over its paths.
    fn normalize(&mut self) {
        if self.amplitudes.is_empty() {
            return;
        }
        let total = self.total_probability();
        if !total.is_finite() || total <= f64::MIN_POSITIVE {
            let uniform = Complex64::new(1.0 / (self.amplitudes.len() as f64).sqrt(), 0.0);
            self.amplitudes.values_mut().for_each(|a| *a = uniform);
            return;
        }
        if (total - 1.0).abs() > NORMALIZATION_TOLERANCE {
            let factor = 1.0 / total.sqrt();
            self.amplitudes.values_mut().for_each(|a| *a *= factor);
        }
    }

    /// Inserts or overwrites `path` and renormalizes the whole state.
    pub fn add_decision_path(&mut self, path: DecisionPath, amplitude: impl Into<Complex64>) {
        // Re-inserting replaces the stored key too, so its metadata is current.
        self.amplitudes.remove(&path);
        self.amplitudes.insert(path, amplitude.into());
        self.normalize();
    }

    /// Applies `hamiltonian` to the state vector (paths in id order).
    ///
    /// A Hamiltonian smaller than the state is padded with an identity block;
    /// a larger one acts on the state extended with zero amplitudes and the
    /// extra components are dropped. Empty states and empty Hamiltonians are
    /// no-ops.
    ///
    /// # Errors
    ///
    /// [`ReasoningError::Shape`] if `hamiltonian` is not square.
    pub fn evolve(&mut self, hamiltonian: &ComplexMatrix) -> Result<(), ReasoningError> {
        if self.amplitudes.is_empty() || hamiltonian.is_empty() {
            return Ok(());
        }
        let dim = hamiltonian.dim()?;
        let n = self.amplitudes.len().max(dim);

        let operator = hamiltonian.pad_with_identity(n);
        let mut vector = self.state_vector();
        vector.resize(n, Complex64::new(0.0, 0.0));
        let evolved = operator.mul_vec(&vector)?;

        for (amplitude, value) in self.amplitudes.values_mut().zip(evolved) {
            *amplitude = value;
        }
        self.history.push(EvolutionRecord {
            amplitudes: self.amplitudes.clone(),
            timestamp: super::now_timestamp(),
        });
        self.normalize();
        Ok(())
    }

    /// Samples one path with probability `|amplitude|²` and collapses the
    /// state onto it.
    ///
    /// # Errors
    ///
    /// [`ReasoningError::EmptyState`] if there are no paths.
    pub fn measure<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<DecisionPath, ReasoningError> {
        if self.amplitudes.is_empty() {
            return Err(ReasoningError::EmptyState);
        }
        let paths: Vec<&DecisionPath> = self.amplitudes.keys().collect();
        let weights: Vec<f64> = self.amplitudes.values().map(|a| a.norm_sqr()).collect();

        let selected = match WeightedIndex::new(&weights) {
            Ok(dist) => paths[dist.sample(rng)].clone(),
            // Normalization keeps weights positive; fall back to the first path.
            Err(_) => paths[0].clone(),
        };

        self.amplitudes.clear();
        self.amplitudes
            .insert(selected.clone(), Complex64::new(1.0, 0.0));
        Ok(selected)
    }

    /// Probability of each path.
    pub fn probabilities(&self) -> BTreeMap<DecisionPath, f64> {
        self.amplitudes
            .iter()
            .map(|(p, a)| (p.clone(), a.norm_sqr()))
            .collect()
    }

    /// Probability of `path`, 0 if it is not part of the state.
    pub fn probability_of(&self, path: &DecisionPath) -> f64 {
        self.amplitudes.get(path).map_or(0.0, |a| a.norm_sqr())
    }

    /// Amplitudes in path-id order.
    pub fn state_vector(&self) -> Vec<Complex64> {
        self.amplitudes.values().copied().collect()
    }
}
