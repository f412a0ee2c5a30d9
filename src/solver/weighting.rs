//! Position weights derived from a reasoning state.

use crate::linalg::QuboMatrix;
use crate::qubo::QuboTerm;
use crate::reasoning::QuantumReasoningState;

/// Action prefix that ties a decision path to a schedule position.
pub const SCHEDULE_ACTION_PREFIX: &str = "schedule_";

/// Parses `"schedule_<position>"`.
pub fn schedule_position(action: &str) -> Option<usize> {
    action.strip_prefix(SCHEDULE_ACTION_PREFIX)?.parse().ok()
}

/// Per-position weights in `[0, 1]`, normalized by their maximum.
#[derive(Debug, Clone, PartialEq)]
pub struct ReasoningWeights {
    weights: Vec<f64>,
}

impl ReasoningWeights {
    /// Sums the probability of every path whose actions name a schedule
    /// position below `horizon`, then normalizes by the largest sum.
    ///
    /// Positions nobody votes for weigh 0.
    pub fn from_state(state: &QuantumReasoningState, horizon: usize) -> Self {
        let mut weights = vec![0.0; horizon];
        for (path, probability) in state.probabilities() {
            for position in path.actions.iter().filter_map(|a| schedule_position(a)) {
                if let Some(w) = weights.get_mut(position) {
                    *w += probability;
                }
            }
        }

        let max = weights.iter().copied().fold(0.0, f64::max);
        if max > 0.0 {
            weights.iter_mut().for_each(|w| *w /= max);
        }
        Self { weights }
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.weights
    }

    /// Mean normalized weight, 0 without positions.
    pub fn influence(&self) -> f64 {
        if self.weights.is_empty() {
            0.0
        } else {
            self.weights.iter().sum::<f64>() / self.weights.len() as f64
        }
    }

    /// Position-decay base weight: 1 on the diagonal, `exp(-|i - j|)` off it.
    pub fn base_weight(i: usize, j: usize) -> f64 {
        if i == j {
            1.0
        } else {
            (-(i.abs_diff(j) as f64)).exp()
        }
    }

    /// Reasoning factor: `w_i` on the diagonal, `-0.5 · w_i · w_j` off it.
    pub fn factor(&self, i: usize, j: usize) -> f64 {
        let wi = self.weights.get(i).copied().unwrap_or(0.0);
        if i == j {
            wi
        } else {
            let wj = self.weights.get(j).copied().unwrap_or(0.0);
            -0.5 * wi * wj
        }
    }

    /// Combined weight of position pair `(i, j)`: base minus reasoning factor.
    ///
    /// Favoured positions get cheaper diagonals, while pairs of favoured
    /// positions are pushed apart.
    pub fn term_weight(&self, i: usize, j: usize) -> f64 {
        Self::base_weight(i, j) - self.factor(i, j)
    }

    /// Symmetric `horizon x horizon` matrix of [`term_weight`](Self::term_weight).
    pub fn matrix(&self) -> QuboMatrix {
        let n = self.weights.len();
        let mut q = QuboMatrix::square(n);
        for i in 0..n {
            for j in 0..n {
                q[(i, j)] = self.term_weight(i, j);
            }
        }
        q
    }

    /// Upper-triangle terms whose energy equals `xᵀ M x` for [`matrix`](Self::matrix).
    pub fn terms(&self) -> Vec<QuboTerm> {
        let n = self.weights.len();
        let mut terms = Vec::with_capacity(n * (n + 1) / 2);
        for i in 0..n {
            terms.push(QuboTerm::linear(i, self.term_weight(i, i)));
            for j in i + 1..n {
                terms.push(QuboTerm::quadratic(i, j, 2.0 * self.term_weight(i, j)));
            }
        }
        terms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qubo::{energy, to_matrix};
    use crate::reasoning::DecisionPath;

    fn state_with(actions: &[(&str, f64)]) -> QuantumReasoningState {
        let mut state = QuantumReasoningState::new();
        for (i, (action, amplitude)) in actions.iter().enumerate() {
            state.add_decision_path(
                DecisionPath::new(format!("p{i}"), 0.0, vec![action.to_string()]),
                *amplitude,
            );
        }
        state
    }

    #[test]
    fn parses_schedule_actions() {
        assert_eq!(schedule_position("schedule_12"), Some(12));
        assert_eq!(schedule_position("schedule_x"), None);
        assert_eq!(schedule_position("retry"), None);
    }

    #[test]
    fn empty_state_has_no_influence() {
        let weights = ReasoningWeights::from_state(&QuantumReasoningState::new(), 3);
        assert_eq!(weights.as_slice(), &[0.0, 0.0, 0.0]);
        assert_eq!(weights.influence(), 0.0);
        assert_eq!(weights.term_weight(0, 0), 1.0);
        assert!((weights.term_weight(0, 2) - (-2.0f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn weights_normalize_by_max() {
        let state = state_with(&[("schedule_0", 2.0), ("schedule_1", 1.0), ("other", 1.0)]);
        let weights = ReasoningWeights::from_state(&state, 3);
        assert!((weights.as_slice()[0] - 1.0).abs() < 1e-12);
        assert!((weights.as_slice()[1] - 0.25).abs() < 1e-12);
        assert_eq!(weights.as_slice()[2], 0.0);
        assert!((weights.influence() - 1.25 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn positions_beyond_horizon_are_ignored() {
        let state = state_with(&[("schedule_5", 1.0)]);
        let weights = ReasoningWeights::from_state(&state, 2);
        assert_eq!(weights.influence(), 0.0);
    }

    #[test]
    fn factor_lowers_diagonal_and_repels_pairs() {
        let state = state_with(&[("schedule_0", 1.0), ("schedule_1", 1.0)]);
        let weights = ReasoningWeights::from_state(&state, 2);
        assert!((weights.term_weight(0, 0) - 0.0).abs() < 1e-12);
        let expected = (-1.0f64).exp() + 0.5;
        assert!((weights.term_weight(0, 1) - expected).abs() < 1e-12);
    }

    #[test]
    fn terms_match_matrix_energy() {
        let state = state_with(&[("schedule_0", 1.0), ("schedule_2", 0.5)]);
        let weights = ReasoningWeights::from_state(&state, 3);
        let q = weights.matrix();
        let from_terms = to_matrix(&weights.terms(), 3);
        for bits in [[1u8, 0, 1], [1, 1, 1], [0, 1, 0]] {
            assert!((q.energy(&bits) - energy(&weights.terms(), &bits)).abs() < 1e-12);
            assert!((q.energy(&bits) - from_terms.energy(&bits)).abs() < 1e-12);
        }
    }
}
