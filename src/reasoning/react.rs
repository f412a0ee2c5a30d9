//! Reward-driven decision learner over a reasoning state.

use std::collections::{BTreeMap, HashMap};

use rand::Rng;

use crate::Id;

use super::config::ReactConfig;
use super::error::ReasoningError;
use super::hamiltonian::{HamiltonianStrategy, RotationHamiltonian};
use super::path::{Decision, DecisionContext, DecisionPath, Outcome};
use super::state::QuantumReasoningState;

/// Learns per-action weights from outcomes and uses them to seed
/// decision paths.
///
/// Unseen actions weigh 1.0. After every adjustment the weights are rescaled
/// so that they sum to the number of known actions.
#[derive(Debug)]
pub struct QuantumReact {
    config: ReactConfig,
    weights: BTreeMap<String, f64>,
    decisions: HashMap<Id, Decision>,
    outcomes: Vec<Outcome>,
    strategy: Box<dyn HamiltonianStrategy>,
}

impl Default for QuantumReact {
    fn default() -> Self {
        Self::new(ReactConfig::default())
    }
}

impl QuantumReact {
    pub fn new(config: ReactConfig) -> Self {
        Self {
            config,
            weights: BTreeMap::new(),
            decisions: HashMap::new(),
            outcomes: Vec::new(),
            strategy: Box::new(RotationHamiltonian),
        }
    }

    /// Replaces the evolution operator used by [`make_decision`](Self::make_decision).
    pub fn with_strategy(mut self, strategy: Box<dyn HamiltonianStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn config(&self) -> &ReactConfig {
        &self.config
    }

    pub fn strategy(&self) -> &dyn HamiltonianStrategy {
        self.strategy.as_ref()
    }

    /// Learned weight of `action`.
    pub fn weight(&self, action: &str) -> f64 {
        self.weights
            .get(action)
            .copied()
            .unwrap_or(1.0)
            .max(self.config.min_weight)
    }

    pub fn weights(&self) -> &BTreeMap<String, f64> {
        &self.weights
    }

    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    pub fn decision(&self, id: &str) -> Option<&Decision> {
        self.decisions.get(id)
    }

    /// Adds one path per available action to `state`, evolves it and
    /// collapses it to a decision.
    ///
    /// Each path starts with probability proportional to the action weight.
    /// The reported confidence is the chosen path's probability right
    /// before collapse.
    ///
    /// # Errors
    ///
    /// - [`ReasoningError::NoActions`] if `context` lists no actions
    /// - [`ReasoningError::Shape`] if the strategy returns a non-square operator
    pub fn make_decision<R: Rng + ?Sized>(
        &mut self,
        context: &DecisionContext,
        state: &mut QuantumReasoningState,
        rng: &mut R,
    ) -> Result<Decision, ReasoningError> {
        if context.available_actions.is_empty() {
            return Err(ReasoningError::NoActions);
        }

        let weights: Vec<f64> = context
            .available_actions
            .iter()
            .map(|a| self.weight(a))
            .collect();
        let total: f64 = weights.iter().sum();

        for (action, w) in context.available_actions.iter().zip(&weights) {
            let probability = w / total;
            state.add_decision_path(
                DecisionPath::for_action(action.clone(), probability),
                probability.sqrt(),
            );
        }

        let hamiltonian = self.strategy.hamiltonian(context, state.len());
        state.evolve(&hamiltonian)?;

        let before = state.probabilities();
        let path = state.measure(rng)?;
        let confidence = before.get(&path).copied().unwrap_or(0.0);

        let decision = Decision {
            id: crate::generate_id(),
            action: path.primary_action().unwrap_or_default().to_string(),
            confidence,
            path,
        };
        tracing::debug!(
            action = %decision.action,
            confidence,
            strategy = self.strategy.name(),
            "reasoning decision"
        );
        self.decisions.insert(decision.id.clone(), decision.clone());
        Ok(decision)
    }

    /// Updates the weight of the acted-on action from `outcome`.
    ///
    /// The action is read from the `"action"` feedback entry, else from the
    /// recorded decision. Outcomes naming neither are only logged.
    pub fn reflect_and_adjust(&mut self, outcome: Outcome) {
        let action = outcome.action().map(str::to_string).or_else(|| {
            self.decisions
                .get(&outcome.decision_id)
                .map(|d| d.action.clone())
        });

        if let Some(action) = action {
            let factor = if outcome.success {
                1.0 + self.config.learning_rate
            } else {
                1.0 - self.config.learning_rate
            };
            let updated = (self.weight(&action) * factor).max(self.config.min_weight);
            self.weights.insert(action, updated);
            self.rescale();
        } else {
            tracing::debug!(decision = %outcome.decision_id, "outcome without a known action");
        }

        self.outcomes.push(outcome);
    }

    fn rescale(&mut self) {
        let total: f64 = self.weights.values().sum();
        if total <= 0.0 {
            return;
        }
        let factor = self.weights.len() as f64 / total;
        self.weights.values_mut().for_each(|w| *w *= factor);
    }
}
