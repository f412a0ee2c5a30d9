//! Decision paths, decisions and outcomes.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use crate::Id;

/// A candidate action bundle tracked with an amplitude.
///
/// Identity is the `id` alone: equality, hashing and ordering ignore
/// `probability` and `actions`, so a path can be used as a map key.
/// `probability` is informational; the owning state's amplitudes are
/// authoritative.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct DecisionPath {
    pub id: Id,
    pub probability: f64,
    pub actions: Vec<String>,
}

impl DecisionPath {
    pub fn new(id: impl Into<Id>, probability: f64, actions: Vec<String>) -> Self {
        Self {
            id: id.into(),
            probability,
            actions,
        }
    }

    /// Creates a path with a generated id and a single action.
    pub fn for_action(action: impl Into<String>, probability: f64) -> Self {
        Self::new(crate::generate_id(), probability, vec![action.into()])
    }

    /// The first action of the bundle, if any.
    pub fn primary_action(&self) -> Option<&str> {
        self.actions.first().map(String::as_str)
    }
}

impl PartialEq for DecisionPath {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for DecisionPath {}

impl Hash for DecisionPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Ord for DecisionPath {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl PartialOrd for DecisionPath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Input to [`super::QuantumReact::make_decision`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct DecisionContext {
    pub available_actions: Vec<String>,
    /// In `[0, 1]`; scales the rotation angle of the evolution Hamiltonian.
    pub uncertainty: f64,
}

impl DecisionContext {
    pub fn new<I, S>(actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            available_actions: actions.into_iter().map(Into::into).collect(),
            uncertainty: 0.5,
        }
    }

    pub fn with_uncertainty(mut self, uncertainty: f64) -> Self {
        self.uncertainty = uncertainty;
        self
    }
}

/// The collapsed result of a reasoning query.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Decision {
    pub id: Id,
    pub action: String,
    /// Probability of the chosen path just before collapse.
    pub confidence: f64,
    pub path: DecisionPath,
}

/// Feedback about a previously made decision.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Outcome {
    pub decision_id: Id,
    pub success: bool,
    /// Free-form feedback; the `"action"` key names the acted-on action.
    pub feedback: BTreeMap<String, String>,
    pub timestamp: f64,
}

impl Outcome {
    /// Creates an outcome stamped with the current time.
    pub fn new(decision_id: impl Into<Id>, success: bool) -> Self {
        Self {
            decision_id: decision_id.into(),
            success,
            feedback: BTreeMap::new(),
            timestamp: super::now_timestamp(),
        }
    }

    pub fn with_feedback(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.feedback.insert(key.into(), value.into());
        self
    }

    /// The acted-on action named in the feedback.
    pub fn action(&self) -> Option<&str> {
        self.feedback.get("action").map(String::as_str)
    }
}
