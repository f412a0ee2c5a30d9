//! Quantum-inspired probabilistic reasoning.
//!
//! A [`QuantumReasoningState`] holds complex amplitudes over candidate
//! [`DecisionPath`]s. [`QuantumReact`] turns a set of available actions into
//! paths weighted by learned preferences, evolves the state with a
//! context-dependent Hamiltonian, collapses it to a [`Decision`] and adjusts
//! its weights from the reported [`Outcome`].
//!
//! Neither type is thread-safe for shared mutation; use one instance per
//! worker.

mod config;
mod error;
mod hamiltonian;
mod path;
mod react;
mod state;

pub use config::ReactConfig;
pub use error::ReasoningError;
pub use hamiltonian::{HamiltonianStrategy, RotationHamiltonian};
pub use path::{Decision, DecisionContext, DecisionPath, Outcome};
pub use react::QuantumReact;
pub use state::{EvolutionRecord, QuantumReasoningState, NORMALIZATION_TOLERANCE};

/// Seconds since the Unix epoch, or 0 if the clock is before it.
pub(crate) fn now_timestamp() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
