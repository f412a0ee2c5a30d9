//! qam - QUBO task scheduling with quantum-inspired reasoning
//!
//! Builds task–agent–time-window QUBOs, biases them with a probabilistic
//! reasoning state, and solves them with an external backend, a statevector
//! QAOA optimizer or classical local search. Large task sets are split
//! across clusters and recombined as a hierarchical QUBO.

pub mod cluster;
pub mod hierarchical;
pub mod linalg;
pub mod qaoa;
pub mod qubo;
pub mod reasoning;
pub mod solver;
pub mod task;
pub mod time_window;

/// Identifier type used for tasks, agents, decisions and clusters.
pub type Id = String;

/// Generates a new unique identifier (UUID v4).
pub fn generate_id() -> Id {
    uuid::Uuid::new_v4().to_string()
}
