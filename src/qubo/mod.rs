//! QUBO formulation of the task–agent–window assignment problem.
//!
//! # Module Structure
//!
//! - [`term`] - `(i, j, coefficient)` terms and their evaluation
//! - [`variables`] - bijective `(task, agent, window)` ↔ index mapping
//! - [`builder`] - [`QuboScheduler`], which emits constraint and objective terms
//! - [`wire`] - JSON schema exchanged with external QUBO solvers

pub mod builder;
pub mod error;
pub mod term;
pub mod variables;
pub mod wire;

pub use builder::{Assignment, QuboScheduler};
pub use error::QuboError;
pub use term::{energy, from_matrix, to_matrix, variable_count, QuboTerm};
pub use variables::{VariableKey, VariableMap};
pub use wire::{
    format_problem, parse_solution, JobEnvelope, ProblemPayload, ProblemType, WireError,
    WireTerm, VARIABLE_COUNT_PARAMETER,
};
