//! Reasoning-weighted schedule solver.
//!
//! # Module Structure
//!
//! - [`weighting`] - per-position weights read from a reasoning state
//! - [`candidate`] - dependency- and resource-aware candidate schedules
//! - [`validate`] - feasibility checks for start-time schedules
//! - [`classical`] - greedy bit-flip fallback solver
//! - [`external`] - external solver boundary with timeout
//! - [`scheduler`] - [`ReasoningScheduler`], tying the above together

pub mod candidate;
pub mod classical;
mod config;
mod error;
pub mod external;
pub mod scheduler;
pub mod validate;
pub mod weighting;

pub use candidate::Schedule;
pub use classical::GreedyBitFlip;
pub use config::SolverConfig;
pub use error::{ExternalSolverError, InfeasibleScheduleError};
pub use external::{submit_with_timeout, ExternalSolver};
pub use scheduler::{QuboSolution, ReasoningScheduler, ScheduleOutcome, SolutionSource};
pub use validate::{validate_dependencies, validate_resources};
pub use weighting::ReasoningWeights;
