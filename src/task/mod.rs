//! Tasks, agents and the dependency graph between tasks.

mod agent;
mod error;
mod graph;
mod task;

pub use agent::Agent;
pub use error::DependencyError;
pub use graph::DependencyGraph;
pub use task::Task;
