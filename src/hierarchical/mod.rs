//! Hierarchical composition of independent QUBO levels.
//!
//! Levels are combined block-diagonally, coupled through weighted
//! connections and solved together by a greedy search that never flips
//! variables with a fixed target.

mod composer;
mod config;
mod level;

pub use composer::{level_name, HierarchicalQubo};
pub use config::HierarchicalConfig;
pub use level::{Connection, QuboLevel};
