//! Cluster-scale scheduling.
//!
//! Tasks are assigned to the cluster with the best resource affinity, each
//! cluster gets its own reasoning-weighted position QUBO built and solved on
//! a bounded worker pool, and the surviving levels can be stacked into a
//! [`crate::hierarchical::HierarchicalQubo`].

mod affinity;
mod config;
mod error;
mod scheduler;

pub use affinity::{assign_tasks_to_clusters, ClusterInfo};
pub use config::ClusterConfig;
pub use error::ClusterError;
pub use scheduler::{ClusterLevel, ClusterScheduler};
