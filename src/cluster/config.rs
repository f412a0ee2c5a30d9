//! Configuration for cluster-scale scheduling.

use crate::hierarchical::HierarchicalConfig;
use crate::solver::SolverConfig;

/// Tuning of [`super::ClusterScheduler`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct ClusterConfig {
    /// Worker threads of the fan-out pool. 0 is read as 1.
    pub max_parallel_jobs: usize,
    /// Tasks kept per cluster; the rest are dropped from the build.
    pub max_cluster_size: usize,
    /// Weight of the chained connection between consecutive cluster levels.
    pub inter_cluster_weight: f64,
    /// Per-cluster solver settings. A seed is offset by the cluster index.
    pub solver: SolverConfig,
    /// Settings of the composed hierarchy.
    pub hierarchical: HierarchicalConfig,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            max_parallel_jobs: 4,
            max_cluster_size: 100,
            inter_cluster_weight: 1.0,
            solver: SolverConfig::default(),
            hierarchical: HierarchicalConfig::default(),
        }
    }
}

impl ClusterConfig {
    /// Seeds both the per-cluster solvers and the hierarchy.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.solver.seed = Some(seed);
        self.hierarchical.seed = Some(seed);
        self
    }
}
