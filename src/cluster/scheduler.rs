//! Parallel per-cluster QUBO construction.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use rayon::prelude::*;

use crate::hierarchical::HierarchicalQubo;
use crate::linalg::QuboMatrix;
use crate::qubo::to_matrix;
use crate::reasoning::{DecisionPath, QuantumReasoningState};
use crate::solver::weighting::SCHEDULE_ACTION_PREFIX;
use crate::solver::{ExternalSolver, QuboSolution, ReasoningScheduler};
use crate::task::Task;
use crate::Id;

use super::affinity::{assign_tasks_to_clusters, ClusterInfo};
use super::config::ClusterConfig;
use super::error::ClusterError;

/// Position QUBO built and solved for one cluster.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct ClusterLevel {
    pub cluster_id: Id,
    /// Tasks of the cluster; the QUBO has one position per task.
    pub task_ids: Vec<Id>,
    pub matrix: QuboMatrix,
    pub solution: QuboSolution,
}

/// Splits a task set across clusters and builds one QUBO level per cluster.
///
/// Jobs run on a dedicated pool of `max_parallel_jobs` threads. Each job
/// owns its reasoning state and solver; a panicking job is logged and its
/// cluster left out of the result.
pub struct ClusterScheduler {
    config: ClusterConfig,
    external: Option<Arc<dyn ExternalSolver>>,
}

impl fmt::Debug for ClusterScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterScheduler")
            .field("config", &self.config)
            .field("external", &self.external.as_ref().map(|s| s.name()))
            .finish()
    }
}

impl Default for ClusterScheduler {
    fn default() -> Self {
        Self::new(ClusterConfig::default())
    }
}

impl ClusterScheduler {
    pub fn new(config: ClusterConfig) -> Self {
        Self {
            config,
            external: None,
        }
    }

    /// Shares `solver` with every per-cluster job.
    pub fn with_external_solver(mut self, solver: Arc<dyn ExternalSolver>) -> Self {
        self.external = Some(solver);
        self
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// Groups tasks by their best cluster, in cluster order.
    ///
    /// Clusters without tasks are skipped. At most `max_cluster_size` tasks
    /// are kept per cluster, in input order.
    pub fn group_tasks<'a>(
        &self,
        tasks: &'a [Task],
        clusters: &[ClusterInfo],
    ) -> Vec<(Id, Vec<&'a Task>)> {
        let assignments = assign_tasks_to_clusters(tasks, clusters);
        let mut groups: BTreeMap<&str, Vec<&Task>> = BTreeMap::new();
        let mut dropped = 0usize;
        for task in tasks {
            let Some(cluster) = assignments.get(&task.id) else {
                continue;
            };
            let group = groups.entry(cluster.as_str()).or_default();
            if group.len() < self.config.max_cluster_size {
                group.push(task);
            } else {
                dropped += 1;
            }
        }
        if dropped > 0 {
            tracing::debug!(dropped, limit = self.config.max_cluster_size, "clusters over size limit");
        }

        clusters
            .iter()
            .filter_map(|c| {
                let group = groups.remove(c.id.as_str())?;
                Some((c.id.clone(), group))
            })
            .collect()
    }

    /// Builds and solves one position QUBO per non-empty cluster.
    ///
    /// # Errors
    ///
    /// [`ClusterError::Pool`] if the worker pool cannot be created. Failed
    /// jobs are not errors: they are logged and omitted.
    pub fn build_hierarchical_qubo(
        &self,
        tasks: &[Task],
        clusters: &[ClusterInfo],
    ) -> Result<Vec<ClusterLevel>, ClusterError> {
        let groups = self.group_tasks(tasks, clusters);
        if groups.is_empty() {
            return Ok(Vec::new());
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.max_parallel_jobs.max(1))
            .build()
            .map_err(|e| ClusterError::Pool(e.to_string()))?;

        let results: Vec<Result<ClusterLevel, ClusterError>> = pool.install(|| {
            groups
                .par_iter()
                .enumerate()
                .map(|(index, (cluster_id, group))| {
                    guarded(cluster_id, || self.solve_cluster(index, cluster_id, group))
                })
                .collect()
        });

        Ok(results
            .into_iter()
            .filter_map(|result| match result {
                Ok(level) => Some(level),
                Err(error) => {
                    tracing::warn!(%error, "cluster job failed, omitting cluster");
                    None
                }
            })
            .collect())
    }

    fn solve_cluster(&self, index: usize, cluster_id: &Id, tasks: &[&Task]) -> ClusterLevel {
        let horizon = tasks.len();
        let mut state = QuantumReasoningState::new();
        for position in 0..horizon {
            let path = DecisionPath::for_action(
                format!("{SCHEDULE_ACTION_PREFIX}{position}"),
                1.0 / horizon as f64,
            );
            state.add_decision_path(path, 1.0);
        }

        let mut config = self.config.solver.clone();
        config.seed = config.seed.map(|s| s.wrapping_add(index as u64));
        let mut scheduler = ReasoningScheduler::new(config);
        if let Some(solver) = &self.external {
            scheduler = scheduler.with_external_solver(Arc::clone(solver));
        }

        let terms = scheduler.build_qubo_with_reasoning(horizon, &state);
        let solution = scheduler.solve_qubo(&terms, horizon);
        tracing::debug!(cluster = %cluster_id, horizon, energy = solution.energy, "cluster QUBO solved");

        ClusterLevel {
            cluster_id: cluster_id.clone(),
            task_ids: tasks.iter().map(|t| t.id.clone()).collect(),
            matrix: to_matrix(&terms, horizon),
            solution,
        }
    }

    /// Stacks `levels` into a hierarchy, connecting each level to the next
    /// with `inter_cluster_weight`.
    ///
    /// # Errors
    ///
    /// [`ClusterError::Shape`] if a level matrix is not square.
    pub fn compose(&self, levels: &[ClusterLevel]) -> Result<HierarchicalQubo, ClusterError> {
        let mut hierarchy = HierarchicalQubo::new(self.config.hierarchical.clone());
        if let Some(solver) = &self.external {
            hierarchy = hierarchy.with_external_solver(Arc::clone(solver));
        }
        for level in levels {
            hierarchy.add_level(level.matrix.clone(), None, BTreeMap::new(), 1.0)?;
        }
        for i in 1..hierarchy.len() {
            hierarchy.add_connection(i - 1, i, self.config.inter_cluster_weight);
        }
        Ok(hierarchy)
    }
}

/// Runs `job`, turning a panic into [`ClusterError::Panicked`].
pub(crate) fn guarded<T>(cluster: &Id, job: impl FnOnce() -> T) -> Result<T, ClusterError> {
    panic::catch_unwind(AssertUnwindSafe(job)).map_err(|payload| ClusterError::Panicked {
        cluster: cluster.clone(),
        message: panic_message(payload.as_ref()),
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchical::level_name;
    use crate::solver::external::testing::{FailingSolver, FixedSolver};
    use crate::solver::SolutionSource;
    use serde_json::json;

    fn clusters() -> Vec<ClusterInfo> {
        vec![
            ClusterInfo::new("cpu", 10.0).with_resource("cpu"),
            ClusterInfo::new("gpu", 10.0).with_resource("gpu"),
            ClusterInfo::new("spare", 10.0).with_resource("tape"),
        ]
    }

    fn tasks() -> Vec<Task> {
        vec![
            Task::new("a", 1).with_resource("cpu"),
            Task::new("b", 2).with_resource("gpu"),
            Task::new("c", 1).with_resource("cpu"),
            Task::new("d", 3).with_resource("gpu"),
            Task::new("e", 1).with_resource("cpu"),
        ]
    }

    fn scheduler() -> ClusterScheduler {
        ClusterScheduler::new(ClusterConfig::default().with_seed(5))
    }

    #[test]
    fn groups_follow_cluster_order_and_skip_empty() {
        let tasks = tasks();
        let groups = scheduler().group_tasks(&tasks, &clusters());
        let ids: Vec<&str> = groups.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["cpu", "gpu"]);
        let cpu: Vec<&str> = groups[0].1.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(cpu, vec!["a", "c", "e"]);
    }

    #[test]
    fn groups_are_capped() {
        let mut config = ClusterConfig::default();
        config.max_cluster_size = 2;
        let tasks = tasks();
        let groups = ClusterScheduler::new(config).group_tasks(&tasks, &clusters());
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].1.len(), 2);
    }

    #[test]
    fn builds_one_level_per_cluster() {
        let levels = scheduler()
            .build_hierarchical_qubo(&tasks(), &clusters())
            .unwrap();
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[0].cluster_id, "cpu");
        assert_eq!(levels[0].matrix.rows(), 3);
        assert_eq!(levels[0].solution.bits.len(), 3);
        assert_eq!(levels[1].task_ids, vec!["b".to_string(), "d".to_string()]);
        assert_eq!(levels[1].matrix.rows(), 2);
        assert_eq!(levels[1].solution.source, SolutionSource::Classical);
    }

    #[test]
    fn seeded_builds_are_reproducible() {
        let first = scheduler().build_hierarchical_qubo(&tasks(), &clusters()).unwrap();
        let second = scheduler().build_hierarchical_qubo(&tasks(), &clusters()).unwrap();
        let bits = |levels: &[ClusterLevel]| -> Vec<Vec<u8>> {
            levels.iter().map(|l| l.solution.bits.clone()).collect()
        };
        assert_eq!(bits(&first), bits(&second));
    }

    #[test]
    fn single_worker_pool_handles_all_clusters() {
        let mut config = ClusterConfig::default().with_seed(1);
        config.max_parallel_jobs = 0;
        let levels = ClusterScheduler::new(config)
            .build_hierarchical_qubo(&tasks(), &clusters())
            .unwrap();
        assert_eq!(levels.len(), 2);
    }

    #[test]
    fn empty_input_builds_nothing() {
        assert!(scheduler().build_hierarchical_qubo(&[], &clusters()).unwrap().is_empty());
        assert!(scheduler().build_hierarchical_qubo(&tasks(), &[]).unwrap().is_empty());
    }

    #[test]
    fn failing_external_solver_falls_back_per_cluster() {
        let levels = scheduler()
            .with_external_solver(Arc::new(FailingSolver))
            .build_hierarchical_qubo(&tasks(), &clusters())
            .unwrap();
        assert_eq!(levels.len(), 2);
        assert!(levels.iter().all(|l| l.solution.source == SolutionSource::Classical));
    }

    #[test]
    fn external_solver_is_shared_by_jobs() {
        let solver = Arc::new(FixedSolver(json!({"solution": [1, 0, 1]})));
        let levels = scheduler()
            .with_external_solver(solver)
            .build_hierarchical_qubo(&tasks(), &clusters())
            .unwrap();
        assert_eq!(levels[0].solution.bits, vec![1, 0, 1]);
        assert_eq!(levels[0].solution.source, SolutionSource::External("fixed".into()));
    }

    #[test]
    fn panics_become_errors() {
        let cluster: Id = "east".into();
        let result: Result<(), _> = guarded(&cluster, || panic!("worker lost"));
        assert_eq!(
            result,
            Err(ClusterError::Panicked {
                cluster,
                message: "worker lost".into(),
            })
        );
        assert_eq!(guarded(&"west".to_string(), || 7), Ok(7));
    }

    #[test]
    fn compose_chains_levels() {
        let scheduler = scheduler();
        let levels = scheduler.build_hierarchical_qubo(&tasks(), &clusters()).unwrap();
        let mut hierarchy = scheduler.compose(&levels).unwrap();
        assert_eq!(hierarchy.len(), 2);
        assert_eq!(hierarchy.connections().len(), 1);
        assert_eq!(hierarchy.combined_matrix().rows(), 5);

        let solution = hierarchy.optimize();
        assert_eq!(solution[&level_name(0)].len(), 3);
        assert_eq!(solution[&level_name(1)].len(), 2);
    }

    #[test]
    fn compose_of_nothing_is_empty() {
        assert!(scheduler().compose(&[]).unwrap().is_empty());
    }
}
