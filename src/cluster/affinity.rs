//! Task-to-cluster affinity.

use std::collections::{BTreeMap, BTreeSet};

use crate::task::Task;
use crate::Id;

/// A cluster as reported by the resource bookkeeping collaborator.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct ClusterInfo {
    pub id: Id,
    pub available_resources: BTreeSet<String>,
    pub current_load: f64,
    pub capacity: f64,
}

impl ClusterInfo {
    /// An idle cluster with no resources.
    pub fn new(id: impl Into<Id>, capacity: f64) -> Self {
        Self {
            id: id.into(),
            available_resources: BTreeSet::new(),
            current_load: 0.0,
            capacity,
        }
    }

    pub fn with_resource(mut self, tag: impl Into<String>) -> Self {
        self.available_resources.insert(tag.into());
        self
    }

    pub fn with_load(mut self, load: f64) -> Self {
        self.current_load = load;
        self
    }

    /// `1 - load/capacity`; 0 for a cluster without capacity.
    ///
    /// Negative when the cluster is overloaded.
    pub fn load_factor(&self) -> f64 {
        if self.capacity <= 0.0 {
            0.0
        } else {
            1.0 - self.current_load / self.capacity
        }
    }

    /// Shared resource tags times the load factor.
    pub fn affinity(&self, task: &Task) -> f64 {
        let matched = task
            .resources
            .intersection(&self.available_resources)
            .count();
        matched as f64 * self.load_factor()
    }
}

/// Maps every task id to the id of the cluster with the highest affinity.
///
/// The first cluster wins ties, so a task matching nothing goes to the
/// first cluster. Empty when either input is empty.
pub fn assign_tasks_to_clusters(tasks: &[Task], clusters: &[ClusterInfo]) -> BTreeMap<Id, Id> {
    let mut assignments = BTreeMap::new();
    for task in tasks {
        let mut best: Option<(&ClusterInfo, f64)> = None;
        for cluster in clusters {
            let score = cluster.affinity(task);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((cluster, score));
            }
        }
        if let Some((cluster, _)) = best {
            assignments.insert(task.id.clone(), cluster.id.clone());
        }
    }
    assignments
}
