use std::collections::HashMap;

use petgraph::algo::{has_path_connecting, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use rand::Rng;

use super::error::DependencyError;
use super::task::Task;

/// Precedence DAG over a task slice.
///
/// Nodes carry the position of the task in the slice the graph was built
/// from; an edge `a -> b` means `a` must finish before `b` starts.
///
/// # Invariants
///
/// - The graph is acyclic; [`DependencyGraph::build`] rejects cycles
/// - Dependencies naming unknown task ids are ignored
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    graph: DiGraph<usize, ()>,
    node_by_id: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    /// Builds the graph for `tasks`.
    ///
    /// # Errors
    ///
    /// - `DuplicateId` if two tasks share an id
    /// - `CycleDetected` if the dependencies are cyclic
    pub fn build(tasks: &[Task]) -> Result<Self, DependencyError> {
        let mut graph = DiGraph::with_capacity(tasks.len(), 0);
        let mut node_by_id = HashMap::with_capacity(tasks.len());

        for (index, task) in tasks.iter().enumerate() {
            let node = graph.add_node(index);
            if node_by_id.insert(task.id.clone(), node).is_some() {
                return Err(DependencyError::DuplicateId(task.id.clone()));
            }
        }

        for task in tasks {
            let to = node_by_id[&task.id];
            for dep in &task.dependencies {
                let Some(&from) = node_by_id.get(dep) else {
                    continue;
                };
                // Edge from→to creates a cycle if to already reaches from.
                if from == to || has_path_connecting(&graph, to, from, None) {
                    return Err(DependencyError::CycleDetected {
                        from: dep.clone(),
                        to: task.id.clone(),
                    });
                }
                graph.update_edge(from, to, ());
            }
        }

        Ok(Self { graph, node_by_id })
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn dependency_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Slice position of the task with `id`.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.node_by_id.get(id).map(|&n| self.graph[n])
    }

    /// Slice positions of the direct predecessors of task `index`.
    pub fn predecessors(&self, index: usize) -> Vec<usize> {
        self.graph
            .neighbors_directed(NodeIndex::new(index), Direction::Incoming)
            .map(|n| self.graph[n])
            .collect()
    }

    /// Task positions in a deterministic topological order.
    pub fn topo_order(&self) -> Vec<usize> {
        // Acyclic by construction, so toposort cannot fail.
        toposort(&self.graph, None)
            .map(|nodes| nodes.into_iter().map(|n| self.graph[n]).collect())
            .unwrap_or_default()
    }

    /// Topological order with ties between ready tasks broken at random.
    pub fn random_topo_order<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<usize> {
        let mut in_degree: Vec<usize> = self
            .graph
            .node_indices()
            .map(|n| self.graph.neighbors_directed(n, Direction::Incoming).count())
            .collect();
        let mut ready: Vec<NodeIndex> = self
            .graph
            .node_indices()
            .filter(|n| in_degree[n.index()] == 0)
            .collect();
        let mut order = Vec::with_capacity(self.len());

        while !ready.is_empty() {
            let node = ready.swap_remove(rng.gen_range(0..ready.len()));
            order.push(self.graph[node]);
            for next in self.graph.neighbors_directed(node, Direction::Outgoing) {
                in_degree[next.index()] -= 1;
                if in_degree[next.index()] == 0 {
                    ready.push(next);
                }
            }
        }
        order
    }
}
