//! Dense indexing of `(task, agent, window)` assignment variables.

use std::collections::HashMap;

use crate::task::{Agent, Task};
use crate::time_window::{TimeWindow, WindowEngine};
use crate::Id;

/// Identity of one binary assignment variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct VariableKey {
    pub task_id: Id,
    pub agent_id: Id,
    pub window: TimeWindow,
}

/// Bijective mapping between feasible `(task, agent, window)` triples and
/// dense indices `0..len()`.
///
/// Indices are assigned task-major, then agent, then window start. A mapping
/// belongs to one horizon; rebuilding for a new horizon invalidates all
/// previously issued indices.
#[derive(Debug, Clone, Default)]
pub struct VariableMap {
    horizon: u32,
    index_by_key: HashMap<VariableKey, usize>,
    keys: Vec<VariableKey>,
}

impl VariableMap {
    /// Enumerates every admissible window of every task on every agent.
    pub fn build(tasks: &[Task], agents: &[Agent], horizon: u32) -> Self {
        let engine = WindowEngine::new(tasks, horizon);
        let mut map = Self {
            horizon,
            ..Self::default()
        };
        for task in tasks {
            let windows = engine.windows_for(task);
            for agent in agents {
                for &window in &windows {
                    map.insert(VariableKey {
                        task_id: task.id.clone(),
                        agent_id: agent.id.clone(),
                        window,
                    });
                }
            }
        }
        map
    }

    fn insert(&mut self, key: VariableKey) {
        if self.index_by_key.contains_key(&key) {
            return;
        }
        self.index_by_key.insert(key.clone(), self.keys.len());
        self.keys.push(key);
    }

    pub fn horizon(&self) -> u32 {
        self.horizon
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Index of the variable assigning `task_id` to `agent_id` during `window`.
    pub fn encode(&self, task_id: &str, agent_id: &str, window: TimeWindow) -> Option<usize> {
        self.index_by_key
            .get(&VariableKey {
                task_id: task_id.to_string(),
                agent_id: agent_id.to_string(),
                window,
            })
            .copied()
    }

    /// The assignment a variable index stands for.
    pub fn decode(&self, index: usize) -> Option<&VariableKey> {
        self.keys.get(index)
    }

    /// Iterates `(index, key)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &VariableKey)> {
        self.keys.iter().enumerate()
    }

    /// Indices of all variables belonging to `task_id`.
    pub fn indices_for_task<'a>(&'a self, task_id: &'a str) -> impl Iterator<Item = usize> + 'a {
        self.iter()
            .filter(move |(_, k)| k.task_id == task_id)
            .map(|(i, _)| i)
    }

    /// Indices of all variables assigned to `agent_id`.
    pub fn indices_for_agent<'a>(
        &'a self,
        agent_id: &'a str,
    ) -> impl Iterator<Item = usize> + 'a {
        self.iter()
            .filter(move |(_, k)| k.agent_id == agent_id)
            .map(|(i, _)| i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn build_enumerates_all_triples() {
        let tasks = vec![Task::new("t1", 2), Task::new("t2", 2)];
        let agents = vec![Agent::new("a1"), Agent::new("a2")];
        let map = VariableMap::build(&tasks, &agents, 4);
        // 2 tasks × 2 agents × 2 windows
        assert_eq!(map.len(), 8);
        assert_eq!(map.encode("t1", "a1", TimeWindow::new(0, 2)), Some(0));
        assert_eq!(map.encode("t1", "a1", TimeWindow::new(2, 4)), Some(1));
        assert_eq!(map.encode("t1", "a2", TimeWindow::new(0, 2)), Some(2));
        assert_eq!(map.encode("t1", "a1", TimeWindow::new(1, 3)), None);
    }

    #[test]
    fn decode_out_of_range() {
        let map = VariableMap::build(&[Task::new("t", 1)], &[Agent::new("a")], 2);
        assert!(map.decode(2).is_none());
    }

    #[test]
    fn task_and_agent_filters() {
        let tasks = vec![Task::new("t1", 1), Task::new("t2", 1)];
        let agents = vec![Agent::new("a1"), Agent::new("a2")];
        let map = VariableMap::build(&tasks, &agents, 2);
        assert_eq!(map.indices_for_task("t2").count(), 4);
        assert_eq!(map.indices_for_agent("a1").count(), 4);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_mapping_is_bijective(
            durations in prop::collection::vec(1u32..4, 1..4),
            releases in prop::collection::vec(0u32..3, 4),
            agent_count in 1usize..4,
            horizon in 0u32..10,
        ) {
            let tasks: Vec<Task> = durations
                .iter()
                .enumerate()
                .map(|(i, &d)| Task::new(format!("t{i}"), d).with_release_time(releases[i]))
                .collect();
            let agents: Vec<Agent> = (0..agent_count).map(|i| Agent::new(format!("a{i}"))).collect();
            let map = VariableMap::build(&tasks, &agents, horizon);

            for (index, key) in map.iter() {
                prop_assert_eq!(map.encode(&key.task_id, &key.agent_id, key.window), Some(index));
                prop_assert!(key.window.end() <= horizon);
            }
            prop_assert!(map.decode(map.len()).is_none());
        }
    }
}
