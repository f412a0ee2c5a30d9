//! Dependency- and resource-aware construction of candidate schedules.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::linalg::QuboMatrix;
use crate::task::{DependencyGraph, Task};
use crate::time_window::{TimeWindow, WindowEngine};
use crate::Id;

/// Start time per task id.
pub type Schedule = BTreeMap<Id, u32>;

/// Places tasks one at a time in a topological order, choosing among the
/// admissible windows that start after every predecessor has finished and do
/// not overlap a placed task holding a shared resource.
pub(crate) struct CandidateSearch<'a> {
    tasks: &'a [Task],
    graph: &'a DependencyGraph,
    windows: Vec<Vec<TimeWindow>>,
}

impl<'a> CandidateSearch<'a> {
    pub fn new(tasks: &'a [Task], graph: &'a DependencyGraph, engine: &WindowEngine) -> Self {
        Self {
            tasks,
            graph,
            windows: tasks.iter().map(|t| engine.windows_for(t)).collect(),
        }
    }

    fn feasible_windows(&self, index: usize, placed: &[Option<TimeWindow>]) -> Vec<TimeWindow> {
        let earliest = self
            .graph
            .predecessors(index)
            .into_iter()
            .filter_map(|p| placed[p])
            .map(|w| w.end())
            .max()
            .unwrap_or(0);
        let task = &self.tasks[index];

        self.windows[index]
            .iter()
            .filter(|w| w.start() >= earliest)
            .filter(|w| {
                placed.iter().enumerate().all(|(other, slot)| match slot {
                    Some(taken) => !task.shares_resource_with(&self.tasks[other]) || !w.overlaps(taken),
                    None => true,
                })
            })
            .copied()
            .collect()
    }

    fn place<F>(&self, order: &[usize], mut choose: F) -> Option<Schedule>
    where
        F: FnMut(&[TimeWindow]) -> Option<TimeWindow>,
    {
        let mut placed: Vec<Option<TimeWindow>> = vec![None; self.tasks.len()];
        for &index in order {
            let window = choose(&self.feasible_windows(index, &placed))?;
            placed[index] = Some(window);
        }
        placed
            .into_iter()
            .zip(self.tasks)
            .map(|(w, t)| w.map(|w| (t.id.clone(), w.start())))
            .collect()
    }

    /// Deterministic candidate that prefers windows starting at a slot set in
    /// `bits`, else the earliest feasible window.
    pub fn guided(&self, bits: &[u8]) -> Option<Schedule> {
        let order = self.graph.topo_order();
        self.place(&order, |feasible| {
            feasible
                .iter()
                .find(|w| bits.get(w.start() as usize) == Some(&1))
                .or_else(|| feasible.first())
                .copied()
        })
    }

    /// Candidate built from a random topological order and random windows.
    pub fn random<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Schedule> {
        let order = self.graph.random_topo_order(rng);
        self.place(&order, |feasible| feasible.choose(rng).copied())
    }
}

/// Binary occupancy of the horizon: slot `t` is 1 if any task runs at `t`.
pub fn occupancy(tasks: &[Task], schedule: &Schedule, horizon: usize) -> Vec<u8> {
    let mut bits = vec![0u8; horizon];
    for task in tasks {
        let Some(&start) = schedule.get(&task.id) else {
            continue;
        };
        let end = (start as usize).saturating_add(task.effective_duration() as usize);
        for slot in bits.iter_mut().take(end).skip(start as usize) {
            *slot = 1;
        }
    }
    bits
}

/// `xᵀQx` of the schedule's occupancy vector.
pub fn schedule_energy(q: &QuboMatrix, tasks: &[Task], schedule: &Schedule) -> f64 {
    q.energy(&occupancy(tasks, schedule, q.rows()))
}

/// Runs tasks back to back in `order`, each no earlier than its release time.
///
/// Ignores the horizon; used when the search finds nothing feasible.
pub fn sequential(tasks: &[Task], order: &[usize]) -> Schedule {
    let mut cursor = 0u32;
    let mut schedule = Schedule::new();
    for &index in order {
        let task = &tasks[index];
        let start = cursor.max(task.release_time);
        cursor = start.saturating_add(task.effective_duration());
        schedule.insert(task.id.clone(), start);
    }
    schedule
}
