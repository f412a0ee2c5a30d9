//! Feasibility checks for start-time schedules.
//!
//! A schedule maps task ids to start times; task `t` occupies
//! `[start, start + duration)`.

use std::collections::{BTreeMap, HashMap};

use crate::task::Task;
use crate::Id;

/// `[start, start + duration)` widened to u64 so late starts cannot overflow.
fn occupied(task: &Task, start: u32) -> (u64, u64) {
    let start = u64::from(start);
    (start, start + u64::from(task.effective_duration()))
}

fn overlaps((a_start, a_end): (u64, u64), (b_start, b_end): (u64, u64)) -> bool {
    a_start < b_end && b_start < a_end
}

/// Returns true if every task starts after all of its dependencies finish.
///
/// Dependencies on ids outside `tasks` are ignored. A known dependency that
/// is missing from `schedule` is a violation.
pub fn validate_dependencies(tasks: &[Task], schedule: &BTreeMap<Id, u32>) -> bool {
    let by_id: HashMap<&str, &Task> = tasks.iter().map(|t| (t.id.as_str(), t)).collect();

    tasks.iter().all(|task| {
        let Some(&start) = schedule.get(&task.id) else {
            return true;
        };
        task.dependencies.iter().all(|dep| match by_id.get(dep.as_str()) {
            None => true,
            Some(dep_task) => schedule
                .get(dep)
                .is_some_and(|&dep_start| occupied(dep_task, dep_start).1 <= u64::from(start)),
        })
    })
}

/// Returns true if no two tasks sharing a resource tag run at the same time.
pub fn validate_resources(tasks: &[Task], schedule: &BTreeMap<Id, u32>) -> bool {
    let placed: Vec<(&Task, (u64, u64))> = tasks
        .iter()
        .filter_map(|t| schedule.get(&t.id).map(|&s| (t, occupied(t, s))))
        .collect();

    placed.iter().enumerate().all(|(pos, (a, wa))| {
        placed[pos + 1..]
            .iter()
            .all(|(b, wb)| !a.shares_resource_with(b) || !overlaps(*wa, *wb))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule(entries: &[(&str, u32)]) -> BTreeMap<Id, u32> {
        entries.iter().map(|(id, s)| (id.to_string(), *s)).collect()
    }

    #[test]
    fn dependency_must_finish_first() {
        let tasks = vec![Task::new("a", 2), Task::new("b", 1).with_dependency("a")];
        assert!(validate_dependencies(&tasks, &schedule(&[("a", 0), ("b", 2)])));
        assert!(!validate_dependencies(&tasks, &schedule(&[("a", 0), ("b", 1)])));
        assert!(!validate_dependencies(&tasks, &schedule(&[("a", 2), ("b", 0)])));
    }

    #[test]
    fn missing_dependency_start_is_a_violation() {
        let tasks = vec![Task::new("a", 2), Task::new("b", 1).with_dependency("a")];
        assert!(!validate_dependencies(&tasks, &schedule(&[("b", 3)])));
    }

    #[test]
    fn unknown_dependency_is_ignored() {
        let tasks = vec![Task::new("b", 1).with_dependency("ghost")];
        assert!(validate_dependencies(&tasks, &schedule(&[("b", 0)])));
    }

    #[test]
    fn shared_resource_cannot_overlap() {
        let tasks = vec![
            Task::new("a", 2).with_resource("gpu"),
            Task::new("b", 2).with_resource("gpu"),
            Task::new("c", 2),
        ];
        assert!(!validate_resources(&tasks, &schedule(&[("a", 0), ("b", 1)])));
        assert!(validate_resources(&tasks, &schedule(&[("a", 0), ("b", 2)])));
        assert!(validate_resources(
            &tasks,
            &schedule(&[("a", 0), ("b", 2), ("c", 0)])
        ));
    }

    #[test]
    fn starts_at_u32_max_do_not_overflow() {
        let tasks = vec![
            Task::new("a", 3).with_resource("gpu"),
            Task::new("b", 1).with_resource("gpu").with_dependency("a"),
        ];
        assert!(validate_resources(&tasks, &schedule(&[("a", u32::MAX)])));
        assert!(!validate_resources(
            &tasks,
            &schedule(&[("a", u32::MAX - 1), ("b", u32::MAX)])
        ));
        assert!(!validate_dependencies(
            &tasks,
            &schedule(&[("a", u32::MAX - 1), ("b", u32::MAX)])
        ));
    }
}
