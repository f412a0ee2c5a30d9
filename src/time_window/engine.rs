//! Admissible window computation.

use crate::task::Task;

use super::window::TimeWindow;

/// Greatest common divisor, with `gcd(a, 0) == a`.
pub fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Shared window grid step: GCD of all task durations, at least 1.
pub fn granularity(tasks: &[Task]) -> u32 {
    tasks
        .iter()
        .map(Task::effective_duration)
        .fold(0, gcd)
        .max(1)
}

/// Windows for `task` aligned to `granularity` inside
/// `[release_time, min(horizon, deadline))`.
///
/// Window starts are the grid points at or after the release time; a window
/// is admissible only if it ends by the deadline (or horizon).
pub fn admissible_windows(task: &Task, horizon: u32, granularity: u32) -> Vec<TimeWindow> {
    let step = granularity.max(1);
    let duration = task.effective_duration();
    let latest_end = task.latest_end(horizon);
    let mut windows = Vec::new();
    // No grid point at or after a release time this late fits in u32.
    let Some(mut start) = task.release_time.div_ceil(step).checked_mul(step) else {
        return windows;
    };

    while let Some(end) = start.checked_add(duration) {
        if end > latest_end {
            break;
        }
        windows.push(TimeWindow::new(start, end));
        let Some(next) = start.checked_add(step) else {
            break;
        };
        start = next;
    }
    windows
}

/// Window generator bound to one task set and horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowEngine {
    horizon: u32,
    granularity: u32,
}

impl WindowEngine {
    /// Derives the granularity from `tasks`.
    pub fn new(tasks: &[Task], horizon: u32) -> Self {
        Self {
            horizon,
            granularity: granularity(tasks),
        }
    }

    pub fn horizon(&self) -> u32 {
        self.horizon
    }

    pub fn granularity(&self) -> u32 {
        self.granularity
    }

    pub fn windows_for(&self, task: &Task) -> Vec<TimeWindow> {
        admissible_windows(task, self.horizon, self.granularity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gcd_basics() {
        assert_eq!(gcd(12, 8), 4);
        assert_eq!(gcd(7, 0), 7);
        assert_eq!(gcd(0, 0), 0);
    }

    #[test]
    fn granularity_is_gcd_of_durations() {
        let tasks = vec![Task::new("a", 4), Task::new("b", 6)];
        assert_eq!(granularity(&tasks), 2);
        assert_eq!(granularity(&[]), 1);
    }

    #[test]
    fn windows_step_by_granularity() {
        let task = Task::new("a", 2);
        let windows = admissible_windows(&task, 6, 2);
        assert_eq!(
            windows,
            vec![
                TimeWindow::new(0, 2),
                TimeWindow::new(2, 4),
                TimeWindow::new(4, 6)
            ]
        );
    }

    #[test]
    fn windows_respect_release_and_deadline() {
        let task = Task::new("a", 2).with_release_time(3).with_deadline(8);
        let windows = admissible_windows(&task, 20, 2);
        // Release 3 aligns up to grid point 4.
        assert_eq!(windows, vec![TimeWindow::new(4, 6), TimeWindow::new(6, 8)]);
    }

    #[test]
    fn no_windows_when_task_does_not_fit() {
        let task = Task::new("a", 5);
        assert!(admissible_windows(&task, 4, 1).is_empty());
        assert!(admissible_windows(&task, 0, 1).is_empty());
    }

    #[test]
    fn release_near_u32_max_yields_no_windows() {
        let task = Task::new("a", 4).with_release_time(u32::MAX - 1);
        assert!(admissible_windows(&task, u32::MAX, 4).is_empty());
    }

    #[test]
    fn last_window_ends_at_u32_max() {
        let task = Task::new("a", 1).with_release_time(u32::MAX - 1);
        assert_eq!(
            admissible_windows(&task, u32::MAX, 1),
            vec![TimeWindow::new(u32::MAX - 1, u32::MAX)]
        );
    }

    #[test]
    fn engine_uses_shared_granularity() {
        let tasks = vec![Task::new("a", 2), Task::new("b", 4)];
        let engine = WindowEngine::new(&tasks, 4);
        assert_eq!(engine.granularity(), 2);
        assert_eq!(engine.windows_for(&tasks[0]).len(), 2);
        assert_eq!(engine.windows_for(&tasks[1]), vec![TimeWindow::new(0, 4)]);
    }
}
