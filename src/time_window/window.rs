//! Discrete half-open time window.

use std::fmt::Display;

/// Half-open range `[start, end)` of integer time units.
///
/// Used as part of a QUBO variable key, so it is hashable and totally ordered
/// (by start, then end).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeWindow {
    start: u32,
    end: u32,
}

impl TimeWindow {
    /// Creates window `[start, end)`.
    ///
    /// # Panics
    ///
    /// Panics if `start >= end`.
    pub const fn new(start: u32, end: u32) -> Self {
        assert!(start < end, "TimeWindow start must be < end");
        Self { start, end }
    }

    /// Creates window `[start, end)`, or `None` if it would be empty.
    pub const fn try_new(start: u32, end: u32) -> Option<Self> {
        if start < end {
            Some(Self { start, end })
        } else {
            None
        }
    }

    pub const fn start(&self) -> u32 {
        self.start
    }

    pub const fn end(&self) -> u32 {
        self.end
    }

    pub const fn duration(&self) -> u32 {
        self.end - self.start
    }

    /// Returns true if `t` ∈ `[start, end)`.
    pub const fn contains(&self, t: u32) -> bool {
        self.start <= t && t < self.end
    }

    /// Checks if the two windows share at least one time unit.
    ///
    /// Back-to-back windows (`a.end == b.start`) do not overlap.
    pub const fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_and_contains() {
        let w = TimeWindow::new(2, 5);
        assert_eq!(w.duration(), 3);
        assert!(w.contains(2));
        assert!(w.contains(4));
        assert!(!w.contains(5));
    }

    #[test]
    fn back_to_back_windows_do_not_overlap() {
        let a = TimeWindow::new(0, 2);
        let b = TimeWindow::new(2, 4);
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn nested_and_partial_overlap() {
        let outer = TimeWindow::new(0, 10);
        assert!(outer.overlaps(&TimeWindow::new(3, 4)));
        assert!(TimeWindow::new(0, 3).overlaps(&TimeWindow::new(2, 6)));
    }

    #[test]
    fn try_new_rejects_empty() {
        assert!(TimeWindow::try_new(3, 3).is_none());
        assert!(TimeWindow::try_new(4, 3).is_none());
    }

    #[test]
    #[should_panic(expected = "TimeWindow start must be < end")]
    fn new_panics_on_empty() {
        let _ = TimeWindow::new(1, 1);
    }

    #[test]
    fn ordering_is_by_start_then_end() {
        let mut windows = vec![
            TimeWindow::new(2, 3),
            TimeWindow::new(0, 4),
            TimeWindow::new(0, 2),
        ];
        windows.sort();
        assert_eq!(
            windows,
            vec![
                TimeWindow::new(0, 2),
                TimeWindow::new(0, 4),
                TimeWindow::new(2, 3)
            ]
        );
    }

    #[test]
    fn display() {
        assert_eq!(TimeWindow::new(1, 4).to_string(), "[1, 4)");
    }
}
