use std::collections::BTreeSet;

use crate::Id;

/// A unit of work to be placed on an agent within the scheduling horizon.
///
/// # Invariants
///
/// - `duration` is positive; a zero duration is treated as one time unit
/// - `deadline`, when present, is not earlier than `release_time`
/// - `dependencies` name tasks that must finish before this one starts
/// - `resources` are exclusive: two tasks sharing a tag never run at once
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Task {
    pub id: Id,
    pub duration: u32,
    pub release_time: u32,
    pub deadline: Option<u32>,
    pub dependencies: Vec<Id>,
    pub resources: BTreeSet<String>,
}

impl Task {
    /// Creates a task released at time 0 with no deadline.
    pub fn new(id: impl Into<Id>, duration: u32) -> Self {
        Self {
            id: id.into(),
            duration,
            release_time: 0,
            deadline: None,
            dependencies: Vec::new(),
            resources: BTreeSet::new(),
        }
    }

    pub fn with_release_time(mut self, release_time: u32) -> Self {
        self.release_time = release_time;
        self
    }

    pub fn with_deadline(mut self, deadline: u32) -> Self {
        self.deadline = Some(deadline.max(self.release_time));
        self
    }

    pub fn with_dependency(mut self, id: impl Into<Id>) -> Self {
        self.dependencies.push(id.into());
        self
    }

    pub fn with_resource(mut self, tag: impl Into<String>) -> Self {
        self.resources.insert(tag.into());
        self
    }

    /// Duration clamped to at least one time unit.
    pub fn effective_duration(&self) -> u32 {
        self.duration.max(1)
    }

    /// Latest admissible completion time within `horizon`.
    pub fn latest_end(&self, horizon: u32) -> u32 {
        self.deadline.map_or(horizon, |d| d.min(horizon))
    }

    /// Returns true if this task and `other` share a resource tag.
    pub fn shares_resource_with(&self, other: &Task) -> bool {
        !self.resources.is_disjoint(&other.resources)
    }
}
