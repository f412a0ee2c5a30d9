use std::collections::BTreeSet;

use crate::Id;

/// An agent able to execute tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Agent {
    pub id: Id,
    /// Capability tags; may be empty.
    pub capabilities: BTreeSet<String>,
}

impl Agent {
    pub fn new(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            capabilities: BTreeSet::new(),
        }
    }

    pub fn with_capability(mut self, capability: impl Into<String>) -> Self {
        self.capabilities.insert(capability.into());
        self
    }

    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities.contains(capability)
    }
}
