use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DependencyError {
    #[error("Dependency {from} -> {to} would create a cycle")]
    CycleDetected { from: String, to: String },

    #[error("Task ID already exists: {0}")]
    DuplicateId(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_detected_display() {
        let e = DependencyError::CycleDetected {
            from: "a".into(),
            to: "b".into(),
        };
        assert_eq!(e.to_string(), "Dependency a -> b would create a cycle");
    }

    #[test]
    fn duplicate_id_display() {
        let e = DependencyError::DuplicateId("my-task".to_string());
        assert_eq!(e.to_string(), "Task ID already exists: my-task");
    }
}
