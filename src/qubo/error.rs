use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuboError {
    /// Terms were requested before a variable mapping was created.
    #[error("Variable mapping must be created before building {0}")]
    MissingVariableMap(&'static str),

    #[error("Solution has {found} bits but the mapping has {expected} variables")]
    SolutionLength { expected: usize, found: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_variable_map_display() {
        let e = QuboError::MissingVariableMap("agent overlap constraints");
        assert_eq!(
            e.to_string(),
            "Variable mapping must be created before building agent overlap constraints"
        );
    }
}
