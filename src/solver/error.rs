use std::time::Duration;

use thiserror::Error;

use crate::qubo::WireError;
use crate::task::DependencyError;

/// Failure at the external QUBO solver boundary.
///
/// Never returned from the scheduling entry points; callers of
/// [`super::ReasoningScheduler`] get the classical fallback instead.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExternalSolverError {
    #[error("External solver did not answer within {0:?}")]
    Timeout(Duration),

    #[error("External solver worker stopped without answering")]
    Disconnected,

    #[error("External solver rejected the job: {0}")]
    Rejected(String),

    #[error("Invalid solver response: {0}")]
    Wire(#[from] WireError),
}

/// No valid schedule could be produced by the candidate search.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InfeasibleScheduleError {
    #[error("Task dependencies are not acyclic: {0}")]
    Dependencies(#[from] DependencyError),

    #[error("No feasible schedule found in {attempts} attempts")]
    NoFeasibleCandidate { attempts: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_display() {
        let e = ExternalSolverError::Timeout(Duration::from_secs(2));
        assert_eq!(e.to_string(), "External solver did not answer within 2s");
    }

    #[test]
    fn wire_error_converts() {
        let e: ExternalSolverError = WireError::NoSolutions.into();
        assert_eq!(
            e.to_string(),
            "Invalid solver response: Response contains no solutions"
        );
    }

    #[test]
    fn infeasible_displays() {
        let e = InfeasibleScheduleError::NoFeasibleCandidate { attempts: 5 };
        assert_eq!(e.to_string(), "No feasible schedule found in 5 attempts");

        let e: InfeasibleScheduleError = DependencyError::CycleDetected {
            from: "a".into(),
            to: "b".into(),
        }
        .into();
        assert_eq!(
            e.to_string(),
            "Task dependencies are not acyclic: Dependency a -> b would create a cycle"
        );
    }
}
