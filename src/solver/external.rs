//! Boundary to external QUBO solvers.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde_json::Value;

use crate::qubo::JobEnvelope;

use super::error::ExternalSolverError;

/// A solver reached through the JSON wire schema.
///
/// `submit` blocks until the solver answers. It returns the raw response,
/// which may use either accepted solution shape.
pub trait ExternalSolver: Send + Sync {
    fn submit(&self, job: &JobEnvelope) -> Result<Value, ExternalSolverError>;

    fn name(&self) -> &str;
}

/// Submits `job` on a worker thread and waits at most `timeout`.
///
/// A worker that outlives the timeout is detached; its late answer is
/// discarded. Detached workers are not bounded: each timed-out call leaves
/// one OS thread blocked in `submit` until the solver returns, so an
/// implementation that can hang forever should enforce its own deadline
/// inside `submit`.
pub fn submit_with_timeout(
    solver: Arc<dyn ExternalSolver>,
    job: JobEnvelope,
    timeout: Duration,
) -> Result<Value, ExternalSolverError> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        // The receiver may be gone after a timeout.
        let _ = tx.send(solver.submit(&job));
    });

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => Err(ExternalSolverError::Timeout(timeout)),
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(ExternalSolverError::Disconnected),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use serde_json::json;

    /// Answers every job with a fixed response.
    pub struct FixedSolver(pub Value);

    impl ExternalSolver for FixedSolver {
        fn submit(&self, _job: &JobEnvelope) -> Result<Value, ExternalSolverError> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    /// Rejects every job.
    pub struct FailingSolver;

    impl ExternalSolver for FailingSolver {
        fn submit(&self, _job: &JobEnvelope) -> Result<Value, ExternalSolverError> {
            Err(ExternalSolverError::Rejected("unavailable".into()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    /// Sleeps before answering.
    pub struct SlowSolver(pub Duration);

    impl ExternalSolver for SlowSolver {
        fn submit(&self, _job: &JobEnvelope) -> Result<Value, ExternalSolverError> {
            thread::sleep(self.0);
            Ok(json!({"solution": []}))
        }

        fn name(&self) -> &str {
            "slow"
        }
    }

    /// Panics inside the worker thread.
    pub struct PanickingSolver;

    impl ExternalSolver for PanickingSolver {
        fn submit(&self, _job: &JobEnvelope) -> Result<Value, ExternalSolverError> {
            panic!("solver crashed")
        }

        fn name(&self) -> &str {
            "panicking"
        }
    }
}
