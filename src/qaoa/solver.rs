//! QAOA optimizer behind the external solver interface.

use std::sync::Mutex;

use serde_json::{json, Value};

use crate::qubo::{to_matrix, JobEnvelope, VARIABLE_COUNT_PARAMETER};
use crate::solver::{ExternalSolver, ExternalSolverError};

use super::circuit::diagonal_hamiltonian;
use super::config::QaoaConfig;
use super::error::QaoaError;
use super::optimizer::QaoaOptimizer;

/// Solves small wire-format QUBOs by statevector QAOA.
///
/// Answers with `{"solution": [...]}`. Problems wider than `max_qubits` are
/// rejected so the caller falls back to its classical solver.
#[derive(Debug)]
pub struct QaoaSolver {
    optimizer: Mutex<QaoaOptimizer>,
    max_qubits: usize,
}

impl QaoaSolver {
    pub const DEFAULT_MAX_QUBITS: usize = 8;

    pub fn new(config: QaoaConfig) -> Self {
        Self::with_max_qubits(config, Self::DEFAULT_MAX_QUBITS)
    }

    pub fn with_max_qubits(config: QaoaConfig, max_qubits: usize) -> Self {
        Self {
            optimizer: Mutex::new(QaoaOptimizer::new(config)),
            max_qubits,
        }
    }

    pub fn max_qubits(&self) -> usize {
        self.max_qubits
    }

    /// Number of optimizations run so far.
    pub fn runs(&self) -> usize {
        self.optimizer
            .lock()
            .map_or(0, |o| o.optimization_history().len())
    }
}

impl Default for QaoaSolver {
    fn default() -> Self {
        Self::new(QaoaConfig::default())
    }
}

fn rejected(error: QaoaError) -> ExternalSolverError {
    ExternalSolverError::Rejected(error.to_string())
}

impl ExternalSolver for QaoaSolver {
    fn submit(&self, job: &JobEnvelope) -> Result<Value, ExternalSolverError> {
        let terms = job.problem.to_terms()?;
        let n = job
            .parameters
            .get(VARIABLE_COUNT_PARAMETER)
            .and_then(Value::as_u64)
            .map_or(0, |n| n as usize)
            .max(job.problem.variable_count());

        if n > self.max_qubits {
            return Err(rejected(QaoaError::TooManyQubits {
                requested: n,
                limit: self.max_qubits,
            }));
        }
        if n == 0 {
            return Ok(json!({ "solution": [] }));
        }

        let q = to_matrix(&terms, n);
        let hamiltonian = diagonal_hamiltonian(&q).map_err(|e| rejected(e.into()))?;
        let result = self
            .optimizer
            .lock()
            .map_err(|_| ExternalSolverError::Rejected("QAOA optimizer lock poisoned".into()))?
            .optimize(&hamiltonian, None)
            .map_err(rejected)?;

        Ok(json!({ "solution": result.bits }))
    }

    fn name(&self) -> &str {
        "qaoa"
    }
}
