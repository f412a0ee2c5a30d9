//! JSON schema exchanged with external QUBO solvers.
//!
//! Request:
//!
//! ```json
//! {"problem_type": "qubo", "terms": [{"c": -1.0, "ids": [0]}, {"c": 2.0, "ids": [0, 1]}], "version": "1.0"}
//! ```
//!
//! Vendor solvers additionally take a job envelope
//! (`{"type": "optimization", "format": "microsoft.qio.v2", "problem": {...}, "parameters": {...}}`).
//!
//! Accepted responses:
//!
//! - `{"solution": [0, 1, ...]}`
//! - `{"solutions": [{"configuration": {"0": 1, "1": 0, ...}}]}`

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::linalg::QuboMatrix;

use super::term::{to_matrix, QuboTerm};

pub const WIRE_VERSION: &str = "1.0";
pub const JOB_TYPE: &str = "optimization";
pub const JOB_FORMAT: &str = "microsoft.qio.v2";
/// Envelope parameter with the full problem size, for problems whose
/// trailing variables have no terms.
pub const VARIABLE_COUNT_PARAMETER: &str = "variable_count";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum WireError {
    #[error("Response matches neither `solution` nor `solutions` shape: {0}")]
    UnknownShape(String),

    #[error("Response contains no solutions")]
    NoSolutions,

    #[error("Solution has {found} entries, expected {expected}")]
    Length { expected: usize, found: usize },

    #[error("Variable index `{0}` is invalid for this problem")]
    BadIndex(String),

    #[error("Value {0} is not a binary assignment")]
    NotBinary(f64),

    #[error("Term with {0} ids is not supported by a QUBO matrix")]
    UnsupportedTerm(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProblemType {
    Qubo,
    Pubo,
}

/// One wire term: coefficient `c` on the product of the variables in `ids`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireTerm {
    pub c: f64,
    pub ids: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemPayload {
    pub problem_type: ProblemType,
    pub terms: Vec<WireTerm>,
    pub version: String,
}

impl ProblemPayload {
    /// Number of variables referenced by the payload.
    pub fn variable_count(&self) -> usize {
        self.terms
            .iter()
            .flat_map(|t| t.ids.iter())
            .map(|&i| i + 1)
            .max()
            .unwrap_or(0)
    }

    /// Converts the payload back into QUBO terms.
    ///
    /// # Errors
    ///
    /// `UnsupportedTerm` for terms of order other than one or two.
    pub fn to_terms(&self) -> Result<Vec<QuboTerm>, WireError> {
        self.terms
            .iter()
            .map(|t| match t.ids.as_slice() {
                [i] => Ok(QuboTerm::linear(*i, t.c)),
                [i, j] => Ok(QuboTerm::quadratic(*i, *j, t.c)),
                other => Err(WireError::UnsupportedTerm(other.len())),
            })
            .collect()
    }

    /// Dense matrix form with `xᵀQx` equal to the payload energy.
    pub fn to_matrix(&self) -> Result<QuboMatrix, WireError> {
        Ok(to_matrix(&self.to_terms()?, self.variable_count()))
    }
}

/// Vendor job envelope around a [`ProblemPayload`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobEnvelope {
    #[serde(rename = "type")]
    pub job_type: String,
    pub format: String,
    pub problem: ProblemPayload,
    #[serde(default)]
    pub parameters: BTreeMap<String, Value>,
}

impl JobEnvelope {
    /// Wraps `problem` as a PUBO optimization job.
    pub fn new(mut problem: ProblemPayload) -> Self {
        problem.problem_type = ProblemType::Pubo;
        Self {
            job_type: JOB_TYPE.to_string(),
            format: JOB_FORMAT.to_string(),
            problem,
            parameters: BTreeMap::new(),
        }
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: Value) -> Self {
        self.parameters.insert(key.into(), value);
        self
    }
}

/// Formats QUBO terms with the wire schema.
pub fn format_problem(terms: &[QuboTerm], problem_type: ProblemType) -> ProblemPayload {
    ProblemPayload {
        problem_type,
        terms: terms
            .iter()
            .map(|t| WireTerm {
                c: t.coefficient,
                ids: if t.is_linear() { vec![t.i] } else { vec![t.i, t.j] },
            })
            .collect(),
        version: WIRE_VERSION.to_string(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SolverResponse {
    Direct { solution: Vec<f64> },
    Configurations { solutions: Vec<Configuration> },
}

#[derive(Debug, Deserialize)]
struct Configuration {
    configuration: BTreeMap<String, f64>,
}

fn to_bit(value: f64) -> Result<u8, WireError> {
    if (value - 1.0).abs() < 1e-9 {
        Ok(1)
    } else if value.abs() < 1e-9 {
        Ok(0)
    } else {
        Err(WireError::NotBinary(value))
    }
}

/// Extracts an `n`-bit solution from either response shape.
///
/// For the `solutions` shape the first configuration is used and indices it
/// omits default to 0.
///
/// # Errors
///
/// Any shape, length, index or value mismatch.
pub fn parse_solution(response: &Value, n: usize) -> Result<Vec<u8>, WireError> {
    let parsed: SolverResponse = serde_json::from_value(response.clone())
        .map_err(|e| WireError::UnknownShape(e.to_string()))?;

    match parsed {
        SolverResponse::Direct { solution } => {
            if solution.len() != n {
                return Err(WireError::Length {
                    expected: n,
                    found: solution.len(),
                });
            }
            solution.into_iter().map(to_bit).collect()
        }
        SolverResponse::Configurations { solutions } => {
            let first = solutions.into_iter().next().ok_or(WireError::NoSolutions)?;
            let mut bits = vec![0u8; n];
            for (key, value) in first.configuration {
                let index: usize = key.parse().map_err(|_| WireError::BadIndex(key.clone()))?;
                let slot = bits.get_mut(index).ok_or(WireError::BadIndex(key))?;
                *slot = to_bit(value)?;
            }
            Ok(bits)
        }
    }
}
