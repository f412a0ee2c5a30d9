use thiserror::Error;

use crate::linalg::ShapeError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QaoaError {
    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error("Initial state has {found} amplitudes, expected {expected}")]
    InitialState { expected: usize, found: usize },

    #[error("Problem needs {requested} qubits, limit is {limit}")]
    TooManyQubits { requested: usize, limit: usize },
}
