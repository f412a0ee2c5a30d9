use thiserror::Error;

use crate::linalg::ShapeError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReasoningError {
    #[error("No decision paths in quantum state")]
    EmptyState,

    #[error("No available actions in context")]
    NoActions,

    #[error(transparent)]
    Shape(#[from] ShapeError),
}
