//! Dense row-major matrices shared by the QUBO, reasoning and QAOA layers.

mod error;
mod matrix;

pub use error::ShapeError;
pub use matrix::{ComplexMatrix, Matrix, QuboMatrix};
