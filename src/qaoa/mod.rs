//! QAOA-style optimization by classical statevector simulation.
//!
//! The circuit alternates a diagonal phase separator `exp(-iγ·diag(H))` with
//! an X-rotation mixer on every qubit. [`QaoaOptimizer`] tunes the angles by
//! finite-difference gradient descent; [`QaoaSolver`] exposes it through the
//! external solver interface for small QUBOs.

pub mod circuit;
mod config;
mod error;
mod optimizer;
mod solver;

pub use circuit::diagonal_hamiltonian;
pub use config::QaoaConfig;
pub use error::QaoaError;
pub use optimizer::{OptimizationResult, QaoaOptimizer, QaoaParameters};
pub use solver::QaoaSolver;
