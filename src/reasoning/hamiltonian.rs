//! Evolution operators for reasoning states.

use std::f64::consts::PI;
use std::fmt::Debug;

use num_complex::Complex64;

use crate::linalg::ComplexMatrix;

use super::path::DecisionContext;

/// Produces the operator a reasoning state is evolved with before a decision.
///
/// Implementations are heuristics over decision paths; they need not be
/// unitary. The returned matrix may be smaller than `n_paths`, in which case
/// the state pads it with an identity block.
pub trait HamiltonianStrategy: Send + Sync + Debug {
    fn hamiltonian(&self, context: &DecisionContext, n_paths: usize) -> ComplexMatrix;

    fn name(&self) -> &str;
}

/// Rotation by `π · uncertainty` between the first two paths.
///
/// With more than two paths the 2x2 rotation is embedded in the identity, so
/// only the first two paths (in id order) mix.
#[derive(Debug, Clone, Copy, Default)]
pub struct RotationHamiltonian;

impl HamiltonianStrategy for RotationHamiltonian {
    fn hamiltonian(&self, context: &DecisionContext, n_paths: usize) -> ComplexMatrix {
        if n_paths < 2 {
            return ComplexMatrix::identity(n_paths);
        }
        let theta = PI * context.uncertainty;
        let (sin, cos) = theta.sin_cos();

        let mut h = ComplexMatrix::identity(n_paths);
        h[(0, 0)] = Complex64::new(cos, 0.0);
        h[(0, 1)] = Complex64::new(-sin, 0.0);
        h[(1, 0)] = Complex64::new(sin, 0.0);
        h[(1, 1)] = Complex64::new(cos, 0.0);
        h
    }

    fn name(&self) -> &str {
        "rotation"
    }
}
