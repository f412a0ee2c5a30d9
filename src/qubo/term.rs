//! QUBO terms.

use crate::linalg::QuboMatrix;

/// One QUBO coefficient.
///
/// `i == j` is a linear term on `x_i`; `i != j` is a symmetric quadratic term
/// on `x_i · x_j`. Duplicate `(i, j)` pairs in a problem are summed.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct QuboTerm {
    pub i: usize,
    pub j: usize,
    pub coefficient: f64,
}

impl QuboTerm {
    pub const fn new(i: usize, j: usize, coefficient: f64) -> Self {
        Self { i, j, coefficient }
    }

    pub const fn linear(i: usize, coefficient: f64) -> Self {
        Self::new(i, i, coefficient)
    }

    pub const fn quadratic(i: usize, j: usize, coefficient: f64) -> Self {
        Self::new(i, j, coefficient)
    }

    pub const fn is_linear(&self) -> bool {
        self.i == self.j
    }
}

/// Evaluates `Σ c · x_i · x_j` over `terms`.
///
/// Terms referring to indices beyond `bits` contribute nothing.
pub fn energy(terms: &[QuboTerm], bits: &[u8]) -> f64 {
    terms
        .iter()
        .filter(|t| {
            bits.get(t.i).copied().unwrap_or(0) != 0 && bits.get(t.j).copied().unwrap_or(0) != 0
        })
        .map(|t| t.coefficient)
        .sum()
}

/// Number of variables referenced by `terms` (highest index + 1).
pub fn variable_count(terms: &[QuboTerm]) -> usize {
    terms.iter().map(|t| t.i.max(t.j) + 1).max().unwrap_or(0)
}

/// Accumulates `terms` into an `n x n` matrix with `xᵀQx == energy(terms, x)`.
///
/// Quadratic coefficients are split evenly between `(i, j)` and `(j, i)`;
/// terms outside the matrix are dropped.
pub fn to_matrix(terms: &[QuboTerm], n: usize) -> QuboMatrix {
    let mut q = QuboMatrix::square(n);
    for t in terms.iter().filter(|t| t.i < n && t.j < n) {
        if t.is_linear() {
            q.add_at(t.i, t.i, t.coefficient);
        } else {
            q.add_at(t.i, t.j, t.coefficient / 2.0);
            q.add_at(t.j, t.i, t.coefficient / 2.0);
        }
    }
    q
}

/// Terms of a square matrix: diagonal entries as linear terms, each
/// off-diagonal pair `q_ij + q_ji` as one quadratic term. Zero entries are
/// skipped.
pub fn from_matrix(q: &QuboMatrix) -> Vec<QuboTerm> {
    let n = q.rows().min(q.cols());
    let mut terms = Vec::new();
    for i in 0..n {
        if q[(i, i)] != 0.0 {
            terms.push(QuboTerm::linear(i, q[(i, i)]));
        }
        for j in i + 1..n {
            let c = q[(i, j)] + q[(j, i)];
            if c != 0.0 {
                terms.push(QuboTerm::quadratic(i, j, c));
            }
        }
    }
    terms
}
