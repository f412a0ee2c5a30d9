//! Levels and connections of a hierarchical QUBO.

use std::collections::BTreeMap;

use crate::linalg::{QuboMatrix, ShapeError};

/// One independent QUBO block.
///
/// # Invariants
///
/// - `matrix` is square
/// - `variables.len()` equals the matrix side
/// - constraint targets are 0 or 1
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct QuboLevel {
    matrix: QuboMatrix,
    variables: Vec<String>,
    constraints: BTreeMap<String, u8>,
    weight: f64,
}

impl QuboLevel {
    /// Validates and creates a level. Variables default to `x0, x1, ...`;
    /// nonzero constraint targets are read as 1.
    ///
    /// # Errors
    ///
    /// - [`ShapeError::NotSquare`] for a rectangular matrix
    /// - [`ShapeError::DimensionMismatch`] if `variables` has the wrong length
    pub fn new(
        matrix: QuboMatrix,
        variables: Option<Vec<String>>,
        constraints: BTreeMap<String, u8>,
        weight: f64,
    ) -> Result<Self, ShapeError> {
        let size = matrix.dim()?;
        let variables = variables.unwrap_or_else(|| (0..size).map(|i| format!("x{i}")).collect());
        if variables.len() != size {
            return Err(ShapeError::DimensionMismatch {
                expected: size,
                found: variables.len(),
            });
        }
        let constraints = constraints
            .into_iter()
            .map(|(name, target)| (name, u8::from(target != 0)))
            .collect();

        Ok(Self {
            matrix,
            variables,
            constraints,
            weight,
        })
    }

    pub fn size(&self) -> usize {
        self.variables.len()
    }

    pub fn matrix(&self) -> &QuboMatrix {
        &self.matrix
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn constraints(&self) -> &BTreeMap<String, u8> {
        &self.constraints
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Fixed target of the variable at `index`, if any.
    pub fn target(&self, index: usize) -> Option<u8> {
        self.variables
            .get(index)
            .and_then(|name| self.constraints.get(name))
            .copied()
    }
}

/// Weighted coupling between two levels.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Connection {
    pub from: usize,
    pub to: usize,
    pub weight: f64,
}
