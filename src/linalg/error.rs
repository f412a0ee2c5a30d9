use thiserror::Error;

/// Malformed matrix or variable-list input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShapeError {
    #[error("Matrix must be square, got {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    #[error("Matrix rows have inconsistent lengths: expected {expected}, found {found}")]
    Ragged { expected: usize, found: usize },

    #[error("Dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("Dimension {0} is not a power of two")]
    NotPowerOfTwo(usize),

    #[error("Matrix is empty")]
    Empty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_square_display() {
        let e = ShapeError::NotSquare { rows: 2, cols: 3 };
        assert_eq!(e.to_string(), "Matrix must be square, got 2x3");
    }

    #[test]
    fn dimension_mismatch_display() {
        let e = ShapeError::DimensionMismatch {
            expected: 4,
            found: 3,
        };
        assert_eq!(e.to_string(), "Dimension mismatch: expected 4, found 3");
    }

    #[test]
    fn not_power_of_two_display() {
        assert_eq!(
            ShapeError::NotPowerOfTwo(3).to_string(),
            "Dimension 3 is not a power of two"
        );
    }
}
