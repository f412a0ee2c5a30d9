//! Dense row-major matrix.

use std::fmt;
use std::ops::{Add, Index, IndexMut, Mul};

use num_complex::Complex64;

use super::error::ShapeError;

/// Dense row-major matrix of `rows x cols` elements.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Matrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

/// Real matrix used for QUBO weights and problem Hamiltonians.
pub type QuboMatrix = Matrix<f64>;

/// Complex matrix used to evolve reasoning states.
pub type ComplexMatrix = Matrix<Complex64>;

impl<T: Copy + Default> Matrix<T> {
    /// Creates a `rows x cols` matrix filled with `T::default()`.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![T::default(); rows * cols],
        }
    }

    /// Creates an `n x n` zero matrix.
    pub fn square(n: usize) -> Self {
        Self::zeros(n, n)
    }

    /// Builds a matrix from row vectors.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError::Ragged`] if rows differ in length.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self, ShapeError> {
        let n_rows = rows.len();
        let n_cols = rows.first().map(Vec::len).unwrap_or(0);
        let mut data = Vec::with_capacity(n_rows * n_cols);
        for row in rows {
            if row.len() != n_cols {
                return Err(ShapeError::Ragged {
                    expected: n_cols,
                    found: row.len(),
                });
            }
            data.extend(row);
        }
        Ok(Self {
            rows: n_rows,
            cols: n_cols,
            data,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Side length of a square matrix.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError::NotSquare`] for rectangular matrices.
    pub fn dim(&self) -> Result<usize, ShapeError> {
        if self.is_square() {
            Ok(self.rows)
        } else {
            Err(ShapeError::NotSquare {
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    pub fn get(&self, i: usize, j: usize) -> Option<T> {
        (i < self.rows && j < self.cols).then(|| self.data[i * self.cols + j])
    }

    /// Returns the main diagonal.
    pub fn diagonal(&self) -> Vec<T> {
        (0..self.rows.min(self.cols))
            .map(|i| self.data[i * self.cols + i])
            .collect()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Copies `block` into this matrix with its top-left corner at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if the block does not fit.
    pub fn set_block(&mut self, row: usize, col: usize, block: &Matrix<T>) {
        assert!(
            row + block.rows <= self.rows && col + block.cols <= self.cols,
            "block does not fit"
        );
        for i in 0..block.rows {
            for j in 0..block.cols {
                self[(row + i, col + j)] = block[(i, j)];
            }
        }
    }
}

impl<T> Matrix<T>
where
    T: Copy + Default + From<f64>,
{
    /// Creates the `n x n` identity matrix.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::square(n);
        for i in 0..n {
            m[(i, i)] = T::from(1.0);
        }
        m
    }

    /// Places this matrix in the top-left corner of an `n x n` identity.
    ///
    /// A matrix that is already at least `n` wide is returned unchanged.
    pub fn pad_with_identity(&self, n: usize) -> Self {
        if self.rows >= n && self.cols >= n {
            return self.clone();
        }
        let size = n.max(self.rows).max(self.cols);
        let mut padded = Self::identity(size);
        padded.set_block(0, 0, self);
        padded
    }
}

impl<T> Matrix<T>
where
    T: Copy + Default + Add<Output = T> + Mul<Output = T>,
{
    /// Computes `self * v`.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError::DimensionMismatch`] if `v.len() != cols`.
    pub fn mul_vec(&self, v: &[T]) -> Result<Vec<T>, ShapeError> {
        if v.len() != self.cols {
            return Err(ShapeError::DimensionMismatch {
                expected: self.cols,
                found: v.len(),
            });
        }
        Ok(self
            .data
            .chunks(self.cols.max(1))
            .take(self.rows)
            .map(|row| {
                row.iter()
                    .zip(v)
                    .fold(T::default(), |acc, (&a, &b)| acc + a * b)
            })
            .collect())
    }

    /// Returns a copy with every element multiplied by `factor`.
    pub fn scaled(&self, factor: T) -> Self {
        Self {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|&x| x * factor).collect(),
        }
    }
}

impl Matrix<f64> {
    /// Evaluates `xᵀ Q x` for a binary vector.
    pub fn energy(&self, bits: &[u8]) -> f64 {
        let n = self.rows.min(self.cols).min(bits.len());
        let mut total = 0.0;
        for i in 0..n {
            if bits[i] == 0 {
                continue;
            }
            for j in 0..n {
                if bits[j] != 0 {
                    total += self.data[i * self.cols + j];
                }
            }
        }
        total
    }

    /// Energy change caused by flipping bit `k` of `bits`.
    pub fn flip_delta(&self, bits: &[u8], k: usize) -> f64 {
        let n = self.rows.min(self.cols).min(bits.len());
        let direction = if bits[k] == 0 { 1.0 } else { -1.0 };
        let mut field = self.data[k * self.cols + k];
        for j in 0..n {
            if j != k && bits[j] != 0 {
                field += self.data[k * self.cols + j] + self.data[j * self.cols + k];
            }
        }
        direction * field
    }

    /// Adds `value` to `(i, j)`.
    pub fn add_at(&mut self, i: usize, j: usize, value: f64) {
        self[(i, j)] += value;
    }
}

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    fn index(&self, (i, j): (usize, usize)) -> &T {
        assert!(i < self.rows && j < self.cols, "index ({i}, {j}) out of bounds");
        &self.data[i * self.cols + j]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T> {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut T {
        assert!(i < self.rows && j < self.cols, "index ({i}, {j}) out of bounds");
        &mut self.data[i * self.cols + j]
    }
}

impl<T: fmt::Display> fmt::Display for Matrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.rows {
            let row: Vec<String> = (0..self.cols)
                .map(|j| self.data[i * self.cols + j].to_string())
                .collect();
            writeln!(f, "[{}]", row.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rows_rejects_ragged() {
        let result = QuboMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]]);
        assert_eq!(
            result,
            Err(ShapeError::Ragged {
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn dim_of_rectangular_fails() {
        let m = QuboMatrix::zeros(2, 3);
        assert!(matches!(m.dim(), Err(ShapeError::NotSquare { rows: 2, cols: 3 })));
    }

    #[test]
    fn identity_padding_keeps_block() {
        let m = QuboMatrix::from_rows(vec![vec![0.0, 2.0], vec![3.0, 0.0]]).unwrap();
        let padded = m.pad_with_identity(4);
        assert_eq!(padded.rows(), 4);
        assert_eq!(padded[(0, 1)], 2.0);
        assert_eq!(padded[(1, 0)], 3.0);
        assert_eq!(padded[(2, 2)], 1.0);
        assert_eq!(padded[(3, 3)], 1.0);
        assert_eq!(padded[(2, 3)], 0.0);
    }

    #[test]
    fn mul_vec_complex() {
        let m = ComplexMatrix::identity(2).scaled(Complex64::new(0.0, 1.0));
        let v = vec![Complex64::new(1.0, 0.0), Complex64::new(0.0, 1.0)];
        let out = m.mul_vec(&v).unwrap();
        assert_eq!(out[0], Complex64::new(0.0, 1.0));
        assert_eq!(out[1], Complex64::new(-1.0, 0.0));
    }

    #[test]
    fn mul_vec_dimension_mismatch() {
        let m = QuboMatrix::identity(3);
        assert!(matches!(
            m.mul_vec(&[1.0, 2.0]),
            Err(ShapeError::DimensionMismatch {
                expected: 3,
                found: 2
            })
        ));
    }

    #[test]
    fn flip_delta_matches_full_energy() {
        let m = QuboMatrix::from_rows(vec![
            vec![1.0, -2.0, 0.5],
            vec![0.0, -1.0, 3.0],
            vec![1.5, 0.0, 2.0],
        ])
        .unwrap();
        let bits = [1u8, 0, 1];
        for k in 0..3 {
            let mut flipped = bits;
            flipped[k] = 1 - flipped[k];
            let expected = m.energy(&flipped) - m.energy(&bits);
            assert!((m.flip_delta(&bits, k) - expected).abs() < 1e-12);
        }
    }
}
