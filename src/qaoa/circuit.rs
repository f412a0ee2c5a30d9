//! Statevector operations of the QAOA circuit.
//!
//! Basis state `k` encodes bit `q` of the problem as `(k >> q) & 1`.

use num_complex::Complex64;

use crate::linalg::{QuboMatrix, ShapeError};

/// Number of qubits for a `dim`-dimensional state space.
///
/// # Errors
///
/// [`ShapeError::Empty`] for 0, [`ShapeError::NotPowerOfTwo`] otherwise.
pub fn qubit_count(dim: usize) -> Result<usize, ShapeError> {
    if dim == 0 {
        return Err(ShapeError::Empty);
    }
    if !dim.is_power_of_two() {
        return Err(ShapeError::NotPowerOfTwo(dim));
    }
    Ok(dim.trailing_zeros() as usize)
}

/// `1/√(2ⁿ)` on every basis state.
pub fn uniform_superposition(n_qubits: usize) -> Vec<Complex64> {
    let dim = 1usize << n_qubits;
    vec![Complex64::new(1.0 / (dim as f64).sqrt(), 0.0); dim]
}

/// Multiplies each amplitude by `exp(-iγ·h_k)`.
pub fn apply_phase_separator(state: &mut [Complex64], diagonal: &[f64], gamma: f64) {
    for (amplitude, &h) in state.iter_mut().zip(diagonal) {
        *amplitude *= Complex64::from_polar(1.0, -gamma * h);
    }
}

/// Applies `[[cos β, -i sin β], [-i sin β, cos β]]` to every qubit in turn.
pub fn apply_mixer(state: &mut [Complex64], beta: f64) {
    let (sin, cos) = beta.sin_cos();
    let c = Complex64::new(cos, 0.0);
    let s = Complex64::new(0.0, -sin);
    let dim = state.len();

    let mut bit = 1;
    while bit < dim {
        for k in (0..dim).filter(|k| k & bit == 0) {
            let (a, b) = (state[k], state[k | bit]);
            state[k] = c * a + s * b;
            state[k | bit] = s * a + c * b;
        }
        bit <<= 1;
    }
}

/// Runs `gammas.len()` phase/mixer layers on a copy of `state`.
pub fn apply_layers(
    state: &[Complex64],
    diagonal: &[f64],
    gammas: &[f64],
    betas: &[f64],
) -> Vec<Complex64> {
    let mut out = state.to_vec();
    for (&gamma, &beta) in gammas.iter().zip(betas) {
        apply_phase_separator(&mut out, diagonal, gamma);
        apply_mixer(&mut out, beta);
    }
    out
}

/// `Re(⟨ψ|H|ψ⟩)`.
pub fn expectation(state: &[Complex64], hamiltonian: &QuboMatrix) -> f64 {
    let n = state.len().min(hamiltonian.rows());
    let mut total = 0.0;
    for i in 0..n {
        for j in 0..n {
            let h = hamiltonian[(i, j)];
            if h != 0.0 {
                total += (state[i].conj() * state[j]).re * h;
            }
        }
    }
    total
}

/// Cost Hamiltonian of an `n`-variable QUBO: diagonal with entry `k` equal
/// to `xᵀQx` for the bits of `k`.
///
/// # Errors
///
/// [`ShapeError::NotSquare`] for rectangular `q`.
pub fn diagonal_hamiltonian(q: &QuboMatrix) -> Result<QuboMatrix, ShapeError> {
    let n = q.dim()?;
    let dim = 1usize << n;
    let mut h = QuboMatrix::square(dim);
    for k in 0..dim {
        h[(k, k)] = q.energy(&basis_bits(k, n));
    }
    Ok(h)
}

/// Bits of basis state `k` over `n` qubits.
pub fn basis_bits(k: usize, n: usize) -> Vec<u8> {
    (0..n).map(|q| ((k >> q) & 1) as u8).collect()
}
