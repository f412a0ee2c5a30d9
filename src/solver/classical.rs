//! Greedy bit-flip local search for QUBO matrices.

use rand::Rng;

use crate::linalg::QuboMatrix;

/// Single-flip descent: sweep all free variables, keep any flip that lowers
/// the energy, repeat until a sweep changes nothing or the sweep budget runs
/// out.
///
/// The energy of the result is never higher than the energy of the seed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GreedyBitFlip {
    pub max_sweeps: usize,
    /// A flip must lower the energy by more than this to be kept.
    pub min_improvement: f64,
}

impl Default for GreedyBitFlip {
    fn default() -> Self {
        Self {
            max_sweeps: 1000,
            min_improvement: 0.0,
        }
    }
}

impl GreedyBitFlip {
    pub fn new(max_sweeps: usize, min_improvement: f64) -> Self {
        Self {
            max_sweeps,
            min_improvement,
        }
    }

    /// Descends from `seed`. Variables with `frozen[k] == true` keep their
    /// seed value.
    pub fn solve(&self, q: &QuboMatrix, seed: Vec<u8>, frozen: Option<&[bool]>) -> Vec<u8> {
        let mut bits = seed;
        let n = bits.len().min(q.rows()).min(q.cols());
        let is_free = |k: usize| frozen.and_then(|f| f.get(k)).map_or(true, |&f| !f);

        for _ in 0..self.max_sweeps {
            let mut improved = false;
            for k in (0..n).filter(|&k| is_free(k)) {
                if q.flip_delta(&bits, k) < -self.min_improvement {
                    bits[k] ^= 1;
                    improved = true;
                }
            }
            if !improved {
                break;
            }
        }
        bits
    }
}

/// Uniformly random bit vector of length `n`.
pub fn random_bits<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<u8> {
    (0..n).map(|_| u8::from(rng.gen_bool(0.5))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sample() -> QuboMatrix {
        QuboMatrix::from_rows(vec![
            vec![-1.0, 2.0, 0.0],
            vec![2.0, -1.0, 0.0],
            vec![0.0, 0.0, 1.0],
        ])
        .unwrap()
    }

    #[test]
    fn reaches_local_minimum() {
        let q = sample();
        let bits = GreedyBitFlip::default().solve(&q, vec![0, 0, 1], None);
        assert_eq!(q.energy(&bits), -1.0);
        assert_eq!(bits[2], 0);
        for k in 0..3 {
            assert!(q.flip_delta(&bits, k) >= 0.0);
        }
    }

    #[test]
    fn frozen_bits_are_kept() {
        let q = sample();
        let bits = GreedyBitFlip::default().solve(&q, vec![0, 0, 1], Some(&[false, false, true]));
        assert_eq!(bits[2], 1);
    }

    #[test]
    fn zero_sweeps_returns_seed() {
        let q = sample();
        let bits = GreedyBitFlip::new(0, 0.0).solve(&q, vec![1, 1, 1], None);
        assert_eq!(bits, vec![1, 1, 1]);
    }

    #[test]
    fn random_bits_are_binary() {
        let mut rng = StdRng::seed_from_u64(3);
        let bits = random_bits(64, &mut rng);
        assert_eq!(bits.len(), 64);
        assert!(bits.iter().all(|&b| b <= 1));
    }

    proptest! {
        #[test]
        fn prop_never_worse_than_seed(
            data in prop::collection::vec(-5.0f64..5.0, 16),
            seed in prop::collection::vec(0u8..2, 4),
        ) {
            let rows = data.chunks(4).map(<[f64]>::to_vec).collect();
            let q = QuboMatrix::from_rows(rows).unwrap();
            let before = q.energy(&seed);
            let bits = GreedyBitFlip::default().solve(&q, seed, None);
            prop_assert!(q.energy(&bits) <= before + 1e-9);
        }
    }
}
