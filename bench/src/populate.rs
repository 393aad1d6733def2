//! Working-set generation: the matrix, byte buffer and table rows that the
//! timed blocks operate on.
//!
//! Everything is drawn from a seeded `StdRng`, so the same seed always yields
//! the same data and runs stay comparable.

use crate::workloads::database::BenchRow;
use nalgebra::DMatrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Upper bound (exclusive) of the generated column values.
pub const ROW_VALUE_LIMIT: i64 = 100;

/// `size`×`size` matrix of uniform values in `[0, 1)`.
pub fn random_matrix(size: usize, seed: u64) -> DMatrix<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    DMatrix::from_fn(size, size, |_, _| rng.gen::<f64>())
}

/// `len` random bytes.
pub fn random_bytes(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut bytes = vec![0u8; len];
    rng.fill(bytes.as_mut_slice());
    bytes
}

/// `count` rows of three integers in `0..ROW_VALUE_LIMIT`.
pub fn generate_rows(count: usize, seed: u64) -> Vec<BenchRow> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| BenchRow {
            a: rng.gen_range(0..ROW_VALUE_LIMIT),
            b: rng.gen_range(0..ROW_VALUE_LIMIT),
            c: rng.gen_range(0..ROW_VALUE_LIMIT),
        })
        .collect()
}
