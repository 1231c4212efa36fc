//! Weight initialization.
//!
//! # References
//!
//! - Glorot, X., & Bengio, Y. (2010). Understanding the difficulty of training
//!   deep feedforward neural networks. AISTATS.

use crate::primitives::Matrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Xavier uniform initialization (Glorot & Bengio, 2010).
///
/// Samples a `rows x cols` matrix from U(-a, a) where
/// a = sqrt(6 / (`fan_in` + `fan_out`)).
///
/// # Example
///
/// ```
/// use reroute::nn::xavier_uniform;
///
/// let w = xavier_uniform(4, 8, 4, 8, Some(7));
/// let bound = (6.0_f32 / 12.0).sqrt();
/// assert!(w.as_slice().iter().all(|v| v.abs() <= bound));
/// ```
#[must_use]
pub fn xavier_uniform(
    rows: usize,
    cols: usize,
    fan_in: usize,
    fan_out: usize,
    seed: Option<u64>,
) -> Matrix<f32> {
    let a = (6.0 / (fan_in + fan_out).max(1) as f32).sqrt();
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    let mut m = Matrix::zeros(rows, cols);
    for i in 0..rows {
        for j in 0..cols {
            m.set(i, j, rng.gen_range(-a..=a));
        }
    }
    m
}
