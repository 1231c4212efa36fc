//! Fully connected (linear) layer.
//!
//! Implements the transformation y = xW^T + b.

use super::init::xavier_uniform;
use crate::error::{RerouteError, Result};
use crate::primitives::Matrix;
use serde::{Deserialize, Serialize};

/// Fully connected layer: y = xW^T + b
///
/// The weight is stored pre-transposed (`[in_features, out_features]`) so
/// the forward pass is a single matmul.
///
/// # Example
///
/// ```
/// use reroute::nn::Linear;
/// use reroute::primitives::Matrix;
///
/// let layer = Linear::with_seed(3, 2, Some(0));
/// let out = layer.forward(&Matrix::zeros(4, 3)).expect("3 input features");
/// assert_eq!(out.shape(), (4, 2));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Linear {
    /// Transposed weight, shape: [in_features, out_features]
    weight_t: Matrix<f32>,
    /// Bias vector, shape: [out_features]
    bias: Vec<f32>,
}

impl Linear {
    /// Create a Linear layer with Xavier initialization and zero bias.
    #[must_use]
    pub fn with_seed(in_features: usize, out_features: usize, seed: Option<u64>) -> Self {
        Self {
            weight_t: xavier_uniform(in_features, out_features, in_features, out_features, seed),
            bias: vec![0.0; out_features],
        }
    }

    /// Build from a `[out_features, in_features]` weight and a bias.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if the bias length differs from the weight's row count.
    pub fn from_parts(weight: &Matrix<f32>, bias: Vec<f32>) -> Result<Self> {
        if bias.len() != weight.n_rows() {
            return Err(RerouteError::dimension_mismatch(
                "linear bias",
                weight.n_rows(),
                bias.len(),
            ));
        }
        Ok(Self {
            weight_t: weight.transpose(),
            bias,
        })
    }

    /// Input feature dimension.
    #[must_use]
    pub fn in_features(&self) -> usize {
        self.weight_t.n_rows()
    }

    /// Output feature dimension.
    #[must_use]
    pub fn out_features(&self) -> usize {
        self.weight_t.n_cols()
    }

    /// Number of scalar parameters.
    #[must_use]
    pub fn num_parameters(&self) -> usize {
        self.weight_t.as_slice().len() + self.bias.len()
    }

    /// Checks internal consistency after deserialization.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` when the bias and weight disagree or the
    /// parameters are not finite.
    pub fn validate(&self) -> Result<()> {
        if self.bias.len() != self.out_features() {
            return Err(RerouteError::dimension_mismatch(
                "linear bias",
                self.out_features(),
                self.bias.len(),
            ));
        }
        if !self.weight_t.all_finite() || self.bias.iter().any(|b| !b.is_finite()) {
            return Err(RerouteError::DimensionMismatch {
                expected: "finite parameters".to_string(),
                actual: "NaN or infinite value".to_string(),
            });
        }
        Ok(())
    }

    /// Applies the layer to `x` (`[n, in_features]` → `[n, out_features]`).
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if `x` has the wrong width.
    pub fn forward(&self, x: &Matrix<f32>) -> Result<Matrix<f32>> {
        if x.n_cols() != self.in_features() {
            return Err(RerouteError::dimension_mismatch(
                "linear input features",
                self.in_features(),
                x.n_cols(),
            ));
        }
        let mut out = x
            .matmul(&self.weight_t)
            .map_err(|e| RerouteError::DimensionMismatch {
                expected: format!("[n, {}]", self.in_features()),
                actual: e.to_string(),
            })?;
        out.add_row_vector(&self.bias)
            .map_err(|e| RerouteError::DimensionMismatch {
                expected: format!("bias of {}", out.n_cols()),
                actual: e.to_string(),
            })?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_known_weights() {
        // W = [[1, 2], [3, 4], [5, 6]] (3 out, 2 in), b = [0.5, 0, -1]
        let w = Matrix::from_rows(&[[1.0_f32, 2.0], [3.0, 4.0], [5.0, 6.0]]);
        let layer = Linear::from_parts(&w, vec![0.5, 0.0, -1.0]).expect("consistent");
        let x = Matrix::from_rows(&[[1.0_f32, 1.0]]);

        let y = layer.forward(&x).expect("2 features");
        assert_eq!(y.as_slice(), &[3.5, 7.0, 10.0]);
    }

    #[test]
    fn test_dimensions_and_parameter_count() {
        let layer = Linear::with_seed(5, 8, Some(1));
        assert_eq!(layer.in_features(), 5);
        assert_eq!(layer.out_features(), 8);
        assert_eq!(layer.num_parameters(), 5 * 8 + 8);
        assert!(layer.validate().is_ok());
    }

    #[test]
    fn test_wrong_input_width() {
        let layer = Linear::with_seed(5, 8, Some(1));
        assert!(layer.forward(&Matrix::zeros(2, 4)).is_err());
    }

    #[test]
    fn test_from_parts_bias_mismatch() {
        let w = Matrix::<f32>::zeros(3, 2);
        assert!(Linear::from_parts(&w, vec![0.0; 2]).is_err());
    }
}
