//! Preprocessing transformers for feature standardization.
//!
//! # Example
//!
//! ```
//! use reroute::prelude::*;
//!
//! let data = Matrix::from_rows(&[[1.0_f32, 100.0], [2.0, 200.0], [3.0, 300.0]]);
//!
//! let mut scaler = StandardScaler::new();
//! let scaled = scaler.fit_transform(&data).expect("fit_transform should succeed");
//!
//! // Middle row sits on the mean of both columns
//! assert!(scaled.get(1, 0).abs() < 1e-6);
//! assert!(scaled.get(1, 1).abs() < 1e-6);
//! ```

use crate::error::{RerouteError, Result};
use crate::primitives::Matrix;
use crate::traits::Transformer;

/// Standard deviations at or below this are treated as 1 (column is only centered).
const MIN_STD: f64 = 1e-10;

/// Standardizes features by removing mean and scaling to unit variance.
///
/// The standard score of a sample x is: z = (x - mean) / std, with the
/// population standard deviation (divide by n). Statistics are accumulated
/// in `f64` and stored as `f32`.
#[derive(Debug, Clone, Default)]
pub struct StandardScaler {
    /// Mean of each feature (computed during fit).
    mean: Option<Vec<f32>>,
    /// Standard deviation of each feature (computed during fit).
    std: Option<Vec<f32>>,
}

impl StandardScaler {
    /// Creates an unfitted scaler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the fitted per-column means.
    #[must_use]
    pub fn mean(&self) -> Option<&[f32]> {
        self.mean.as_deref()
    }

    /// Returns the fitted per-column standard deviations.
    #[must_use]
    pub fn std(&self) -> Option<&[f32]> {
        self.std.as_deref()
    }

    /// Returns true if the scaler has been fitted.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.mean.is_some()
    }
}

impl Transformer for StandardScaler {
    fn fit(&mut self, x: &Matrix<f32>) -> Result<()> {
        let (n_samples, n_features) = x.shape();

        if n_samples == 0 {
            return Err(RerouteError::EmptyGraph {
                what: "feature table has no rows",
            });
        }

        let n = n_samples as f64;
        let mut mean = vec![0.0_f64; n_features];
        for (j, mean_j) in mean.iter_mut().enumerate() {
            let sum: f64 = (0..n_samples).map(|i| f64::from(x.get(i, j))).sum();
            *mean_j = sum / n;
        }

        let mut std = vec![0.0_f64; n_features];
        for (j, std_j) in std.iter_mut().enumerate() {
            let sum_sq: f64 = (0..n_samples)
                .map(|i| {
                    let diff = f64::from(x.get(i, j)) - mean[j];
                    diff * diff
                })
                .sum();
            *std_j = (sum_sq / n).sqrt();
        }

        self.mean = Some(mean.into_iter().map(|m| m as f32).collect());
        self.std = Some(
            std.into_iter()
                .map(|s| if s > MIN_STD { s as f32 } else { 1.0 })
                .collect(),
        );

        Ok(())
    }

    fn transform(&self, x: &Matrix<f32>) -> Result<Matrix<f32>> {
        let (Some(mean), Some(std)) = (self.mean.as_ref(), self.std.as_ref()) else {
            return Err(RerouteError::malformed("scaler used before fit"));
        };

        let (n_samples, n_features) = x.shape();
        if n_features != mean.len() {
            return Err(RerouteError::dimension_mismatch(
                "scaler features",
                mean.len(),
                n_features,
            ));
        }

        let mut result = Vec::with_capacity(n_samples * n_features);
        for i in 0..n_samples {
            for j in 0..n_features {
                result.push((x.get(i, j) - mean[j]) / std[j]);
            }
        }

        Matrix::from_vec(n_samples, n_features, result).map_err(|e| {
            RerouteError::DimensionMismatch {
                expected: format!("{n_samples}x{n_features}"),
                actual: e.to_string(),
            }
        })
    }
}
