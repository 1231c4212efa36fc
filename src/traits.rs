//! Core traits shared by the encoding stages.

use crate::error::Result;
use crate::primitives::Matrix;

/// Trait for data transformers (scalers, encoders).
///
/// Transformers are fitted and applied within a single request; nothing
/// fitted here outlives the request that produced it.
///
/// ```
/// use reroute::prelude::*;
///
/// let x = Matrix::from_rows(&[[1.0_f32, 10.0], [3.0, 30.0]]);
/// let mut scaler = StandardScaler::new();
/// let z = scaler.fit_transform(&x).expect("two rows");
/// assert!((z.get(0, 0) + 1.0).abs() < 1e-6);
/// ```
pub trait Transformer {
    /// Fits the transformer to data.
    ///
    /// # Errors
    ///
    /// Returns an error if fitting fails.
    fn fit(&mut self, x: &Matrix<f32>) -> Result<()>;

    /// Transforms data using fitted parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if transformer is not fitted.
    fn transform(&self, x: &Matrix<f32>) -> Result<Matrix<f32>>;

    /// Fits and transforms in one step.
    ///
    /// # Errors
    ///
    /// Returns an error if fitting fails.
    fn fit_transform(&mut self, x: &Matrix<f32>) -> Result<Matrix<f32>> {
        self.fit(x)?;
        self.transform(x)
    }
}
