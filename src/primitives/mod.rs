//! Dense numeric primitives.
//!
//! Feature tables and layer weights are all row-major [`Matrix`] values.

mod matrix;

pub use matrix::Matrix;
