//! Dense neural network building blocks used by the cost model.
//!
//! Inference only: layers hold plain [`Matrix`](crate::primitives::Matrix)
//! parameters and have no gradient state.

mod init;
mod linear;

pub use init::xavier_uniform;
pub use linear::Linear;
