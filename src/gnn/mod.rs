//! Graph Neural Network layers and the edge-cost regressor built from them.
//!
//! # Architecture
//!
//! ```text
//! node table (N x 5)        edge list (E)       edge table (E x 3)
//!        │                      │                      │
//!        ▼                      │                      │
//!   GcnConv 5→H, ReLU ◄─────────┤                      │
//!        ▼                      │                      │
//!   GcnConv H→H, ReLU ◄─────────┘                      │
//!        │                                             │
//!        └──► [h_src ‖ h_dst ‖ edge features] ◄────────┘
//!                          │
//!                    Linear 2H+3 → 1
//!                          ▼
//!                 predicted cost per edge
//! ```
//!
//! # References
//!
//! - Kipf, T. N., & Welling, M. (2017). Semi-Supervised Classification with
//!   Graph Convolutional Networks. ICLR.

use crate::error::{RerouteError, Result};
use crate::nn::Linear;
use crate::primitives::Matrix;
use crate::registry::NodeCode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Edge index type: (source_node, target_node)
pub type EdgeIndex = (NodeCode, NodeCode);

/// Hidden width of the shipped model.
pub const DEFAULT_HIDDEN_DIM: usize = 64;

/// Bumped whenever the persisted layout changes.
const MODEL_FORMAT_VERSION: u32 = 1;

/// Graph Convolutional Network layer (Kipf & Welling, 2017).
///
/// Messages flow along edge direction (source → target). With self-loops
/// added, node `i` receives
///
/// ```text
/// h_i' = W · Σ_{j ∈ N_in(i) ∪ {i}} (1/√(d_i · d_j)) · h_j + b
/// ```
///
/// where `d` counts incoming edges plus the self-loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GcnConv {
    /// Linear transformation
    linear: Linear,
    /// Whether to add self-loops
    add_self_loops: bool,
}

impl GcnConv {
    /// Create a GCN layer with Xavier-initialised weights.
    #[must_use]
    pub fn with_seed(in_features: usize, out_features: usize, seed: Option<u64>) -> Self {
        Self {
            linear: Linear::with_seed(in_features, out_features, seed),
            add_self_loops: true,
        }
    }

    /// Wrap an existing linear transformation.
    #[must_use]
    pub fn from_linear(linear: Linear, add_self_loops: bool) -> Self {
        Self {
            linear,
            add_self_loops,
        }
    }

    /// Get input feature dimension.
    #[must_use]
    pub fn in_features(&self) -> usize {
        self.linear.in_features()
    }

    /// Get output feature dimension.
    #[must_use]
    pub fn out_features(&self) -> usize {
        self.linear.out_features()
    }

    /// Number of scalar parameters.
    #[must_use]
    pub fn num_parameters(&self) -> usize {
        self.linear.num_parameters()
    }

    /// Forward pass with graph structure.
    ///
    /// Neighbour contributions are accumulated in sorted `(target, source)`
    /// order, so the output does not depend on the order of `edge_index`.
    ///
    /// # Errors
    ///
    /// - `DimensionMismatch` if `x` has the wrong width
    /// - `InvalidCode` if an edge references a node outside `x`
    pub fn forward_gnn(&self, x: &Matrix<f32>, edge_index: &[EdgeIndex]) -> Result<Matrix<f32>> {
        let (num_nodes, in_features) = x.shape();
        if in_features != self.in_features() {
            return Err(RerouteError::dimension_mismatch(
                "gcn input features",
                self.in_features(),
                in_features,
            ));
        }

        let mut edges = edge_index.to_vec();
        if let Some(&(s, t)) = edges.iter().find(|&&(s, t)| s >= num_nodes || t >= num_nodes) {
            return Err(RerouteError::InvalidCode {
                code: s.max(t),
                len: num_nodes,
            });
        }
        edges.sort_unstable_by_key(|&(src, tgt)| (tgt, src));

        // In-degree, plus one for the self-loop
        let mut degrees = vec![if self.add_self_loops { 1.0_f32 } else { 0.0 }; num_nodes];
        for &(_, tgt) in &edges {
            degrees[tgt] += 1.0;
        }
        let norm: Vec<f32> = degrees
            .iter()
            .map(|&d| if d > 0.0 { 1.0 / d.sqrt() } else { 0.0 })
            .collect();

        let mut aggregated = Matrix::zeros(num_nodes, in_features);
        if self.add_self_loops {
            for i in 0..num_nodes {
                let norm_ii = norm[i] * norm[i];
                for f in 0..in_features {
                    aggregated.set(i, f, norm_ii * x.get(i, f));
                }
            }
        }
        for &(src, tgt) in &edges {
            let coeff = norm[src] * norm[tgt];
            for f in 0..in_features {
                let acc = aggregated.get(tgt, f) + coeff * x.get(src, f);
                aggregated.set(tgt, f, acc);
            }
        }

        self.linear.forward(&aggregated)
    }

    fn validate(&self) -> Result<()> {
        self.linear.validate()
    }
}

/// Two-layer GCN encoder with a linear edge head predicting one cost per edge.
///
/// # Example
///
/// ```
/// use reroute::gnn::GcnEdgeRegressor;
/// use reroute::primitives::Matrix;
///
/// let model = GcnEdgeRegressor::with_seed(5, 3, 16, Some(42));
/// let x = Matrix::zeros(3, 5);
/// let edge_attr = Matrix::zeros(2, 3);
/// let costs = model
///     .predict_edges(&x, &[(0, 1), (1, 2)], &edge_attr)
///     .expect("shapes agree");
/// assert_eq!(costs.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GcnEdgeRegressor {
    conv1: GcnConv,
    conv2: GcnConv,
    edge_predictor: Linear,
}

#[derive(Serialize, Deserialize)]
struct ModelFile {
    version: u32,
    model: GcnEdgeRegressor,
}

impl GcnEdgeRegressor {
    /// Freshly initialised (untrained) model.
    #[must_use]
    pub fn with_seed(
        node_features: usize,
        edge_features: usize,
        hidden: usize,
        seed: Option<u64>,
    ) -> Self {
        // Distinct per-layer streams derived from one seed
        let layer_seed = |k: u64| seed.map(|s| s.wrapping_mul(31).wrapping_add(k));
        Self {
            conv1: GcnConv::with_seed(node_features, hidden, layer_seed(1)),
            conv2: GcnConv::with_seed(hidden, hidden, layer_seed(2)),
            edge_predictor: Linear::with_seed(2 * hidden + edge_features, 1, layer_seed(3)),
        }
    }

    /// Assemble from trained layers.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if the layers do not chain.
    pub fn from_layers(conv1: GcnConv, conv2: GcnConv, edge_predictor: Linear) -> Result<Self> {
        let model = Self {
            conv1,
            conv2,
            edge_predictor,
        };
        model.validate()?;
        Ok(model)
    }

    /// Node feature width the model expects.
    #[must_use]
    pub fn node_features(&self) -> usize {
        self.conv1.in_features()
    }

    /// Hidden width.
    #[must_use]
    pub fn hidden_dim(&self) -> usize {
        self.conv2.out_features()
    }

    /// Edge feature width the model expects.
    #[must_use]
    pub fn edge_features(&self) -> usize {
        self.edge_predictor
            .in_features()
            .saturating_sub(2 * self.hidden_dim())
    }

    /// Number of scalar parameters.
    #[must_use]
    pub fn num_parameters(&self) -> usize {
        self.conv1.num_parameters()
            + self.conv2.num_parameters()
            + self.edge_predictor.num_parameters()
    }

    /// Checks that the layers chain and hold finite parameters.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` describing the first inconsistency.
    pub fn validate(&self) -> Result<()> {
        self.conv1.validate()?;
        self.conv2.validate()?;
        self.edge_predictor.validate()?;
        if self.conv2.in_features() != self.conv1.out_features() {
            return Err(RerouteError::dimension_mismatch(
                "conv2 input",
                self.conv1.out_features(),
                self.conv2.in_features(),
            ));
        }
        if self.edge_predictor.in_features() <= 2 * self.hidden_dim() {
            return Err(RerouteError::dimension_mismatch(
                "edge head input",
                2 * self.hidden_dim() + 1,
                self.edge_predictor.in_features(),
            ));
        }
        if self.edge_predictor.out_features() != 1 {
            return Err(RerouteError::dimension_mismatch(
                "edge head output",
                1,
                self.edge_predictor.out_features(),
            ));
        }
        Ok(())
    }

    /// Predicts one cost per edge, in `edge_index` order.
    ///
    /// # Errors
    ///
    /// - `DimensionMismatch` if table widths disagree with the model or the
    ///   edge table length differs from `edge_index`
    /// - `InvalidCode` if an edge references a node outside `x`
    pub fn predict_edges(
        &self,
        x: &Matrix<f32>,
        edge_index: &[EdgeIndex],
        edge_attr: &Matrix<f32>,
    ) -> Result<Vec<f32>> {
        if edge_attr.n_rows() != edge_index.len() {
            return Err(RerouteError::dimension_mismatch(
                "edge feature rows",
                edge_index.len(),
                edge_attr.n_rows(),
            ));
        }
        if edge_attr.n_cols() != self.edge_features() {
            return Err(RerouteError::dimension_mismatch(
                "edge features",
                self.edge_features(),
                edge_attr.n_cols(),
            ));
        }

        let mut h = self.conv1.forward_gnn(x, edge_index)?;
        h.relu_inplace();
        let mut h = self.conv2.forward_gnn(&h, edge_index)?;
        h.relu_inplace();

        let hidden = self.hidden_dim();
        let width = 2 * hidden + edge_attr.n_cols();
        let mut edge_inputs = Vec::with_capacity(edge_index.len() * width);
        for (e, &(src, tgt)) in edge_index.iter().enumerate() {
            edge_inputs.extend_from_slice(h.row(src));
            edge_inputs.extend_from_slice(h.row(tgt));
            edge_inputs.extend_from_slice(edge_attr.row(e));
        }
        let edge_inputs = Matrix::from_vec(edge_index.len(), width, edge_inputs).map_err(|e| {
            RerouteError::DimensionMismatch {
                expected: format!("{} x {width}", edge_index.len()),
                actual: e.to_string(),
            }
        })?;

        Ok(self.edge_predictor.forward(&edge_inputs)?.column(0))
    }

    /// Writes the parameters with bincode.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = bincode::serialize(&ModelFile {
            version: MODEL_FORMAT_VERSION,
            model: self.clone(),
        })?;
        fs::write(path, bytes)?;
        Ok(())
    }

    /// Reads parameters written by [`save`](Self::save) and validates them.
    ///
    /// # Errors
    ///
    /// `OracleLoad` if the file is missing, corrupt, from another format
    /// version or holds inconsistent layers.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| RerouteError::oracle_load(path, e.to_string()))?;
        let file: ModelFile = bincode::deserialize(&bytes)
            .map_err(|e| RerouteError::oracle_load(path, format!("corrupt parameters: {e}")))?;
        if file.version != MODEL_FORMAT_VERSION {
            return Err(RerouteError::oracle_load(
                path,
                format!(
                    "format version {} (supported: {MODEL_FORMAT_VERSION})",
                    file.version
                ),
            ));
        }
        file.model
            .validate()
            .map_err(|e| RerouteError::oracle_load(path, e.to_string()))?;
        Ok(file.model)
    }
}

#[cfg(test)]
mod tests;
