//! Cost oracle: the learned function mapping an encoded graph to one
//! traversal cost per directed edge.
//!
//! The pipeline treats the oracle as pure and read-only. Its declared input
//! widths are checked once, when the pipeline is built; a mismatch is a
//! fatal configuration error rather than a per-request failure.

use crate::error::{RerouteError, Result};
use crate::features::{EncodedGraph, EDGE_FEATURES, NODE_FEATURES};
use crate::gnn::GcnEdgeRegressor;
use std::path::Path;
use tracing::info;

/// Predicts a traversal cost for every edge of an encoded graph.
///
/// Implementations must be deterministic: identical inputs give identical
/// outputs.
pub trait CostOracle: Send + Sync {
    /// Node feature width the oracle consumes.
    fn node_feature_dim(&self) -> usize;

    /// Edge feature width the oracle consumes.
    fn edge_feature_dim(&self) -> usize;

    /// One cost per entry of `graph.edge_index`, in the same order.
    ///
    /// # Errors
    ///
    /// Returns an error if the graph tables do not match the oracle.
    fn predict(&self, graph: &EncodedGraph) -> Result<Vec<f64>>;
}

impl CostOracle for GcnEdgeRegressor {
    fn node_feature_dim(&self) -> usize {
        self.node_features()
    }

    fn edge_feature_dim(&self) -> usize {
        self.edge_features()
    }

    fn predict(&self, graph: &EncodedGraph) -> Result<Vec<f64>> {
        let costs = self.predict_edges(
            &graph.node_features,
            &graph.edge_index,
            &graph.edge_features,
        )?;
        Ok(costs.into_iter().map(f64::from).collect())
    }
}

/// Verifies that `oracle` consumes the tables the feature encoder produces.
///
/// # Errors
///
/// `OracleLoad` naming the mismatching width.
pub fn check_input_shape(oracle: &dyn CostOracle, source: &str) -> Result<()> {
    if oracle.node_feature_dim() != NODE_FEATURES {
        return Err(RerouteError::oracle_load(
            source,
            format!(
                "model expects {} node features, encoder produces {NODE_FEATURES}",
                oracle.node_feature_dim()
            ),
        ));
    }
    if oracle.edge_feature_dim() != EDGE_FEATURES {
        return Err(RerouteError::oracle_load(
            source,
            format!(
                "model expects {} edge features, encoder produces {EDGE_FEATURES}",
                oracle.edge_feature_dim()
            ),
        ));
    }
    Ok(())
}

/// Loads the persisted cost model and checks it against the encoder.
///
/// # Errors
///
/// `OracleLoad` if the file cannot be read, is corrupt, or has the wrong
/// input widths.
pub fn load_oracle<P: AsRef<Path>>(path: P) -> Result<GcnEdgeRegressor> {
    let path = path.as_ref();
    let model = GcnEdgeRegressor::load(path)?;
    check_input_shape(&model, &path.display().to_string())?;
    info!(
        path = %path.display(),
        hidden = model.hidden_dim(),
        parameters = model.num_parameters(),
        "loaded cost model"
    );
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureEncoder;
    use crate::telemetry::{EdgeRecord, NodeRecord, TelemetryRow};

    fn rows() -> Vec<TelemetryRow> {
        [("A", "B", 3.0), ("B", "C", 7.0), ("A", "C", 1.0)]
            .into_iter()
            .map(|(src, dst, q)| TelemetryRow {
                node: NodeRecord {
                    id: src.into(),
                    queue_length: q,
                    status: 1.0,
                    processing_rate: 2.0,
                    delay: q,
                    capacity: 20.0,
                },
                edge: EdgeRecord {
                    source: src.into(),
                    target: dst.into(),
                    distance: 4.0 * q,
                    reroute_capacity: 1.0,
                    is_connected: 1.0,
                },
            })
            .collect()
    }

    #[test]
    fn test_regressor_predicts_one_cost_per_edge() {
        let model = GcnEdgeRegressor::with_seed(NODE_FEATURES, EDGE_FEATURES, 8, Some(4));
        let graph = FeatureEncoder::new().encode(&rows()).expect("encodes");
        let costs = model.predict(&graph).expect("predicts");
        assert_eq!(costs.len(), graph.num_edges());
    }

    #[test]
    fn test_check_input_shape_accepts_matching_model() {
        let model = GcnEdgeRegressor::with_seed(NODE_FEATURES, EDGE_FEATURES, 8, Some(4));
        assert!(check_input_shape(&model, "memory").is_ok());
    }

    #[test]
    fn test_check_input_shape_rejects_wrong_widths() {
        let model = GcnEdgeRegressor::with_seed(4, EDGE_FEATURES, 8, Some(4));
        let err = check_input_shape(&model, "memory").expect_err("4 node features");
        assert!(matches!(err, RerouteError::OracleLoad { .. }));

        let model = GcnEdgeRegressor::with_seed(NODE_FEATURES, 2, 8, Some(4));
        assert!(check_input_shape(&model, "memory").is_err());
    }

    #[test]
    fn test_load_oracle_rejects_wrong_widths_on_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("narrow.bin");
        GcnEdgeRegressor::with_seed(6, EDGE_FEATURES, 4, Some(0))
            .save(&path)
            .expect("save");
        assert!(matches!(
            load_oracle(&path),
            Err(RerouteError::OracleLoad { .. })
        ));
    }

    #[test]
    fn test_load_oracle_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("model.bin");
        let model = GcnEdgeRegressor::with_seed(NODE_FEATURES, EDGE_FEATURES, 4, Some(2));
        model.save(&path).expect("save");
        assert_eq!(load_oracle(&path).expect("loads"), model);
    }
}
