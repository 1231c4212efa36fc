//! Shared fixtures for integration tests.

#![allow(dead_code)]

use reroute::prelude::*;

/// Deterministic oracle: each edge costs its raw `distance` feature.
pub struct DistanceOracle;

impl CostOracle for DistanceOracle {
    fn node_feature_dim(&self) -> usize {
        NODE_FEATURES
    }

    fn edge_feature_dim(&self) -> usize {
        EDGE_FEATURES
    }

    fn predict(&self, graph: &EncodedGraph) -> reroute::Result<Vec<f64>> {
        Ok(graph
            .edge_features
            .column(0)
            .into_iter()
            .map(f64::from)
            .collect())
    }
}

/// One telemetry row for `src -> dst`; node attributes derive from `queue`.
pub fn row(src: &str, dst: &str, distance: f64, queue: f64) -> TelemetryRow {
    TelemetryRow {
        node: NodeRecord {
            id: src.to_string(),
            queue_length: queue,
            status: 1.0,
            processing_rate: 2.0 + queue / 10.0,
            delay: queue / 2.0,
            capacity: 40.0,
        },
        edge: EdgeRecord {
            source: src.to_string(),
            target: dst.to_string(),
            distance,
            reroute_capacity: 3.0,
            is_connected: 1.0,
        },
    }
}

/// A -> B (2), B -> C (3), A -> C (10).
pub fn triangle_rows() -> Vec<TelemetryRow> {
    vec![
        row("A", "B", 2.0, 4.0),
        row("B", "C", 3.0, 7.0),
        row("A", "C", 10.0, 4.0),
    ]
}

pub fn distance_pipeline() -> RoutePipeline<DistanceOracle> {
    RoutePipeline::new(DistanceOracle).expect("distance oracle matches the encoder")
}

pub fn gcn_pipeline(seed: u64) -> RoutePipeline<GcnEdgeRegressor> {
    let model = GcnEdgeRegressor::with_seed(NODE_FEATURES, EDGE_FEATURES, 16, Some(seed));
    RoutePipeline::new(model).expect("fresh model matches the encoder")
}
