//! Tests for feature encoding.

use super::*;
use crate::telemetry::{EdgeRecord, NodeRecord};

fn row(src: &str, dst: &str, queue: f64, distance: f64) -> TelemetryRow {
    TelemetryRow {
        node: NodeRecord {
            id: src.to_string(),
            queue_length: queue,
            status: 1.0,
            processing_rate: 2.0,
            delay: queue / 2.0,
            capacity: 40.0,
        },
        edge: EdgeRecord {
            source: src.to_string(),
            target: dst.to_string(),
            distance,
            reroute_capacity: 4.0,
            is_connected: 1.0,
        },
    }
}

#[test]
fn test_empty_rows_is_empty_graph() {
    let err = FeatureEncoder::new().encode(&[]).expect_err("no rows");
    assert!(matches!(err, RerouteError::EmptyGraph { .. }));
}

#[test]
fn test_neighbor_only_node_gets_exact_defaults() {
    let encoder = FeatureEncoder::new();
    let rows = vec![row("A", "B", 6.0, 1.0)];
    let registry = IdentifierRegistry::fit(["A", "B"]);

    let (raw, observed) = encoder.raw_node_table(&registry, &rows).expect("encodes");
    let b = registry.encode("B").expect("registered");

    assert_eq!(raw.row(b), &[0.0, 1.0, 5.0, 0.0, 50.0]);
    assert_eq!(observed, vec![true, false]);
}

#[test]
fn test_custom_defaults() {
    let defaults = NodeDefaults {
        queue_length: 1.0,
        status: 0.0,
        processing_rate: 3.0,
        delay: 2.0,
        capacity: 10.0,
    };
    let encoder = FeatureEncoder::new().with_defaults(defaults);
    let registry = IdentifierRegistry::fit(["A", "B"]);
    let (raw, _) = encoder
        .raw_node_table(&registry, &[row("A", "B", 6.0, 1.0)])
        .expect("encodes");
    assert_eq!(raw.row(1), &[1.0, 0.0, 3.0, 2.0, 10.0]);
}

#[test]
fn test_repeated_counter_is_averaged() {
    let encoder = FeatureEncoder::new();
    let rows = vec![row("A", "B", 2.0, 1.0), row("A", "C", 6.0, 1.0)];
    let registry = IdentifierRegistry::fit(["A", "B", "C"]);

    let (raw, _) = encoder.raw_node_table(&registry, &rows).expect("encodes");

    assert_eq!(raw.n_rows(), 3, "one row per registry identifier");
    assert!((raw.get(0, 0) - 4.0).abs() < 1e-6);
    assert!((raw.get(0, 3) - 2.0).abs() < 1e-6);
}

#[test]
fn test_node_table_is_standardized() {
    let rows = vec![
        row("A", "B", 2.0, 1.0),
        row("B", "C", 9.0, 2.0),
        row("C", "A", 4.0, 3.0),
    ];
    let encoded = FeatureEncoder::new().encode(&rows).expect("encodes");

    assert_eq!(encoded.node_features.shape(), (3, NODE_FEATURES));
    let queue = encoded.node_features.column(0);
    let mean: f32 = queue.iter().sum::<f32>() / 3.0;
    assert!(mean.abs() < 1e-5);
    // status is constant: centered, not divided by zero
    assert!(encoded.node_features.column(1).iter().all(|v| *v == 0.0));
    assert!(encoded.node_features.all_finite());
}

#[test]
fn test_edge_table_keeps_request_order_and_raw_values() {
    let rows = vec![row("C", "A", 1.0, 30.0), row("A", "B", 1.0, 10.0)];
    let encoded = FeatureEncoder::new().encode(&rows).expect("encodes");

    assert_eq!(encoded.edge_index, vec![(2, 0), (0, 1)]);
    assert_eq!(encoded.edge_features.shape(), (2, EDGE_FEATURES));
    assert_eq!(encoded.edge_features.row(0), &[30.0, 4.0, 1.0]);
    assert_eq!(encoded.edge_features.row(1), &[10.0, 4.0, 1.0]);
}

#[test]
fn test_edge_normalization_opt_in() {
    let rows = vec![row("A", "B", 1.0, 10.0), row("B", "A", 1.0, 30.0)];
    let encoded = FeatureEncoder::new()
        .with_edge_normalization(true)
        .encode(&rows)
        .expect("encodes");

    assert!((encoded.edge_features.get(0, 0) + 1.0).abs() < 1e-6);
    assert!((encoded.edge_features.get(1, 0) - 1.0).abs() < 1e-6);
}

#[test]
fn test_parallel_edges_are_kept() {
    let rows = vec![row("A", "B", 1.0, 10.0), row("A", "B", 1.0, 20.0)];
    let encoded = FeatureEncoder::new().encode(&rows).expect("encodes");
    assert_eq!(encoded.num_edges(), 2);
    assert_eq!(encoded.edge_index, vec![(0, 1), (0, 1)]);
}

#[test]
fn test_row_permutation_gives_identical_node_table() {
    let rows = vec![
        row("A", "B", 2.0, 1.0),
        row("B", "C", 7.0, 2.0),
        row("A", "C", 3.0, 5.0),
    ];
    let mut reversed = rows.clone();
    reversed.reverse();

    let a = FeatureEncoder::new().encode(&rows).expect("encodes");
    let b = FeatureEncoder::new().encode(&reversed).expect("encodes");

    assert_eq!(a.registry.labels(), b.registry.labels());
    assert_eq!(a.node_features, b.node_features);
}

#[test]
fn test_overflowing_values_are_rejected() {
    // Rows built directly skip request validation; the encoder still refuses them
    let mut rows = vec![row("A", "B", 3.0, 2.0), row("B", "C", 7.0, 3.0)];
    rows[0].node.queue_length = 1e39;
    let err = FeatureEncoder::new().encode(&rows).expect_err("queue overflows f32");
    assert!(matches!(err, RerouteError::MalformedRequest { .. }));

    let mut rows = vec![row("A", "B", 3.0, 2.0), row("B", "C", 7.0, 3.0)];
    rows[1].edge.distance = 1e40;
    assert!(FeatureEncoder::new().encode(&rows).is_err());
    assert!(FeatureEncoder::new()
        .with_edge_normalization(true)
        .encode(&rows)
        .is_err());
}
