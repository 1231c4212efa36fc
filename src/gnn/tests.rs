use super::*;

fn line_graph_edges() -> Vec<EdgeIndex> {
    // Line: 0 -> 1 -> 2 -> 3
    vec![(0, 1), (1, 2), (2, 3)]
}

fn identity_gcn(features: usize) -> GcnConv {
    let mut w = Matrix::zeros(features, features);
    for i in 0..features {
        w.set(i, i, 1.0);
    }
    GcnConv::from_linear(
        Linear::from_parts(&w, vec![0.0; features]).expect("square"),
        true,
    )
}

#[test]
fn test_gcn_conv_output_shape() {
    let gcn = GcnConv::with_seed(4, 8, Some(0));
    let x = Matrix::zeros(4, 4);
    let out = gcn.forward_gnn(&x, &line_graph_edges()).expect("valid");
    assert_eq!(out.shape(), (4, 8));
    assert_eq!(gcn.in_features(), 4);
    assert_eq!(gcn.out_features(), 8);
}

#[test]
fn test_gcn_conv_directed_normalization() {
    // 0 -> 1, identity weights: node 0 only sees itself (deg 1),
    // node 1 sees itself and node 0 (deg 2).
    let gcn = identity_gcn(1);
    let x = Matrix::from_rows(&[[4.0_f32], [2.0]]);
    let out = gcn.forward_gnn(&x, &[(0, 1)]).expect("valid");

    assert!((out.get(0, 0) - 4.0).abs() < 1e-6);
    let expected = 0.5 * 2.0 + (1.0 / 2.0_f32.sqrt()) * 4.0;
    assert!((out.get(1, 0) - expected).abs() < 1e-5);
}

#[test]
fn test_gcn_conv_without_self_loops_isolated_node_is_bias_only() {
    let w = Matrix::from_rows(&[[1.0_f32]]);
    let gcn = GcnConv::from_linear(Linear::from_parts(&w, vec![0.25]).expect("1x1"), false);
    let x = Matrix::from_rows(&[[3.0_f32], [5.0]]);
    let out = gcn.forward_gnn(&x, &[(0, 1)]).expect("valid");

    assert!((out.get(0, 0) - 0.25).abs() < 1e-6);
    assert!(out.all_finite());
}

#[test]
fn test_gcn_conv_edge_order_invariant() {
    let gcn = GcnConv::with_seed(3, 5, Some(9));
    let x = Matrix::from_rows(&[[0.1_f32, -1.0, 2.0], [0.7, 0.3, -0.2], [1.5, 0.0, 0.4]]);
    let edges = vec![(0, 1), (2, 1), (1, 2), (0, 2), (0, 1)];
    let mut shuffled = edges.clone();
    shuffled.reverse();

    let a = gcn.forward_gnn(&x, &edges).expect("valid");
    let b = gcn.forward_gnn(&x, &shuffled).expect("valid");
    assert_eq!(a, b);
}

#[test]
fn test_gcn_conv_rejects_out_of_range_edge() {
    let gcn = GcnConv::with_seed(2, 2, Some(0));
    let x = Matrix::zeros(2, 2);
    assert!(matches!(
        gcn.forward_gnn(&x, &[(0, 5)]),
        Err(RerouteError::InvalidCode { code: 5, len: 2 })
    ));
}

#[test]
fn test_gcn_conv_rejects_wrong_width() {
    let gcn = GcnConv::with_seed(2, 2, Some(0));
    assert!(gcn.forward_gnn(&Matrix::zeros(2, 3), &[(0, 1)]).is_err());
}

#[test]
fn test_regressor_dimensions() {
    let model = GcnEdgeRegressor::with_seed(5, 3, 64, Some(1));
    assert_eq!(model.node_features(), 5);
    assert_eq!(model.edge_features(), 3);
    assert_eq!(model.hidden_dim(), 64);
    let expected = (5 * 64 + 64) + (64 * 64 + 64) + (131 + 1);
    assert_eq!(model.num_parameters(), expected);
    assert!(model.validate().is_ok());
}

#[test]
fn test_regressor_is_deterministic() {
    let model = GcnEdgeRegressor::with_seed(5, 3, 16, Some(3));
    let x = Matrix::from_rows(&[
        [0.5_f32, 1.0, -0.3, 0.0, 1.2],
        [-1.0, 0.0, 0.3, 0.4, -0.6],
        [0.5, -1.0, 0.0, -0.4, -0.6],
    ]);
    let edges = vec![(0, 1), (1, 2), (0, 2)];
    let attr = Matrix::from_rows(&[[10.0_f32, 2.0, 1.0], [5.0, 1.0, 1.0], [30.0, 0.0, 0.0]]);

    let a = model.predict_edges(&x, &edges, &attr).expect("valid");
    let b = model.predict_edges(&x, &edges, &attr).expect("valid");
    assert_eq!(a, b);
    assert_eq!(a.len(), 3);
    assert!(a.iter().all(|c| c.is_finite()));
}

#[test]
fn test_regressor_same_seed_same_model() {
    let a = GcnEdgeRegressor::with_seed(5, 3, 8, Some(11));
    let b = GcnEdgeRegressor::with_seed(5, 3, 8, Some(11));
    assert_eq!(a, b);
}

#[test]
fn test_regressor_rejects_edge_table_mismatch() {
    let model = GcnEdgeRegressor::with_seed(5, 3, 8, Some(0));
    let x = Matrix::zeros(2, 5);
    let short = Matrix::zeros(1, 3);
    assert!(model.predict_edges(&x, &[(0, 1), (1, 0)], &short).is_err());
    let narrow = Matrix::zeros(2, 2);
    assert!(model.predict_edges(&x, &[(0, 1), (1, 0)], &narrow).is_err());
}

#[test]
fn test_from_layers_rejects_broken_chain() {
    let conv1 = GcnConv::with_seed(5, 8, Some(0));
    let conv2 = GcnConv::with_seed(4, 8, Some(0));
    let head = Linear::with_seed(19, 1, Some(0));
    assert!(GcnEdgeRegressor::from_layers(conv1, conv2, head).is_err());
}

#[test]
fn test_save_load_roundtrip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("model.bin");

    let model = GcnEdgeRegressor::with_seed(5, 3, 8, Some(5));
    model.save(&path).expect("save");
    let loaded = GcnEdgeRegressor::load(&path).expect("load");
    assert_eq!(model, loaded);
}

#[test]
fn test_load_missing_file_is_oracle_load() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = GcnEdgeRegressor::load(dir.path().join("absent.bin")).expect_err("missing");
    assert!(matches!(err, RerouteError::OracleLoad { .. }));
}

#[test]
fn test_load_garbage_is_oracle_load() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("garbage.bin");
    std::fs::write(&path, b"not a model").expect("write");
    let err = GcnEdgeRegressor::load(&path).expect_err("corrupt");
    assert!(matches!(err, RerouteError::OracleLoad { .. }));
}
