//! Request-to-route pipeline.
//!
//! ```text
//! RouteRequest ─► rows ─► FeatureEncoder ─► CostOracle ─► RouteGraph ─► RoutePlanner
//! ```
//!
//! A pipeline owns its oracle and is shared read-only across requests. All
//! per-request state lives on the stack of [`RoutePipeline::predict_route`].

use crate::config::RouterConfig;
use crate::error::{RerouteError, Result};
use crate::features::FeatureEncoder;
use crate::graph::{NegativeCostPolicy, RouteGraph};
use crate::oracle::{check_input_shape, CostOracle};
use crate::planner::{RoutePlan, RoutePlanner};
use crate::telemetry::RouteRequest;
use tracing::{debug, info, info_span};

/// Encodes telemetry, predicts edge costs and plans routes.
///
/// # Examples
///
/// ```
/// use reroute::features::{EDGE_FEATURES, NODE_FEATURES};
/// use reroute::gnn::GcnEdgeRegressor;
/// use reroute::pipeline::RoutePipeline;
/// use reroute::telemetry::RouteRequest;
///
/// let model = GcnEdgeRegressor::with_seed(NODE_FEATURES, EDGE_FEATURES, 8, Some(1));
/// let pipeline = RoutePipeline::new(model).expect("model matches the encoder");
///
/// let request: RouteRequest = serde_json::from_value(serde_json::json!({
///     "counter_id_list": ["A", "B"],
///     "queue_length_list": [3, 5],
///     "status_list": [1, 1],
///     "processing_rate_list": [2.0, 2.5],
///     "delay_list": [4, 6],
///     "capacity_list": [40, 40],
///     "neighbor_counter_id_list": ["B", "C"],
///     "distance_list": [10, 20],
///     "reroute_capacity_list": [5, 5],
///     "is_connected_list": [true, true],
///     "start_counter": "A"
/// }))
/// .expect("valid request");
///
/// let plan = pipeline.predict_route(&request).expect("A is known");
/// assert_eq!(plan.options().len(), 2);
/// ```
#[derive(Debug)]
pub struct RoutePipeline<O> {
    oracle: O,
    encoder: FeatureEncoder,
    planner: RoutePlanner,
    negative_costs: NegativeCostPolicy,
}

impl<O: CostOracle> RoutePipeline<O> {
    /// Pipeline with default encoder and planner settings.
    ///
    /// # Errors
    ///
    /// `OracleLoad` if the oracle does not consume the encoder's tables.
    pub fn new(oracle: O) -> Result<Self> {
        Self::with_parts(oracle, FeatureEncoder::new())
    }

    /// Pipeline configured from a [`RouterConfig`].
    ///
    /// # Errors
    ///
    /// `OracleLoad` if the oracle does not consume the encoder's tables.
    pub fn from_config(oracle: O, config: &RouterConfig) -> Result<Self> {
        let pipeline = Self::with_parts(oracle, config.encoder())?;
        Ok(pipeline.with_negative_costs(config.negative_costs))
    }

    /// Pipeline from an oracle and an explicit encoder.
    ///
    /// # Errors
    ///
    /// `OracleLoad` if the oracle does not consume the encoder's tables.
    pub fn with_parts(oracle: O, encoder: FeatureEncoder) -> Result<Self> {
        check_input_shape(&oracle, "pipeline")?;
        Ok(Self {
            oracle,
            encoder,
            planner: RoutePlanner::new(),
            negative_costs: NegativeCostPolicy::default(),
        })
    }

    /// Sets how negative predicted costs enter the route graph.
    #[must_use]
    pub fn with_negative_costs(mut self, policy: NegativeCostPolicy) -> Self {
        self.negative_costs = policy;
        self
    }

    /// Negative-cost policy applied when building the route graph.
    #[must_use]
    pub fn negative_costs(&self) -> NegativeCostPolicy {
        self.negative_costs
    }

    /// Runs one request end to end.
    ///
    /// # Errors
    ///
    /// - `MalformedRequest` / `EmptyGraph` for unusable input
    /// - `UnknownSource` if the start counter is not in the request graph
    /// - `DimensionMismatch` / `NonFiniteCost` if the oracle misbehaves
    /// - `NegativeCycle` if negative costs make routing undefined
    pub fn predict_route(&self, request: &RouteRequest) -> Result<RoutePlan> {
        let span = info_span!("predict_route", start = %request.start_counter);
        let _enter = span.enter();

        let rows = request.rows()?;
        let encoded = self.encoder.encode(&rows)?;

        let costs = self.oracle.predict(&encoded)?;
        if costs.len() != encoded.num_edges() {
            return Err(RerouteError::dimension_mismatch(
                "oracle output",
                encoded.num_edges(),
                costs.len(),
            ));
        }
        debug!(edges = costs.len(), "predicted edge costs");

        let graph = RouteGraph::from_predictions(
            &encoded.registry,
            &encoded.edge_index,
            &costs,
            self.negative_costs,
        )?;
        let plan = self.planner.plan(&graph, &request.start_counter)?;

        match &plan {
            RoutePlan::Routes { options, .. } => {
                info!(destinations = options.len(), "route plan ready");
            }
            RoutePlan::NoPathsFound => info!("no destination reachable"),
        }
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{EncodedGraph, EDGE_FEATURES, NODE_FEATURES};
    use crate::telemetry::{EdgeRecord, NodeRecord, TelemetryRow};

    /// Cost = edge distance column, or a fixed vector.
    struct Scripted {
        costs: Option<Vec<f64>>,
        node_dim: usize,
    }

    impl Scripted {
        fn distance() -> Self {
            Self {
                costs: None,
                node_dim: NODE_FEATURES,
            }
        }

        fn fixed(costs: Vec<f64>) -> Self {
            Self {
                costs: Some(costs),
                node_dim: NODE_FEATURES,
            }
        }
    }

    impl CostOracle for Scripted {
        fn node_feature_dim(&self) -> usize {
            self.node_dim
        }

        fn edge_feature_dim(&self) -> usize {
            EDGE_FEATURES
        }

        fn predict(&self, graph: &EncodedGraph) -> Result<Vec<f64>> {
            Ok(match &self.costs {
                Some(c) => c.clone(),
                None => graph.edge_features.column(0).into_iter().map(f64::from).collect(),
            })
        }
    }

    fn row(src: &str, dst: &str, distance: f64) -> TelemetryRow {
        TelemetryRow {
            node: NodeRecord {
                id: src.into(),
                queue_length: 1.0,
                status: 1.0,
                processing_rate: 2.0,
                delay: 1.0,
                capacity: 10.0,
            },
            edge: EdgeRecord {
                source: src.into(),
                target: dst.into(),
                distance,
                reroute_capacity: 1.0,
                is_connected: 1.0,
            },
        }
    }

    fn triangle(start: &str) -> RouteRequest {
        RouteRequest::from_rows(
            start,
            &[row("A", "B", 2.0), row("B", "C", 3.0), row("A", "C", 10.0)],
        )
    }

    #[test]
    fn test_rejects_oracle_with_wrong_width() {
        let oracle = Scripted {
            costs: None,
            node_dim: 4,
        };
        assert!(matches!(
            RoutePipeline::new(oracle),
            Err(RerouteError::OracleLoad { .. })
        ));
    }

    #[test]
    fn test_routes_along_predicted_costs() {
        let pipeline = RoutePipeline::new(Scripted::distance()).expect("shape ok");
        let plan = pipeline.predict_route(&triangle("A")).expect("valid");

        let opts = plan.options();
        assert_eq!(opts[0].destination, "B");
        assert_eq!(opts[0].total_cost, 2.0);
        assert_eq!(opts[1].destination, "C");
        assert_eq!(opts[1].path, ["A", "B", "C"]);
        assert_eq!(opts[1].total_cost, 5.0);
    }

    #[test]
    fn test_unknown_start() {
        let pipeline = RoutePipeline::new(Scripted::distance()).expect("shape ok");
        let err = pipeline.predict_route(&triangle("Q")).expect_err("Q absent");
        assert!(matches!(err, RerouteError::UnknownSource { .. }));
    }

    #[test]
    fn test_wrong_oracle_output_length() {
        let pipeline = RoutePipeline::new(Scripted::fixed(vec![1.0])).expect("shape ok");
        assert!(matches!(
            pipeline.predict_route(&triangle("A")),
            Err(RerouteError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_non_finite_oracle_output() {
        let pipeline =
            RoutePipeline::new(Scripted::fixed(vec![1.0, f64::INFINITY, 1.0])).expect("shape ok");
        assert!(matches!(
            pipeline.predict_route(&triangle("A")),
            Err(RerouteError::NonFiniteCost { edge: 1, .. })
        ));
    }

    #[test]
    fn test_clamp_policy_from_config() {
        let config = RouterConfig {
            negative_costs: NegativeCostPolicy::Clamp,
            ..RouterConfig::default()
        };
        let pipeline =
            RoutePipeline::from_config(Scripted::fixed(vec![-1.0, 3.0, 10.0]), &config)
                .expect("shape ok");
        let plan = pipeline.predict_route(&triangle("A")).expect("clamped");
        assert_eq!(plan.options()[0].destination, "B");
        assert_eq!(plan.options()[0].total_cost, 0.0);
        assert_eq!(plan.options()[1].total_cost, 3.0);
    }

    #[test]
    fn test_clamp_policy_set_directly() {
        let costs = vec![-4.0, 1.0, 2.0];
        let searched = RoutePipeline::new(Scripted::fixed(costs.clone())).expect("shape ok");
        assert_eq!(searched.negative_costs(), NegativeCostPolicy::BellmanFord);
        let plan = searched.predict_route(&triangle("A")).expect("no cycle");
        assert_eq!(plan.options()[0].total_cost, -4.0);
        assert_eq!(plan.options()[1].total_cost, -3.0);

        let clamped = RoutePipeline::new(Scripted::fixed(costs))
            .expect("shape ok")
            .with_negative_costs(NegativeCostPolicy::Clamp);
        let plan = clamped.predict_route(&triangle("A")).expect("clamped");
        assert_eq!(plan.options()[0].total_cost, 0.0);
        assert_eq!(plan.options()[1].total_cost, 1.0);
    }

    #[test]
    fn test_empty_request_is_rejected() {
        let pipeline = RoutePipeline::new(Scripted::distance()).expect("shape ok");
        let err = pipeline
            .predict_route(&RouteRequest::from_rows("A", &[]))
            .expect_err("no rows");
        assert!(matches!(err, RerouteError::EmptyGraph { .. }));
    }
}
