//! Feature encoding: telemetry rows to dense node and edge tables.
//!
//! ```text
//! rows ──► IdentifierRegistry ──► node table (N x 5, standardized)
//!                              └► edge list  (E pairs of codes)
//!                                 edge table (E x 3, request order)
//! ```
//!
//! Node statistics are fitted on the current request only; the same raw
//! attributes can encode differently next to a different set of nodes.

use crate::error::{RerouteError, Result};
use crate::preprocessing::StandardScaler;
use crate::primitives::Matrix;
use crate::registry::{IdentifierRegistry, NodeCode};
use crate::telemetry::TelemetryRow;
use crate::traits::Transformer;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Columns of the node feature table.
pub const NODE_FEATURE_NAMES: [&str; 5] = [
    "queue_length",
    "status",
    "processing_rate",
    "delay",
    "capacity",
];

/// Columns of the edge feature table.
pub const EDGE_FEATURE_NAMES: [&str; 3] = ["distance", "reroute_capacity", "is_connected"];

/// Width of the node feature table.
pub const NODE_FEATURES: usize = NODE_FEATURE_NAMES.len();

/// Width of the edge feature table.
pub const EDGE_FEATURES: usize = EDGE_FEATURE_NAMES.len();

/// Attributes assumed for a counter that only appears as a neighbour.
///
/// The defaults describe an idle, average counter and must match the values
/// the cost model was fitted with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeDefaults {
    /// Default queue length
    pub queue_length: f64,
    /// Default status code
    pub status: f64,
    /// Default processing rate
    pub processing_rate: f64,
    /// Default delay
    pub delay: f64,
    /// Default capacity
    pub capacity: f64,
}

impl Default for NodeDefaults {
    fn default() -> Self {
        Self {
            queue_length: 0.0,
            status: 1.0,
            processing_rate: 5.0,
            delay: 0.0,
            capacity: 50.0,
        }
    }
}

impl NodeDefaults {
    /// Defaults in node-table column order.
    #[must_use]
    pub fn as_row(&self) -> [f64; NODE_FEATURES] {
        [
            self.queue_length,
            self.status,
            self.processing_rate,
            self.delay,
            self.capacity,
        ]
    }
}

/// A request encoded for the cost oracle.
#[derive(Debug, Clone)]
pub struct EncodedGraph {
    /// Identifier ↔ code mapping shared by every table below
    pub registry: IdentifierRegistry,
    /// One row per registry code
    pub node_features: Matrix<f32>,
    /// `(source, target)` codes, one per request row, in request order
    pub edge_index: Vec<(NodeCode, NodeCode)>,
    /// One row per edge, aligned with `edge_index`
    pub edge_features: Matrix<f32>,
    /// Whether each node had its own telemetry (false = defaults were used)
    pub observed: Vec<bool>,
}

impl EncodedGraph {
    /// Number of nodes.
    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.registry.len()
    }

    /// Number of edges.
    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.edge_index.len()
    }
}

/// Builds [`EncodedGraph`]s from validated telemetry rows.
///
/// # Examples
///
/// ```
/// use reroute::features::FeatureEncoder;
/// use reroute::telemetry::{EdgeRecord, NodeRecord, TelemetryRow};
///
/// let row = |src: &str, dst: &str, queue: f64| TelemetryRow {
///     node: NodeRecord {
///         id: src.into(), queue_length: queue, status: 1.0,
///         processing_rate: 2.0, delay: 1.0, capacity: 30.0,
///     },
///     edge: EdgeRecord {
///         source: src.into(), target: dst.into(),
///         distance: 5.0, reroute_capacity: 2.0, is_connected: 1.0,
///     },
/// };
///
/// let encoded = FeatureEncoder::new()
///     .encode(&[row("A", "B", 4.0), row("B", "C", 8.0)])
///     .expect("non-empty request");
/// assert_eq!(encoded.num_nodes(), 3);
/// assert_eq!(encoded.edge_index, vec![(0, 1), (1, 2)]);
/// assert_eq!(encoded.observed, vec![true, true, false]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FeatureEncoder {
    defaults: NodeDefaults,
    normalize_edges: bool,
}

impl FeatureEncoder {
    /// Encoder with the standard neighbour defaults and raw edge features.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the neighbour-only defaults.
    #[must_use]
    pub fn with_defaults(mut self, defaults: NodeDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Standardize the edge table with its own per-request statistics.
    #[must_use]
    pub fn with_edge_normalization(mut self, normalize: bool) -> Self {
        self.normalize_edges = normalize;
        self
    }

    /// Neighbour defaults in use.
    #[must_use]
    pub fn defaults(&self) -> &NodeDefaults {
        &self.defaults
    }

    /// Encodes rows into registry, node table, edge list and edge table.
    ///
    /// # Errors
    ///
    /// `EmptyGraph` when `rows` is empty.
    pub fn encode(&self, rows: &[TelemetryRow]) -> Result<EncodedGraph> {
        if rows.is_empty() {
            return Err(RerouteError::EmptyGraph {
                what: "no edges submitted",
            });
        }

        let registry = IdentifierRegistry::fit(
            rows.iter()
                .flat_map(|r| [r.edge.source.as_str(), r.edge.target.as_str()]),
        );

        let (raw_nodes, observed) = self.raw_node_table(&registry, rows)?;
        let node_features = StandardScaler::new().fit_transform(&raw_nodes)?;

        let edge_index = rows
            .iter()
            .map(|r| Ok((registry.encode(&r.edge.source)?, registry.encode(&r.edge.target)?)))
            .collect::<Result<Vec<_>>>()?;

        let raw_edges = Matrix::from_rows(
            &rows
                .iter()
                .map(|r| {
                    [
                        r.edge.distance as f32,
                        r.edge.reroute_capacity as f32,
                        r.edge.is_connected as f32,
                    ]
                })
                .collect::<Vec<_>>(),
        );
        let edge_features = if self.normalize_edges {
            StandardScaler::new().fit_transform(&raw_edges)?
        } else {
            raw_edges
        };

        if !node_features.all_finite() || !edge_features.all_finite() {
            return Err(RerouteError::malformed(
                "telemetry values overflow the feature tables",
            ));
        }

        debug!(
            nodes = registry.len(),
            edges = edge_index.len(),
            defaulted = observed.iter().filter(|o| !**o).count(),
            "encoded request graph"
        );

        Ok(EncodedGraph {
            registry,
            node_features,
            edge_index,
            edge_features,
            observed,
        })
    }

    /// Unscaled node table, one row per registry code.
    ///
    /// A counter listed on several rows gets the per-column mean of its
    /// observations; values are summed in sorted order so the result does
    /// not depend on row order. Counters never listed as a source get
    /// [`NodeDefaults`].
    ///
    /// # Errors
    ///
    /// `InvalidIdentifier` if a row's counter is missing from `registry`.
    pub fn raw_node_table(
        &self,
        registry: &IdentifierRegistry,
        rows: &[TelemetryRow],
    ) -> Result<(Matrix<f32>, Vec<bool>)> {
        let mut observations: Vec<Vec<[f64; NODE_FEATURES]>> = vec![Vec::new(); registry.len()];
        for row in rows {
            let code = registry.encode(&row.node.id)?;
            observations[code].push([
                row.node.queue_length,
                row.node.status,
                row.node.processing_rate,
                row.node.delay,
                row.node.capacity,
            ]);
        }

        let defaults = self.defaults.as_row();
        let mut table = Matrix::zeros(registry.len(), NODE_FEATURES);
        let mut observed = Vec::with_capacity(registry.len());
        for (code, obs) in observations.iter().enumerate() {
            observed.push(!obs.is_empty());
            for col in 0..NODE_FEATURES {
                let value = if obs.is_empty() {
                    defaults[col]
                } else {
                    let mut column: Vec<f64> = obs.iter().map(|o| o[col]).collect();
                    column.sort_by(f64::total_cmp);
                    column.iter().sum::<f64>() / column.len() as f64
                };
                table.set(code, col, value as f32);
            }
        }

        Ok((table, observed))
    }
}

#[cfg(test)]
mod tests;
