//! Directed, edge-weighted route graph in CSR form.
//!
//! Built from an encoded request and the oracle's per-edge costs. Parallel
//! arcs between the same ordered pair are all kept; searches consider every
//! one of them.
//!
//! # Examples
//!
//! ```
//! use reroute::graph::RouteGraph;
//!
//! let g = RouteGraph::from_arcs(&[("A", "B", 2.0), ("B", "C", 3.0), ("A", "C", 10.0)]);
//! let a = g.node_id("A").expect("present");
//! let c = g.node_id("C").expect("present");
//!
//! let paths = g.dijkstra_from(a);
//! assert_eq!(paths.distance(c), Some(5.0));
//! ```

use crate::error::{RerouteError, Result};
use crate::registry::{IdentifierRegistry, NodeCode};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use tracing::warn;

/// What to do with negative predicted costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegativeCostPolicy {
    /// Keep costs as predicted; search with Bellman-Ford when any is negative.
    #[default]
    BellmanFord,
    /// Replace negative costs with zero before searching.
    Clamp,
}

/// Route graph using CSR (Compressed Sparse Row) adjacency.
///
/// Memory layout:
/// - Adjacency stored as flat vectors, arcs of each node sorted by
///   (target, weight)
/// - Node labels stored separately, indexed by node id
#[derive(Debug, Clone)]
pub struct RouteGraph {
    row_ptr: Vec<usize>,      // Offset into col_indices (length = n_nodes + 1)
    col_indices: Vec<NodeCode>, // Flattened arc targets (length = n_edges)
    edge_weights: Vec<f64>,   // Parallel to col_indices

    node_labels: Vec<String>,
    label_to_id: HashMap<String, NodeCode>,
}

impl RouteGraph {
    /// Assembles the graph from registry codes and predicted costs.
    ///
    /// Every endpoint is decoded through `registry`; node ids in the graph
    /// are the registry codes.
    ///
    /// # Errors
    ///
    /// - `DimensionMismatch` if `costs` and `edge_index` differ in length
    /// - `InvalidCode` if an edge references an unregistered code
    /// - `NonFiniteCost` if a cost is NaN or infinite
    pub fn from_predictions(
        registry: &IdentifierRegistry,
        edge_index: &[(NodeCode, NodeCode)],
        costs: &[f64],
        policy: NegativeCostPolicy,
    ) -> Result<Self> {
        if costs.len() != edge_index.len() {
            return Err(RerouteError::dimension_mismatch(
                "predicted costs",
                edge_index.len(),
                costs.len(),
            ));
        }

        let node_labels: Vec<String> = registry.labels().to_vec();
        let label_to_id: HashMap<String, NodeCode> = node_labels
            .iter()
            .enumerate()
            .map(|(id, label)| (label.clone(), id))
            .collect();

        let mut clamped = 0usize;
        let mut adj_list: Vec<Vec<(NodeCode, f64)>> = vec![Vec::new(); node_labels.len()];
        for (edge, (&(src, tgt), &cost)) in edge_index.iter().zip(costs).enumerate() {
            if !cost.is_finite() {
                return Err(RerouteError::NonFiniteCost { edge, value: cost });
            }
            let source = label_to_id[registry.decode(src)?];
            let target = label_to_id[registry.decode(tgt)?];
            let weight = if cost < 0.0 && policy == NegativeCostPolicy::Clamp {
                clamped += 1;
                0.0
            } else {
                cost
            };
            adj_list[source].push((target, weight));
        }
        if clamped > 0 {
            warn!(clamped, "negative predicted costs clamped to zero");
        }

        Ok(Self::from_adjacency(adj_list, node_labels, label_to_id))
    }

    /// Builds a graph straight from labelled arcs.
    #[must_use]
    pub fn from_arcs(arcs: &[(&str, &str, f64)]) -> Self {
        let registry = IdentifierRegistry::fit(arcs.iter().flat_map(|&(s, t, _)| [s, t]));
        let node_labels: Vec<String> = registry.labels().to_vec();
        let label_to_id: HashMap<String, NodeCode> = node_labels
            .iter()
            .enumerate()
            .map(|(id, label)| (label.clone(), id))
            .collect();

        let mut adj_list: Vec<Vec<(NodeCode, f64)>> = vec![Vec::new(); node_labels.len()];
        for &(s, t, w) in arcs {
            adj_list[label_to_id[s]].push((label_to_id[t], w));
        }
        Self::from_adjacency(adj_list, node_labels, label_to_id)
    }

    fn from_adjacency(
        mut adj_list: Vec<Vec<(NodeCode, f64)>>,
        node_labels: Vec<String>,
        label_to_id: HashMap<String, NodeCode>,
    ) -> Self {
        for arcs in &mut adj_list {
            arcs.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)));
        }

        let mut row_ptr = Vec::with_capacity(adj_list.len() + 1);
        let mut col_indices = Vec::new();
        let mut edge_weights = Vec::new();

        row_ptr.push(0);
        for arcs in &adj_list {
            for &(target, weight) in arcs {
                col_indices.push(target);
                edge_weights.push(weight);
            }
            row_ptr.push(col_indices.len());
        }

        Self {
            row_ptr,
            col_indices,
            edge_weights,
            node_labels,
            label_to_id,
        }
    }

    /// Get number of nodes in graph.
    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.node_labels.len()
    }

    /// Get number of arcs in graph (parallel arcs counted separately).
    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.col_indices.len()
    }

    /// Node id for a label.
    #[must_use]
    pub fn node_id(&self, label: &str) -> Option<NodeCode> {
        self.label_to_id.get(label).copied()
    }

    /// Label of node `v`.
    ///
    /// # Panics
    ///
    /// Panics if `v` is out of range.
    #[must_use]
    pub fn label(&self, v: NodeCode) -> &str {
        &self.node_labels[v]
    }

    /// Outgoing arcs of `v` as `(target, weight)`, sorted by target then weight.
    pub fn arcs(&self, v: NodeCode) -> impl Iterator<Item = (NodeCode, f64)> + '_ {
        let (start, end) = if v < self.num_nodes() {
            (self.row_ptr[v], self.row_ptr[v + 1])
        } else {
            (0, 0)
        };
        self.col_indices[start..end]
            .iter()
            .copied()
            .zip(self.edge_weights[start..end].iter().copied())
    }

    /// Cheapest arc weight from `source` to `target`, if any arc exists.
    #[must_use]
    pub fn min_arc_weight(&self, source: NodeCode, target: NodeCode) -> Option<f64> {
        self.arcs(source)
            .filter(|&(t, _)| t == target)
            .map(|(_, w)| w)
            .min_by(f64::total_cmp)
    }

    /// True if any arc weight is negative.
    #[must_use]
    pub fn has_negative_weights(&self) -> bool {
        self.edge_weights.iter().any(|&w| w < 0.0)
    }

    /// Single-source shortest paths with Dijkstra's algorithm (1959).
    ///
    /// Assumes non-negative weights. Heap ties are broken by node id and
    /// relaxation is strict, so the chosen paths are deterministic.
    ///
    /// # Complexity
    /// * Time: O((n + m) log n)
    /// * Space: O(n)
    #[must_use]
    pub fn dijkstra_from(&self, source: NodeCode) -> ShortestPaths {
        #[derive(Copy, Clone, PartialEq)]
        struct State {
            cost: f64,
            node: NodeCode,
        }

        impl Eq for State {}

        impl Ord for State {
            fn cmp(&self, other: &Self) -> Ordering {
                // Reversed for a min-heap
                other
                    .cost
                    .total_cmp(&self.cost)
                    .then_with(|| other.node.cmp(&self.node))
            }
        }

        impl PartialOrd for State {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        let mut paths = ShortestPaths::new(source, self.num_nodes());
        if source >= self.num_nodes() {
            return paths;
        }

        let mut heap = BinaryHeap::new();
        paths.distances[source] = 0.0;
        heap.push(State {
            cost: 0.0,
            node: source,
        });

        while let Some(State { cost, node }) = heap.pop() {
            if cost > paths.distances[node] {
                continue;
            }

            for (neighbor, weight) in self.arcs(node) {
                let next_cost = cost + weight;
                if next_cost < paths.distances[neighbor] {
                    paths.distances[neighbor] = next_cost;
                    paths.predecessor[neighbor] = Some(node);
                    heap.push(State {
                        cost: next_cost,
                        node: neighbor,
                    });
                }
            }
        }

        paths
    }

    /// Single-source shortest paths with Bellman-Ford, tolerating negative weights.
    ///
    /// # Errors
    ///
    /// `NegativeCycle` if a negative-weight cycle is reachable from `source`.
    ///
    /// # Complexity
    /// * Time: O(n · m)
    pub fn bellman_ford_from(&self, source: NodeCode) -> Result<ShortestPaths> {
        let n = self.num_nodes();
        let mut paths = ShortestPaths::new(source, n);
        if source >= n {
            return Ok(paths);
        }
        paths.distances[source] = 0.0;

        for _ in 1..n {
            let mut updated = false;
            for u in 0..n {
                let du = paths.distances[u];
                if du.is_infinite() {
                    continue;
                }
                for (v, w) in self.arcs(u) {
                    if du + w < paths.distances[v] {
                        paths.distances[v] = du + w;
                        paths.predecessor[v] = Some(u);
                        updated = true;
                    }
                }
            }
            if !updated {
                return Ok(paths);
            }
        }

        // n-th pass: anything still relaxing sits on or behind a negative cycle
        for u in 0..n {
            let du = paths.distances[u];
            if du.is_infinite() {
                continue;
            }
            for (v, w) in self.arcs(u) {
                if du + w < paths.distances[v] {
                    return Err(RerouteError::NegativeCycle {
                        node: self.label(v).to_string(),
                    });
                }
            }
        }

        Ok(paths)
    }
}

/// Result of a single-source search.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortestPaths {
    source: NodeCode,
    distances: Vec<f64>,
    predecessor: Vec<Option<NodeCode>>,
}

impl ShortestPaths {
    fn new(source: NodeCode, n: usize) -> Self {
        Self {
            source,
            distances: vec![f64::INFINITY; n],
            predecessor: vec![None; n],
        }
    }

    /// Search origin.
    #[must_use]
    pub fn source(&self) -> NodeCode {
        self.source
    }

    /// Total weight of the best path to `target`, `None` if unreachable.
    #[must_use]
    pub fn distance(&self, target: NodeCode) -> Option<f64> {
        self.distances
            .get(target)
            .copied()
            .filter(|d| d.is_finite())
    }

    /// Best path from the source to `target` inclusive, `None` if unreachable.
    #[must_use]
    pub fn path_to(&self, target: NodeCode) -> Option<Vec<NodeCode>> {
        self.distance(target)?;

        let mut path = vec![target];
        let mut current = target;
        while let Some(prev) = self.predecessor[current] {
            path.push(prev);
            current = prev;
            if path.len() > self.distances.len() {
                return None;
            }
        }
        if current != self.source {
            return None;
        }
        path.reverse();
        Some(path)
    }

    /// Nodes other than the source with a finite distance, in id order.
    pub fn reachable(&self) -> impl Iterator<Item = NodeCode> + '_ {
        (0..self.distances.len()).filter(move |&v| v != self.source && self.distances[v].is_finite())
    }
}
