//! Route planning: rank every destination reachable from a start counter.
//!
//! Costs are compared at full precision; they are rounded to two decimals
//! only when a plan is serialized.

use crate::error::{RerouteError, Result};
use crate::graph::RouteGraph;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use tracing::debug;

/// Message returned when nothing is reachable from the start counter.
pub const NO_PATHS_MESSAGE: &str = "No paths found from the start counter.";

/// Best path to one destination.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteOption {
    /// Destination counter
    pub destination: String,
    /// Counters from start to destination, inclusive
    pub path: Vec<String>,
    /// Sum of predicted costs along `path`, full precision
    pub total_cost: f64,
}

impl RouteOption {
    /// Total cost rounded to two decimal places.
    #[must_use]
    pub fn rounded_cost(&self) -> f64 {
        round2(self.total_cost)
    }
}

/// Outcome of planning from one start counter.
#[derive(Debug, Clone, PartialEq)]
pub enum RoutePlan {
    /// At least one destination is reachable; options are ranked.
    Routes {
        /// Counter the routes start from
        start_counter: String,
        /// Ascending by cost, ties by destination identifier
        options: Vec<RouteOption>,
    },
    /// The start counter exists but reaches nothing.
    NoPathsFound,
}

impl RoutePlan {
    /// Ranked options, empty for [`RoutePlan::NoPathsFound`].
    #[must_use]
    pub fn options(&self) -> &[RouteOption] {
        match self {
            Self::Routes { options, .. } => options,
            Self::NoPathsFound => &[],
        }
    }
}

#[derive(Serialize)]
struct OptionBody<'a> {
    path: &'a [String],
    total_predicted_delay_minutes: f64,
}

struct RankedOptions<'a>(&'a [RouteOption]);

impl Serialize for RankedOptions<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for option in self.0 {
            map.serialize_entry(
                &option.destination,
                &OptionBody {
                    path: &option.path,
                    total_predicted_delay_minutes: option.rounded_cost(),
                },
            )?;
        }
        map.end()
    }
}

impl Serialize for RoutePlan {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Routes {
                start_counter,
                options,
            } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("start_counter", start_counter)?;
                map.serialize_entry("reroute_options", &RankedOptions(options))?;
                map.end()
            }
            Self::NoPathsFound => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("message", NO_PATHS_MESSAGE)?;
                map.end()
            }
        }
    }
}

/// Computes least-cost routes from a start counter to every other counter.
///
/// Searches the graph as built: Dijkstra when every cost is non-negative,
/// Bellman-Ford otherwise. Clamping happens earlier, in
/// [`RouteGraph::from_predictions`].
///
/// # Examples
///
/// ```
/// use reroute::graph::RouteGraph;
/// use reroute::planner::RoutePlanner;
///
/// let g = RouteGraph::from_arcs(&[("A", "B", 2.0), ("B", "C", 3.0), ("A", "C", 10.0)]);
/// let plan = RoutePlanner::new().plan(&g, "A").expect("A is in the graph");
///
/// let ranked: Vec<_> = plan.options().iter().map(|o| o.destination.as_str()).collect();
/// assert_eq!(ranked, ["B", "C"]);
/// assert_eq!(plan.options()[1].path, ["A", "B", "C"]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct RoutePlanner;

impl RoutePlanner {
    /// New planner.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Ranks the best route to every destination reachable from `start`.
    ///
    /// # Errors
    ///
    /// - `UnknownSource` if `start` is not a node of `graph`
    /// - `NegativeCycle` if negative costs form a cycle reachable from `start`
    pub fn plan(&self, graph: &RouteGraph, start: &str) -> Result<RoutePlan> {
        let source = graph
            .node_id(start)
            .ok_or_else(|| RerouteError::UnknownSource {
                source_id: start.to_string(),
            })?;

        let paths = if graph.has_negative_weights() {
            debug!(start, "negative costs present, searching with Bellman-Ford");
            graph.bellman_ford_from(source)?
        } else {
            graph.dijkstra_from(source)
        };

        let mut options: Vec<RouteOption> = paths
            .reachable()
            .filter_map(|target| {
                let path = paths.path_to(target)?;
                let total_cost = path_cost(graph, &path)?;
                Some(RouteOption {
                    destination: graph.label(target).to_string(),
                    path: path.iter().map(|&v| graph.label(v).to_string()).collect(),
                    total_cost,
                })
            })
            .collect();

        if options.is_empty() {
            return Ok(RoutePlan::NoPathsFound);
        }

        options.sort_by(|a, b| {
            a.total_cost
                .total_cmp(&b.total_cost)
                .then_with(|| a.destination.cmp(&b.destination))
        });

        Ok(RoutePlan::Routes {
            start_counter: start.to_string(),
            options,
        })
    }
}

/// Sum of the cheapest arc between each consecutive pair, in path order.
fn path_cost(graph: &RouteGraph, path: &[usize]) -> Option<f64> {
    path.windows(2)
        .map(|pair| graph.min_arc_weight(pair[0], pair[1]))
        .sum()
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
