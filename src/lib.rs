//! Reroute: least-delay counter rerouting from GNN-predicted edge costs.
//!
//! A request carries per-counter telemetry and directed links to
//! neighbouring counters. Reroute encodes it into graph tables, asks a
//! cost oracle for a predicted delay on every link, and ranks the cheapest
//! route from a start counter to every counter it can reach.
//!
//! # Quick Start
//!
//! ```
//! use reroute::prelude::*;
//!
//! let model = GcnEdgeRegressor::with_seed(NODE_FEATURES, EDGE_FEATURES, 16, Some(7));
//! let pipeline = RoutePipeline::new(model).expect("model matches the encoder");
//!
//! let counter = |id: &str, next: &str, queue: f64| TelemetryRow {
//!     node: NodeRecord {
//!         id: id.into(), queue_length: queue, status: 1.0,
//!         processing_rate: 2.0, delay: queue / 2.0, capacity: 40.0,
//!     },
//!     edge: EdgeRecord {
//!         source: id.into(), target: next.into(),
//!         distance: 10.0, reroute_capacity: 3.0, is_connected: 1.0,
//!     },
//! };
//! let request = RouteRequest::from_rows(
//!     "C1",
//!     &[counter("C1", "C2", 4.0), counter("C2", "C3", 9.0)],
//! );
//!
//! let plan = pipeline.predict_route(&request).expect("C1 is in the graph");
//! assert_eq!(plan.options().len(), 2);
//! ```
//!
//! # Modules
//!
//! - [`telemetry`]: Inbound request shape and row validation
//! - [`registry`]: Identifier ↔ dense code mapping
//! - [`features`]: Node and edge feature tables
//! - [`preprocessing`]: Standard scaling
//! - [`gnn`]: Graph convolution layers and the edge-cost regressor
//! - [`oracle`]: Cost oracle trait and model loading
//! - [`graph`]: Route graph and single-source searches
//! - [`planner`]: Ranked route plans
//! - [`pipeline`]: End-to-end request handling
//! - [`config`]: Router configuration
//! - [`server`]: HTTP service

pub mod config;
pub mod error;
pub mod features;
pub mod gnn;
pub mod graph;
pub mod nn;
pub mod oracle;
pub mod pipeline;
pub mod planner;
pub mod prelude;
pub mod preprocessing;
pub mod primitives;
pub mod registry;
pub mod server;
pub mod telemetry;
pub mod traits;

pub use error::{RerouteError, Result};
pub use primitives::Matrix;
pub use traits::Transformer;
