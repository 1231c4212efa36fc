//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use reroute::prelude::*;
//! ```

pub use crate::config::RouterConfig;
pub use crate::error::RerouteError;
pub use crate::features::{EncodedGraph, FeatureEncoder, NodeDefaults, EDGE_FEATURES, NODE_FEATURES};
pub use crate::gnn::GcnEdgeRegressor;
pub use crate::graph::{NegativeCostPolicy, RouteGraph};
pub use crate::oracle::CostOracle;
pub use crate::pipeline::RoutePipeline;
pub use crate::planner::{RouteOption, RoutePlan, RoutePlanner};
pub use crate::preprocessing::StandardScaler;
pub use crate::primitives::Matrix;
pub use crate::registry::IdentifierRegistry;
pub use crate::telemetry::{EdgeRecord, NodeRecord, RouteRequest, TelemetryRow};
pub use crate::traits::Transformer;
