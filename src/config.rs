//! Router configuration.
//!
//! Loaded from an optional JSON file; every field has a default so a partial
//! file (or none at all) is valid.
//!
//! ```json
//! {
//!   "model_path": "gnn_model.bin",
//!   "port": 9000,
//!   "negative_costs": "clamp"
//! }
//! ```

use crate::error::{RerouteError, Result};
use crate::features::{FeatureEncoder, NodeDefaults};
use crate::graph::NegativeCostPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings for the pipeline and the HTTP server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Persisted cost model
    pub model_path: PathBuf,
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Attributes assumed for counters that only appear as neighbours
    pub node_defaults: NodeDefaults,
    /// Standardize the edge table per request
    pub normalize_edge_features: bool,
    /// Handling of negative predicted costs
    pub negative_costs: NegativeCostPolicy,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("gnn_model.bin"),
            host: "0.0.0.0".to_string(),
            port: 8000,
            node_defaults: NodeDefaults::default(),
            normalize_edge_features: false,
            negative_costs: NegativeCostPolicy::default(),
        }
    }
}

impl RouterConfig {
    /// Reads a JSON configuration file.
    ///
    /// # Errors
    ///
    /// `Io` if the file cannot be read, `Serialization` if it is not valid.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            RerouteError::Serialization(format!("Failed to parse config {}: {e}", path.display()))
        })
    }

    /// Override the model path.
    #[must_use]
    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = path.into();
        self
    }

    /// Override the bind host.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Override the port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Get bind address
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Feature encoder for these settings.
    #[must_use]
    pub fn encoder(&self) -> FeatureEncoder {
        FeatureEncoder::new()
            .with_defaults(self.node_defaults)
            .with_edge_normalization(self.normalize_edge_features)
    }
}
