//! Error types for reroute operations.
//!
//! Every per-request failure is a [`RerouteError`] and is reported to the
//! caller; only [`RerouteError::OracleLoad`] is fatal, and only at startup.

use thiserror::Error;

/// How an error is surfaced at the process boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller supplied something unusable (HTTP 400).
    Client,
    /// Start counter is not part of the request graph (HTTP 404).
    NotFound,
    /// Process cannot serve requests at all.
    Fatal,
}

/// Main error type for reroute operations.
///
/// # Examples
///
/// ```
/// use reroute::error::{ErrorKind, RerouteError};
///
/// let err = RerouteError::UnknownSource {
///     source_id: "C9".to_string(),
/// };
/// assert_eq!(err.kind(), ErrorKind::NotFound);
/// assert!(err.to_string().contains("C9"));
/// ```
#[derive(Debug, Error)]
pub enum RerouteError {
    /// Request arrays have inconsistent shape or contain unusable values.
    #[error("Malformed request: {reason}")]
    MalformedRequest {
        /// Human-readable reason
        reason: String,
    },

    /// No nodes or no edges to work with.
    #[error("Malformed request: empty graph ({what})")]
    EmptyGraph {
        /// Which table was empty
        what: &'static str,
    },

    /// Identifier was never registered in this request.
    #[error("Invalid identifier: '{identifier}' is not registered")]
    InvalidIdentifier {
        /// Offending identifier
        identifier: String,
    },

    /// Code does not decode to a registered identifier.
    #[error("Invalid identifier code: {code} out of range (len={len})")]
    InvalidCode {
        /// Offending code
        code: usize,
        /// Number of registered identifiers
        len: usize,
    },

    /// Start counter is absent from the decoded graph.
    #[error("Start counter not found in graph: '{source_id}'")]
    UnknownSource {
        /// Requested start counter
        source_id: String,
    },

    /// Table or vector dimensions disagree.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimensions description
        expected: String,
        /// Actual dimensions found
        actual: String,
    },

    /// Oracle produced NaN or an infinite cost.
    #[error("Predicted cost for edge {edge} is not finite: {value}")]
    NonFiniteCost {
        /// Edge position in request order
        edge: usize,
        /// Offending value
        value: f64,
    },

    /// Negative predicted costs form a cycle reachable from the start counter.
    #[error("Negative-cost cycle reachable from start counter (through '{node}')")]
    NegativeCycle {
        /// A node on or downstream of the cycle
        node: String,
    },

    /// Cost oracle could not be loaded or has the wrong shape.
    #[error("Failed to load model from {path}: {reason}")]
    OracleLoad {
        /// Parameter file path
        path: String,
        /// Failure description
        reason: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl RerouteError {
    /// Create a malformed request error.
    #[must_use]
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedRequest {
            reason: reason.into(),
        }
    }

    /// Create a dimension mismatch error with descriptive context.
    #[must_use]
    pub fn dimension_mismatch(context: &str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            expected: format!("{context}={expected}"),
            actual: format!("{actual}"),
        }
    }

    /// Create an oracle load error.
    #[must_use]
    pub fn oracle_load(path: impl AsRef<std::path::Path>, reason: impl Into<String>) -> Self {
        Self::OracleLoad {
            path: path.as_ref().display().to_string(),
            reason: reason.into(),
        }
    }

    /// Classify for the process boundary.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownSource { .. } => ErrorKind::NotFound,
            Self::OracleLoad { .. } => ErrorKind::Fatal,
            _ => ErrorKind::Client,
        }
    }
}

impl From<serde_json::Error> for RerouteError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<bincode::Error> for RerouteError {
    fn from(err: bincode::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, RerouteError>;
