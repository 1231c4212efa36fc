//! Inbound telemetry: the route-prediction request and its row records.
//!
//! A request is a set of parallel arrays. Row `i` describes one directed
//! edge `counter_id[i] -> neighbor_counter_id[i]` together with the node
//! attributes of its source counter.

use crate::error::{RerouteError, Result};
use serde::{Deserialize, Deserializer, Serialize};

/// Live attributes of one counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Counter identifier
    pub id: String,
    /// Customers waiting
    pub queue_length: f64,
    /// Status code
    pub status: f64,
    /// Customers served per minute
    pub processing_rate: f64,
    /// Current delay in minutes
    pub delay: f64,
    /// Maximum queue capacity
    pub capacity: f64,
}

/// Directed relation from a counter to a neighbour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    /// Source counter
    pub source: String,
    /// Neighbour counter
    pub target: String,
    /// Walking distance
    pub distance: f64,
    /// How many customers the neighbour can absorb
    pub reroute_capacity: f64,
    /// 1.0 when the pair is connected, 0.0 otherwise
    pub is_connected: f64,
}

/// One request row: an edge plus its source node's attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryRow {
    /// Source counter attributes
    pub node: NodeRecord,
    /// Outgoing edge
    pub edge: EdgeRecord,
}

/// Route-prediction request in its wire shape.
///
/// # Examples
///
/// ```
/// use reroute::telemetry::RouteRequest;
///
/// let json = r#"{
///     "counter_id_list": ["A"], "queue_length_list": [3], "status_list": [1],
///     "processing_rate_list": [2.5], "delay_list": [4], "capacity_list": [40],
///     "neighbor_counter_id_list": ["B"], "distance_list": [10],
///     "reroute_capacity_list": [5], "is_connected_list": [true],
///     "start_counter": "A"
/// }"#;
/// let request: RouteRequest = serde_json::from_str(json).expect("valid json");
/// let rows = request.rows().expect("consistent arrays");
/// assert_eq!(rows[0].edge.target, "B");
/// assert_eq!(rows[0].edge.is_connected, 1.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    /// Source counter of each row
    #[serde(rename = "counter_id_list", deserialize_with = "de_identifiers")]
    pub counter_id: Vec<String>,
    /// Queue length of each row's source counter
    #[serde(rename = "queue_length_list")]
    pub queue_length: Vec<f64>,
    /// Status code of each row's source counter
    #[serde(rename = "status_list")]
    pub status: Vec<f64>,
    /// Processing rate of each row's source counter
    #[serde(rename = "processing_rate_list")]
    pub processing_rate: Vec<f64>,
    /// Delay of each row's source counter
    #[serde(rename = "delay_list")]
    pub delay: Vec<f64>,
    /// Capacity of each row's source counter
    #[serde(rename = "capacity_list")]
    pub capacity: Vec<f64>,
    /// Neighbour counter of each row
    #[serde(rename = "neighbor_counter_id_list", deserialize_with = "de_identifiers")]
    pub neighbor_counter_id: Vec<String>,
    /// Edge distance
    #[serde(rename = "distance_list")]
    pub distance: Vec<f64>,
    /// Edge reroute capacity
    #[serde(rename = "reroute_capacity_list")]
    pub reroute_capacity: Vec<f64>,
    /// Edge connectivity flag (bool or 0/1)
    #[serde(rename = "is_connected_list", deserialize_with = "de_flags")]
    pub is_connected: Vec<f64>,
    /// Counter to route from
    pub start_counter: String,
}

impl RouteRequest {
    /// Assembles a request from row records.
    #[must_use]
    pub fn from_rows(start_counter: impl Into<String>, rows: &[TelemetryRow]) -> Self {
        Self {
            counter_id: rows.iter().map(|r| r.node.id.clone()).collect(),
            queue_length: rows.iter().map(|r| r.node.queue_length).collect(),
            status: rows.iter().map(|r| r.node.status).collect(),
            processing_rate: rows.iter().map(|r| r.node.processing_rate).collect(),
            delay: rows.iter().map(|r| r.node.delay).collect(),
            capacity: rows.iter().map(|r| r.node.capacity).collect(),
            neighbor_counter_id: rows.iter().map(|r| r.edge.target.clone()).collect(),
            distance: rows.iter().map(|r| r.edge.distance).collect(),
            reroute_capacity: rows.iter().map(|r| r.edge.reroute_capacity).collect(),
            is_connected: rows.iter().map(|r| r.edge.is_connected).collect(),
            start_counter: start_counter.into(),
        }
    }

    /// Number of rows, if every array agrees on it.
    ///
    /// # Errors
    ///
    /// `MalformedRequest` naming the first array whose length differs from
    /// `counter_id_list`.
    pub fn row_count(&self) -> Result<usize> {
        let n = self.counter_id.len();
        let lengths = [
            ("queue_length_list", self.queue_length.len()),
            ("status_list", self.status.len()),
            ("processing_rate_list", self.processing_rate.len()),
            ("delay_list", self.delay.len()),
            ("capacity_list", self.capacity.len()),
            ("neighbor_counter_id_list", self.neighbor_counter_id.len()),
            ("distance_list", self.distance.len()),
            ("reroute_capacity_list", self.reroute_capacity.len()),
            ("is_connected_list", self.is_connected.len()),
        ];
        for (name, len) in lengths {
            if len != n {
                return Err(RerouteError::malformed(format!(
                    "{name} has {len} entries but counter_id_list has {n}"
                )));
            }
        }
        Ok(n)
    }

    /// Validates shape and values and splits the arrays into rows.
    ///
    /// # Errors
    ///
    /// - `MalformedRequest` on unequal array lengths, non-finite numbers or
    ///   empty identifiers
    /// - `EmptyGraph` when there are no rows
    pub fn rows(&self) -> Result<Vec<TelemetryRow>> {
        let n = self.row_count()?;
        if n == 0 {
            return Err(RerouteError::EmptyGraph {
                what: "request has no rows",
            });
        }

        let mut rows = Vec::with_capacity(n);
        for i in 0..n {
            let row = TelemetryRow {
                node: NodeRecord {
                    id: self.counter_id[i].clone(),
                    queue_length: self.queue_length[i],
                    status: self.status[i],
                    processing_rate: self.processing_rate[i],
                    delay: self.delay[i],
                    capacity: self.capacity[i],
                },
                edge: EdgeRecord {
                    source: self.counter_id[i].clone(),
                    target: self.neighbor_counter_id[i].clone(),
                    distance: self.distance[i],
                    reroute_capacity: self.reroute_capacity[i],
                    is_connected: self.is_connected[i],
                },
            };
            check_row(i, &row)?;
            rows.push(row);
        }
        Ok(rows)
    }
}

fn check_row(i: usize, row: &TelemetryRow) -> Result<()> {
    if row.edge.source.is_empty() || row.edge.target.is_empty() {
        return Err(RerouteError::malformed(format!(
            "row {i} has an empty counter identifier"
        )));
    }
    let values = [
        ("queue_length", row.node.queue_length),
        ("status", row.node.status),
        ("processing_rate", row.node.processing_rate),
        ("delay", row.node.delay),
        ("capacity", row.node.capacity),
        ("distance", row.edge.distance),
        ("reroute_capacity", row.edge.reroute_capacity),
        ("is_connected", row.edge.is_connected),
    ];
    for (name, value) in values {
        if !value.is_finite() {
            return Err(RerouteError::malformed(format!(
                "row {i}: {name} is not a finite number ({value})"
            )));
        }
        // Feature tables are f32
        if value.abs() > f64::from(f32::MAX) {
            return Err(RerouteError::malformed(format!(
                "row {i}: {name} is out of range ({value})"
            )));
        }
    }
    Ok(())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawIdentifier {
    Text(String),
    Int(i64),
    Float(f64),
}

impl From<RawIdentifier> for String {
    fn from(raw: RawIdentifier) -> Self {
        match raw {
            RawIdentifier::Text(s) => s,
            RawIdentifier::Int(i) => i.to_string(),
            RawIdentifier::Float(f) => f.to_string(),
        }
    }
}

/// Counter identifiers arrive as strings, but numeric ids are common in telemetry feeds.
fn de_identifiers<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Vec<RawIdentifier> = Vec::deserialize(deserializer)?;
    Ok(raw.into_iter().map(String::from).collect())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFlag {
    Bool(bool),
    Number(f64),
}

fn de_flags<'de, D>(deserializer: D) -> std::result::Result<Vec<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Vec<RawFlag> = Vec::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|flag| match flag {
            RawFlag::Bool(b) => f64::from(u8::from(b)),
            RawFlag::Number(n) => n,
        })
        .collect())
}
