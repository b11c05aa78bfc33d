//! Heartbeat readings from the external bandwidth sensor
//!
//! A heartbeat carries one node's latest measured bandwidth factor. The
//! engine does no aggregation, smoothing, or staleness detection: ingestion
//! is a pure last-value overwrite, so applying the same reading twice is a
//! no-op. A node that stops sending heartbeats simply keeps its stale factor.

use serde::{Deserialize, Serialize};

/// One `(node, bandwidth factor)` reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Heartbeat {
    /// Pool index of the reporting node
    pub node_index: usize,

    /// Latest measured relative throughput, non-negative
    pub bandwidth_factor: f64,
}

impl Heartbeat {
    pub fn new(node_index: usize, bandwidth_factor: f64) -> Self {
        Heartbeat {
            node_index,
            bandwidth_factor,
        }
    }
}
