//! Placement facade over the node pool
//!
//! [`Placement`] owns the node ledgers, performs the up-front availability
//! and argument checks, and dispatches to the allocation strategies. Nodes
//! never move inside the pool vector, so a node's `index` doubles as its
//! position for heartbeat routing and schedule frees; strategies order nodes
//! through index vectors computed fresh per call.

use crate::error::{PlacementError, Result};
use crate::heartbeat::Heartbeat;
use crate::node::NodeLedger;
use crate::strategy::{flat, weighted, AllocationOutcome, Schedule};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

/// Fixed pool of storage nodes and the allocation entry points
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Placement {
    nodes: Vec<NodeLedger>,
}

impl Placement {
    /// Create a pool of `node_count` nodes, each with `blocks_per_node`
    /// capacity and a bandwidth factor of 1.0
    pub fn new(node_count: usize, blocks_per_node: u64) -> Result<Self> {
        if node_count == 0 {
            return Err(PlacementError::EmptyPool);
        }
        Ok(Placement {
            nodes: (0..node_count)
                .map(|i| NodeLedger::new(i, blocks_per_node))
                .collect(),
        })
    }

    /// Sum of node capacities
    pub fn total_capacity(&self) -> u64 {
        self.nodes.iter().map(|n| n.capacity()).sum()
    }

    /// Blocks currently free across the whole pool
    pub fn available_blocks(&self) -> u64 {
        self.nodes.iter().map(|n| n.available()).sum()
    }

    /// Sum of reported bandwidth factors
    pub fn total_bandwidth(&self) -> f64 {
        self.nodes.iter().map(|n| n.bandwidth_factor()).sum()
    }

    pub fn node(&self, index: usize) -> Option<&NodeLedger> {
        self.nodes.get(index)
    }

    pub fn nodes(&self) -> &[NodeLedger] {
        &self.nodes
    }

    /// Distribute `requested` blocks evenly across the pool
    ///
    /// Checks pool-wide availability before mutating anything; on `Good`
    /// the returned schedule totals exactly `requested`.
    pub fn flat_allocate(&mut self, requested: u64) -> Result<AllocationOutcome> {
        if let Some(outcome) = self.check_space(requested) {
            return Ok(outcome);
        }
        let schedule = flat::distribute(&mut self.nodes, requested);
        Ok(AllocationOutcome::Good { schedule })
    }

    /// Distribute `requested` blocks proportionally to reported bandwidth
    ///
    /// Checks pool-wide availability before mutating anything. Under-delivery
    /// after the proportional and fallback passes is reported as
    /// [`AllocationOutcome::Retry`] with the partial schedule; nothing is
    /// rolled back.
    pub fn weighted_allocate(&mut self, requested: u64) -> Result<AllocationOutcome> {
        if let Some(outcome) = self.check_space(requested) {
            return Ok(outcome);
        }
        let (schedule, allocated) = weighted::distribute(&mut self.nodes, requested)?;
        if allocated == requested {
            Ok(AllocationOutcome::Good { schedule })
        } else {
            warn!(requested, allocated, "weighted allocation under-delivered");
            Ok(AllocationOutcome::Retry {
                schedule,
                allocated,
                requested,
            })
        }
    }

    /// Apply one heartbeat reading: pure last-value overwrite
    pub fn ingest_heartbeat(&mut self, heartbeat: Heartbeat) -> Result<()> {
        let node = self
            .nodes
            .get_mut(heartbeat.node_index)
            .ok_or(PlacementError::InvalidNodeIndex(heartbeat.node_index))?;
        node.set_bandwidth_factor(heartbeat.bandwidth_factor)
    }

    /// Return a schedule's blocks to their nodes
    ///
    /// Validates every node index before touching any ledger. Returns the
    /// number of blocks actually restored, clamped at each node's capacity.
    pub fn free_schedule(&mut self, schedule: &Schedule) -> Result<u64> {
        for entry in schedule.entries() {
            if entry.node_index >= self.nodes.len() {
                return Err(PlacementError::InvalidNodeIndex(entry.node_index));
            }
        }
        let mut restored = 0;
        for entry in schedule.entries() {
            restored += self.nodes[entry.node_index].free(entry.blocks);
        }
        Ok(restored)
    }

    /// `OutOfSpace` when the pool cannot cover `requested`, before mutation
    fn check_space(&self, requested: u64) -> Option<AllocationOutcome> {
        let available = self.available_blocks();
        if available < requested {
            warn!(requested, available, "not enough blocks in the pool");
            return Some(AllocationOutcome::OutOfSpace {
                requested,
                available,
            });
        }
        None
    }
}

/// Thread-safe handle enforcing the allocation-wide lock discipline
///
/// The weighted pass depends on a stable snapshot of every node's
/// availability and bandwidth factor, so one allocation or heartbeat must
/// complete in full before the next begins. `SharedPlacement` puts the whole
/// pool behind a single mutex; clones share the same pool.
#[derive(Debug, Clone)]
pub struct SharedPlacement {
    inner: Arc<Mutex<Placement>>,
}

impl SharedPlacement {
    pub fn new(node_count: usize, blocks_per_node: u64) -> Result<Self> {
        Ok(SharedPlacement {
            inner: Arc::new(Mutex::new(Placement::new(node_count, blocks_per_node)?)),
        })
    }

    pub fn total_capacity(&self) -> u64 {
        self.inner.lock().total_capacity()
    }

    pub fn available_blocks(&self) -> u64 {
        self.inner.lock().available_blocks()
    }

    pub fn total_bandwidth(&self) -> f64 {
        self.inner.lock().total_bandwidth()
    }

    pub fn flat_allocate(&self, requested: u64) -> Result<AllocationOutcome> {
        self.inner.lock().flat_allocate(requested)
    }

    pub fn weighted_allocate(&self, requested: u64) -> Result<AllocationOutcome> {
        self.inner.lock().weighted_allocate(requested)
    }

    pub fn ingest_heartbeat(&self, heartbeat: Heartbeat) -> Result<()> {
        self.inner.lock().ingest_heartbeat(heartbeat)
    }

    pub fn free_schedule(&self, schedule: &Schedule) -> Result<u64> {
        self.inner.lock().free_schedule(schedule)
    }
}
