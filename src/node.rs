//! Per-node capacity and availability bookkeeping
//!
//! A [`NodeLedger`] is the unit of ownership for one storage node's block
//! count and bandwidth factor. All block movements are clamped: the ledger
//! never errors on over-withdrawal or over-return, it reports the number of
//! blocks actually moved and the caller accounts for the difference.

use crate::error::{PlacementError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Ledger for a single storage node
///
/// Invariant: `available <= capacity` at all times. `index` is a stable
/// identity assigned at pool construction and never changes, regardless of
/// how nodes are ordered during an allocation pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeLedger {
    /// Stable identity, 0-based position in the pool
    index: usize,

    /// Maximum blocks this node can ever hold
    capacity: u64,

    /// Blocks currently free to allocate
    available: u64,

    /// Relative throughput weight, updated by heartbeats
    bandwidth_factor: f64,
}

impl NodeLedger {
    /// Create a ledger for a node with all blocks available
    pub fn new(index: usize, capacity: u64) -> Self {
        NodeLedger {
            index,
            capacity,
            available: capacity,
            bandwidth_factor: 1.0,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn available(&self) -> u64 {
        self.available
    }

    /// Blocks currently resident on the node
    pub fn used(&self) -> u64 {
        self.capacity - self.available
    }

    pub fn bandwidth_factor(&self) -> f64 {
        self.bandwidth_factor
    }

    /// Remove up to `n` blocks from the node
    ///
    /// Returns the number actually removed. Under-delivery is signaled only
    /// by the returned count being less than `n`.
    pub fn allocate(&mut self, n: u64) -> u64 {
        let taken = n.min(self.available);
        self.available -= taken;
        taken
    }

    /// Remove and return all currently available blocks
    pub fn allocate_all(&mut self) -> u64 {
        let taken = self.available;
        self.available = 0;
        taken
    }

    /// Return up to `n` blocks to the node, clamped at capacity
    pub fn free(&mut self, n: u64) -> u64 {
        let restored = n.min(self.capacity - self.available);
        self.available += restored;
        restored
    }

    /// Restore the node to full availability, returning the count restored
    pub fn free_all(&mut self) -> u64 {
        let restored = self.capacity - self.available;
        self.available = self.capacity;
        restored
    }

    /// Overwrite the bandwidth factor with the latest reported value
    ///
    /// Last-write-wins; rejects negative and non-finite factors.
    pub fn set_bandwidth_factor(&mut self, factor: f64) -> Result<()> {
        if !factor.is_finite() || factor < 0.0 {
            return Err(PlacementError::InvalidBandwidthFactor(factor));
        }
        self.bandwidth_factor = factor;
        Ok(())
    }

    /// Sort key: fewest available blocks first
    pub fn cmp_by_available(a: &NodeLedger, b: &NodeLedger) -> Ordering {
        a.available.cmp(&b.available)
    }

    /// Sort key: highest bandwidth factor first
    pub fn cmp_by_bandwidth(a: &NodeLedger, b: &NodeLedger) -> Ordering {
        b.bandwidth_factor.total_cmp(&a.bandwidth_factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_node_fully_available() {
        let node = NodeLedger::new(3, 10);
        assert_eq!(node.index(), 3);
        assert_eq!(node.capacity(), 10);
        assert_eq!(node.available(), 10);
        assert_eq!(node.used(), 0);
        assert_eq!(node.bandwidth_factor(), 1.0);
    }

    #[test]
    fn test_allocate_clamps_to_available() {
        let mut node = NodeLedger::new(0, 10);

        assert_eq!(node.allocate(4), 4);
        assert_eq!(node.available(), 6);

        // Asking for more than is left returns only what is left
        assert_eq!(node.allocate(8), 6);
        assert_eq!(node.available(), 0);
    }

    #[test]
    fn test_free_clamps_to_capacity() {
        let mut node = NodeLedger::new(0, 10);
        node.allocate(10);

        assert_eq!(node.free(5), 5);
        assert_eq!(node.available(), 5);

        assert_eq!(node.free_all(), 5);
        assert_eq!(node.available(), 10);

        // Already full, nothing to restore
        assert_eq!(node.free(3), 0);
        assert_eq!(node.available(), 10);
    }

    #[test]
    fn test_allocate_all() {
        let mut node = NodeLedger::new(0, 10);
        node.allocate(4);

        assert_eq!(node.allocate_all(), 6);
        assert_eq!(node.available(), 0);
        assert_eq!(node.used(), 10);
    }

    #[test]
    fn test_set_bandwidth_factor() {
        let mut node = NodeLedger::new(0, 10);

        node.set_bandwidth_factor(0.7).unwrap();
        assert_eq!(node.bandwidth_factor(), 0.7);

        let result = node.set_bandwidth_factor(-3.0);
        assert!(matches!(
            result,
            Err(PlacementError::InvalidBandwidthFactor(_))
        ));
        assert_eq!(node.bandwidth_factor(), 0.7);

        assert!(node.set_bandwidth_factor(f64::NAN).is_err());
        assert!(node.set_bandwidth_factor(0.0).is_ok());
    }

    #[test]
    fn test_sort_keys() {
        let mut a = NodeLedger::new(0, 10);
        let b = NodeLedger::new(1, 10);

        assert_eq!(NodeLedger::cmp_by_available(&a, &b), Ordering::Equal);
        a.allocate(2);
        assert_eq!(NodeLedger::cmp_by_available(&a, &b), Ordering::Less);

        a.set_bandwidth_factor(0.7).unwrap();
        // Higher bandwidth sorts first
        assert_eq!(NodeLedger::cmp_by_bandwidth(&a, &b), Ordering::Greater);
    }
}
