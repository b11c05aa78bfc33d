//! Bandwidth-proportional distribution
//!
//! Each node's target is its share of total reported bandwidth, floored to
//! whole blocks. The proportional pass visits nodes in ascending-available
//! order, settling target-vs-delivered differences through a running
//! accumulator; whatever integer rounding leaves unplaced ("scrap") is
//! handed to the latency-greedy fallback.

use crate::error::{PlacementError, Result};
use crate::node::NodeLedger;
use crate::strategy::{fallback, flat, Accumulator, Schedule};
use tracing::debug;

/// Whole blocks a bandwidth share entitles a node to: `floor(share * n)`
pub fn share_blocks(share: f64, requested: u64) -> Result<u64> {
    if !share.is_finite() || share < 0.0 {
        return Err(PlacementError::InvalidBandwidthFactor(share));
    }
    Ok((share * requested as f64).floor() as u64)
}

/// Distribute `requested` blocks proportionally to bandwidth
///
/// Caller must have verified that the pool is non-empty and that pool-wide
/// availability covers `requested`. Returns the schedule and the total
/// actually allocated; the total falls short of `requested` only on the
/// under-delivery path the caller reports as `Retry`.
pub(crate) fn distribute(nodes: &mut [NodeLedger], requested: u64) -> Result<(Schedule, u64)> {
    let total_bandwidth: f64 = nodes.iter().map(|n| n.bandwidth_factor()).sum();
    if total_bandwidth == 0.0 {
        // All-zero factors carry no proportionality information
        debug!("zero total bandwidth, falling back to flat distribution");
        let schedule = flat::distribute(nodes, requested);
        let total = schedule.total_blocks();
        return Ok((schedule, total));
    }

    let targets: Vec<u64> = nodes
        .iter()
        .map(|n| share_blocks(n.bandwidth_factor() / total_bandwidth, requested))
        .collect::<Result<_>>()?;

    let mut order: Vec<usize> = (0..nodes.len()).collect();
    order.sort_by(|&a, &b| NodeLedger::cmp_by_available(&nodes[a], &nodes[b]));

    debug!(requested, total_bandwidth, "weighted distribution pass");

    let count = nodes.len() as u64;
    let mut accum = Accumulator::new();
    let mut total = 0u64;
    let mut schedule = Schedule::new();

    for (visited, &slot) in order.iter().enumerate() {
        let remaining = count - visited as u64;
        let node = &mut nodes[slot];
        let target = targets[slot];

        let draw = target as i64 + accum.share(remaining);
        let draw = draw.clamp(0, (requested - total) as i64) as u64;
        let got = node.allocate(draw);
        total += got;
        // Positive residue: shortfall to spread ahead; negative: this node
        // over-delivered and reduces future obligation
        accum.add(target as i64 - got as i64);
        schedule.add(node.index(), got);
    }

    // Rounding residue left unplaced by the proportional pass. A positive
    // end residue is already part of the gap, so the fallback request is
    // clamped to it; a negative residue shrinks the request below the gap,
    // which surfaces as under-delivery.
    let gap = requested - total;
    let scrap = (gap as i64 + accum.residue()).clamp(0, gap as i64) as u64;
    if scrap > 0 {
        debug!(scrap, "handing scrap to latency-greedy fallback");
        total += fallback::place(nodes, scrap, &mut schedule)?;
    }

    Ok((schedule, total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heartbeat::Heartbeat;
    use crate::placement::Placement;

    #[test]
    fn test_share_blocks_floors() {
        assert_eq!(share_blocks(0.8, 10).unwrap(), 8);
        assert_eq!(share_blocks(0.5, 10).unwrap(), 5);
        assert_eq!(share_blocks(0.5, 5).unwrap(), 2);
        assert_eq!(share_blocks(0.0, 10).unwrap(), 0);
        assert_eq!(share_blocks(1.0, 10).unwrap(), 10);
    }

    #[test]
    fn test_share_blocks_rejects_bad_shares() {
        assert!(matches!(
            share_blocks(-3.0, 5),
            Err(PlacementError::InvalidBandwidthFactor(_))
        ));
        assert!(share_blocks(f64::NAN, 5).is_err());
        assert!(share_blocks(f64::INFINITY, 5).is_err());
    }

    #[test]
    fn test_faster_node_gets_at_least_as_much() {
        let mut placement = Placement::new(5, 10).unwrap();
        for i in 0..5 {
            placement
                .ingest_heartbeat(Heartbeat::new(i, 0.5 + i as f64 * 0.1))
                .unwrap();
        }
        assert!((placement.total_bandwidth() - 3.5).abs() < 1e-9);

        let outcome = placement.weighted_allocate(10).unwrap();
        assert!(outcome.is_good());

        let used_slow = placement.node(0).unwrap().used();
        let used_fast = placement.node(4).unwrap().used();
        assert!(used_fast >= used_slow);
    }

    #[test]
    fn test_uniform_bandwidth_matches_even_split() {
        let mut nodes: Vec<NodeLedger> = (0..5).map(|i| NodeLedger::new(i, 10)).collect();
        let (schedule, total) = distribute(&mut nodes, 10).unwrap();

        assert_eq!(total, 10);
        assert_eq!(schedule.total_blocks(), 10);
        for node in &nodes {
            assert_eq!(node.used(), 2);
        }
    }

    #[test]
    fn test_zero_bandwidth_falls_back_to_flat() {
        let mut nodes: Vec<NodeLedger> = (0..5).map(|i| NodeLedger::new(i, 10)).collect();
        for node in nodes.iter_mut() {
            node.set_bandwidth_factor(0.0).unwrap();
        }

        let (schedule, total) = distribute(&mut nodes, 10).unwrap();
        assert_eq!(total, 10);
        assert_eq!(schedule.total_blocks(), 10);
        for node in &nodes {
            assert_eq!(node.used(), 2);
        }
    }

    #[test]
    fn test_scrap_goes_through_fallback() {
        // Factors sum to 3.5; floored targets sum below 10, so the
        // remainder must come from the fallback and the pass still
        // delivers exactly the request
        let mut nodes: Vec<NodeLedger> = (0..5).map(|i| NodeLedger::new(i, 10)).collect();
        for (i, node) in nodes.iter_mut().enumerate() {
            node.set_bandwidth_factor(0.5 + i as f64 * 0.1).unwrap();
        }

        let (schedule, total) = distribute(&mut nodes, 10).unwrap();
        assert_eq!(total, 10);
        assert_eq!(schedule.total_blocks(), 10);
    }

    #[test]
    fn test_constrained_node_shortfall_redistributed() {
        let mut nodes: Vec<NodeLedger> = (0..3).map(|i| NodeLedger::new(i, 10)).collect();
        // Node 2 is nearly full but reports the highest bandwidth
        nodes[2].allocate(9);
        nodes[2].set_bandwidth_factor(10.0).unwrap();

        let (schedule, total) = distribute(&mut nodes, 8).unwrap();
        assert_eq!(total, 8);
        assert_eq!(schedule.total_blocks(), 8);
        let available: u64 = nodes.iter().map(|n| n.available()).sum();
        assert_eq!(available, 21 - 8);
    }
}
