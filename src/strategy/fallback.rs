//! Latency-greedy placement for scrap blocks
//!
//! Places blocks one at a time onto whichever non-full node currently has
//! the lowest projected marginal latency, modeled as
//! `(used_blocks + 1) / bandwidth_factor`. This is a local greedy heuristic:
//! it approximates the proportional target under integer-rounding loss
//! without re-solving the full distribution, and makes no claim of global
//! optimality.

use crate::error::{PlacementError, Result};
use crate::node::NodeLedger;
use crate::strategy::Schedule;
use tracing::{debug, warn};

/// Marginal cost of putting one more block on the node
///
/// A zero bandwidth factor yields `+inf`, which sorts such a node last.
fn projected_latency(node: &NodeLedger) -> f64 {
    (node.used() + 1) as f64 / node.bandwidth_factor()
}

/// Place `scrap` blocks, cheapest-next-unit first
///
/// Appends every placement to `schedule` and returns the number of blocks
/// placed. Running out of acceptable nodes before `scrap` blocks are placed
/// means the upstream availability check and this view of the pool disagree;
/// that is a broken invariant and propagates as
/// [`PlacementError::AllocationExhausted`], never a routine status.
pub(crate) fn place(nodes: &mut [NodeLedger], scrap: u64, schedule: &mut Schedule) -> Result<u64> {
    let mut candidates: Vec<(usize, f64)> = nodes
        .iter()
        .enumerate()
        .filter(|(_, n)| n.available() > 0)
        .map(|(slot, n)| (slot, projected_latency(n)))
        .collect();

    debug!(scrap, candidates = candidates.len(), "latency-greedy pass");

    let mut placed = 0u64;
    for _ in 0..scrap {
        candidates.sort_by(|a, b| a.1.total_cmp(&b.1));

        let mut accepted = false;
        for entry in candidates.iter_mut() {
            let node = &mut nodes[entry.0];
            if node.allocate(1) == 1 {
                schedule.add(node.index(), 1);
                // One more resident block raises the next block's cost
                entry.1 += 1.0 / node.bandwidth_factor();
                placed += 1;
                accepted = true;
                break;
            }
        }

        if !accepted {
            warn!(
                requested = scrap,
                placed, "no node can accept a block, aborting fallback"
            );
            return Err(PlacementError::AllocationExhausted {
                requested: scrap,
                placed,
            });
        }
    }

    Ok(placed)
}
