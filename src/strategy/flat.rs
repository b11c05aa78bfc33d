//! Even, bandwidth-agnostic distribution
//!
//! Splits a request into `base = n / node_count` blocks per node plus a
//! remainder, visiting nodes with the least spare capacity first so that
//! constrained nodes are drained before the remainder is spread. Shortfall
//! from nodes that cannot cover `base` is carried forward and absorbed by
//! the surplus nodes still ahead.

use crate::node::NodeLedger;
use crate::strategy::{Accumulator, Schedule};
use tracing::debug;

/// Distribute `requested` blocks as evenly as integer arithmetic allows
///
/// Caller must have verified that the pool is non-empty and that pool-wide
/// availability covers `requested`; under that precondition the returned
/// schedule totals exactly `requested`.
pub(crate) fn distribute(nodes: &mut [NodeLedger], requested: u64) -> Schedule {
    let count = nodes.len() as u64;
    let base = requested / count;
    let mut rem = Accumulator::with_residue(requested % count);
    let mut shortfall = Accumulator::new();
    let mut schedule = Schedule::new();

    let mut order: Vec<usize> = (0..nodes.len()).collect();
    order.sort_by(|&a, &b| NodeLedger::cmp_by_available(&nodes[a], &nodes[b]));

    debug!(requested, base, "flat distribution pass");

    for (visited, &slot) in order.iter().enumerate() {
        let remaining = count - visited as u64;
        let node = &mut nodes[slot];
        let available = node.available();

        if available < base {
            // Constrained node: drain it and carry the shortfall forward
            shortfall.add((base - available) as i64);
            let got = node.allocate_all();
            debug!(
                node = node.index(),
                got, base, "node below base, shortfall carried"
            );
            schedule.add(node.index(), got);
            continue;
        }
        if available == base {
            let got = node.allocate_all();
            schedule.add(node.index(), got);
            continue;
        }

        // Surplus node: absorb its slice of the remainder and of the
        // carried shortfall
        let draw = base as i64 + rem.take_share(remaining) + shortfall.take_share(remaining);
        let draw = draw.max(0) as u64;
        let got = node.allocate(draw);
        if got < draw {
            shortfall.add((draw - got) as i64);
        }
        schedule.add(node.index(), got);
    }

    debug_assert_eq!(schedule.total_blocks(), requested);
    schedule
}
