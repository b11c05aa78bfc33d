//! Allocation strategies for the placement engine
//!
//! Two strategies are available:
//! - [`flat`] - even distribution, independent of bandwidth
//! - [`weighted`] - bandwidth-proportional distribution, with the
//!   [`fallback`] latency-greedy pass for rounding residue
//!
//! Both produce a [`Schedule`]: the exact per-node record of what was taken,
//! suitable for auditing or for handing back to
//! [`Placement::free_schedule`](crate::Placement::free_schedule).

pub mod fallback;
pub mod flat;
pub mod weighted;

use serde::{Deserialize, Serialize};

/// One node's share of an allocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Stable pool index of the node
    pub node_index: usize,

    /// Blocks withdrawn from that node
    pub blocks: u64,
}

/// Exact per-node record of an allocation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    entries: Vec<ScheduleEntry>,
}

impl Schedule {
    pub fn new() -> Self {
        Schedule::default()
    }

    /// Record `blocks` taken from `node_index`, coalescing repeat visits
    pub fn add(&mut self, node_index: usize, blocks: u64) {
        if blocks == 0 {
            return;
        }
        if let Some(entry) = self.entries.iter_mut().find(|e| e.node_index == node_index) {
            entry.blocks += blocks;
        } else {
            self.entries.push(ScheduleEntry { node_index, blocks });
        }
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    pub fn total_blocks(&self) -> u64 {
        self.entries.iter().map(|e| e.blocks).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Result of an allocation request
///
/// `OutOfSpace` and `Retry` are routine statuses, not errors: the former
/// guarantees no mutation happened, the latter is a deliberate partial
/// commit. Genuine failures (bad arguments, broken invariants) surface as
/// [`PlacementError`](crate::PlacementError) instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllocationOutcome {
    /// Request fully satisfied; the schedule totals exactly the request
    Good { schedule: Schedule },

    /// Request exceeds pool-wide availability; nothing was mutated
    OutOfSpace { requested: u64, available: u64 },

    /// Under-delivery after partial mutation
    ///
    /// Best effort, no rollback: `schedule` records what was actually taken
    /// so the caller can reconcile, or free it back and retry.
    Retry {
        schedule: Schedule,
        allocated: u64,
        requested: u64,
    },
}

impl AllocationOutcome {
    pub fn is_good(&self) -> bool {
        matches!(self, AllocationOutcome::Good { .. })
    }

    /// The per-node schedule, when any mutation occurred
    pub fn schedule(&self) -> Option<&Schedule> {
        match self {
            AllocationOutcome::Good { schedule } => Some(schedule),
            AllocationOutcome::Retry { schedule, .. } => Some(schedule),
            AllocationOutcome::OutOfSpace { .. } => None,
        }
    }
}

/// Carried-forward remainder for a distribution pass
///
/// Positive residue is unmet demand to spread over the nodes still ahead;
/// negative residue is over-delivery that reduces their obligation. Each
/// visited node takes `ceil(residue / remaining_nodes)` so the residue
/// telescopes to zero by the last node.
#[derive(Debug, Default)]
pub(crate) struct Accumulator {
    residue: i64,
}

impl Accumulator {
    pub fn new() -> Self {
        Accumulator::default()
    }

    pub fn with_residue(residue: u64) -> Self {
        Accumulator {
            residue: residue as i64,
        }
    }

    pub fn add(&mut self, delta: i64) {
        self.residue += delta;
    }

    pub fn residue(&self) -> i64 {
        self.residue
    }

    /// This node's share without consuming it: `ceil(residue / remaining_nodes)`
    ///
    /// Used by the weighted pass, where the residue is settled separately
    /// from the actual blocks delivered.
    pub fn share(&self, remaining_nodes: u64) -> i64 {
        debug_assert!(remaining_nodes > 0);
        div_ceil(self.residue, remaining_nodes as i64)
    }

    /// Remove and return this node's share: `ceil(residue / remaining_nodes)`
    pub fn take_share(&mut self, remaining_nodes: u64) -> i64 {
        let share = self.share(remaining_nodes);
        self.residue -= share;
        share
    }
}

/// Ceiling division toward +inf for a signed numerator, positive denominator
fn div_ceil(a: i64, b: i64) -> i64 {
    (a + b - 1).div_euclid(b)
}
