//! Block-placement engine
//!
//! Decides how many storage blocks to withdraw from (allocate) or return to
//! (free) each node of a fixed pool, keeping per-node utilization either
//! perfectly even or proportional to each node's reported memory bandwidth.
//!
//! ## Components
//!
//! - [`node`] - per-node capacity and availability bookkeeping
//! - [`heartbeat`] - externally-reported bandwidth factor readings
//! - [`strategy`] - the allocation algorithm family:
//!   - [`strategy::flat`] - even, bandwidth-agnostic distribution
//!   - [`strategy::weighted`] - bandwidth-proportional distribution
//!   - [`strategy::fallback`] - latency-greedy placement of rounding residue
//! - [`placement`] - the facade owning the pool and the entry points
//! - [`error`] - error types for placement operations
//!
//! ## Example
//!
//! ```rust
//! use blockplace::{AllocationOutcome, Heartbeat, Placement};
//!
//! // 5 nodes, 10 blocks each
//! let mut placement = Placement::new(5, 10).unwrap();
//!
//! // The bandwidth sensor reports per-node throughput factors
//! placement.ingest_heartbeat(Heartbeat::new(0, 0.5)).unwrap();
//! placement.ingest_heartbeat(Heartbeat::new(1, 0.9)).unwrap();
//!
//! // Place 10 blocks proportionally to bandwidth
//! match placement.weighted_allocate(10).unwrap() {
//!     AllocationOutcome::Good { schedule } => {
//!         for entry in schedule.entries() {
//!             println!("node {} takes {} blocks", entry.node_index, entry.blocks);
//!         }
//!         // Hand the blocks back when done
//!         placement.free_schedule(&schedule).unwrap();
//!     }
//!     AllocationOutcome::OutOfSpace { requested, available } => {
//!         println!("wanted {requested}, pool only has {available}");
//!     }
//!     AllocationOutcome::Retry { allocated, requested, .. } => {
//!         println!("partial: {allocated} of {requested}, caller reconciles");
//!     }
//! }
//! ```
//!
//! The engine is synchronous and single-threaded by design; wrap the pool in
//! [`SharedPlacement`] when allocations and heartbeats arrive from
//! independent sources, so each operation completes in full before the next
//! begins.

pub mod error;
pub mod heartbeat;
pub mod node;
pub mod placement;
pub mod strategy;

// Re-export commonly used types
pub use error::{PlacementError, Result};
pub use heartbeat::Heartbeat;
pub use node::NodeLedger;
pub use placement::{Placement, SharedPlacement};
pub use strategy::weighted::share_blocks;
pub use strategy::{AllocationOutcome, Schedule, ScheduleEntry};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
