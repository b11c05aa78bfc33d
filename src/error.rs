use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlacementError {
    #[error("node pool is empty")]
    EmptyPool,

    #[error("invalid node index: {0}")]
    InvalidNodeIndex(usize),

    #[error("invalid bandwidth factor: {0} (must be finite and non-negative)")]
    InvalidBandwidthFactor(f64),

    #[error("allocation exhausted: placed {placed} of {requested} blocks with no acceptable node left")]
    AllocationExhausted { requested: u64, placed: u64 },
}

pub type Result<T> = std::result::Result<T, PlacementError>;
