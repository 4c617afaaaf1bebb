//! Error types for triageflow

use thiserror::Error;

use crate::store::StoreError;

/// Main error type for allocation runs.
///
/// `InvalidCapacity`, `AssignmentInconsistency` and `FlowInvariant` indicate
/// correctness bugs in the inputs or the engine and are always surfaced to
/// the caller.
#[derive(Debug, Error)]
pub enum AllocationError {
    /// A capacity, weight, value or quantity was negative.
    #[error("invalid capacity for {context}: {value}")]
    InvalidCapacity { context: String, value: i64 },

    /// A priority level outside the known bands.
    #[error("invalid priority level: {0}")]
    InvalidBand(i64),

    /// A knapsack capacity above the configured maximum.
    #[error("capacity {capacity} exceeds the configured maximum of {max}")]
    CapacityTooLarge { capacity: i64, max: i64 },

    /// Source equals sink, or an edge loops onto its own node.
    #[error("degenerate request: {0}")]
    DegenerateRequest(String),

    /// A solve was requested against a node that was never added.
    #[error("unknown node: {0}")]
    UnknownNode(String),

    /// A demand node carries flow into more than one supply node.
    #[error("demand {demand} has flow into multiple supplies: {}", supplies.join(", "))]
    AssignmentInconsistency {
        demand: String,
        supplies: Vec<String>,
    },

    /// A completed flow violated conservation, capacity or min-cut checks.
    #[error("flow invariant violated: {0}")]
    FlowInvariant(String),

    /// Reading a snapshot from the store failed.
    #[error("store read failed: {0}")]
    Store(#[source] StoreError),

    /// The store rejected the atomic commit; no effects were applied.
    #[error("commit failed: {0}")]
    CommitFailure(#[source] StoreError),
}

impl AllocationError {
    /// Builds an `InvalidCapacity` error for the given context.
    pub fn invalid_capacity(context: impl Into<String>, value: i64) -> Self {
        Self::InvalidCapacity {
            context: context.into(),
            value,
        }
    }
}

/// Result type alias for allocation operations
pub type Result<T> = std::result::Result<T, AllocationError>;
