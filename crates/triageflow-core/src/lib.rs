//! triageflow Core - Core types and traits for capacity-bounded allocation
//!
//! This crate provides the fundamental abstractions for triageflow:
//! - Node identifiers and priority bands for flow graphs
//! - Domain entities read from the persistence layer
//! - Point-in-time snapshots consumed by the graph builders
//! - The `AllocationStore` seam and its atomic `CommitBatch`

pub mod domain;
pub mod error;
pub mod node;
pub mod snapshot;
pub mod store;

#[cfg(test)]
mod node_tests;
#[cfg(test)]
mod snapshot_tests;

pub use domain::{
    BandBeds, CapacitySlot, DisasterZone, Hospital, HospitalTransfer, Item, ItemId, Patient,
    RouteLink, SupplyCenter, TransportRoute,
};
pub use error::{AllocationError, Result};
pub use node::{Band, EntityKind, EntityRef, NodeId};
pub use snapshot::{BedSnapshot, ItemPool, NetworkSnapshot, StockSnapshot};
pub use store::{AllocationStore, CommitBatch, Mutation, StoreError};
