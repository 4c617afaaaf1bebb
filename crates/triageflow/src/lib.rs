//! triageflow - Allocation of scarce emergency resources
//!
//! Runs maximum-flow and knapsack allocations over a persistence seam and
//! commits each run's effects as one atomic batch.
//!
//! # Example
//!
//! ```rust
//! use triageflow::prelude::*;
//!
//! let store = InMemoryStore::new()
//!     .with_patients([Patient::new(1, "Rahim", 1)])
//!     .with_hospitals([Hospital::new(1, "Dhaka Medical", BandBeds::new(1, 0, 0, 0))]);
//!
//! let mut engine = AllocationEngine::new(store);
//! let report = engine.allocate_beds().unwrap();
//! assert_eq!(report.solve.value, 1);
//! assert_eq!(engine.store().patient(1).unwrap().hospital_id, Some(1));
//! ```

// Domain types and the persistence seam
pub use triageflow_core::{
    AllocationError, AllocationStore, Band, BandBeds, CapacitySlot, CommitBatch, DisasterZone,
    EntityKind, EntityRef, Hospital, HospitalTransfer, Item, ItemId, Mutation, NodeId, Patient,
    Result, RouteLink, StoreError, SupplyCenter, TransportRoute,
};

// Configuration
pub use triageflow_config::{
    ConfigError, EngineConfig, EnvironmentMode, KnapsackConfig, NetworkConfig,
    RouteCapacityPolicy, TransportConfig,
};

// Engine and reports
pub use triageflow_solver::{
    AllocationEngine, BedAllocationReport, BedUsage, CenterLevel, KitReport, RouteCapacityReport,
    Shipment, SolveSummary, SupplyChainReport, SupplyReport, TransportReport, ZoneLevel,
};

// Building blocks, for callers composing their own runs
pub use triageflow_solver::{
    builder, cascade, extract, graph, knapsack, maxflow, verify, EdmondsKarp, KnapsackSolver,
    MaxFlow, ResidualGraph, Selection,
};

// Stores
pub use triageflow_store::{
    ingest, load_csv, load_dataset, read_csv, DatasetSummary, InMemoryStore, IngestError,
};

/// Colored console output; enable with the `console` feature.
#[cfg(feature = "console")]
pub use triageflow_console as console;

pub mod prelude {
    pub use super::{
        AllocationEngine, AllocationError, AllocationStore, Band, BandBeds, CapacitySlot,
        DisasterZone, EngineConfig, Hospital, HospitalTransfer, InMemoryStore, Item, Patient,
        RouteLink, SupplyCenter, TransportRoute,
    };
}
