//! triageflow Solver Engine
//!
//! This crate provides the allocation engine:
//! - Residual graph with explicit reverse-arc bookkeeping
//! - Edmonds–Karp maximum flow and post-solve verification
//! - Scenario graph builders (beds, transport, route networks)
//! - Flow-to-assignment extraction and capacity slot derivation
//! - Bounded knapsack and the greedy slot cascade
//! - `AllocationEngine`, which runs scenarios end to end against a store

pub mod builder;
pub mod cascade;
pub mod engine;
pub mod extract;
pub mod graph;
pub mod knapsack;
pub mod maxflow;
pub mod verify;

pub use builder::{bed_assignment_graph, route_capacity, route_network_graph, stock_distribution_graph};
pub use cascade::{run_cascade, CascadeOutcome, SlotSelection};
pub use engine::{
    AllocationEngine, BedAllocationReport, BedUsage, CenterLevel, KitReport, RouteCapacityReport,
    Shipment, SolveSummary, SupplyChainReport, SupplyReport, TransportReport, ZoneLevel,
};
pub use extract::{
    extract, settle_placements, slots_from_assignments, slots_from_source, Assignment, Extraction,
    Placement, SiteFlow, Transfer,
};
pub use graph::{EdgeFlow, ResidualGraph};
pub use knapsack::{expand, KnapsackSolver, Pick, Selection, UnitCopy};
pub use maxflow::{max_flow, EdmondsKarp, MaxFlow, SolveStats};
pub use verify::{min_cut, verify_flow, MinCut};
