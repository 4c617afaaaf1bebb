//! Serializable results of engine runs.

use serde::Serialize;
use triageflow_core::{Band, CapacitySlot};

use crate::cascade::CascadeOutcome;
use crate::extract::{Placement, SiteFlow, Transfer};
use crate::knapsack::Selection;
use crate::maxflow::MaxFlow;

/// Flow value and solver counters of one solve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SolveSummary {
    pub value: i64,
    pub augmenting_paths: u64,
    pub nodes_visited: u64,
    pub elapsed_ms: f64,
}

impl From<&MaxFlow> for SolveSummary {
    fn from(result: &MaxFlow) -> Self {
        Self {
            value: result.value,
            augmenting_paths: result.stats.augmenting_paths,
            nodes_visited: result.stats.nodes_visited,
            elapsed_ms: result.stats.elapsed.as_secs_f64() * 1000.0,
        }
    }
}

/// Beds consumed in one hospital band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BedUsage {
    pub hospital_id: u64,
    pub band: Band,
    pub used: i64,
    pub remaining: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BedAllocationReport {
    pub solve: SolveSummary,
    pub placements: Vec<Placement>,
    pub transfers: Vec<Transfer>,
    pub bed_usage: Vec<BedUsage>,
    /// Patients left without a bed, ascending.
    pub unplaced: Vec<u64>,
    pub committed: bool,
}

/// Stock moved from one center to one zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Shipment {
    pub center_id: u64,
    pub zone_id: u64,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CenterLevel {
    pub center_id: u64,
    pub shipped: i64,
    pub remaining: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneLevel {
    pub zone_id: u64,
    pub received: i64,
    pub remaining: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransportReport {
    pub solve: SolveSummary,
    pub shipments: Vec<Shipment>,
    pub centers: Vec<CenterLevel>,
    pub zones: Vec<ZoneLevel>,
    pub committed: bool,
}

impl TransportReport {
    pub fn shipped(&self) -> i64 {
        self.shipments.iter().map(|s| s.amount).sum()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteCapacityReport {
    pub source: String,
    pub sink: String,
    pub solve: SolveSummary,
    /// One slot per neighbor of the source that received flow.
    pub slots: Vec<CapacitySlot>,
    pub site_flows: Vec<SiteFlow>,
    pub committed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SupplyReport {
    pub cascade: CascadeOutcome,
    pub committed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct KitReport {
    pub selection: Selection,
    pub committed: bool,
}

/// Transport, slot derivation and cascade committed as one batch.
#[derive(Debug, Clone, Serialize)]
pub struct SupplyChainReport {
    pub transport: TransportReport,
    pub slots: Vec<CapacitySlot>,
    pub cascade: CascadeOutcome,
    pub committed: bool,
}
