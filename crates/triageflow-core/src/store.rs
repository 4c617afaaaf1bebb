//! The persistence seam.
//!
//! The engine reads snapshots through [`AllocationStore`] and hands back a
//! single [`CommitBatch`]. A store must apply a batch atomically: either
//! every mutation takes effect or none does.

use thiserror::Error;

use crate::domain::{
    CapacitySlot, DisasterZone, Hospital, HospitalTransfer, Item, ItemId, Patient, RouteLink,
    SupplyCenter, TransportRoute,
};
use crate::node::Band;

/// Errors raised by a persistence backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("conflicting update: {0}")]
    Conflict(String),

    #[error("batch rejected: {0}")]
    Rejected(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// One derived update produced by an allocation run.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum Mutation {
    AssignPatient {
        patient_id: u64,
        hospital_id: u64,
    },
    SetHospitalBeds {
        hospital_id: u64,
        band: Band,
        available: i64,
    },
    SetCenterStock {
        center_id: u64,
        total_stock: i64,
    },
    SetZoneDemand {
        zone_id: u64,
        demand: i64,
    },
    /// Creates the route if it does not exist yet.
    RecordRouteFlow {
        center_id: u64,
        zone_id: u64,
        amount: i64,
    },
    ReplaceCapacitySlots {
        slots: Vec<CapacitySlot>,
    },
    ConsumeItem {
        item_id: ItemId,
        units: i64,
        slot: Option<String>,
    },
}

/// An ordered set of mutations applied all-or-nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CommitBatch {
    pub mutations: Vec<Mutation>,
}

impl CommitBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, mutation: Mutation) {
        self.mutations.push(mutation);
    }

    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }
}

impl Extend<Mutation> for CommitBatch {
    fn extend<T: IntoIterator<Item = Mutation>>(&mut self, iter: T) {
        self.mutations.extend(iter);
    }
}

/// Read snapshots and atomic commit against the system of record.
///
/// Implementations are not required to be thread-safe: callers serialize
/// allocation runs, since two runs over the same capacity pool could
/// double-allocate.
pub trait AllocationStore {
    /// Patients without a hospital.
    fn unassigned_patients(&self) -> Result<Vec<Patient>, StoreError>;

    fn hospitals(&self) -> Result<Vec<Hospital>, StoreError>;

    fn hospital_transfers(&self) -> Result<Vec<HospitalTransfer>, StoreError>;

    fn supply_centers(&self) -> Result<Vec<SupplyCenter>, StoreError>;

    fn disaster_zones(&self) -> Result<Vec<DisasterZone>, StoreError>;

    fn transport_routes(&self) -> Result<Vec<TransportRoute>, StoreError>;

    fn route_links(&self) -> Result<Vec<RouteLink>, StoreError>;

    /// All items, including consumed ones.
    fn items(&self) -> Result<Vec<Item>, StoreError>;

    /// Capacity slots recorded by a previous flow stage.
    fn capacity_slots(&self) -> Result<Vec<CapacitySlot>, StoreError>;

    /// Applies every mutation of `batch`, or none of them.
    fn commit(&mut self, batch: CommitBatch) -> Result<(), StoreError>;
}
