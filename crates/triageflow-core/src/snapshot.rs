//! Point-in-time snapshots of capacities and demands.
//!
//! The graph builders only ever see a snapshot. Constructors sort every
//! entity list by primary id so that graph construction does not depend on
//! the order the persistence layer happened to return rows in.

use crate::domain::{
    DisasterZone, Hospital, HospitalTransfer, Item, Patient, RouteLink, SupplyCenter,
    TransportRoute,
};
use crate::error::{AllocationError, Result};
use crate::store::AllocationStore;

/// Inputs of the banded patient-to-hospital assignment.
#[derive(Debug, Clone, Default)]
pub struct BedSnapshot {
    pub patients: Vec<Patient>,
    pub hospitals: Vec<Hospital>,
    pub transfers: Vec<HospitalTransfer>,
}

impl BedSnapshot {
    pub fn new(
        mut patients: Vec<Patient>,
        mut hospitals: Vec<Hospital>,
        mut transfers: Vec<HospitalTransfer>,
    ) -> Self {
        patients.retain(|p| !p.is_assigned());
        patients.sort_by_key(|p| p.id);
        hospitals.sort_by_key(|h| h.id);
        transfers.sort_by_key(|t| t.id);
        Self {
            patients,
            hospitals,
            transfers,
        }
    }

    /// Reads unassigned patients, hospitals and transfers from the store.
    pub fn read<S: AllocationStore + ?Sized>(store: &S) -> Result<Self> {
        Ok(Self::new(
            store.unassigned_patients().map_err(AllocationError::Store)?,
            store.hospitals().map_err(AllocationError::Store)?,
            store.hospital_transfers().map_err(AllocationError::Store)?,
        ))
    }

    pub fn hospital(&self, id: u64) -> Option<&Hospital> {
        self.hospitals.iter().find(|h| h.id == id)
    }
}

/// Inputs of the stock-to-demand transport flow.
#[derive(Debug, Clone, Default)]
pub struct StockSnapshot {
    pub centers: Vec<SupplyCenter>,
    pub zones: Vec<DisasterZone>,
    pub routes: Vec<TransportRoute>,
}

impl StockSnapshot {
    pub fn new(
        mut centers: Vec<SupplyCenter>,
        mut zones: Vec<DisasterZone>,
        mut routes: Vec<TransportRoute>,
    ) -> Self {
        centers.sort_by_key(|c| c.id);
        zones.sort_by_key(|z| z.id);
        routes.sort_by_key(|r| r.id);
        Self {
            centers,
            zones,
            routes,
        }
    }

    pub fn read<S: AllocationStore + ?Sized>(store: &S) -> Result<Self> {
        Ok(Self::new(
            store.supply_centers().map_err(AllocationError::Store)?,
            store.disaster_zones().map_err(AllocationError::Store)?,
            store.transport_routes().map_err(AllocationError::Store)?,
        ))
    }
}

/// Links of a named route network.
#[derive(Debug, Clone, Default)]
pub struct NetworkSnapshot {
    pub links: Vec<RouteLink>,
}

impl NetworkSnapshot {
    pub fn new(mut links: Vec<RouteLink>) -> Self {
        links.sort_by_key(|l| l.id);
        Self { links }
    }

    pub fn read<S: AllocationStore + ?Sized>(store: &S) -> Result<Self> {
        Ok(Self::new(
            store.route_links().map_err(AllocationError::Store)?,
        ))
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Returns true if `name` is an endpoint of any link.
    pub fn contains_site(&self, name: &str) -> bool {
        self.links.iter().any(|l| l.from == name || l.to == name)
    }
}

/// Items still available for selection.
#[derive(Debug, Clone, Default)]
pub struct ItemPool {
    pub items: Vec<Item>,
}

impl ItemPool {
    /// Builds a pool, dropping consumed or already-routed items.
    pub fn new(mut items: Vec<Item>) -> Self {
        items.retain(Item::is_available);
        items.sort_by_key(|i| i.id);
        Self { items }
    }

    pub fn read<S: AllocationStore + ?Sized>(store: &S) -> Result<Self> {
        Ok(Self::new(store.items().map_err(AllocationError::Store)?))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
