//! An [`AllocationStore`] kept entirely in memory.
//!
//! Commits are applied to a copy of the current state; the copy replaces
//! the state only if every mutation succeeded, so a rejected batch leaves
//! nothing behind.

use std::collections::BTreeMap;

use tracing::debug;
use triageflow_core::{
    AllocationStore, CapacitySlot, CommitBatch, DisasterZone, Hospital, HospitalTransfer, Item,
    ItemId, Mutation, Patient, RouteLink, StoreError, SupplyCenter, TransportRoute,
};

#[derive(Debug, Clone, Default)]
struct State {
    patients: BTreeMap<u64, Patient>,
    hospitals: BTreeMap<u64, Hospital>,
    transfers: BTreeMap<u64, HospitalTransfer>,
    centers: BTreeMap<u64, SupplyCenter>,
    zones: BTreeMap<u64, DisasterZone>,
    routes: BTreeMap<u64, TransportRoute>,
    links: BTreeMap<u64, RouteLink>,
    items: BTreeMap<ItemId, Item>,
    slots: Vec<CapacitySlot>,
}

/// In-memory system of record with all-or-nothing commits.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: State,
    revision: u64,
}

macro_rules! rows {
    ($name:ident, $field:ident, $ty:ty) => {
        pub fn $name(mut self, rows: impl IntoIterator<Item = $ty>) -> Self {
            self.state.$field.extend(rows.into_iter().map(|r| (r.id, r)));
            self
        }
    };
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    rows!(with_patients, patients, Patient);
    rows!(with_hospitals, hospitals, Hospital);
    rows!(with_transfers, transfers, HospitalTransfer);
    rows!(with_centers, centers, SupplyCenter);
    rows!(with_zones, zones, DisasterZone);
    rows!(with_routes, routes, TransportRoute);
    rows!(with_links, links, RouteLink);
    rows!(with_items, items, Item);

    pub fn with_slots(mut self, slots: impl IntoIterator<Item = CapacitySlot>) -> Self {
        self.state.slots.extend(slots);
        self
    }

    /// Replaces the whole route network, as an upload does.
    pub fn replace_links(&mut self, links: Vec<RouteLink>) {
        self.state.links = links.into_iter().map(|l| (l.id, l)).collect();
    }

    /// Number of successful commits so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn patient(&self, id: u64) -> Option<&Patient> {
        self.state.patients.get(&id)
    }

    pub fn hospital(&self, id: u64) -> Option<&Hospital> {
        self.state.hospitals.get(&id)
    }

    pub fn center(&self, id: u64) -> Option<&SupplyCenter> {
        self.state.centers.get(&id)
    }

    pub fn zone(&self, id: u64) -> Option<&DisasterZone> {
        self.state.zones.get(&id)
    }

    pub fn route(&self, id: u64) -> Option<&TransportRoute> {
        self.state.routes.get(&id)
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.state.items.get(&id)
    }

    pub fn slots(&self) -> &[CapacitySlot] {
        &self.state.slots
    }

    /// All patients, assigned or not.
    pub fn patients(&self) -> impl Iterator<Item = &Patient> {
        self.state.patients.values()
    }
}

fn not_found(entity: &'static str, id: impl ToString) -> StoreError {
    StoreError::NotFound {
        entity,
        id: id.to_string(),
    }
}

fn non_negative(what: &str, value: i64) -> Result<i64, StoreError> {
    if value < 0 {
        return Err(StoreError::Rejected(format!("{what} would become {value}")));
    }
    Ok(value)
}

impl State {
    fn apply(&mut self, mutation: Mutation) -> Result<(), StoreError> {
        match mutation {
            Mutation::AssignPatient {
                patient_id,
                hospital_id,
            } => {
                if !self.hospitals.contains_key(&hospital_id) {
                    return Err(not_found("hospital", hospital_id));
                }
                let patient = self
                    .patients
                    .get_mut(&patient_id)
                    .ok_or_else(|| not_found("patient", patient_id))?;
                if let Some(current) = patient.hospital_id {
                    return Err(StoreError::Conflict(format!(
                        "patient {patient_id} already assigned to hospital {current}"
                    )));
                }
                patient.hospital_id = Some(hospital_id);
            }
            Mutation::SetHospitalBeds {
                hospital_id,
                band,
                available,
            } => {
                let hospital = self
                    .hospitals
                    .get_mut(&hospital_id)
                    .ok_or_else(|| not_found("hospital", hospital_id))?;
                let beds = non_negative(&format!("hospital {hospital_id} {band} beds"), available)?;
                hospital.beds.set(band, beds);
            }
            Mutation::SetCenterStock {
                center_id,
                total_stock,
            } => {
                let center = self
                    .centers
                    .get_mut(&center_id)
                    .ok_or_else(|| not_found("center", center_id))?;
                center.total_stock = non_negative(&format!("center {center_id} stock"), total_stock)?;
            }
            Mutation::SetZoneDemand { zone_id, demand } => {
                let zone = self
                    .zones
                    .get_mut(&zone_id)
                    .ok_or_else(|| not_found("zone", zone_id))?;
                zone.demand = non_negative(&format!("zone {zone_id} demand"), demand)?;
            }
            Mutation::RecordRouteFlow {
                center_id,
                zone_id,
                amount,
            } => {
                let amount = non_negative("route flow", amount)?;
                let existing = self
                    .routes
                    .values()
                    .find(|r| r.center_id == center_id && r.zone_id == zone_id)
                    .map(|r| r.id);
                let id = existing.unwrap_or_else(|| {
                    self.routes.keys().next_back().map_or(1, |last| last + 1)
                });
                self.routes
                    .entry(id)
                    .or_insert(TransportRoute {
                        id,
                        center_id,
                        zone_id,
                        send_limit: amount,
                        amount_sent: None,
                    })
                    .amount_sent = Some(amount);
            }
            Mutation::ReplaceCapacitySlots { slots } => {
                for slot in &slots {
                    non_negative(&format!("slot {} capacity", slot.name), slot.capacity)?;
                }
                self.slots = slots;
            }
            Mutation::ConsumeItem {
                item_id,
                units,
                slot,
            } => {
                let item = self
                    .items
                    .get_mut(&item_id)
                    .ok_or_else(|| not_found("item", item_id))?;
                if !item.is_available() {
                    return Err(StoreError::Conflict(format!(
                        "item {item_id} is no longer available"
                    )));
                }
                if units <= 0 || units > item.quantity {
                    return Err(StoreError::Rejected(format!(
                        "cannot take {units} of {} units of item {item_id}",
                        item.quantity
                    )));
                }
                item.quantity -= units;
                item.consumed = item.quantity == 0;
                item.slot = slot;
            }
        }
        Ok(())
    }
}

impl AllocationStore for InMemoryStore {
    fn unassigned_patients(&self) -> Result<Vec<Patient>, StoreError> {
        Ok(self
            .state
            .patients
            .values()
            .filter(|p| !p.is_assigned())
            .cloned()
            .collect())
    }

    fn hospitals(&self) -> Result<Vec<Hospital>, StoreError> {
        Ok(self.state.hospitals.values().cloned().collect())
    }

    fn hospital_transfers(&self) -> Result<Vec<HospitalTransfer>, StoreError> {
        Ok(self.state.transfers.values().cloned().collect())
    }

    fn supply_centers(&self) -> Result<Vec<SupplyCenter>, StoreError> {
        Ok(self.state.centers.values().cloned().collect())
    }

    fn disaster_zones(&self) -> Result<Vec<DisasterZone>, StoreError> {
        Ok(self.state.zones.values().cloned().collect())
    }

    fn transport_routes(&self) -> Result<Vec<TransportRoute>, StoreError> {
        Ok(self.state.routes.values().cloned().collect())
    }

    fn route_links(&self) -> Result<Vec<RouteLink>, StoreError> {
        Ok(self.state.links.values().cloned().collect())
    }

    fn items(&self) -> Result<Vec<Item>, StoreError> {
        Ok(self.state.items.values().cloned().collect())
    }

    fn capacity_slots(&self) -> Result<Vec<CapacitySlot>, StoreError> {
        Ok(self.state.slots.clone())
    }

    fn commit(&mut self, batch: CommitBatch) -> Result<(), StoreError> {
        let mutations = batch.len();
        let mut next = self.state.clone();
        for mutation in batch.mutations {
            next.apply(mutation)?;
        }
        self.state = next;
        self.revision += 1;
        debug!(event = "store_commit", mutations, revision = self.revision);
        Ok(())
    }
}
