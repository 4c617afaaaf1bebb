//! Reads positive flows back into domain-level pairings.
//!
//! Source- and sink-incident edges are dropped; the remaining positive
//! flows are decoded from their tagged node identifiers:
//!
//! | edge | result |
//! |---|---|
//! | `Demand -> Supply` | [`Assignment`] (patient to hospital band) |
//! | `Supply -> Demand` | [`Assignment`] (center to zone) |
//! | `Supply -> Supply` | [`Transfer`] between hospitals |
//! | `Site -> Site` | [`SiteFlow`] on a route link |

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::debug;
use triageflow_core::{AllocationError, Band, CapacitySlot, EntityKind, EntityRef, NodeId, Result};

use crate::graph::EdgeFlow;
use crate::maxflow::MaxFlow;

/// A demand paired with the supply that serves it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub demand: EntityRef,
    pub supply: EntityRef,
    pub band: Option<Band>,
    /// Always 1 for patients; any positive amount for stock routes.
    pub amount: i64,
}

/// Flow moved between two supply nodes of the same band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transfer {
    pub from: EntityRef,
    pub to: EntityRef,
    pub band: Option<Band>,
    pub amount: i64,
}

/// Flow on a link between two named sites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteFlow {
    pub from: String,
    pub to: String,
    pub amount: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Extraction {
    pub assignments: Vec<Assignment>,
    pub transfers: Vec<Transfer>,
    pub site_flows: Vec<SiteFlow>,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty() && self.transfers.is_empty() && self.site_flows.is_empty()
    }

    /// Total amount over all assignments.
    pub fn assigned(&self) -> i64 {
        self.assignments.iter().map(|a| a.amount).sum()
    }
}

/// Decodes the positive flows of a solve.
///
/// # Errors
///
/// `AssignmentInconsistency` when a demand node sends flow into more than
/// one supply node. Unit source edges make that impossible for a correctly
/// built graph, so it always points at a builder defect.
pub fn extract(result: &MaxFlow) -> Result<Extraction> {
    let mut extraction = Extraction::default();
    let mut served_by: BTreeMap<EntityRef, Vec<String>> = BTreeMap::new();

    for EdgeFlow { from, to, amount } in &result.flows {
        if from.is_terminal() || to.is_terminal() {
            continue;
        }
        match (from, to) {
            (NodeId::Demand(demand, band), NodeId::Supply(supply, supply_band)) => {
                served_by.entry(*demand).or_default().push(to.to_string());
                extraction.assignments.push(Assignment {
                    demand: *demand,
                    supply: *supply,
                    band: band.or(*supply_band),
                    amount: *amount,
                });
            }
            (NodeId::Supply(supply, band), NodeId::Demand(demand, _)) => {
                extraction.assignments.push(Assignment {
                    demand: *demand,
                    supply: *supply,
                    band: *band,
                    amount: *amount,
                });
            }
            (NodeId::Supply(a, band), NodeId::Supply(b, _)) => {
                extraction.transfers.push(Transfer {
                    from: *a,
                    to: *b,
                    band: *band,
                    amount: *amount,
                });
            }
            (NodeId::Site(a), NodeId::Site(b)) => {
                extraction.site_flows.push(SiteFlow {
                    from: a.clone(),
                    to: b.clone(),
                    amount: *amount,
                });
            }
            _ => debug!(event = "flow_ignored", from = %from, to = %to, amount),
        }
    }

    if let Some((demand, supplies)) = served_by.into_iter().find(|(_, s)| s.len() > 1) {
        return Err(AllocationError::AssignmentInconsistency {
            demand: demand.to_string(),
            supplies,
        });
    }
    Ok(extraction)
}

/// Where a patient's bed is actually consumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub patient_id: u64,
    pub band: Band,
    /// Hospital whose band node the patient's flow entered.
    pub entered_hospital: u64,
    /// Hospital that provides the bed.
    pub hospital_id: u64,
}

impl Placement {
    pub fn is_transferred(&self) -> bool {
        self.entered_hospital != self.hospital_id
    }
}

/// Follows each patient's unit of flow to the hospital band that passes
/// it to the sink.
///
/// Patients are walked in ascending id order. At each band node a unit is
/// kept while sink flow remains there, otherwise it moves along the first
/// transfer with flow left. Conservation guarantees every walk ends at a
/// sink edge.
pub fn settle_placements(result: &MaxFlow, extraction: &Extraction) -> Result<Vec<Placement>> {
    let mut to_sink: HashMap<(EntityRef, Band), i64> = HashMap::new();
    for flow in result.flows.iter().filter(|f| f.to == result.sink) {
        if let NodeId::Supply(hospital, Some(band)) = &flow.from {
            *to_sink.entry((*hospital, *band)).or_default() += flow.amount;
        }
    }

    let mut outgoing: HashMap<(EntityRef, Band), Vec<(EntityRef, i64)>> = HashMap::new();
    for transfer in &extraction.transfers {
        if let Some(band) = transfer.band {
            outgoing
                .entry((transfer.from, band))
                .or_default()
                .push((transfer.to, transfer.amount));
        }
    }

    let mut patients: Vec<&Assignment> = extraction
        .assignments
        .iter()
        .filter(|a| a.demand.kind == EntityKind::Patient)
        .collect();
    patients.sort_by_key(|a| a.demand.id);

    let mut placements = Vec::with_capacity(patients.len());
    for assignment in patients {
        let band = assignment.band.ok_or_else(|| {
            AllocationError::FlowInvariant(format!("patient {} has no band", assignment.demand))
        })?;
        let mut at = assignment.supply;
        loop {
            if let Some(left) = to_sink.get_mut(&(at, band)).filter(|l| **l > 0) {
                *left -= 1;
                break;
            }
            let next = outgoing
                .get_mut(&(at, band))
                .and_then(|out| out.iter_mut().find(|(_, left)| *left > 0));
            match next {
                Some((target, left)) => {
                    *left -= 1;
                    at = *target;
                }
                None => {
                    return Err(AllocationError::FlowInvariant(format!(
                        "flow of {} stops at {at}/{band}",
                        assignment.demand
                    )));
                }
            }
        }
        placements.push(Placement {
            patient_id: assignment.demand.id,
            band,
            entered_hospital: assignment.supply.id,
            hospital_id: at.id,
        });
    }
    Ok(placements)
}

/// Turns the flow leaving the source into capacity slots, one per
/// immediate neighbor, numbered from 1 in graph order.
pub fn slots_from_source(result: &MaxFlow) -> Vec<CapacitySlot> {
    result
        .flows
        .iter()
        .filter(|f| f.from == result.source)
        .enumerate()
        .map(|(i, f)| {
            let name = match &f.to {
                NodeId::Site(name) => name.clone(),
                other => other.to_string(),
            };
            CapacitySlot::new(i as u64 + 1, name, f.amount)
        })
        .collect()
}

/// Turns routed stock into capacity slots, one per center and zone pair,
/// ordered by center then zone.
pub fn slots_from_assignments(assignments: &[Assignment]) -> Vec<CapacitySlot> {
    let mut routed: BTreeMap<(EntityRef, EntityRef), i64> = BTreeMap::new();
    for a in assignments.iter().filter(|a| a.amount > 0) {
        *routed.entry((a.supply, a.demand)).or_default() += a.amount;
    }
    routed
        .into_iter()
        .enumerate()
        .map(|(i, ((supply, demand), amount))| {
            CapacitySlot::new(i as u64 + 1, format!("{supply}->{demand}"), amount)
        })
        .collect()
}

#[cfg(test)]
mod tests;
