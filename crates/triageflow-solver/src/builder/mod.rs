//! Graph builders for the allocation scenarios.
//!
//! Each builder turns a snapshot into a [`ResidualGraph`]. Snapshots are
//! sorted by primary id, so the same snapshot always yields the same nodes
//! and edges in the same order. Entities with zero relevant capacity are
//! left out instead of being connected with zero-capacity edges.
//!
//! Scenarios:
//! - [`bed_assignment_graph`]: patients to hospital bands, strict banding
//! - [`stock_distribution_graph`]: supply centers to disaster zones
//! - [`route_network_graph`]: named sites joined by route links

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};
use triageflow_config::RouteCapacityPolicy;
use triageflow_core::{
    AllocationError, Band, BedSnapshot, EntityRef, NetworkSnapshot, NodeId, Result,
    StockSnapshot, TransportRoute,
};

use crate::graph::ResidualGraph;

/// Builds the priority-banded patient assignment graph.
///
/// - `Source -> Demand(patient)` with capacity 1 per unassigned patient
/// - `Demand(patient) -> Supply(hospital, band)` with capacity 1 when the
///   hospital has beds in the patient's band
/// - `Supply(a, band) -> Supply(b, band)` for each transfer, in every band
///   where both hospitals have beds. The transfer capacity bounds each band
///   lane on its own; lanes are not pooled, since a pooled node would let
///   flow change band.
/// - `Supply(hospital, band) -> Sink` with capacity equal to available beds
///
/// # Errors
///
/// `InvalidBand` for an unknown priority level, `InvalidCapacity` for a
/// negative bed count or transfer capacity.
pub fn bed_assignment_graph(snapshot: &BedSnapshot) -> Result<ResidualGraph> {
    let mut graph = ResidualGraph::new();
    graph.add_node(NodeId::Source);
    graph.add_node(NodeId::Sink);

    for hospital in &snapshot.hospitals {
        for band in Band::ALL {
            let beds = hospital.beds.get(band);
            if beds < 0 {
                return Err(AllocationError::invalid_capacity(
                    format!("hospital {} {band} beds", hospital.id),
                    beds,
                ));
            }
        }
    }

    for patient in &snapshot.patients {
        Band::from_priority(patient.priority_level)?;
        graph.add_edge(
            NodeId::Source,
            NodeId::demand(EntityRef::patient(patient.id)),
            1,
        )?;
    }

    for patient in &snapshot.patients {
        let band = Band::from_priority(patient.priority_level)?;
        let demand = NodeId::demand(EntityRef::patient(patient.id));
        for hospital in snapshot.hospitals.iter().filter(|h| h.beds.get(band) > 0) {
            graph.add_edge(
                demand.clone(),
                NodeId::banded_supply(EntityRef::hospital(hospital.id), band),
                1,
            )?;
        }
    }

    for transfer in &snapshot.transfers {
        if transfer.capacity < 0 {
            return Err(AllocationError::invalid_capacity(
                format!("transfer {}", transfer.id),
                transfer.capacity,
            ));
        }
        if transfer.capacity == 0 || transfer.from_hospital == transfer.to_hospital {
            continue;
        }
        let (Some(from), Some(to)) = (
            snapshot.hospital(transfer.from_hospital),
            snapshot.hospital(transfer.to_hospital),
        ) else {
            warn!(
                event = "transfer_skipped",
                transfer = transfer.id,
                reason = "unknown hospital"
            );
            continue;
        };
        for band in Band::ALL {
            if from.beds.get(band) > 0 && to.beds.get(band) > 0 {
                graph.add_edge(
                    NodeId::banded_supply(EntityRef::hospital(from.id), band),
                    NodeId::banded_supply(EntityRef::hospital(to.id), band),
                    transfer.capacity,
                )?;
            }
        }
    }

    for hospital in &snapshot.hospitals {
        for band in Band::ALL {
            let beds = hospital.beds.get(band);
            if beds > 0 {
                graph.add_edge(
                    NodeId::banded_supply(EntityRef::hospital(hospital.id), band),
                    NodeId::Sink,
                    beds,
                )?;
            }
        }
    }

    debug!(
        event = "graph_built",
        scenario = "beds",
        nodes = graph.node_count(),
        edges = graph.edge_count(),
    );
    Ok(graph)
}

/// Capacity of a center-to-zone route under `policy`.
pub fn route_capacity(route: &TransportRoute, policy: RouteCapacityPolicy) -> Result<i64> {
    if route.send_limit < 0 {
        return Err(AllocationError::invalid_capacity(
            format!("route {} send limit", route.id),
            route.send_limit,
        ));
    }
    match (policy, route.amount_sent) {
        (_, Some(sent)) if sent < 0 => Err(AllocationError::invalid_capacity(
            format!("route {} sent amount", route.id),
            sent,
        )),
        (RouteCapacityPolicy::PreferSent, Some(sent)) if sent > 0 => Ok(sent),
        _ => Ok(route.send_limit),
    }
}

/// Builds the stock-to-demand transport graph.
///
/// - `Source -> Supply(center)` with capacity equal to current stock
/// - `Supply(center) -> Demand(zone)` with the route capacity; several
///   routes between the same pair add up
/// - `Demand(zone) -> Sink` with capacity equal to unmet demand
pub fn stock_distribution_graph(
    snapshot: &StockSnapshot,
    policy: RouteCapacityPolicy,
) -> Result<ResidualGraph> {
    let mut graph = ResidualGraph::new();
    graph.add_node(NodeId::Source);
    graph.add_node(NodeId::Sink);

    let mut stocked = BTreeSet::new();
    for center in &snapshot.centers {
        if center.total_stock < 0 {
            return Err(AllocationError::invalid_capacity(
                format!("center {} stock", center.id),
                center.total_stock,
            ));
        }
        if center.total_stock > 0 {
            graph.add_edge(
                NodeId::Source,
                NodeId::supply(EntityRef::center(center.id)),
                center.total_stock,
            )?;
            stocked.insert(center.id);
        }
    }

    let mut in_need = BTreeSet::new();
    for zone in &snapshot.zones {
        if zone.demand < 0 {
            return Err(AllocationError::invalid_capacity(
                format!("zone {} demand", zone.id),
                zone.demand,
            ));
        }
        if zone.demand > 0 {
            in_need.insert(zone.id);
        }
    }

    let mut pair_capacity: BTreeMap<(u64, u64), i64> = BTreeMap::new();
    for route in &snapshot.routes {
        let capacity = route_capacity(route, policy)?;
        if capacity > 0 && stocked.contains(&route.center_id) && in_need.contains(&route.zone_id) {
            let total = pair_capacity
                .entry((route.center_id, route.zone_id))
                .or_default();
            *total = total.checked_add(capacity).ok_or_else(|| {
                AllocationError::invalid_capacity(
                    format!(
                        "parallel routes from center {} to zone {}",
                        route.center_id, route.zone_id
                    ),
                    capacity,
                )
            })?;
        }
    }
    for ((center_id, zone_id), capacity) in pair_capacity {
        graph.add_edge(
            NodeId::supply(EntityRef::center(center_id)),
            NodeId::demand(EntityRef::zone(zone_id)),
            capacity,
        )?;
    }

    for zone in snapshot.zones.iter().filter(|z| z.demand > 0) {
        graph.add_edge(
            NodeId::demand(EntityRef::zone(zone.id)),
            NodeId::Sink,
            zone.demand,
        )?;
    }

    debug!(
        event = "graph_built",
        scenario = "transport",
        nodes = graph.node_count(),
        edges = graph.edge_count(),
    );
    Ok(graph)
}

/// Builds a graph of named sites from route links.
///
/// With `bidirectional` every link is added in both directions with the
/// same capacity. Links from a site to itself carry nothing and are skipped.
pub fn route_network_graph(snapshot: &NetworkSnapshot, bidirectional: bool) -> Result<ResidualGraph> {
    let mut graph = ResidualGraph::new();

    for link in &snapshot.links {
        if link.max_capacity < 0 {
            return Err(AllocationError::invalid_capacity(
                format!("link {} ({} -> {})", link.id, link.from, link.to),
                link.max_capacity,
            ));
        }
        if link.from == link.to {
            warn!(event = "link_skipped", link = link.id, reason = "self-loop");
            continue;
        }
        if link.max_capacity == 0 {
            continue;
        }
        let from = NodeId::site(link.from.as_str());
        let to = NodeId::site(link.to.as_str());
        graph.add_edge(from.clone(), to.clone(), link.max_capacity)?;
        if bidirectional {
            graph.add_edge(to, from, link.max_capacity)?;
        }
    }

    debug!(
        event = "graph_built",
        scenario = "network",
        nodes = graph.node_count(),
        edges = graph.edge_count(),
    );
    Ok(graph)
}
