//! Tests for flow extraction, placement settlement and slot derivation.

use triageflow_config::RouteCapacityPolicy;
use triageflow_core::{
    AllocationError, Band, BedSnapshot, EntityRef, NetworkSnapshot, NodeId, StockSnapshot,
};
use triageflow_test::logistics::bangladesh_network;
use triageflow_test::{center, hospital, patient, route, transfer, zone};

use super::*;
use crate::builder::{bed_assignment_graph, route_network_graph, stock_distribution_graph};
use crate::graph::{EdgeFlow, ResidualGraph};
use crate::maxflow::{max_flow, SolveStats};

fn solved(mut graph: ResidualGraph, source: NodeId, sink: NodeId) -> MaxFlow {
    max_flow(&mut graph, &source, &sink).unwrap()
}

fn edge(from: NodeId, to: NodeId, amount: i64) -> EdgeFlow {
    EdgeFlow { from, to, amount }
}

fn fabricated(flows: Vec<EdgeFlow>) -> MaxFlow {
    MaxFlow {
        source: NodeId::Source,
        sink: NodeId::Sink,
        value: 0,
        flows,
        stats: SolveStats::default(),
    }
}

#[test]
fn test_patient_assignments() {
    let snapshot = BedSnapshot::new(
        vec![patient(1, 1), patient(2, 2), patient(3, 2)],
        vec![hospital(1, [1, 0, 0, 0]), hospital(2, [0, 1, 0, 0])],
        vec![],
    );
    let result = solved(
        bed_assignment_graph(&snapshot).unwrap(),
        NodeId::Source,
        NodeId::Sink,
    );

    let extraction = extract(&result).unwrap();

    assert_eq!(extraction.assigned(), 2);
    assert_eq!(
        extraction.assignments[0],
        Assignment {
            demand: EntityRef::patient(1),
            supply: EntityRef::hospital(1),
            band: Some(Band::Critical),
            amount: 1,
        }
    );
    assert_eq!(extraction.assignments[1].demand, EntityRef::patient(2));
    assert_eq!(extraction.assignments[1].band, Some(Band::Top));
    assert!(extraction.transfers.is_empty());
}

#[test]
fn test_empty_flow_extracts_nothing() {
    let result = solved(
        bed_assignment_graph(&BedSnapshot::default()).unwrap(),
        NodeId::Source,
        NodeId::Sink,
    );
    let extraction = extract(&result).unwrap();
    assert!(extraction.is_empty());
    assert_eq!(extraction.assigned(), 0);
}

#[test]
fn test_demand_split_across_supplies_is_inconsistent() {
    let demand = NodeId::demand(EntityRef::patient(4));
    let result = fabricated(vec![
        edge(NodeId::Source, demand.clone(), 2),
        edge(
            demand.clone(),
            NodeId::banded_supply(EntityRef::hospital(1), Band::Low),
            1,
        ),
        edge(
            demand,
            NodeId::banded_supply(EntityRef::hospital(2), Band::Low),
            1,
        ),
    ]);

    match extract(&result) {
        Err(AllocationError::AssignmentInconsistency { demand, supplies }) => {
            assert_eq!(demand, "patient-4");
            assert_eq!(supplies.len(), 2);
        }
        other => panic!("expected inconsistency, got {other:?}"),
    }
}

#[test]
fn test_zone_served_by_several_centers_is_fine() {
    let snapshot = StockSnapshot::new(
        vec![center(1, 3), center(2, 3)],
        vec![zone(1, 5)],
        vec![route(1, 1, 1, 10), route(2, 2, 1, 10)],
    );
    let result = solved(
        stock_distribution_graph(&snapshot, RouteCapacityPolicy::PreferSent).unwrap(),
        NodeId::Source,
        NodeId::Sink,
    );

    let extraction = extract(&result).unwrap();

    assert_eq!(result.value, 5);
    assert_eq!(extraction.assignments.len(), 2);
    assert_eq!(extraction.assigned(), 5);
    assert!(extraction
        .assignments
        .iter()
        .all(|a| a.demand == EntityRef::zone(1) && a.band.is_none()));
}

#[test]
fn test_transfer_settles_patient_at_receiving_hospital() {
    // Hospital 1 has one critical bed, hospital 2 has one. Both patients
    // can only reach hospital 1 directly; the transfer moves one on.
    let snapshot = BedSnapshot::new(
        vec![patient(1, 1), patient(2, 1)],
        vec![hospital(1, [1, 0, 0, 0]), hospital(2, [1, 0, 0, 0])],
        vec![transfer(1, 1, 2, 1)],
    );
    let mut graph = bed_assignment_graph(&snapshot).unwrap();
    // Only hospital 1 is directly reachable for both patients.
    for p in [1, 2] {
        graph
            .add_edge(
                NodeId::demand(EntityRef::patient(p)),
                NodeId::banded_supply(EntityRef::hospital(2), Band::Critical),
                0,
            )
            .unwrap();
    }
    let result = solved(graph, NodeId::Source, NodeId::Sink);
    let extraction = extract(&result).unwrap();

    assert_eq!(result.value, 2);
    assert_eq!(extraction.transfers.len(), 1);

    let placements = settle_placements(&result, &extraction).unwrap();
    assert_eq!(placements.len(), 2);
    assert_eq!(placements[0].hospital_id, 1);
    assert!(!placements[0].is_transferred());
    assert_eq!(placements[1].entered_hospital, 1);
    assert_eq!(placements[1].hospital_id, 2);
    assert!(placements[1].is_transferred());
}

#[test]
fn test_settlement_detects_missing_sink_flow() {
    let demand = NodeId::demand(EntityRef::patient(1));
    let supply = NodeId::banded_supply(EntityRef::hospital(1), Band::Mid);
    let result = fabricated(vec![
        edge(NodeId::Source, demand.clone(), 1),
        edge(demand, supply, 1),
    ]);
    let extraction = extract(&result).unwrap();

    assert!(matches!(
        settle_placements(&result, &extraction),
        Err(AllocationError::FlowInvariant(_))
    ));
}

#[test]
fn test_slots_from_network_source() {
    let snapshot = NetworkSnapshot::new(bangladesh_network());
    let result = solved(
        route_network_graph(&snapshot, true).unwrap(),
        NodeId::site("Dhaka"),
        NodeId::site("Chittagong"),
    );

    let slots = slots_from_source(&result);

    assert_eq!(
        slots,
        vec![
            CapacitySlot::new(1, "Comilla", 6),
            CapacitySlot::new(2, "Mymensingh", 3),
        ]
    );
    assert_eq!(slots.iter().map(|s| s.capacity).sum::<i64>(), result.value);

    let extraction = extract(&result).unwrap();
    assert!(extraction
        .site_flows
        .iter()
        .any(|f| f.from == "Comilla" && f.to == "Chittagong" && f.amount == 6));
}

#[test]
fn test_slots_from_assignments_merge_pairs() {
    let assignments = vec![
        Assignment {
            demand: EntityRef::zone(2),
            supply: EntityRef::center(1),
            band: None,
            amount: 4,
        },
        Assignment {
            demand: EntityRef::zone(1),
            supply: EntityRef::center(1),
            band: None,
            amount: 2,
        },
        Assignment {
            demand: EntityRef::zone(2),
            supply: EntityRef::center(1),
            band: None,
            amount: 1,
        },
        Assignment {
            demand: EntityRef::zone(3),
            supply: EntityRef::center(2),
            band: None,
            amount: 0,
        },
    ];

    let slots = slots_from_assignments(&assignments);

    assert_eq!(
        slots,
        vec![
            CapacitySlot::new(1, "center-1->zone-1", 2),
            CapacitySlot::new(2, "center-1->zone-2", 5),
        ]
    );
}
